//! Subcommand handlers

use anyhow::{Context, bail};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use tarkov_client::{
    Credentials, LauncherClient, MarketFilter, Session, SessionClient, TraderItem, generate_hwid,
};
use tarkov_protocol::ClientConfig;
use tracing::{info, warn};

use crate::{LoginArgs, OutputFormat};

pub fn hwid(format: OutputFormat) -> anyhow::Result<()> {
    let hwid = generate_hwid();
    match format {
        OutputFormat::Text => println!("{hwid}"),
        OutputFormat::Json => print_json(&serde_json::json!({ "hwid": hwid }))?,
    }
    Ok(())
}

pub async fn profile(login: &LoginArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut client = connect(login).await?;
    let profile = client.my_profile().await?;
    match format {
        OutputFormat::Json => print_json(&profile)?,
        OutputFormat::Text => {
            let info = &profile["Info"];
            println!("Id:       {}", text(&profile["_id"]));
            println!("Nickname: {}", text(&info["Nickname"]));
            println!("Side:     {}", text(&info["Side"]));
            println!("Level:    {}", text(&info["Level"]));
        }
    }
    Ok(())
}

pub async fn traders(login: &LoginArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut client = connect(login).await?;
    let traders = client.traders().await?;
    match format {
        OutputFormat::Json => print_json(&traders)?,
        OutputFormat::Text => {
            for trader in traders.as_array().into_iter().flatten() {
                println!("{:<26} {}", text(&trader["_id"]), text(&trader["nickname"]));
            }
        }
    }
    Ok(())
}

pub async fn trader_items(login: &LoginArgs, trader: &str, format: OutputFormat) -> anyhow::Result<()> {
    let mut client = connect(login).await?;
    let trader_id = if is_object_id(trader) {
        trader.to_string()
    } else {
        client.trader_id_by_name(trader).await?
    };

    let resolution = client.trader_items(&trader_id).await?;
    for gap in &resolution.gaps {
        let template = gap.template_id.as_deref().unwrap_or("-");
        warn!("Skipped {} ({template}): {}", gap.item_id, gap.reason);
    }

    match format {
        OutputFormat::Json => print_json(&resolution.items)?,
        OutputFormat::Text => {
            for item in &resolution.items {
                let name = display_name(&mut client, &item.template_id).await?;
                let costs = costs(&mut client, item).await?;
                println!("{name:<40} LL{} {costs}", item.loyalty_level);
            }
        }
    }
    Ok(())
}

pub async fn roubles(login: &LoginArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut client = connect(login).await?;
    let count = client.rouble_count().await?;
    match format {
        OutputFormat::Text => println!("{count}"),
        OutputFormat::Json => print_json(&serde_json::json!({ "roubles": count }))?,
    }
    Ok(())
}

pub async fn market(login: &LoginArgs, template: &str, limit: u32, format: OutputFormat) -> anyhow::Result<()> {
    let mut client = connect(login).await?;
    let filter = MarketFilter::for_template(template).limit(limit);
    let result = client.search_market(&filter).await?;
    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => {
            println!("{} offer(s)", text(&result["offersCount"]));
            for offer in result["offers"].as_array().into_iter().flatten() {
                println!(
                    "{:<26} {:>12} x{}",
                    text(&offer["_id"]),
                    text(&offer["summaryCost"]),
                    text(&offer["items"][0]["upd"]["StackObjectsCount"])
                );
            }
        }
    }
    Ok(())
}

pub async fn price(login: &LoginArgs, template: &str, format: OutputFormat) -> anyhow::Result<()> {
    let mut client = connect(login).await?;
    let price = client.item_market_price(template).await?;
    match format {
        OutputFormat::Json => print_json(&price)?,
        OutputFormat::Text => {
            println!(
                "min {}  avg {}  max {}",
                text(&price["min"]),
                text(&price["avg"]),
                text(&price["max"])
            );
        }
    }
    Ok(())
}

/// Resume or establish a session
async fn connect(login: &LoginArgs) -> anyhow::Result<SessionClient> {
    let config = ClientConfig::from_env().context("invalid client configuration")?;
    let mut launcher = LauncherClient::with_http(config)?;
    if login.refresh_versions {
        launcher.refresh_versions().await?;
    }

    let hwid = match &login.hwid {
        Some(hwid) => hwid.clone(),
        None => {
            warn!("No hardware id given, generated a new one; the backend will ask for a 2FA code");
            generate_hwid()
        }
    };

    let session = if let Some(session_id) = &login.session {
        Session::new(session_id.as_str(), hwid)?
    } else {
        let (Some(email), Some(password)) = (&login.email, &login.password) else {
            bail!("--email and --password (or TARKOV_EMAIL / TARKOV_PASSWORD) are required");
        };
        let credentials = Credentials::new(email.as_str(), password.as_str(), hwid);
        launcher
            .authenticate(credentials, prompt_two_factor_code)
            .await
            .context("login failed")?
    };

    info!("Using session {}", session.id());
    Ok(SessionClient::from_launcher(&launcher, session))
}

/// Read a two-factor code from stdin; an empty line gives up
fn prompt_two_factor_code() -> Option<String> {
    print!("Enter the 2FA code sent to your e-mail: ");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let code = line.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

async fn display_name(client: &mut SessionClient, template_id: &str) -> anyhow::Result<String> {
    match client.item_name(template_id).await {
        Ok(name) => Ok(name),
        Err(tarkov_client::ClientError::NotFound { .. }) => Ok(template_id.to_string()),
        Err(e) => Err(e.into()),
    }
}

async fn costs(client: &mut SessionClient, item: &TraderItem) -> anyhow::Result<String> {
    let mut parts = Vec::with_capacity(item.costs.len());
    for line in &item.costs {
        let name = display_name(client, &line.template_id).await?;
        parts.push(format!("{} x {name}", line.count));
    }
    Ok(parts.join(", "))
}

/// 24 hex digits, the shape of backend object ids
fn is_object_id(value: &str) -> bool {
    value.len() == 24 && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
