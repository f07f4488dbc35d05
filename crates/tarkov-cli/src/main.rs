mod commands;

use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tarkov",
    about = "Log in to the game backend and query profiles, traders and the flea market",
    version,
    long_about = "A command-line client for the game backend. Credentials come from flags or \
                  the TARKOV_EMAIL / TARKOV_PASSWORD / TARKOV_HWID environment variables; \
                  endpoints and client versions can be overridden with TARKOV_* variables."
)]
struct Cli {
    /// Set the logging level (RUST_LOG takes precedence)
    #[arg(short, long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(flatten)]
    login: LoginArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account e-mail
    #[arg(long, env = "TARKOV_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "TARKOV_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Hardware id registered with the account (generated when absent)
    #[arg(long, env = "TARKOV_HWID", hide_env_values = true, global = true)]
    pub hwid: Option<String>,

    /// Resume an existing session instead of logging in
    #[arg(long, env = "TARKOV_SESSION", hide_env_values = true, global = true)]
    pub session: Option<String>,

    /// Ask the launcher for current client versions before logging in
    #[arg(long, global = true)]
    pub refresh_versions: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a freshly generated hardware id
    Hwid,

    /// Show the main character profile
    Profile,

    /// List traders
    Traders,

    /// Show everything a trader sells, with costs
    TraderItems {
        /// Trader id or nickname (e.g. Prapor)
        trader: String,
    },

    /// Show how many roubles the main character holds
    Roubles,

    /// Search flea market offers for an item template
    Market {
        /// Item template id
        template: String,

        /// Number of offers to fetch
        #[arg(short, long, default_value_t = 15)]
        limit: u32,
    },

    /// Show average market prices for an item template
    Price {
        /// Item template id
        template: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::from(cli.log_level).as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Hwid => commands::hwid(cli.format),
        Commands::Profile => commands::profile(&cli.login, cli.format).await,
        Commands::Traders => commands::traders(&cli.login, cli.format).await,
        Commands::TraderItems { trader } => {
            commands::trader_items(&cli.login, &trader, cli.format).await
        }
        Commands::Roubles => commands::roubles(&cli.login, cli.format).await,
        Commands::Market { template, limit } => {
            commands::market(&cli.login, &template, limit, cli.format).await
        }
        Commands::Price { template } => commands::price(&cli.login, &template, cli.format).await,
    }
}
