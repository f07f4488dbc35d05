//! Launcher API client
//!
//! Login, hardware activation, token exchange and version discovery all go
//! through the launcher endpoints, which share one header set and one error
//! table: any non-zero code is fatal to the call.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tarkov_protocol::envelope::{self, ResponseEnvelope};
use tarkov_protocol::{ClientConfig, ErrorCode, HttpTransport, Transport, TransportRequest};
use tracing::{debug, error, info, trace, warn};

use crate::auth::{AuthFlow, AuthState, LoginStep};
use crate::credentials::{Credentials, validate_hwid};
use crate::error::{ChallengeKind, ClientError, Result};
use crate::requests::{GameStartRequest, HardwareActivationRequest, LoginRequest, VersionContext};
use crate::session::Session;

/// Client for the launcher endpoints
pub struct LauncherClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl LauncherClient {
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Launcher client over a fresh reqwest transport built from `config`
    pub fn with_http(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(&config.http, config.retry_policy.clone())?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared handle to the transport, for building session clients
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    async fn post(
        &self,
        url: String,
        body: Option<&impl Serialize>,
        token: Option<&str>,
    ) -> Result<ResponseEnvelope> {
        let body = match body {
            Some(body) => serde_json::to_string(body).map_err(tarkov_protocol::ProtocolError::from)?,
            None => String::new(),
        };
        debug!("Sending request to {} ({})", url, redact_pass(&body));

        let mut request = TransportRequest::new(url, body)
            .header("Content-Type", "application/json")
            .header(
                "User-Agent",
                format!("BSG Launcher {}", self.config.launcher_version),
            );
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            request = request.header("Authorization", token);
        }

        let response = self.transport.post(request).await?;
        let envelope = envelope::decode_response(&response)?;
        trace!("Response: {}", envelope.data);
        Ok(envelope)
    }

    fn check(operation: &'static str, envelope: ResponseEnvelope) -> Result<Value> {
        if envelope.is_ok() {
            return Ok(envelope.data);
        }
        let err = ClientError::api(operation, envelope.err, envelope.errmsg);
        error!("{err}");
        Err(err)
    }

    fn launcher_url(&self, path: &str, with_branch: bool) -> String {
        let base = self.config.launcher_endpoint(path);
        self.with_query(base, with_branch)
    }

    fn with_query(&self, base: String, with_branch: bool) -> String {
        if with_branch {
            format!(
                "{base}?launcherVersion={}&branch={}",
                self.config.launcher_version, self.config.branch
            )
        } else {
            format!("{base}?launcherVersion={}", self.config.launcher_version)
        }
    }

    /// Ask the launcher for the current launcher and game versions
    ///
    /// Updates the configured versions in place; later requests carry the
    /// refreshed values.
    pub async fn refresh_versions(&mut self) -> Result<()> {
        let url = self.config.launcher_endpoint("/launcher/GetLauncherDistrib");
        let envelope = self.post(url, None::<&()>, None).await?;
        let data = Self::check("refresh_versions", envelope)?;
        let launcher_version = data
            .get("Version")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::malformed("'Version' key is not available"))?;

        if launcher_version == self.config.launcher_version {
            info!("Launcher is up-to-date on version: {launcher_version}");
        } else {
            info!("Launcher updated to version: {launcher_version}");
            self.config.launcher_version = launcher_version.to_string();
        }

        let url = self.launcher_url("/launcher/GetPatchList", true);
        let envelope = self.post(url, None::<&()>, None).await?;
        let data = Self::check("refresh_versions", envelope)?;
        let game_version = data
            .get(0)
            .and_then(|patch| patch.get("Version"))
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::malformed("'Version' key is not available in patch list"))?;

        if game_version == self.config.game_version {
            info!("Game is up-to-date on version: {game_version}");
        } else {
            info!("Game updated to version: {game_version}");
            self.config.game_version = game_version.to_string();
        }

        Ok(())
    }

    /// Submit credentials to the login endpoint
    ///
    /// A two-factor request is a normal outcome; a captcha request is an
    /// [`ClientError::AuthChallenge`] that needs the credentials resubmitted
    /// with a solved captcha.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginStep> {
        credentials.validate()?;

        let url = self.launcher_url("/launcher/login", true);
        let body = LoginRequest {
            email: &credentials.email,
            pass: credentials.password_digest(),
            hw_code: &credentials.hwid,
            captcha: credentials.captcha.as_deref().unwrap_or_default(),
        };
        let envelope = self.post(url, Some(&body), None).await?;

        match envelope.err {
            ErrorCode::TWO_FACTOR_REQUIRED => {
                info!("2FA code is required to continue authentication");
                Ok(LoginStep::TwoFactorRequired)
            }
            ErrorCode::CAPTCHA_REQUIRED => {
                error!("Captcha required to continue authentication");
                Err(ClientError::AuthChallenge {
                    kind: ChallengeKind::Captcha,
                })
            }
            _ => {
                let data = Self::check("login", envelope)?;
                let token = data
                    .get("access_token")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ClientError::malformed("'access_token' key is not available"))?;
                Ok(LoginStep::Authenticated(token.to_string()))
            }
        }
    }

    /// Redeem a two-factor code for `hwid`
    pub async fn activate_hardware(&self, email: &str, code: &str, hwid: &str) -> Result<()> {
        if email.is_empty() || code.is_empty() {
            return Err(ClientError::InvalidArgument("email and code are required"));
        }
        validate_hwid(hwid)?;

        let url = self.launcher_url("/launcher/hardwareCode/activate", false);
        let body = HardwareActivationRequest {
            activate_code: code,
            hw_code: hwid,
            email,
        };
        let envelope = self.post(url, Some(&body), None).await?;
        Self::check("activate_hardware", envelope)?;
        Ok(())
    }

    /// Exchange an access token for a session id
    pub async fn exchange_access_token(&self, access_token: &str, hwid: &str) -> Result<String> {
        if access_token.is_empty() {
            return Err(ClientError::InvalidArgument("access token is empty"));
        }
        validate_hwid(hwid)?;

        let url = self.with_query(self.config.prod_endpoint("/launcher/game/start"), true);
        let body = GameStartRequest {
            hw_code: hwid,
            version: VersionContext {
                backend: &self.config.backend_version,
                game: &self.config.branch,
                major: &self.config.game_version,
            },
        };
        let envelope = self.post(url, Some(&body), Some(access_token)).await?;
        let data = Self::check("exchange_access_token", envelope)?;

        data.get("session")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ClientError::malformed("'session' key is not available"))
    }

    /// Log in with an access token obtained elsewhere
    pub async fn session_from_token(&self, access_token: &str, hwid: &str) -> Result<Session> {
        let session_id = self.exchange_access_token(access_token, hwid).await?;
        let session = Session::new(session_id, hwid)?;
        info!("Login completed, session {}", session.id());
        Ok(session)
    }

    /// Run the whole login handshake
    ///
    /// Two-factor codes are pulled from `code_source` each time the backend
    /// asks for one; returning `None` abandons the login. A rejected code
    /// asks for another.
    pub async fn authenticate<F>(&self, credentials: Credentials, mut code_source: F) -> Result<Session>
    where
        F: FnMut() -> Option<String>,
    {
        let mut flow = AuthFlow::new(self, credentials);
        let mut step = flow.login().await?;

        while step == LoginStep::TwoFactorRequired {
            let Some(code) = code_source() else {
                return Err(ClientError::AuthChallenge {
                    kind: ChallengeKind::TwoFactor,
                });
            };
            step = match flow.submit_two_factor(code.trim()).await {
                Ok(step) => step,
                Err(e) if flow.state() == AuthState::TwoFactorPending => {
                    warn!("Two-factor code rejected: {e}");
                    LoginStep::TwoFactorRequired
                }
                Err(e) => return Err(e),
            };
        }

        flow.establish_session().await
    }
}

fn redact_pass(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut map)) if map.contains_key("pass") => {
            map.insert("pass".to_string(), Value::from("<redacted>"));
            Value::Object(map).to_string()
        }
        _ => body.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::credentials::generate_hwid;
    use crate::testing::{ScriptedTransport, envelope_response};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn launcher(transport: &Arc<ScriptedTransport>) -> LauncherClient {
        LauncherClient::new(transport.clone(), ClientConfig::default())
    }

    #[tokio::test]
    async fn test_login_request_shape() {
        let transport = ScriptedTransport::new([envelope_response(0, json!({"access_token": "tok"}))]);
        let client = launcher(&transport);
        let hwid = generate_hwid();
        let creds = Credentials::new("me@example.com", "password", hwid.clone());

        let step = client.login(&creds).await.expect("Operation should succeed");
        assert_eq!(step, LoginStep::Authenticated("tok".to_string()));

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].url,
            "https://launcher.escapefromtarkov.com/launcher/login?launcherVersion=0.9.3.1023&branch=live"
        );
        assert_eq!(sent[0].header_value("User-Agent"), Some("BSG Launcher 0.9.3.1023"));
        assert_eq!(sent[0].header_value("Content-Type"), Some("application/json"));
        assert_eq!(sent[0].header_value("Authorization"), None);

        let body: Value = serde_json::from_str(&sent[0].body).expect("Operation should succeed");
        assert_eq!(
            body,
            json!({
                "email": "me@example.com",
                "pass": "5f4dcc3b5aa765d61d8327deb882cf99",
                "hwCode": hwid,
                "captcha": ""
            })
        );
    }

    #[tokio::test]
    async fn test_login_rejects_invalid_credentials_without_network() {
        let transport = ScriptedTransport::new([]);
        let client = launcher(&transport);

        let result = client.login(&Credentials::new("me@example.com", "pw", "short")).await;
        assert!(matches!(result, Err(ClientError::InvalidArgument(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_login_error_codes() {
        let transport = ScriptedTransport::new([
            envelope_response(206, Value::Null),
            envelope_response(230, Value::Null),
            envelope_response(214, Value::Null),
        ]);
        let client = launcher(&transport);
        let creds = Credentials::new("me@example.com", "pw", generate_hwid());

        let bad_login = client.login(&creds).await.expect_err("Test operation should fail");
        assert_eq!(bad_login.code(), Some(ErrorCode::BAD_LOGIN));

        let limited = client.login(&creds).await.expect_err("Test operation should fail");
        assert_eq!(limited.code(), Some(ErrorCode::RATE_LIMITED));

        let captcha = client.login(&creds).await.expect_err("Test operation should fail");
        assert!(matches!(
            captcha,
            ClientError::AuthChallenge {
                kind: ChallengeKind::Captcha
            }
        ));
    }

    #[tokio::test]
    async fn test_login_without_token_is_malformed() {
        let transport = ScriptedTransport::new([envelope_response(0, json!({}))]);
        let client = launcher(&transport);
        let creds = Credentials::new("me@example.com", "pw", generate_hwid());

        let err = client.login(&creds).await.expect_err("Test operation should fail");
        assert!(err.to_string().contains("access_token"));
    }

    #[tokio::test]
    async fn test_exchange_access_token() {
        let transport = ScriptedTransport::new([envelope_response(0, json!({"session": "sess-1"}))]);
        let client = launcher(&transport);
        let hwid = generate_hwid();

        let session = client
            .session_from_token("tok", &hwid)
            .await
            .expect("Operation should succeed");
        assert_eq!(session.id(), "sess-1");
        assert_eq!(session.hwid(), hwid);

        let sent = transport.requests();
        assert_eq!(
            sent[0].url,
            "https://prod.escapefromtarkov.com/launcher/game/start?launcherVersion=0.9.3.1023&branch=live"
        );
        assert_eq!(sent[0].header_value("Authorization"), Some("tok"));
        let body: Value = serde_json::from_str(&sent[0].body).expect("Operation should succeed");
        assert_eq!(
            body["version"],
            json!({"backend": "6", "game": "live", "major": "0.12.3.5834"})
        );
    }

    #[tokio::test]
    async fn test_activate_hardware_body() {
        let transport = ScriptedTransport::new([envelope_response(0, Value::Null)]);
        let client = launcher(&transport);
        let hwid = generate_hwid();

        client
            .activate_hardware("me@example.com", "123456", &hwid)
            .await
            .expect("Operation should succeed");

        let sent = transport.requests();
        assert_eq!(
            sent[0].url,
            "https://launcher.escapefromtarkov.com/launcher/hardwareCode/activate?launcherVersion=0.9.3.1023"
        );
        let body: Value = serde_json::from_str(&sent[0].body).expect("Operation should succeed");
        assert_eq!(
            body,
            json!({"activateCode": "123456", "hwCode": hwid, "email": "me@example.com"})
        );
    }

    #[tokio::test]
    async fn test_refresh_versions_updates_config() {
        let transport = ScriptedTransport::new([
            envelope_response(0, json!({"Version": "0.9.4.1100"})),
            envelope_response(0, json!([{"Version": "0.12.4.6000"}, {"Version": "0.12.3.5834"}])),
        ]);
        let mut client = launcher(&transport);

        client.refresh_versions().await.expect("Operation should succeed");
        assert_eq!(client.config().launcher_version, "0.9.4.1100");
        assert_eq!(client.config().game_version, "0.12.4.6000");

        // Patch list query already carries the refreshed launcher version
        let sent = transport.requests();
        assert!(sent[1].url.ends_with("GetPatchList?launcherVersion=0.9.4.1100&branch=live"));
        assert_eq!(sent[1].header_value("User-Agent"), Some("BSG Launcher 0.9.4.1100"));
    }

    #[tokio::test]
    async fn test_refresh_versions_missing_version() {
        let transport = ScriptedTransport::new([envelope_response(0, json!({}))]);
        let mut client = launcher(&transport);

        let err = client.refresh_versions().await.expect_err("Test operation should fail");
        assert!(err.to_string().contains("Version"));
        assert_eq!(client.config().launcher_version, "0.9.3.1023");
    }

    #[test]
    fn test_redact_pass() {
        let redacted = redact_pass(r#"{"email":"a","pass":"abc"}"#);
        assert!(!redacted.contains("abc"));
        assert_eq!(redact_pass("not json"), "not json");
    }
}
