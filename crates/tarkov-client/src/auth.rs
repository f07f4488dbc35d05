//! Login handshake state machine
//!
//! ```text
//! Start -> LoggingIn -> Authenticated -> ExchangingToken -> SessionEstablished
//!              |   ^
//!              |   | submit_two_factor
//!              v   |
//!        TwoFactorPending
//!
//! LoggingIn -> CaptchaPending (terminal)
//! any step  -> Failed (terminal)
//! ```
//!
//! Control returns to the caller between the two-factor challenge and the
//! retried login, so stopping is just not calling again.

use tarkov_protocol::ErrorCode;
use tracing::{debug, info};

use crate::credentials::Credentials;
use crate::error::{ChallengeKind, ClientError, Result};
use crate::launcher::LauncherClient;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Start,
    LoggingIn,
    TwoFactorPending,
    CaptchaPending,
    Authenticated,
    ExchangingToken,
    SessionEstablished,
    Failed,
}

impl AuthState {
    /// No further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::CaptchaPending | Self::SessionEstablished | Self::Failed
        )
    }
}

/// Outcome of one login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    /// Credentials accepted; carries the access token
    Authenticated(String),
    /// A two-factor code must be submitted before retrying
    TwoFactorRequired,
}

/// One run of the login handshake for a set of credentials
pub struct AuthFlow<'a> {
    launcher: &'a LauncherClient,
    credentials: Credentials,
    state: AuthState,
    access_token: Option<String>,
}

impl<'a> AuthFlow<'a> {
    pub fn new(launcher: &'a LauncherClient, credentials: Credentials) -> Self {
        Self {
            launcher,
            credentials,
            state: AuthState::Start,
            access_token: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Access token once authenticated
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn require(&self, expected: AuthState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ClientError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    /// First login attempt
    pub async fn login(&mut self) -> Result<LoginStep> {
        self.require(AuthState::Start, "login")?;
        self.attempt_login().await
    }

    async fn attempt_login(&mut self) -> Result<LoginStep> {
        self.state = AuthState::LoggingIn;
        debug!(email = %self.credentials.email, "logging in");

        match self.launcher.login(&self.credentials).await {
            Ok(LoginStep::Authenticated(token)) => {
                self.state = AuthState::Authenticated;
                self.access_token = Some(token.clone());
                Ok(LoginStep::Authenticated(token))
            }
            Ok(LoginStep::TwoFactorRequired) => {
                self.state = AuthState::TwoFactorPending;
                Ok(LoginStep::TwoFactorRequired)
            }
            Err(
                e @ ClientError::AuthChallenge {
                    kind: ChallengeKind::Captcha,
                },
            ) => {
                self.state = AuthState::CaptchaPending;
                Err(e)
            }
            Err(e) => {
                self.state = AuthState::Failed;
                Err(e)
            }
        }
    }

    /// Activate the hardware id with `code`, then retry the login
    ///
    /// A rejected code leaves the flow waiting for another one.
    pub async fn submit_two_factor(&mut self, code: &str) -> Result<LoginStep> {
        self.require(AuthState::TwoFactorPending, "submit a two-factor code")?;
        if code.is_empty() {
            return Err(ClientError::InvalidArgument("two-factor code is empty"));
        }

        let activation = self
            .launcher
            .activate_hardware(&self.credentials.email, code, &self.credentials.hwid)
            .await;

        match activation {
            Ok(()) => self.attempt_login().await,
            Err(e) if e.code() == Some(ErrorCode::BAD_TWO_FACTOR_CODE) => Err(e),
            Err(e) => {
                self.state = AuthState::Failed;
                Err(e)
            }
        }
    }

    /// Trade the access token for a game session
    pub async fn establish_session(&mut self) -> Result<Session> {
        self.require(AuthState::Authenticated, "establish a session")?;
        let Some(token) = self.access_token.take() else {
            self.state = AuthState::Failed;
            return Err(ClientError::InvalidArgument("access token is empty"));
        };

        self.state = AuthState::ExchangingToken;
        match self
            .launcher
            .session_from_token(&token, &self.credentials.hwid)
            .await
        {
            Ok(session) => {
                self.state = AuthState::SessionEstablished;
                info!("Session established for {}", self.credentials.email);
                Ok(session)
            }
            Err(e) => {
                self.state = AuthState::Failed;
                Err(e)
            }
        }
    }
}
