//! Account credentials and hardware identifiers

use crate::error::{ClientError, Result};

/// Length of a hardware id accepted by the backend, in characters
pub const HWID_LENGTH: usize = 258;

/// Launcher account credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Opaque hardware identifier, see [`generate_hwid`]
    pub hwid: String,
    /// Solved captcha response, when the backend asked for one
    pub captcha: Option<String>,
}

impl Credentials {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        hwid: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            hwid: hwid.into(),
            captcha: None,
        }
    }

    #[must_use]
    pub fn with_captcha(mut self, captcha: impl Into<String>) -> Self {
        self.captcha = Some(captcha.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.is_empty() {
            return Err(ClientError::InvalidArgument("email is empty"));
        }
        if self.password.is_empty() {
            return Err(ClientError::InvalidArgument("password is empty"));
        }
        validate_hwid(&self.hwid)
    }

    /// Password digest as sent on the wire
    pub fn password_digest(&self) -> String {
        password_digest(&self.password)
    }
}

// Keep the password out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("hwid", &self.hwid)
            .field("captcha", &self.captcha.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub(crate) fn validate_hwid(hwid: &str) -> Result<()> {
    if hwid.is_empty() {
        return Err(ClientError::InvalidArgument("hwid is empty"));
    }
    if hwid.chars().count() != HWID_LENGTH {
        return Err(ClientError::InvalidArgument("hwid must be 258 characters"));
    }
    Ok(())
}

/// Lowercase hex MD5 of the password
pub fn password_digest(password: &str) -> String {
    format!("{:x}", md5::compute(password.as_bytes()))
}

fn random_digest() -> String {
    format!("{:x}", md5::compute(rand::random::<u64>().to_le_bytes()))
}

/// Generate a fresh random hardware id
///
/// Layout is `#1-h:h:h-h-h-h-h-s` where each `h` is a 32 digit hex digest and
/// `s` is a 24 digit one.
pub fn generate_hwid() -> String {
    let mut short = random_digest();
    short.truncate(24);

    format!(
        "#1-{}:{}:{}-{}-{}-{}-{}-{}",
        random_digest(),
        random_digest(),
        random_digest(),
        random_digest(),
        random_digest(),
        random_digest(),
        random_digest(),
        short
    )
}
