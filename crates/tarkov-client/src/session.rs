//! Established game session

use crate::credentials::validate_hwid;
use crate::error::{ClientError, Result};

/// Session cookie, hardware id and request counter
///
/// The counter starts at 1, is bumped once per outbound request and is never
/// reset for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    hwid: String,
    request_counter: u64,
}

impl Session {
    /// Resume a session from a known session id
    pub fn new(session_id: impl Into<String>, hwid: impl Into<String>) -> Result<Self> {
        let id = session_id.into();
        let hwid = hwid.into();
        if id.is_empty() {
            return Err(ClientError::InvalidArgument("session id is empty"));
        }
        validate_hwid(&hwid)?;

        Ok(Self {
            id,
            hwid,
            request_counter: 1,
        })
    }

    /// Session id sent as the `PHPSESSID` cookie
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn hwid(&self) -> &str {
        &self.hwid
    }

    /// Id the next request will carry
    pub fn peek_request_id(&self) -> u64 {
        self.request_counter
    }

    /// Take the current request id and advance the counter
    pub(crate) fn next_request_id(&mut self) -> u64 {
        let id = self.request_counter;
        self.request_counter += 1;
        id
    }
}
