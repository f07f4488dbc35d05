//! Backend error code registry
//!
//! Every response envelope carries an integer `err` field. The codes below are
//! the ones the backend is known to emit; anything else is still preserved
//! verbatim in [`ErrorCode`] and reported as unknown.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Integer status code from the `err` field of a response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i64);

impl ErrorCode {
    pub const OK: Self = Self(0);
    pub const NOT_AUTHORIZED: Self = Self(201);
    pub const INVALID_USER_ID: Self = Self(205);
    pub const BAD_LOGIN: Self = Self(206);
    pub const INVALID_PARAMETERS: Self = Self(207);
    pub const TWO_FACTOR_REQUIRED: Self = Self(209);
    pub const BAD_TWO_FACTOR_CODE: Self = Self(211);
    pub const CAPTCHA_REQUIRED: Self = Self(214);
    pub const INVALID_BARTER_ITEMS: Self = Self(228);
    pub const RATE_LIMITED: Self = Self(230);
    pub const MAINTENANCE: Self = Self(263);
    pub const BACKEND_ERROR: Self = Self(1000);
    pub const MAX_OFFER_COUNT: Self = Self(1501);
    pub const INSUFFICIENT_TAX_FUNDS: Self = Self(1502);
    pub const OFFER_NOT_FOUND: Self = Self(1507);
    pub const BAD_LOYALTY_LEVEL: Self = Self(1510);
    pub const OFFER_NOT_AVAILABLE_YET: Self = Self(1512);
    pub const TRANSACTION_ERROR: Self = Self(1514);

    /// All registered codes, in ascending order
    pub const REGISTRY: [Self; 18] = [
        Self::OK,
        Self::NOT_AUTHORIZED,
        Self::INVALID_USER_ID,
        Self::BAD_LOGIN,
        Self::INVALID_PARAMETERS,
        Self::TWO_FACTOR_REQUIRED,
        Self::BAD_TWO_FACTOR_CODE,
        Self::CAPTCHA_REQUIRED,
        Self::INVALID_BARTER_ITEMS,
        Self::RATE_LIMITED,
        Self::MAINTENANCE,
        Self::BACKEND_ERROR,
        Self::MAX_OFFER_COUNT,
        Self::INSUFFICIENT_TAX_FUNDS,
        Self::OFFER_NOT_FOUND,
        Self::BAD_LOYALTY_LEVEL,
        Self::OFFER_NOT_AVAILABLE_YET,
        Self::TRANSACTION_ERROR,
    ];

    /// Raw numeric value
    pub const fn value(self) -> i64 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Whether the code is part of the known registry
    pub fn is_registered(self) -> bool {
        self.known_message().is_some()
    }

    fn known_message(self) -> Option<&'static str> {
        let message = match self {
            Self::OK => "Request completed",
            Self::NOT_AUTHORIZED => "Not authorized or game profile not selected",
            Self::INVALID_USER_ID => "Invalid user ID selected",
            Self::BAD_LOGIN => "Bad login, invalid email or password",
            Self::INVALID_PARAMETERS => "Invalid or missing parameters",
            Self::TWO_FACTOR_REQUIRED => "2FA code is required to continue authentication",
            Self::BAD_TWO_FACTOR_CODE => "Incorrect 2FA code",
            Self::CAPTCHA_REQUIRED => "Captcha response is required to continue authentication",
            Self::INVALID_BARTER_ITEMS => {
                "Provided barter items are invalid, not found or not enough quantities available"
            }
            Self::RATE_LIMITED => "Too many login attempts",
            Self::MAINTENANCE => "Backend is down for maintenance",
            Self::BACKEND_ERROR => "Backend error, no other information is given",
            Self::MAX_OFFER_COUNT => "Maximum outstanding offer count was reached",
            Self::INSUFFICIENT_TAX_FUNDS => "Insufficient funds to pay the flea market fee",
            Self::OFFER_NOT_FOUND => "Offer not found, sold out or out of stock",
            Self::BAD_LOYALTY_LEVEL => "Loyalty level is not high enough to purchase this item",
            Self::OFFER_NOT_AVAILABLE_YET => "Offer is not available yet",
            Self::TRANSACTION_ERROR => "Transaction error",
            _ => return None,
        };
        Some(message)
    }

    /// Human readable description of the code
    ///
    /// Unregistered codes embed the numeric value verbatim.
    pub fn message(self) -> Cow<'static, str> {
        match self.known_message() {
            Some(message) => Cow::Borrowed(message),
            None => Cow::Owned(format!("Unknown error code: {}", self.0)),
        }
    }
}

impl From<i64> for ErrorCode {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
