//! # tarkov-protocol
//!
//! Wire layer for the game backend. Every request is a JSON POST; every
//! response is a zlib-compressed JSON envelope of the form
//! `{ "data": ..., "err": <int>, "errmsg": <string> }`.
//!
//! ## Components
//!
//! - [`codes`]: the backend error-code registry ([`ErrorCode`])
//! - [`envelope`]: the envelope codec (status check, inflate, parse, validate)
//! - [`transport`]: the [`Transport`] trait and the reqwest-backed
//!   [`HttpTransport`]
//! - [`config`]: endpoint, version and HTTP settings ([`ClientConfig`])
//! - [`retry`]: connection-failure retry policy
//!
//! ## Decoding a response
//!
//! ```rust
//! use tarkov_protocol::envelope::{self, ResponseEnvelope};
//! use reqwest::StatusCode;
//!
//! # fn main() -> tarkov_protocol::Result<()> {
//! let wire = envelope::encode(&ResponseEnvelope::ok(serde_json::json!({"session": "abc"})))?;
//! let decoded = envelope::decode(StatusCode::OK, &wire)?;
//! assert!(decoded.is_ok());
//! assert_eq!(decoded.data["session"], "abc");
//! # Ok(())
//! # }
//! ```

pub mod codes;
pub mod config;
pub mod envelope;
pub mod error;
pub mod retry;
pub mod transport;

pub use codes::ErrorCode;
pub use config::{ClientConfig, HttpConfig};
pub use envelope::ResponseEnvelope;
pub use error::{ProtocolError, Result};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};

/// Re-exported so downstream crates name status codes without a direct reqwest dependency
pub use reqwest::StatusCode;
