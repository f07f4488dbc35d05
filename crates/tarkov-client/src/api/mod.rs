//! Domain operations on [`SessionClient`](crate::client::SessionClient)
//!
//! Each submodule adds an `impl SessionClient` block for one area of the
//! game API. Every call builds a typed body, sends it through
//! [`SessionClient::post`](crate::client::SessionClient::post) and applies the
//! shared response check.

mod inventory;
mod mail;
mod market;
mod profile;
mod resources;
mod trader;

pub use market::listing_price;

/// Locale used for name lookups
pub(crate) const LOOKUP_LANGUAGE: &str = "en";

/// `tm` sent with trader deals
pub(crate) const TRADE_TM: i64 = 0;

/// `tm` sent with market and inventory actions
pub(crate) const ACTION_TM: i64 = 2;
