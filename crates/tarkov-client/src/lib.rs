//! # tarkov-client
//!
//! Client for the game backend built on [`tarkov_protocol`].
//!
//! - [`LauncherClient`] and [`AuthFlow`] run the login handshake (password
//!   login, two-factor activation, token exchange) and produce a [`Session`].
//! - [`SessionClient`] owns a session and exposes the profile, trader,
//!   market, inventory and mail operations, caching static game data.
//! - [`catalog`] joins a trader's assortment, barter scheme and price table
//!   into [`TraderItem`]s.
//! - [`stack`] picks inventory stacks to pay for purchases.
//!
//! ## Logging in
//!
//! ```no_run
//! use tarkov_client::{Credentials, LauncherClient, SessionClient, generate_hwid};
//! use tarkov_protocol::ClientConfig;
//!
//! # async fn run() -> tarkov_client::Result<()> {
//! let launcher = LauncherClient::with_http(ClientConfig::default())?;
//! let credentials = Credentials::new("me@example.com", "password", generate_hwid());
//!
//! // Two-factor codes are pulled on demand; returning None gives up
//! let session = launcher.authenticate(credentials, || None).await?;
//! let mut client = SessionClient::from_launcher(&launcher, session);
//!
//! let roubles = client.rouble_count().await?;
//! println!("{roubles} roubles");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod credentials;
pub mod error;
pub mod launcher;
pub mod requests;
pub mod session;
pub mod stack;

#[cfg(test)]
pub(crate) mod testing;

pub use api::listing_price;
pub use auth::{AuthFlow, AuthState, LoginStep};
pub use cache::SessionCache;
pub use catalog::{
    CatalogGap, CatalogResolution, CostLine, CostSource, GapReason, TraderItem, TraderStock,
    resolve_trader_items,
};
pub use client::SessionClient;
pub use credentials::{Credentials, HWID_LENGTH, generate_hwid, password_digest};
pub use error::{ChallengeKind, ClientError, Result};
pub use launcher::LauncherClient;
pub use requests::{
    ItemLocation, MarketCurrency, MarketFilter, MarketSort, MoveDestination, OfferOwner,
    OfferRequirement, PaymentLine, SortDirection,
};
pub use session::Session;
pub use stack::{
    DOLLAR_TEMPLATE_ID, EURO_TEMPLATE_ID, OwnedStack, ROUBLE_TEMPLATE_ID, StackPick,
    StackSelection, find_covering_stacks, owned_stacks,
};
