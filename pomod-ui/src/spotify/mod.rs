//! Remote music streaming service integration
//!
//! `client` is the bearer-authenticated proxy to the provider's Web
//! API, `token` renews expired credentials, and `poller` keeps the
//! current-track view fresh.

pub mod client;
pub mod poller;
pub mod token;

pub use client::SpotifyClient;
pub use poller::NowPlayingPoller;
pub use token::TokenRefresher;

use thiserror::Error;

/// Errors from the remote music API integration
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("network error: {0}")]
    Network(String),

    /// Non-success response from the provider
    #[error("api error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// Response body did not match the expected shape
    #[error("parse error: {0}")]
    Parse(String),
}
