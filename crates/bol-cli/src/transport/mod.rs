//! Transport abstraction over the portal.
//!
//! Defines the `PortalTransport` trait that abstracts over how pages are
//! fetched: plain HTTP with a cookie jar, or a headless Chromium tab. The
//! session, controller and bootstrap are generic over it and never know
//! which one is in use.

pub mod browser;
pub mod http;

use crate::credentials::Credentials;
use crate::error::PortalResult;
use crate::portal::RawDocument;
use async_trait::async_trait;

pub use browser::BrowserTransport;
pub use http::HttpTransport;

/// One connection to the portal, able to log in and fetch pages.
///
/// Implementations do not interpret page contents. Every method performs
/// network I/O; none of them retry.
#[async_trait]
pub trait PortalTransport: Send {
    /// Submit the login form and return whatever page the portal answers
    /// with. Whether the login worked is decided by the caller.
    async fn login(&mut self, credentials: &Credentials) -> PortalResult<RawDocument>;

    /// Fetch the unread notification listing.
    async fn fetch_notifications(&mut self) -> PortalResult<RawDocument>;

    /// Fetch one thread page by absolute URL.
    async fn fetch_thread(&mut self, url: &str) -> PortalResult<RawDocument>;

    /// Release the underlying connection or browser process.
    async fn release(&mut self) -> PortalResult<()>;
}

/// Which transport the binary should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// reqwest with a cookie store.
    #[default]
    Http,
    /// Headless Chromium via the DevTools protocol.
    Browser,
}
