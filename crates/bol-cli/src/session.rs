//! The authenticated portal session.
//!
//! A session owns its transport for the whole process run, knows whether the
//! login succeeded, and releases the transport exactly once.

use crate::credentials::Credentials;
use crate::error::{ExtractionError, PortalError, PortalResult};
use crate::extraction::{parse_notification_list, parse_profile, parse_thread_body};
use crate::portal::PortalEndpoints;
use crate::transport::PortalTransport;
use crate::types::{NotificationRecord, ProfileSummary, ThreadBody};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One connection to the portal plus its login state.
pub struct Session<T: PortalTransport> {
    transport: T,
    endpoints: PortalEndpoints,
    authenticated: bool,
    released: bool,
    created_at: Instant,
}

impl<T: PortalTransport> Session<T> {
    /// Wrap a transport. No I/O happens until [`Session::login`].
    pub fn new(transport: T, endpoints: PortalEndpoints) -> Self {
        Self {
            transport,
            endpoints,
            authenticated: false,
            released: false,
            created_at: Instant::now(),
        }
    }

    /// Log in and read the profile summary.
    ///
    /// The portal gives no explicit status: a login is considered failed
    /// when the post-login page lacks the student name or unread counter.
    pub async fn login(&mut self, credentials: &Credentials) -> PortalResult<ProfileSummary> {
        self.ensure_open()?;
        let doc = self.transport.login(credentials).await?;
        match parse_profile(&doc) {
            Ok(profile) => {
                self.authenticated = true;
                info!(unread = profile.unread_count, "logged in");
                Ok(profile)
            }
            Err(ExtractionError::Missing(element)) => {
                debug!(element, url = %doc.url, "authenticated marker absent");
                Err(PortalError::Authentication)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch and parse the unread notification list.
    pub async fn notifications(&mut self) -> PortalResult<Vec<NotificationRecord>> {
        self.ensure_authenticated()?;
        let doc = self.transport.fetch_notifications().await?;
        Ok(parse_notification_list(&doc, self.endpoints.origin()))
    }

    /// Fetch and parse one thread.
    pub async fn thread(&mut self, record: &NotificationRecord) -> PortalResult<ThreadBody> {
        self.ensure_authenticated()?;
        let doc = self.transport.fetch_thread(&record.thread_url).await?;
        Ok(parse_thread_body(&doc)?)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// How long the session has been alive.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Release the transport. Later calls do nothing.
    pub async fn close(&mut self) -> PortalResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.authenticated = false;
        debug!(age_ms = self.age().as_millis() as u64, "closing session");
        self.transport.release().await
    }

    fn ensure_open(&self) -> PortalResult<()> {
        if self.released {
            return Err(PortalError::Transport("session already closed".to_string()));
        }
        Ok(())
    }

    fn ensure_authenticated(&self) -> PortalResult<()> {
        self.ensure_open()?;
        if !self.authenticated {
            return Err(PortalError::NotAuthenticated);
        }
        Ok(())
    }
}

impl<T: PortalTransport> Drop for Session<T> {
    fn drop(&mut self) {
        if !self.released {
            warn!("session dropped without being closed");
        }
    }
}
