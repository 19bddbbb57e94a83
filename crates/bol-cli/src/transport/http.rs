//! Plain-HTTP transport wrapping reqwest.
//!
//! No JavaScript, only HTTP requests with a cookie jar. Follows redirects
//! and applies one request timeout. Never retries.

use super::PortalTransport;
use crate::credentials::Credentials;
use crate::error::{PortalError, PortalResult};
use crate::extraction::parse_login_form;
use crate::portal::{PortalEndpoints, RawDocument, EMAIL_FIELD, PASSWORD_FIELD};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// HTTP session against the portal.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoints: PortalEndpoints,
}

impl HttpTransport {
    /// Build a client with its own cookie store. Performs no I/O.
    pub fn new(endpoints: PortalEndpoints, timeout: Duration) -> PortalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, endpoints })
    }

    async fn get(&self, url: &str) -> PortalResult<RawDocument> {
        let start = Instant::now();
        let r = self.client.get(url).send().await?;
        read_document(r, start).await
    }

    async fn submit(&self, url: &str, fields: &[(String, String)]) -> PortalResult<RawDocument> {
        let start = Instant::now();
        let r = self.client.post(url).form(fields).send().await?;
        read_document(r, start).await
    }
}

async fn read_document(r: reqwest::Response, start: Instant) -> PortalResult<RawDocument> {
    let status = r.status();
    let final_url = r.url().to_string();
    debug!(
        url = %final_url,
        status = status.as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "portal response"
    );
    if status.is_server_error() {
        return Err(PortalError::Transport(format!(
            "portal answered {status} for {final_url}"
        )));
    }
    let html = r.text().await?;
    Ok(RawDocument::new(final_url, html))
}

#[async_trait]
impl PortalTransport for HttpTransport {
    async fn login(&mut self, credentials: &Credentials) -> PortalResult<RawDocument> {
        let login_url = self.endpoints.login_url();
        info!(url = %login_url, "opening login page");
        let page = self.get(login_url.as_str()).await?;

        let mut form = parse_login_form(&page)?;
        form.set(EMAIL_FIELD, credentials.email());
        form.set(PASSWORD_FIELD, credentials.password());

        info!(action = %form.action, "submitting login form");
        if form.method == "GET" {
            let mut url = url::Url::parse(&form.action)
                .map_err(|e| PortalError::Transport(format!("bad form action: {e}")))?;
            url.query_pairs_mut().extend_pairs(form.fields.iter());
            self.get(url.as_str()).await
        } else {
            self.submit(&form.action, &form.fields).await
        }
    }

    async fn fetch_notifications(&mut self) -> PortalResult<RawDocument> {
        let url = self.endpoints.notifications_url();
        info!(url = %url, "fetching notifications");
        self.get(url.as_str()).await
    }

    async fn fetch_thread(&mut self, url: &str) -> PortalResult<RawDocument> {
        info!(url, "fetching thread");
        self.get(url).await
    }

    async fn release(&mut self) -> PortalResult<()> {
        // Dropping the client closes pooled connections; nothing to flush.
        debug!("http transport released");
        Ok(())
    }
}
