//! Chromium-backed transport using chromiumoxide.
//!
//! Drives one headless tab through the same login → list → thread flow as a
//! person would. The browser is an external process: `release` must run on
//! every exit path or the process outlives us.

use super::PortalTransport;
use crate::credentials::Credentials;
use crate::error::{PortalError, PortalResult};
use crate::extraction::form::LOGIN_FORM;
use crate::portal::{PortalEndpoints, RawDocument, EMAIL_FIELD, PASSWORD_FIELD};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Environment variable naming the browser binary.
pub const CHROMIUM_ENV: &str = "BOL_CHROMIUM_PATH";

/// Executable names tried on `PATH`, in order.
const CHROMIUM_NAMES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Locate a Chromium build: `BOL_CHROMIUM_PATH` when it points at a file,
/// otherwise the first known name on `PATH`.
pub fn find_chromium() -> Option<PathBuf> {
    std::env::var_os(CHROMIUM_ENV)
        .map(PathBuf::from)
        .filter(|p| p.is_file())
        .or_else(|| CHROMIUM_NAMES.iter().find_map(|name| which::which(name).ok()))
}

/// Window property set on the login page right before submitting. A fresh
/// document no longer has it.
const SUBMIT_MARKER: &str = "__bolLoginSubmitted";

/// Interval between checks for the post-login document.
const SUBMIT_POLL: Duration = Duration::from_millis(100);

/// Script that fills both credential fields and submits the login form.
///
/// Returns `false` when the form or a field is missing, so the caller can
/// still read the page and let extraction decide.
fn login_script(credentials: &Credentials) -> PortalResult<String> {
    Ok(format!(
        r#"(() => {{
  const form = document.querySelector({form});
  if (!form) return false;
  const email = form.querySelector({email_field});
  const password = form.querySelector({password_field});
  if (!email || !password) return false;
  email.value = {email};
  password.value = {password};
  window[{marker}] = true;
  const submit = form.querySelector('input[type=submit], button[type=submit]');
  if (submit) {{ submit.click(); }} else {{ form.submit(); }}
  return true;
}})()"#,
        form = js_string(LOGIN_FORM)?,
        email_field = js_string(&format!("[name=\"{EMAIL_FIELD}\"]"))?,
        password_field = js_string(&format!("[name=\"{PASSWORD_FIELD}\"]"))?,
        email = js_string(credentials.email())?,
        password = js_string(credentials.password())?,
        marker = js_string(SUBMIT_MARKER)?,
    ))
}

/// `s` as a JavaScript string literal.
fn js_string(s: &str) -> PortalResult<String> {
    serde_json::to_string(s).map_err(|e| PortalError::Transport(format!("encode: {e}")))
}

/// A headless Chromium with one tab.
pub struct BrowserTransport {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    page: Option<Page>,
    endpoints: PortalEndpoints,
    timeout: Duration,
}

impl BrowserTransport {
    /// Launch Chromium and open a blank tab.
    pub async fn launch(endpoints: PortalEndpoints, timeout: Duration) -> PortalResult<Self> {
        let chrome_path = find_chromium().ok_or_else(|| {
            PortalError::Transport(
                "Chromium not found. Set BOL_CHROMIUM_PATH or install Chrome.".to_string(),
            )
        })?;
        debug!(path = %chrome_path.display(), "launching chromium");

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| PortalError::Transport(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser: Some(browser),
            handler: Some(handler),
            page: Some(page),
            endpoints,
            timeout,
        })
    }

    fn page(&self) -> PortalResult<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| PortalError::Transport("browser already closed".to_string()))
    }

    async fn navigate(&self, url: &str) -> PortalResult<RawDocument> {
        let page = self.page()?;
        let start = Instant::now();

        match tokio::time::timeout(self.timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(PortalError::Transport(format!("navigation failed: {e}"))),
            Err(_) => {
                return Err(PortalError::Transport(format!(
                    "navigation timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }

        let doc = self.snapshot(url).await?;
        debug!(
            url = %doc.url,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "page loaded"
        );
        Ok(doc)
    }

    /// Wait until the login page has been replaced by whatever the form
    /// submission leads to, then until that page has loaded.
    async fn wait_for_new_document(&self, page: &Page) -> PortalResult<()> {
        let check = format!("window[{}] === true", js_string(SUBMIT_MARKER)?);
        let replaced = async {
            loop {
                tokio::time::sleep(SUBMIT_POLL).await;
                // Evaluation fails while the old context is being torn down.
                let still_old = match page.evaluate(check.as_str()).await {
                    Ok(result) => result.into_value::<bool>().unwrap_or(true),
                    Err(_) => true,
                };
                if !still_old {
                    break;
                }
            }
            page.wait_for_navigation().await.map(|_| ())
        };

        match tokio::time::timeout(self.timeout, replaced).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PortalError::Transport(format!("navigation failed: {e}"))),
            Err(_) => Err(PortalError::Transport(format!(
                "login timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    async fn snapshot(&self, requested: &str) -> PortalResult<RawDocument> {
        let page = self.page()?;
        let final_url = page
            .url()
            .await?
            .map(|u| u.to_string())
            .unwrap_or_else(|| requested.to_string());
        let html = page.content().await?;
        Ok(RawDocument::new(final_url, html))
    }
}

#[async_trait]
impl PortalTransport for BrowserTransport {
    async fn login(&mut self, credentials: &Credentials) -> PortalResult<RawDocument> {
        let login_url = self.endpoints.login_url();
        info!(url = %login_url, "opening login page");
        let page_doc = self.navigate(login_url.as_str()).await?;

        let script = login_script(credentials)?;
        let page = self.page()?;
        let submitted: bool = page
            .evaluate(script.as_str())
            .await?
            .into_value()
            .unwrap_or(false);

        if !submitted {
            warn!("login form or fields not found in browser page");
            return Ok(page_doc);
        }

        info!("login form submitted");
        self.wait_for_new_document(page).await?;
        self.snapshot(login_url.as_str()).await
    }

    async fn fetch_notifications(&mut self) -> PortalResult<RawDocument> {
        let url = self.endpoints.notifications_url();
        info!(url = %url, "fetching notifications");
        self.navigate(url.as_str()).await
    }

    async fn fetch_thread(&mut self, url: &str) -> PortalResult<RawDocument> {
        info!(url, "fetching thread");
        self.navigate(url).await
    }

    async fn release(&mut self) -> PortalResult<()> {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        let closed = match self.browser.take() {
            Some(mut browser) => {
                let result = browser.close().await;
                let _ = browser.wait().await;
                result.map(|_| ())
            }
            None => Ok(()),
        };
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        debug!("browser transport released");
        closed.map_err(PortalError::from)
    }
}
