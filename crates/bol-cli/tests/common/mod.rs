//! Shared fixtures: a scripted portal transport, scripted operator input and
//! a sink that records every rendered line.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use bol_cli::controller::{InputEvent, InputSource};
use bol_cli::credentials::Credentials;
use bol_cli::error::{PortalError, PortalResult};
use bol_cli::portal::RawDocument;
use bol_cli::render::{RenderSink, Style};
use bol_cli::transport::PortalTransport;

// ── HTML fixtures ──

pub fn profile_page(name: &str, count: u32) -> String {
    format!(
        r#"<html><body>
            <div class="header"><span id="LblStudentName1">{name}</span>
            <span id="dataCount">{count}</span></div>
        </body></html>"#
    )
}

pub fn login_failed_page() -> String {
    r#"<html><body>
        <form class="custom-form" method="post">
          <input name="TextBoxID"><input name="TxtPassword" type="password">
        </form>
        <span class="error">Invalid credentials</span>
    </body></html>"#
        .to_string()
}

pub fn notifications_page(items: &[(&str, &str, &str)]) -> String {
    let blocks: String = items
        .iter()
        .map(|(title, href, date)| {
            format!(
                r#"<div class="notification unread"><div class="credentials">
                     <a href="{href}">{title}</a> <span class="date">{date}</span>
                   </div></div>"#
            )
        })
        .collect();
    format!("<html><body>{blocks}</body></html>")
}

pub fn thread_page(body: &str) -> String {
    format!(
        r#"<html><body><div id="thread">
             <span id="MainContent_rptThreadView_lblPostContent_0">{body}</span>
           </div></body></html>"#
    )
}

pub fn three_notifications() -> String {
    notifications_page(&[
        ("Quiz 1", "/Forum/Thread?id=1", "01 Mar 2019"),
        ("Assignment 2", "/Forum/Thread?id=2", "02 Mar 2019"),
        ("Final Exam", "/Forum/Thread?id=3", "03 Mar 2019"),
    ])
}

pub const THREAD_2_URL: &str = "https://ol.binus.ac.id/Forum/Thread?id=2";

// ── Mock transport ──

/// What the mock answers with and what it has been asked.
#[derive(Default)]
pub struct MockState {
    pub login_page: String,
    pub notifications_page: String,
    /// Thread pages by URL; `Err` simulates a transport failure.
    pub threads: HashMap<String, Result<String, String>>,
    /// Every call, in order: "login", "notifications", "thread <url>".
    pub calls: Vec<String>,
    pub releases: usize,
    pub last_email: Option<String>,
    /// Calls that never answer, like a portal that stopped responding.
    pub hang_login: bool,
    pub hanging_threads: Vec<String>,
}

/// Cloneable view into a mock's state, kept by the test after the mock
/// itself moves into the session.
#[derive(Clone, Default)]
pub struct MockHandle(pub Arc<Mutex<MockState>>);

impl MockHandle {
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().calls.clone()
    }

    pub fn releases(&self) -> usize {
        self.0.lock().unwrap().releases
    }

    pub fn network_calls(&self) -> usize {
        self.0.lock().unwrap().calls.len()
    }
}

pub struct MockTransport {
    state: MockHandle,
}

impl MockTransport {
    pub fn new(login_page: String, notifications_page: String) -> (Self, MockHandle) {
        let handle = MockHandle::default();
        {
            let mut s = handle.0.lock().unwrap();
            s.login_page = login_page;
            s.notifications_page = notifications_page;
        }
        (
            Self {
                state: handle.clone(),
            },
            handle,
        )
    }

    /// A logged-in-able portal with three notifications.
    pub fn portal() -> (Self, MockHandle) {
        Self::new(profile_page("BUDI SANTOSO", 3), three_notifications())
    }

    pub fn with_thread(self, url: &str, html: String) -> Self {
        self.state
            .0
            .lock()
            .unwrap()
            .threads
            .insert(url.to_string(), Ok(html));
        self
    }

    pub fn with_hanging_login(self) -> Self {
        self.state.0.lock().unwrap().hang_login = true;
        self
    }

    pub fn with_hanging_thread(self, url: &str) -> Self {
        self.state
            .0
            .lock()
            .unwrap()
            .hanging_threads
            .push(url.to_string());
        self
    }

    pub fn with_broken_thread(self, url: &str, error: &str) -> Self {
        self.state
            .0
            .lock()
            .unwrap()
            .threads
            .insert(url.to_string(), Err(error.to_string()));
        self
    }
}

#[async_trait]
impl PortalTransport for MockTransport {
    async fn login(&mut self, credentials: &Credentials) -> PortalResult<RawDocument> {
        let (hang, page) = {
            let mut s = self.state.0.lock().unwrap();
            s.calls.push("login".to_string());
            s.last_email = Some(credentials.email().to_string());
            (s.hang_login, s.login_page.clone())
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(RawDocument::new("https://ol.binus.ac.id/Dashboard", page))
    }

    async fn fetch_notifications(&mut self) -> PortalResult<RawDocument> {
        let mut s = self.state.0.lock().unwrap();
        s.calls.push("notifications".to_string());
        Ok(RawDocument::new(
            "https://ol.binus.ac.id/Services/ViewNotification.aspx",
            s.notifications_page.clone(),
        ))
    }

    async fn fetch_thread(&mut self, url: &str) -> PortalResult<RawDocument> {
        let (hang, answer) = {
            let mut s = self.state.0.lock().unwrap();
            s.calls.push(format!("thread {url}"));
            (
                s.hanging_threads.iter().any(|h| h == url),
                s.threads.get(url).cloned(),
            )
        };
        if hang {
            std::future::pending::<()>().await;
        }
        match answer {
            Some(Ok(html)) => Ok(RawDocument::new(url, html)),
            Some(Err(e)) => Err(PortalError::Transport(e)),
            None => Ok(RawDocument::new(url, "<html><body>Not found</body></html>")),
        }
    }

    async fn release(&mut self) -> PortalResult<()> {
        self.state.0.lock().unwrap().releases += 1;
        Ok(())
    }
}

// ── Operator input ──

/// Replays a fixed list of events, then reports end of input.
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
    pub prompts: usize,
}

impl ScriptedInput {
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self {
            events: events.into(),
            prompts: 0,
        }
    }

    /// Lines typed by the operator, followed by Ctrl+C.
    pub fn lines(lines: &[&str]) -> Self {
        let mut events: Vec<InputEvent> = lines
            .iter()
            .map(|l| InputEvent::Line(l.to_string()))
            .collect();
        events.push(InputEvent::Interrupted);
        Self::new(events)
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> PortalResult<InputEvent> {
        self.prompts += 1;
        Ok(self.events.pop_front().unwrap_or(InputEvent::Closed))
    }
}

// ── Render sink ──

#[derive(Default)]
pub struct RecordingSink {
    pub lines: Vec<(String, Style)>,
}

impl RecordingSink {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|(t, _)| t.as_str()).collect()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lines.iter().any(|(t, _)| t == text)
    }

    pub fn count(&self, text: &str) -> usize {
        self.lines.iter().filter(|(t, _)| t == text).count()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(_, s)| *s == Style::Error)
            .map(|(t, _)| t.as_str())
            .collect()
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(|(t, _)| t.as_str())
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, text: &str, style: Style) {
        self.lines.push((text.to_string(), style));
    }
}
