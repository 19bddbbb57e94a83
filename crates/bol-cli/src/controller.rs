//! The interactive read-select-show loop.
//!
//! ```text
//! Greeting ─▶ Listing ─▶ AwaitingInput ─▶ ShowingThread ─┐
//!               ▲              │                         │
//!               └── invalid ───┘◀────────────────────────┘
//!   AwaitingInput ── interrupt / end of input ─▶ Done
//!   any state ── unrecoverable error ─▶ Fatal
//! ```
//!
//! The loop works from the catalog it was started with and never re-fetches
//! the notification list.

use crate::catalog::NotificationCatalog;
use crate::error::{PortalError, PortalResult};
use crate::render::{RenderSink, Style};
use crate::session::Session;
use crate::transport::PortalTransport;
use crate::types::ProfileSummary;
use tracing::{debug, warn};

/// Prompt shown while waiting for a selection.
pub const SELECTION_PROMPT: &str = "Choose an options above to open thread: ";

/// One result of reading from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl+C at the prompt.
    Interrupted,
    /// End of input (Ctrl+D, closed stdin).
    Closed,
}

/// Something that reads operator input one line at a time.
pub trait InputSource {
    fn read_line(&mut self, prompt: &str) -> PortalResult<InputEvent>;
}

/// Loop controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Greeting,
    Listing,
    AwaitingInput,
    /// Showing the thread with this display index.
    ShowingThread(usize),
    Done,
    Fatal,
}

/// How the loop ended.
#[derive(Debug)]
pub enum LoopOutcome {
    /// Operator cancelled.
    Done,
    /// The session can no longer be used.
    Fatal(PortalError),
}

/// Counters describing one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub listings: usize,
    pub threads_shown: usize,
    pub invalid_selections: usize,
    pub failed_fetches: usize,
}

/// Drives the interactive session over one loaded catalog.
pub struct LoopController {
    profile: ProfileSummary,
    catalog: NotificationCatalog,
    strict: bool,
    max_transport_failures: u32,
    state: LoopState,
    consecutive_transport_failures: u32,
    failure: Option<PortalError>,
    stats: LoopStats,
}

impl LoopController {
    pub fn new(profile: ProfileSummary, catalog: NotificationCatalog) -> Self {
        Self {
            profile,
            catalog,
            strict: false,
            max_transport_failures: crate::config::DEFAULT_MAX_TRANSPORT_FAILURES,
            state: LoopState::Greeting,
            consecutive_transport_failures: 0,
            failure: None,
            stats: LoopStats::default(),
        }
    }

    /// Treat every error inside the loop as fatal.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Consecutive transport failures tolerated before giving up.
    pub fn max_transport_failures(mut self, n: u32) -> Self {
        self.max_transport_failures = n.max(1);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn catalog(&self) -> &NotificationCatalog {
        &self.catalog
    }

    /// Run until the operator cancels or the session breaks.
    pub async fn run<T, I, R>(
        &mut self,
        session: &mut Session<T>,
        input: &mut I,
        sink: &mut R,
    ) -> LoopOutcome
    where
        T: PortalTransport,
        I: InputSource,
        R: RenderSink,
    {
        loop {
            debug!(state = ?self.state, "loop state");
            self.state = match self.state {
                LoopState::Greeting => {
                    self.render_greeting(sink);
                    LoopState::Listing
                }
                LoopState::Listing => {
                    self.render_listing(sink);
                    LoopState::AwaitingInput
                }
                LoopState::AwaitingInput => match input.read_line(SELECTION_PROMPT) {
                    Ok(InputEvent::Line(line)) => {
                        match self.catalog.resolve(&line).map(|r| r.index) {
                            Ok(index) => LoopState::ShowingThread(index),
                            Err(e) => self.recover(e, sink),
                        }
                    }
                    Ok(InputEvent::Interrupted) | Ok(InputEvent::Closed) => LoopState::Done,
                    Err(e) => self.fail(e),
                },
                LoopState::ShowingThread(index) => self.show_thread(index, session, sink).await,
                LoopState::Done => return LoopOutcome::Done,
                LoopState::Fatal => {
                    let e = self
                        .failure
                        .take()
                        .unwrap_or_else(|| PortalError::Terminal("session ended".to_string()));
                    return LoopOutcome::Fatal(e);
                }
            };
        }
    }

    async fn show_thread<T, R>(
        &mut self,
        index: usize,
        session: &mut Session<T>,
        sink: &mut R,
    ) -> LoopState
    where
        T: PortalTransport,
        R: RenderSink,
    {
        let record = match self.catalog.resolve_index(index as i64).cloned() {
            Ok(r) => r,
            Err(e) => return self.recover(e, sink),
        };

        match session.thread(&record).await {
            Ok(body) => {
                self.consecutive_transport_failures = 0;
                self.stats.threads_shown += 1;
                sink.render("", Style::Normal);
                sink.render(&body.text, Style::Normal);
                sink.render("", Style::Normal);
                LoopState::Listing
            }
            Err(e) => {
                self.stats.failed_fetches += 1;
                self.recover(e, sink)
            }
        }
    }

    /// Decide where an in-loop error leads.
    fn recover<R: RenderSink>(&mut self, e: PortalError, sink: &mut R) -> LoopState {
        if self.strict || !e.is_recoverable_in_loop() {
            return self.fail(e);
        }

        let give_up = match &e {
            PortalError::Selection(input) => {
                self.stats.invalid_selections += 1;
                debug!(input = %input, "invalid selection");
                false
            }
            PortalError::Transport(_) => {
                self.consecutive_transport_failures += 1;
                warn!(
                    error = %e,
                    consecutive = self.consecutive_transport_failures,
                    "thread fetch failed"
                );
                self.consecutive_transport_failures >= self.max_transport_failures
            }
            PortalError::Extraction(detail) => {
                warn!(%detail, "thread could not be shown");
                false
            }
            _ => {
                warn!(error = %e, kind = e.kind(), "thread could not be shown");
                false
            }
        };
        if give_up {
            return self.fail(e);
        }

        sink.render(&e.to_string(), Style::Error);
        sink.render("", Style::Normal);
        LoopState::Listing
    }

    fn fail(&mut self, e: PortalError) -> LoopState {
        warn!(error = ?e, kind = e.kind(), "interactive loop aborted");
        self.failure = Some(e);
        LoopState::Fatal
    }

    fn render_greeting<R: RenderSink>(&self, sink: &mut R) {
        sink.render("Welcome to BOL (Binus Online) CLI.", Style::Highlight);
        sink.render(
            &format!(
                "Hello {}, you have {} unread {}",
                self.profile.display_name,
                self.profile.unread_count,
                self.profile.notification_noun()
            ),
            Style::Success,
        );
        sink.render("", Style::Normal);
    }

    fn render_listing<R: RenderSink>(&mut self, sink: &mut R) {
        self.stats.listings += 1;
        if self.catalog.is_empty() {
            sink.render("No unread notifications.", Style::Normal);
        }
        for record in self.catalog.iter() {
            sink.render(
                &format!("[{}] {} at {}", record.index, record.title, record.date),
                Style::Normal,
            );
        }
        sink.render("", Style::Normal);
    }
}
