//! Composes the session: validate credentials → connect → login → fetch the
//! notification list → run the interactive loop.
//!
//! The transport is released exactly once on every exit path, including an
//! interrupt delivered while a request is in flight.

use crate::catalog::NotificationCatalog;
use crate::config::Config;
use crate::controller::{InputSource, LoopController, LoopOutcome};
use crate::credentials::Credentials;
use crate::error::{PortalError, PortalResult};
use crate::render::{RenderSink, Style};
use crate::session::Session;
use crate::transport::PortalTransport;
use std::future::Future;
use std::pin::Pin;
use tracing::{info, warn};

/// Last line printed after a clean exit.
pub const FAREWELL: &str = "Bye..";

/// How a whole run ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The operator left (interrupt or end of input).
    Cancelled,
    /// The run stopped on an error. The message has already been rendered.
    Failed(PortalError),
}

impl SessionOutcome {
    /// Process exit code: 0 for a clean exit, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            SessionOutcome::Cancelled => 0,
            SessionOutcome::Failed(_) => 1,
        }
    }
}

/// One run of the client over a given input source and render sink.
pub struct Bootstrap<'a, I, R> {
    config: &'a Config,
    input: &'a mut I,
    sink: &'a mut R,
}

impl<'a, I, R> Bootstrap<'a, I, R>
where
    I: InputSource,
    R: RenderSink,
{
    pub fn new(config: &'a Config, input: &'a mut I, sink: &'a mut R) -> Self {
        Self {
            config,
            input,
            sink,
        }
    }

    /// Run to completion.
    ///
    /// `connect` builds the transport and is only called once the
    /// credentials are known to be present. `interrupt` resolves when the
    /// operator cancels; it is raced against every network phase.
    pub async fn run<T, C, Fut, S>(
        self,
        email: Option<String>,
        password: Option<String>,
        connect: C,
        interrupt: S,
    ) -> SessionOutcome
    where
        T: PortalTransport,
        C: FnOnce() -> Fut,
        Fut: Future<Output = PortalResult<T>>,
        S: Future<Output = ()>,
    {
        let Bootstrap {
            config,
            input,
            sink,
        } = self;
        tokio::pin!(interrupt);

        let outcome = 'run: {
            let credentials = match Credentials::from_parts(email, password) {
                Ok(c) => c,
                Err(e) => break 'run SessionOutcome::Failed(e),
            };

            let transport = match race(connect(), interrupt.as_mut()).await {
                None => break 'run SessionOutcome::Cancelled,
                Some(Ok(t)) => t,
                Some(Err(e)) => break 'run SessionOutcome::Failed(e),
            };

            let mut session = Session::new(transport, config.endpoints.clone());
            let outcome =
                drive(config, &mut session, &credentials, input, sink, interrupt.as_mut()).await;
            if let Err(e) = session.close().await {
                warn!(error = %e, "failed to release session");
            }
            outcome
        };

        match &outcome {
            SessionOutcome::Cancelled => {
                info!("session finished");
                sink.render(FAREWELL, Style::Normal);
            }
            SessionOutcome::Failed(e) => {
                info!(error = ?e, kind = e.kind(), "session failed");
                sink.render(&e.to_string(), Style::Error);
            }
        }
        outcome
    }
}

async fn drive<T, I, R, S>(
    config: &Config,
    session: &mut Session<T>,
    credentials: &Credentials,
    input: &mut I,
    sink: &mut R,
    mut interrupt: Pin<&mut S>,
) -> SessionOutcome
where
    T: PortalTransport,
    I: InputSource,
    R: RenderSink,
    S: Future<Output = ()>,
{
    let profile = match race(session.login(credentials), interrupt.as_mut()).await {
        None => return SessionOutcome::Cancelled,
        Some(Ok(p)) => p,
        Some(Err(e)) => return SessionOutcome::Failed(e),
    };

    let records = match race(session.notifications(), interrupt.as_mut()).await {
        None => return SessionOutcome::Cancelled,
        Some(Ok(r)) => r,
        Some(Err(e)) => return SessionOutcome::Failed(e),
    };
    let catalog = NotificationCatalog::load(records);
    info!(listed = catalog.len(), unread = profile.unread_count, "catalog loaded");

    let mut controller = LoopController::new(profile, catalog)
        .strict(config.strict)
        .max_transport_failures(config.max_transport_failures);

    let outcome = race(controller.run(session, input, sink), interrupt.as_mut()).await;
    info!(stats = ?controller.stats(), "interactive loop ended");
    match outcome {
        None | Some(LoopOutcome::Done) => SessionOutcome::Cancelled,
        Some(LoopOutcome::Fatal(e)) => SessionOutcome::Failed(e),
    }
}

/// Await `fut` unless `interrupt` fires first.
async fn race<F, S>(fut: F, interrupt: Pin<&mut S>) -> Option<F::Output>
where
    F: Future,
    S: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = interrupt => None,
        out = fut => Some(out),
    }
}
