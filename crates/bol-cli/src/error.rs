//! Error taxonomy for the portal client.
//!
//! Every variant renders as one human-readable line; that line is what the
//! operator sees. Underlying causes are logged, never printed.

/// A structural element the extractor expected was not usable.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The element is absent from the document.
    #[error("expected element `{0}` not found on page")]
    Missing(&'static str),

    /// The element exists but its text could not be interpreted.
    #[error("element `{element}` has unexpected content: {value:?}")]
    Malformed {
        element: &'static str,
        value: String,
    },
}

/// All errors the portal client can produce.
#[derive(thiserror::Error, Debug)]
pub enum PortalError {
    #[error("Email and Password are required through arguments.")]
    Credential,

    #[error("Invalid email and password combination.")]
    Authentication,

    /// The detail names page internals and only goes to the log.
    #[error("Could not read the page.")]
    Extraction(#[from] ExtractionError),

    #[error("Invalid options.")]
    Selection(String),

    #[error("Connection to the portal failed: {0}")]
    Transport(String),

    #[error("Session is not logged in.")]
    NotAuthenticated,

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Interrupted.")]
    Cancelled,
}

impl PortalError {
    /// Short stable label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PortalError::Credential => "credential",
            PortalError::Authentication => "authentication",
            PortalError::Extraction(_) => "extraction",
            PortalError::Selection(_) => "selection",
            PortalError::Transport(_) => "transport",
            PortalError::NotAuthenticated => "not_authenticated",
            PortalError::Terminal(_) => "terminal",
            PortalError::Cancelled => "cancelled",
        }
    }

    /// Whether the interactive loop can carry on after this error in its
    /// default (non-strict) mode.
    pub fn is_recoverable_in_loop(&self) -> bool {
        matches!(
            self,
            PortalError::Selection(_) | PortalError::Extraction(_) | PortalError::Transport(_)
        )
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(e: reqwest::Error) -> Self {
        PortalError::Transport(e.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for PortalError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        PortalError::Transport(e.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for PortalError {
    fn from(e: rustyline::error::ReadlineError) -> Self {
        PortalError::Terminal(e.to_string())
    }
}

pub type PortalResult<T> = Result<T, PortalError>;
