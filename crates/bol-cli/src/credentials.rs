//! Login credentials for one process run.

use crate::error::{PortalError, PortalResult};
use std::fmt;

/// An email/password pair. Never persisted, never logged.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Build a credential pair, rejecting a missing or blank value.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> PortalResult<Self> {
        let email = email.into();
        let password = password.into();
        if email.trim().is_empty() || password.is_empty() {
            return Err(PortalError::Credential);
        }
        Ok(Self {
            email: email.trim().to_string(),
            password,
        })
    }

    /// Build from optional inputs, as they come off the command line.
    pub fn from_parts(email: Option<String>, password: Option<String>) -> PortalResult<Self> {
        match (email, password) {
            (Some(email), Some(password)) => Self::new(email, password),
            _ => Err(PortalError::Credential),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
