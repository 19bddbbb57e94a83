//! Fixed locations on the Binus Online portal and the raw page type
//! every transport hands back.

use url::Url;

/// Production portal origin.
pub const PORTAL_ORIGIN: &str = "https://ol.binus.ac.id";

/// Login page path.
pub const LOGIN_PATH: &str = "/LoginBinusian";

/// Unread notification listing path.
pub const NOTIFICATIONS_PATH: &str = "/Services/ViewNotification.aspx";

/// Name of the email field in the login form.
pub const EMAIL_FIELD: &str = "TextBoxID";

/// Name of the password field in the login form.
pub const PASSWORD_FIELD: &str = "TxtPassword";

/// The portal's endpoints.
///
/// Always [`PortalEndpoints::binus`] in the shipped binary. Tests point the
/// origin at a local mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalEndpoints {
    origin: Url,
}

impl PortalEndpoints {
    /// The real portal.
    pub fn binus() -> Self {
        Self {
            origin: Url::parse(PORTAL_ORIGIN).unwrap(),
        }
    }

    /// Endpoints rooted at another origin.
    pub fn with_origin(origin: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            origin: Url::parse(origin)?,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn login_url(&self) -> Url {
        self.join(LOGIN_PATH)
    }

    pub fn notifications_url(&self) -> Url {
        self.join(NOTIFICATIONS_PATH)
    }

    fn join(&self, path: &str) -> Url {
        // Both paths are absolute literals, so join cannot fail.
        self.origin.join(path).unwrap_or_else(|_| self.origin.clone())
    }
}

impl Default for PortalEndpoints {
    fn default() -> Self {
        Self::binus()
    }
}

/// One fetched page: where it ended up and what it contained.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Final URL after redirects.
    pub url: String,
    /// Response body.
    pub html: String,
}

impl RawDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}
