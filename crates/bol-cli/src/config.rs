//! Process-wide configuration, resolved once at startup.

use crate::portal::PortalEndpoints;
use crate::transport::Backend;
use std::io::IsTerminal;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Consecutive failed thread fetches after which the session is treated as
/// unusable.
pub const DEFAULT_MAX_TRANSPORT_FAILURES: u32 = 3;

/// Everything the bootstrap needs to know about how it was invoked.
#[derive(Debug, Clone)]
pub struct Config {
    /// Transport implementation to build.
    pub backend: Backend,
    /// Emit ANSI colors.
    pub color: bool,
    /// Abort the loop on the first error of any kind.
    pub strict: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Consecutive transport failures tolerated inside the loop.
    pub max_transport_failures: u32,
    /// Portal locations. Fixed to the real portal outside of tests.
    pub endpoints: PortalEndpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Http,
            color: false,
            strict: false,
            timeout: DEFAULT_TIMEOUT,
            max_transport_failures: DEFAULT_MAX_TRANSPORT_FAILURES,
            endpoints: PortalEndpoints::binus(),
        }
    }
}

/// Decide whether to color output.
///
/// Honors `--no-color`, `NO_COLOR` and `BOL_NO_COLOR` (any non-empty value),
/// and turns colors off when stdout is not a terminal.
pub fn resolve_color(no_color_flag: bool) -> bool {
    let env_disabled = ["NO_COLOR", "BOL_NO_COLOR"]
        .iter()
        .any(|k| std::env::var(k).is_ok_and(|v| !v.is_empty()));
    color_enabled(no_color_flag, env_disabled, std::io::stdout().is_terminal())
}

fn color_enabled(no_color_flag: bool, env_disabled: bool, is_tty: bool) -> bool {
    !no_color_flag && !env_disabled && is_tty
}
