//! Configuration for an audit run.
//!
//! All knobs have environment-variable overrides and defaults matching the
//! original hardcoded audit values. The configuration object is built once in
//! `main` and passed explicitly into the run controller; there is no ambient
//! global state.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SITE_VISION_ORIGIN` | Base origin the site is served on | `http://localhost:8080` |
//! | `SITE_VISION_PAGES_DIR` | Directory scanned for page files | `./pages` |
//! | `SITE_VISION_OUTPUT_DIR` | Directory screenshots are written to | `./screenshots` |
//! | `SITE_VISION_VIEWPORT` | Viewport size as WxH | `1440x900` |
//! | `SITE_VISION_TIMEOUT_MS` | Navigation timeout in milliseconds | `15000` |
//! | `SITE_VISION_SETTLE_MS` | Post-navigation settle delay (ms) | `2000` |
//! | `SITE_VISION_READY_SELECTOR` | Readiness marker; switches the settle wait to polling | unset |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default base origin for the locally served site
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Default directory scanned for page documents
pub const DEFAULT_PAGES_DIR: &str = "./pages";

/// Default screenshot output directory
pub const DEFAULT_OUTPUT_DIR: &str = "./screenshots";

/// Default viewport width (pixels)
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1440;

/// Default viewport height (pixels)
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 900;

/// Default navigation timeout (milliseconds)
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 15_000;

/// Default post-navigation settle delay (milliseconds)
pub const DEFAULT_SETTLE_MS: u64 = 2_000;

/// Poll interval used by the readiness-marker settle strategy (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Environment variable for the base origin
pub const ENV_ORIGIN: &str = "SITE_VISION_ORIGIN";

/// Environment variable for the pages directory
pub const ENV_PAGES_DIR: &str = "SITE_VISION_PAGES_DIR";

/// Environment variable for the screenshot output directory
pub const ENV_OUTPUT_DIR: &str = "SITE_VISION_OUTPUT_DIR";

/// Environment variable for the viewport size
pub const ENV_VIEWPORT: &str = "SITE_VISION_VIEWPORT";

/// Environment variable for the navigation timeout
pub const ENV_TIMEOUT_MS: &str = "SITE_VISION_TIMEOUT_MS";

/// Environment variable for the settle delay
pub const ENV_SETTLE_MS: &str = "SITE_VISION_SETTLE_MS";

/// Environment variable for the readiness marker selector
pub const ENV_READY_SELECTOR: &str = "SITE_VISION_READY_SELECTOR";

/// How the auditor waits for deferred client-side mounting after navigation.
///
/// The fixed delay is the historical behavior and remains the default; it is
/// a heuristic, not a readiness signal. Polling on a marker selector is the
/// deterministic alternative for sites that can expose one.
#[derive(Debug, Clone, PartialEq)]
pub enum SettleStrategy {
    /// Sleep for a fixed interval after navigation.
    FixedDelay(Duration),

    /// Poll until at least one element matches `selector`, giving up quietly
    /// after `max_wait`. Falling through is not an error: the checks that
    /// follow will report whatever state the page reached.
    PollUntilPresent {
        selector: String,
        interval: Duration,
        max_wait: Duration,
    },
}

impl Default for SettleStrategy {
    fn default() -> Self {
        SettleStrategy::FixedDelay(Duration::from_millis(DEFAULT_SETTLE_MS))
    }
}

/// Configuration for one audit run
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Base origin the static site is served on, without a trailing slash
    pub origin: String,
    /// Directory scanned for eligible page files
    pub pages_dir: PathBuf,
    /// Directory screenshots are written to
    pub output_dir: PathBuf,
    /// Browser viewport as (width, height) in pixels
    pub viewport: (u32, u32),
    /// Upper bound on navigation (network + render quiescence)
    pub nav_timeout: Duration,
    /// Post-navigation wait strategy
    pub settle: SettleStrategy,
}

impl AuditConfig {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let settle_ms = env::var(ENV_SETTLE_MS)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SETTLE_MS);

        let settle = match env::var(ENV_READY_SELECTOR) {
            Ok(selector) if !selector.is_empty() => SettleStrategy::PollUntilPresent {
                selector,
                interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
                max_wait: Duration::from_millis(settle_ms),
            },
            _ => SettleStrategy::FixedDelay(Duration::from_millis(settle_ms)),
        };

        Self {
            origin: env::var(ENV_ORIGIN).unwrap_or_else(|_| DEFAULT_ORIGIN.to_string()),
            pages_dir: env::var(ENV_PAGES_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PAGES_DIR)),
            output_dir: env::var(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            viewport: env::var(ENV_VIEWPORT)
                .ok()
                .and_then(|s| parse_viewport(&s))
                .unwrap_or((DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT)),
            nav_timeout: Duration::from_millis(
                env::var(ENV_TIMEOUT_MS)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_NAV_TIMEOUT_MS),
            ),
            settle,
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            pages_dir: PathBuf::from(DEFAULT_PAGES_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            viewport: (DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            nav_timeout: Duration::from_millis(DEFAULT_NAV_TIMEOUT_MS),
            settle: SettleStrategy::default(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Parse a viewport string like "1440x900" into (width, height)
pub fn parse_viewport(size: &str) -> Option<(u32, u32)> {
    let (w, h) = size.split_once('x')?;
    let w = w.trim().parse().ok()?;
    let h = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}
