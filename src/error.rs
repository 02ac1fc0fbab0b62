//! Error types for the audit pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// The page directory could not be listed. Fatal: the run aborts before
    /// the browser is launched.
    #[error("failed to list page directory {path}: {source}")]
    Discovery {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The browser process failed to start. Fatal.
    #[error("browser failed to launch: {0}")]
    Launch(String),

    /// Navigation failed at the engine level. Page-scoped: only that page's
    /// remaining steps are skipped.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Navigation did not reach quiescence within the configured timeout.
    /// Page-scoped.
    #[error("navigation to {url} timed out after {timeout_ms} ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    /// A screenshot could not be persisted. Page-scoped: recorded, does not
    /// abort other pages.
    #[error("failed to write screenshot {path}: {source}")]
    ScreenshotWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A DOM query or capture call failed in the browser transport.
    #[error("browser protocol error: {0}")]
    Browser(String),
}

pub type AuditResult<T> = Result<T, AuditError>;
