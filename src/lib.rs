//! Site Vision - visual smoke-testing for multi-page static sites.
//!
//! This crate provides:
//! - Filename-convention page discovery with derived display labels
//! - A headless-Chrome session for rendering and DOM geometry queries
//! - Per-page structural checks (presence + non-zero rendered area)
//! - Full-page screenshot capture for manual review
//! - A partial-failure-tolerant run controller and console reporting
//!
//! # Example
//!
//! ```rust,no_run
//! use site_vision::config::AuditConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AuditConfig::from_env();
//!     let report = site_vision::runner::run(&config).await.unwrap();
//!     site_vision::report::print_report(&report);
//! }
//! ```

pub mod auditor;
pub mod checks;
pub mod config;
pub mod discovery;
pub mod error;
pub mod report;
pub mod runner;
pub mod session;
pub mod snapshot;

// Re-export the types most callers need
pub use checks::{CheckResult, CheckStatus, ElementMetrics};
pub use config::{AuditConfig, SettleStrategy};
pub use discovery::{PageDescriptor, discover_pages};
pub use error::{AuditError, AuditResult};
pub use report::{PageOutcome, RunReport};
pub use session::{BrowserSession, MockPage, MockSession, PageSession};
pub use snapshot::ScreenshotSink;
