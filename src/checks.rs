//! Structural checks and the element-visibility predicate.
//!
//! Two kinds of check run against a rendered page:
//! - generic presence checks, identical on every page (header, footer)
//! - page-specific counted-selector checks, attached to a descriptor at
//!   discovery time by slug lookup
//!
//! Check failures are result values, never errors. The visibility predicate
//! distinguishes "never rendered" from "present but broken", which is the
//! diagnostic purpose of the whole tool.

use serde::{Deserialize, Serialize};

/// Outcome of a single element check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    /// Element exists and renders with positive width and height
    Found,
    /// No element matches the selector
    NotFound,
    /// Element is in the document tree but renders with zero area
    /// (display:none, collapsed layout, detached from the visible flow)
    FoundButHidden,
}

impl CheckStatus {
    pub fn is_ok(self) -> bool {
        self == CheckStatus::Found
    }
}

/// Result of one check against one page; immutable once created
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Human-readable element name (e.g. "site header")
    pub name: String,
    /// Selector the check queried
    pub selector: String,
    pub status: CheckStatus,
    /// Whether a non-Found status is a critical failure
    pub critical: bool,
}

/// Rendered geometry of the first element matching a selector, as reported
/// by a single synchronous DOM query
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElementMetrics {
    pub found: bool,
    pub width: f64,
    pub height: f64,
}

impl ElementMetrics {
    /// A selector with no match in the document
    pub fn absent() -> Self {
        Self {
            found: false,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Classify rendered geometry into a check status
    pub fn status(&self) -> CheckStatus {
        if !self.found {
            CheckStatus::NotFound
        } else if self.width > 0.0 && self.height > 0.0 {
            CheckStatus::Found
        } else {
            CheckStatus::FoundButHidden
        }
    }
}

/// A presence-and-visibility check on a single element
#[derive(Debug, Clone, Copy)]
pub struct CheckSpec {
    pub name: &'static str,
    pub selector: &'static str,
}

/// The generic check set, run identically on every audited page
pub const GENERIC_CHECKS: &[CheckSpec] = &[
    CheckSpec {
        name: "site header",
        selector: "header",
    },
    CheckSpec {
        name: "site footer",
        selector: "footer",
    },
];

/// A counted-selector check: at least `min_count` elements must match
#[derive(Debug, Clone, Copy)]
pub struct CountCheck {
    pub name: &'static str,
    pub selector: &'static str,
    pub min_count: usize,
    /// Critical checks get a dedicated CRITICAL report line on failure
    pub critical: bool,
}

const HOMEPAGE_CHECKS: &[CountCheck] = &[CountCheck {
    name: "change cards",
    selector: ".change-card",
    min_count: 1,
    critical: true,
}];

/// Page-specific checks, keyed by page slug. Looked up once at discovery
/// time so page identity, not display-string matching, selects the extras.
pub fn extra_checks_for(slug: &str) -> &'static [CountCheck] {
    match slug {
        "homepage" => HOMEPAGE_CHECKS,
        _ => &[],
    }
}
