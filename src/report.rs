//! Run results and their console rendering.
//!
//! The reporter is purely presentational: formatting functions build the
//! human-readable lines, thin wrappers print them. Every non-Found check and
//! every page-scoped failure produces at least one line.

use std::path::PathBuf;

use serde::Serialize;

use crate::checks::{CheckResult, CheckStatus};
use crate::discovery::PageDescriptor;

/// Everything recorded for one audited page; never mutated after the
/// auditor finishes with the page
#[derive(Debug, Clone, Serialize)]
pub struct PageOutcome {
    pub page: PageDescriptor,

    /// Check results in execution order (generic before page-specific).
    /// Empty when navigation failed.
    pub checks: Vec<CheckResult>,

    /// Where the full-page screenshot was written, when capture succeeded
    pub screenshot_path: Option<PathBuf>,

    /// Set only when navigation itself could not complete
    pub failure: Option<String>,
}

impl PageOutcome {
    /// Outcome for a page whose navigation failed before any checks ran
    pub fn failed(page: PageDescriptor, reason: String) -> Self {
        Self {
            page,
            checks: Vec::new(),
            screenshot_path: None,
            failure: Some(reason),
        }
    }

    /// True when navigation completed and every check came back Found
    pub fn passed(&self) -> bool {
        self.failure.is_none() && self.checks.iter().all(|c| c.status.is_ok())
    }
}

/// One PageOutcome per discovered page, in discovery order; fresh per
/// invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<PageOutcome>,
}

impl RunReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.len() - self.passed_count()
    }
}

/// Line printed when discovery yields no eligible pages; a zero-page run is
/// a run-level failure signal
pub const NOTHING_TO_AUDIT: &str = "Nothing to audit: no eligible page files were discovered";

/// Format one check result as a report line
pub fn check_line(check: &CheckResult) -> String {
    match check.status {
        CheckStatus::Found => format!("  ✓ {}", check.name),
        CheckStatus::NotFound if check.critical => {
            format!("  CRITICAL: {} missing ({})", check.name, check.selector)
        }
        CheckStatus::NotFound => format!("  ✗ {} missing ({})", check.name, check.selector),
        CheckStatus::FoundButHidden => {
            format!("  ✗ {} present but hidden ({})", check.name, check.selector)
        }
    }
}

/// Format all report lines for one page
pub fn page_lines(outcome: &PageOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({})",
        outcome.page.label, outcome.page.url_path
    )];

    if let Some(failure) = &outcome.failure {
        lines.push(format!("  ✗ navigation failed: {}", failure));
        return lines;
    }

    lines.extend(outcome.checks.iter().map(check_line));

    match &outcome.screenshot_path {
        Some(path) => lines.push(format!("  screenshot: {}", path.display())),
        None => lines.push("  ✗ screenshot not captured".to_string()),
    }
    lines
}

/// Format the final summary line
pub fn summary_line(report: &RunReport) -> String {
    format!(
        "Audited {} page(s): {} passed, {} with failures",
        report.len(),
        report.passed_count(),
        report.failed_count()
    )
}

/// Print the full report to stdout
pub fn print_report(report: &RunReport) {
    if report.is_empty() {
        println!("{}", NOTHING_TO_AUDIT);
        return;
    }
    for outcome in &report.outcomes {
        for line in page_lines(outcome) {
            println!("{}", line);
        }
    }
    println!();
    println!("{}", summary_line(report));
}
