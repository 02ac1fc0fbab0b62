//! Run controller: drives discovery once, then the auditor over every
//! descriptor strictly in sequence, isolating per-page failures.

use tracing::{info, warn};

use crate::auditor::audit_page;
use crate::config::AuditConfig;
use crate::discovery::{self, PageDescriptor};
use crate::error::AuditResult;
use crate::report::RunReport;
use crate::session::{BrowserSession, PageSession};
use crate::snapshot::ScreenshotSink;

/// Run a full audit: discover pages, launch the browser, audit each page,
/// close the browser on every exit path.
///
/// A zero-page discovery returns an empty report without launching the
/// browser at all. Discovery and launch failures are fatal; everything after
/// launch accumulates into the report instead of erroring.
pub async fn run(config: &AuditConfig) -> AuditResult<RunReport> {
    let pages = discovery::discover_pages(&config.pages_dir)?;
    if pages.is_empty() {
        warn!(
            "no eligible page files in {}; skipping browser startup",
            config.pages_dir.display()
        );
        return Ok(RunReport::default());
    }
    info!("discovered {} page(s)", pages.len());

    let session = BrowserSession::launch(config).await?;
    // run_with_session has no error path, so the session is released
    // unconditionally before the report is returned.
    let report = run_with_session(&session, &pages, config).await;
    session.close().await;

    Ok(report)
}

/// Audit every descriptor against an already-open session, in discovery
/// order. One page's failure never prevents the next page from being
/// audited; the report always holds one outcome per descriptor.
pub async fn run_with_session<S: PageSession>(
    session: &S,
    pages: &[PageDescriptor],
    config: &AuditConfig,
) -> RunReport {
    let sink = ScreenshotSink::new(&config.output_dir);
    let mut report = RunReport::default();

    for page in pages {
        let outcome = audit_page(session, page, config, &sink).await;
        report.outcomes.push(outcome);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettleStrategy;
    use crate::discovery::descriptor_for;
    use crate::session::{MockPage, MockSession};
    use std::time::Duration;

    fn test_config(output_dir: &std::path::Path) -> AuditConfig {
        AuditConfig {
            output_dir: output_dir.to_path_buf(),
            settle: SettleStrategy::FixedDelay(Duration::ZERO),
            ..AuditConfig::defaults()
        }
    }

    fn healthy_page() -> MockPage {
        MockPage::new()
            .element("header", 1440.0, 80.0)
            .element("footer", 1440.0, 120.0)
            .elements(".change-card", 2)
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let pages = vec![
            descriptor_for("1 Homepage.html"),
            descriptor_for("2 Issues.html"),
            descriptor_for("3 Contact.html"),
        ];
        let session = MockSession::new()
            .page("/1%20Homepage.html", healthy_page())
            .page("/2%20Issues.html", MockPage::new().failing("timed out"))
            .page("/3%20Contact.html", healthy_page());

        let report = run_with_session(&session, &pages, &config).await;

        assert_eq!(report.len(), pages.len());
        assert!(report.outcomes[0].failure.is_none());
        assert!(report.outcomes[1].failure.is_some());
        assert!(report.outcomes[1].checks.is_empty());
        assert!(report.outcomes[2].failure.is_none());
        assert!(report.outcomes[2].screenshot_path.is_some());
    }

    #[tokio::test]
    async fn test_report_preserves_discovery_order() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let pages = vec![
            descriptor_for("1 Homepage.html"),
            descriptor_for("2 Issues.html"),
        ];
        let session = MockSession::new()
            .page("/1%20Homepage.html", healthy_page())
            .page("/2%20Issues.html", healthy_page());

        let report = run_with_session(&session, &pages, &config).await;
        let labels: Vec<&str> = report
            .outcomes
            .iter()
            .map(|o| o.page.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Homepage", "Issues"]);
    }
}
