//! End-to-end tests for the audit pipeline: discovery through reporting,
//! driven over a scripted session instead of a live browser.

use std::time::Duration;

use pretty_assertions::assert_eq;

use site_vision::checks::CheckStatus;
use site_vision::config::{AuditConfig, SettleStrategy};
use site_vision::session::{MockPage, MockSession};
use site_vision::{discover_pages, report, runner};

fn make_site(files: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Failed to create site dir");
    for name in files {
        std::fs::write(dir.path().join(name), "<html></html>").expect("Failed to write page file");
    }
    dir
}

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
        .elements(".change-card", 3)
}

#[test]
fn test_discovery_excludes_subpages_and_orders_by_prefix() {
    // Scenario 1: two eligible pages plus a digit-letter sub-page.
    let site = make_site(&[
        "2 Issues.html",
        "1 Homepage.html",
        "4A prison_oversight_page.html",
    ]);

    let pages = discover_pages(site.path()).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].label, "Homepage");
    assert_eq!(pages[1].label, "Issues");
    assert_eq!(pages[0].url_path, "/1%20Homepage.html");
}

#[tokio::test]
async fn test_full_run_all_pages_healthy() {
    let site = make_site(&["1 Homepage.html", "2 Issues.html"]);
    let out = tempfile::tempdir().unwrap();
    let config = test_config(out.path());

    let pages = discover_pages(site.path()).unwrap();
    let session = MockSession::new()
        .page("/1%20Homepage.html", healthy_page())
        .page("/2%20Issues.html", healthy_page());

    let run_report = runner::run_with_session(&session, &pages, &config).await;

    assert_eq!(run_report.len(), 2);
    assert_eq!(run_report.passed_count(), 2);
    for outcome in &run_report.outcomes {
        let path = outcome.screenshot_path.as_ref().expect("screenshot path");
        assert!(path.exists(), "screenshot file not written: {:?}", path);
    }
    assert!(out.path().join("Homepage.png").exists());
    assert!(out.path().join("Issues.png").exists());
}

#[tokio::test]
async fn test_missing_change_cards_is_critical_but_not_fatal() {
    // Scenario 2: landing page renders zero change cards. The screenshot is
    // still captured and the run completes.
    let site = make_site(&["1 Homepage.html", "2 Issues.html"]);
    let out = tempfile::tempdir().unwrap();
    let config = test_config(out.path());

    let pages = discover_pages(site.path()).unwrap();
    let session = MockSession::new()
        .page(
            "/1%20Homepage.html",
            MockPage::new()
                .element("header", 1440.0, 80.0)
                .element("footer", 1440.0, 120.0)
                .elements(".change-card", 0),
        )
        .page("/2%20Issues.html", healthy_page());

    let run_report = runner::run_with_session(&session, &pages, &config).await;

    assert_eq!(run_report.len(), 2);
    let homepage = &run_report.outcomes[0];
    assert!(homepage.failure.is_none());
    assert!(homepage.screenshot_path.is_some());

    let cards = homepage
        .checks
        .iter()
        .find(|c| c.selector == ".change-card")
        .expect("card check recorded");
    assert_eq!(cards.status, CheckStatus::NotFound);
    assert!(cards.critical);

    let lines = report::page_lines(homepage);
    assert!(
        lines.iter().any(|l| l.contains("CRITICAL")),
        "expected a CRITICAL line, got: {:?}",
        lines
    );

    // The sibling page is unaffected.
    assert!(run_report.outcomes[1].passed());
}

#[tokio::test]
async fn test_navigation_timeout_isolated_to_one_page() {
    // Scenario 3: "Issues" times out; its neighbors still get full outcomes.
    let site = make_site(&["1 Homepage.html", "2 Issues.html", "3 Contact.html"]);
    let out = tempfile::tempdir().unwrap();
    let config = test_config(out.path());

    let pages = discover_pages(site.path()).unwrap();
    let session = MockSession::new()
        .page("/1%20Homepage.html", healthy_page())
        .page(
            "/2%20Issues.html",
            MockPage::new().failing("navigation timed out"),
        )
        .page(
            "/3%20Contact.html",
            MockPage::new()
                .element("header", 1440.0, 80.0)
                .element("footer", 1440.0, 120.0),
        );

    let run_report = runner::run_with_session(&session, &pages, &config).await;

    assert_eq!(run_report.len(), 3);

    let issues = &run_report.outcomes[1];
    assert!(issues.failure.as_ref().unwrap().contains("timed out"));
    assert!(issues.checks.is_empty());
    assert!(issues.screenshot_path.is_none());

    for outcome in [&run_report.outcomes[0], &run_report.outcomes[2]] {
        assert!(outcome.failure.is_none());
        assert!(!outcome.checks.is_empty());
        assert!(outcome.screenshot_path.is_some());
    }

    assert_eq!(
        report::summary_line(&run_report),
        "Audited 3 page(s): 2 passed, 1 with failures"
    );
}

#[test]
fn test_empty_site_yields_empty_report() {
    let site = make_site(&["4A prison_oversight_page.html", "style.css"]);
    let pages = discover_pages(site.path()).unwrap();
    assert!(pages.is_empty());
}
