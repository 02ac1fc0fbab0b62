//! Per-page audit orchestration.
//!
//! One page, one pass: navigate, settle, generic checks, page-specific
//! checks, screenshot. Only a navigation failure aborts the page; check
//! failures are recorded as data and the screenshot is still captured, since
//! the image is the human-review artifact even when checks fail.

use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::checks::{CheckResult, CheckStatus, GENERIC_CHECKS};
use crate::config::{AuditConfig, SettleStrategy};
use crate::discovery::PageDescriptor;
use crate::report::PageOutcome;
use crate::session::PageSession;
use crate::snapshot::ScreenshotSink;

/// Audit a single page and record everything into a [`PageOutcome`]
pub async fn audit_page<S: PageSession>(
    session: &S,
    page: &PageDescriptor,
    config: &AuditConfig,
    sink: &ScreenshotSink,
) -> PageOutcome {
    let url = format!("{}{}", config.origin, page.url_path);
    info!("auditing {} ({})", page.label, url);

    if let Err(e) = session.navigate(&url, config.nav_timeout).await {
        warn!("skipping remaining steps for {}: {}", page.label, e);
        return PageOutcome::failed(page.clone(), e.to_string());
    }

    settle(session, &config.settle).await;

    let mut checks = Vec::new();

    for spec in GENERIC_CHECKS {
        let status = match session.element_metrics(spec.selector).await {
            Ok(metrics) => metrics.status(),
            Err(e) => {
                warn!("query for '{}' failed on {}: {}", spec.selector, page.label, e);
                CheckStatus::NotFound
            }
        };
        checks.push(CheckResult {
            name: spec.name.to_string(),
            selector: spec.selector.to_string(),
            status,
            critical: false,
        });
    }

    for extra in page.extra_checks {
        let count = match session.count_elements(extra.selector).await {
            Ok(count) => count,
            Err(e) => {
                warn!("count for '{}' failed on {}: {}", extra.selector, page.label, e);
                0
            }
        };
        let status = if count >= extra.min_count {
            CheckStatus::Found
        } else {
            CheckStatus::NotFound
        };
        if status == CheckStatus::NotFound && extra.critical {
            error!(
                "CRITICAL: {} matched {} element(s) on {}, expected at least {}",
                extra.selector, count, page.label, extra.min_count
            );
        }
        checks.push(CheckResult {
            name: extra.name.to_string(),
            selector: extra.selector.to_string(),
            status,
            critical: extra.critical,
        });
    }

    let screenshot_path = match session.screenshot_full_page().await {
        Ok(bytes) => match sink.write(&page.label, &bytes) {
            Ok(path) => Some(path),
            Err(e) => {
                error!("{}", e);
                None
            }
        },
        Err(e) => {
            error!("screenshot capture failed for {}: {}", page.label, e);
            None
        }
    };

    PageOutcome {
        page: page.clone(),
        checks,
        screenshot_path,
        failure: None,
    }
}

/// Wait for deferred client-side mounting after navigation
async fn settle<S: PageSession>(session: &S, strategy: &SettleStrategy) {
    match strategy {
        SettleStrategy::FixedDelay(delay) => {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
        }
        SettleStrategy::PollUntilPresent {
            selector,
            interval,
            max_wait,
        } => {
            let deadline = Instant::now() + *max_wait;
            loop {
                match session.count_elements(selector).await {
                    Ok(count) if count > 0 => return,
                    _ => {}
                }
                if Instant::now() >= deadline {
                    // Not an error: the checks report whatever state the page reached.
                    debug!("readiness marker '{}' never appeared", selector);
                    return;
                }
                tokio::time::sleep(*interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MOCK_PNG, MockPage, MockSession};
    use std::time::Duration;

    fn test_config(output_dir: &std::path::Path) -> AuditConfig {
        AuditConfig {
            output_dir: output_dir.to_path_buf(),
            settle: SettleStrategy::FixedDelay(Duration::ZERO),
            ..AuditConfig::defaults()
        }
    }

    fn homepage_descriptor() -> PageDescriptor {
        crate::discovery::descriptor_for("1 Homepage.html")
    }

    #[tokio::test]
    async fn test_audit_page_all_checks_pass() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let sink = ScreenshotSink::new(&config.output_dir);

        let session = MockSession::new().page(
            "/1%20Homepage.html",
            MockPage::new()
                .element("header", 1440.0, 80.0)
                .element("footer", 1440.0, 120.0)
                .elements(".change-card", 4),
        );

        let outcome = audit_page(&session, &homepage_descriptor(), &config, &sink).await;
        assert!(outcome.failure.is_none());
        assert!(outcome.passed());
        assert_eq!(outcome.checks.len(), 3);

        let path = outcome.screenshot_path.expect("screenshot written");
        assert_eq!(std::fs::read(&path).unwrap(), MOCK_PNG);
    }

    #[tokio::test]
    async fn test_failed_checks_still_capture_screenshot() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let sink = ScreenshotSink::new(&config.output_dir);

        // Header hidden, footer absent, zero change cards: the motivating
        // regression case.
        let session = MockSession::new().page(
            "/1%20Homepage.html",
            MockPage::new().hidden("header").elements(".change-card", 0),
        );

        let outcome = audit_page(&session, &homepage_descriptor(), &config, &sink).await;
        assert!(outcome.failure.is_none());
        assert!(!outcome.passed());
        assert!(outcome.screenshot_path.is_some());

        let statuses: Vec<CheckStatus> = outcome.checks.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![
                CheckStatus::FoundButHidden,
                CheckStatus::NotFound,
                CheckStatus::NotFound,
            ]
        );
        let cards = outcome.checks.last().unwrap();
        assert!(cards.critical);
    }

    #[tokio::test]
    async fn test_navigation_failure_skips_checks_and_screenshot() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let sink = ScreenshotSink::new(&config.output_dir);

        let session = MockSession::new().page(
            "/1%20Homepage.html",
            MockPage::new().failing("net::ERR_CONNECTION_REFUSED"),
        );

        let outcome = audit_page(&session, &homepage_descriptor(), &config, &sink).await;
        assert!(outcome.failure.is_some());
        assert!(outcome.checks.is_empty());
        assert!(outcome.screenshot_path.is_none());
    }

    #[tokio::test]
    async fn test_poll_settle_returns_once_marker_present() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = test_config(tmp.path());
        config.settle = SettleStrategy::PollUntilPresent {
            selector: "main".to_string(),
            interval: Duration::from_millis(1),
            max_wait: Duration::from_millis(50),
        };
        let sink = ScreenshotSink::new(&config.output_dir);

        let session = MockSession::new().page(
            "/1%20Homepage.html",
            MockPage::new()
                .element("main", 1440.0, 600.0)
                .element("header", 1440.0, 80.0)
                .element("footer", 1440.0, 120.0)
                .elements(".change-card", 1),
        );

        let outcome = audit_page(&session, &homepage_descriptor(), &config, &sink).await;
        assert!(outcome.passed());
    }
}
