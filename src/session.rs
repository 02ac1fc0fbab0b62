//! Browser session management.
//!
//! `PageSession` is the seam between the audit pipeline and the rendering
//! engine: navigation, DOM geometry queries, and full-page capture. The real
//! implementation drives headless Chrome through chromiumoxide over one tab;
//! `MockSession` provides scripted pages so the pipeline can be exercised
//! without a browser.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::checks::ElementMetrics;
use crate::config::AuditConfig;
use crate::error::{AuditError, AuditResult};

/// One rendered-document session the auditor can drive.
///
/// A single implementation instance is exclusively owned by the run
/// controller for the lifetime of the run; each call is awaited to
/// completion before the next step proceeds.
#[allow(async_fn_in_trait)]
pub trait PageSession {
    /// Navigate the session's tab to `url`, waiting until the load settles
    /// or `timeout` elapses.
    async fn navigate(&self, url: &str, timeout: Duration) -> AuditResult<()>;

    /// Query the first element matching `selector` and report its rendered
    /// bounding box. One synchronous query; no retries, no polling.
    async fn element_metrics(&self, selector: &str) -> AuditResult<ElementMetrics>;

    /// Count elements matching `selector`.
    async fn count_elements(&self, selector: &str) -> AuditResult<usize>;

    /// Capture a full-page PNG of the current render.
    async fn screenshot_full_page(&self) -> AuditResult<Vec<u8>>;
}

/// Headless-Chrome session over a single tab
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch headless Chrome with the configured viewport and open one
    /// blank tab. Launch failure is fatal to the run.
    pub async fn launch(config: &AuditConfig) -> AuditResult<Self> {
        let (width, height) = config.viewport;
        let browser_config = BrowserConfig::builder()
            .window_size(width, height)
            .viewport(Viewport {
                width,
                height,
                ..Viewport::default()
            })
            .build()
            .map_err(AuditError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AuditError::Launch(e.to_string()))?;

        // The CDP event stream must be drained for the session to make progress.
        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AuditError::Launch(e.to_string()))?;

        debug!(width, height, "browser session launched");

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Close the tab and the browser process. Called on every exit path of
    /// the run controller; close failures are logged, not propagated.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("browser close failed: {}", e);
        }
        self.handler_task.abort();
    }
}

impl PageSession for BrowserSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> AuditResult<()> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(())) => {
                debug!(url, "navigation complete");
                Ok(())
            }
            Ok(Err(e)) => Err(AuditError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(AuditError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn element_metrics(&self, selector: &str) -> AuditResult<ElementMetrics> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return {{ found: false, width: 0, height: 0 }};
                const rect = el.getBoundingClientRect();
                return {{ found: true, width: rect.width, height: rect.height }};
            }})()"#,
            sel = js_string(selector)
        );

        self.page
            .evaluate(js)
            .await
            .map_err(|e| AuditError::Browser(e.to_string()))?
            .into_value()
            .map_err(|e| AuditError::Browser(e.to_string()))
    }

    async fn count_elements(&self, selector: &str) -> AuditResult<usize> {
        let js = format!(
            "document.querySelectorAll({sel}).length",
            sel = js_string(selector)
        );

        self.page
            .evaluate(js)
            .await
            .map_err(|e| AuditError::Browser(e.to_string()))?
            .into_value()
            .map_err(|e| AuditError::Browser(e.to_string()))
    }

    async fn screenshot_full_page(&self) -> AuditResult<Vec<u8>> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| AuditError::Browser(e.to_string()))
    }
}

/// Embed a selector into generated JavaScript as a quoted string literal
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Minimal PNG signature used as the mock screenshot payload
pub const MOCK_PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// A scripted page served by [`MockSession`]
#[derive(Debug, Default, Clone)]
pub struct MockPage {
    visible: HashMap<String, (f64, f64)>,
    counts: HashMap<String, usize>,
    fail_navigation: Option<String>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visible element with the given rendered size
    pub fn element(mut self, selector: &str, width: f64, height: f64) -> Self {
        self.visible.insert(selector.to_string(), (width, height));
        self
    }

    /// Add an element that exists in the tree but renders with zero area
    pub fn hidden(mut self, selector: &str) -> Self {
        self.visible.insert(selector.to_string(), (0.0, 0.0));
        self
    }

    /// Set the number of elements matching a counted selector
    pub fn elements(mut self, selector: &str, count: usize) -> Self {
        self.counts.insert(selector.to_string(), count);
        self
    }

    /// Make navigation to this page fail with `reason`
    pub fn failing(mut self, reason: &str) -> Self {
        self.fail_navigation = Some(reason.to_string());
        self
    }
}

/// In-memory session for exercising the audit pipeline without a browser.
/// Pages are registered by URL path; navigation selects the page whose path
/// the requested URL ends with.
#[derive(Debug, Default)]
pub struct MockSession {
    pages: HashMap<String, MockPage>,
    current: Mutex<Option<String>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scripted page under a root-relative URL path
    pub fn page(mut self, url_path: &str, page: MockPage) -> Self {
        self.pages.insert(url_path.to_string(), page);
        self
    }

    fn current_page(&self) -> AuditResult<MockPage> {
        let current = self.current.lock().expect("mock session lock poisoned");
        current
            .as_ref()
            .and_then(|path| self.pages.get(path))
            .cloned()
            .ok_or_else(|| AuditError::Browser("no page loaded".to_string()))
    }
}

impl PageSession for MockSession {
    async fn navigate(&self, url: &str, _timeout: Duration) -> AuditResult<()> {
        let path = self
            .pages
            .keys()
            .find(|path| url.ends_with(path.as_str()))
            .cloned()
            .ok_or_else(|| AuditError::Navigation {
                url: url.to_string(),
                reason: "no such page".to_string(),
            })?;

        if let Some(reason) = &self.pages[&path].fail_navigation {
            return Err(AuditError::Navigation {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }

        *self.current.lock().expect("mock session lock poisoned") = Some(path);
        Ok(())
    }

    async fn element_metrics(&self, selector: &str) -> AuditResult<ElementMetrics> {
        let page = self.current_page()?;
        Ok(match page.visible.get(selector) {
            Some(&(width, height)) => ElementMetrics {
                found: true,
                width,
                height,
            },
            None => ElementMetrics::absent(),
        })
    }

    async fn count_elements(&self, selector: &str) -> AuditResult<usize> {
        let page = self.current_page()?;
        Ok(page
            .counts
            .get(selector)
            .copied()
            .unwrap_or_else(|| usize::from(page.visible.contains_key(selector))))
    }

    async fn screenshot_full_page(&self) -> AuditResult<Vec<u8>> {
        self.current_page()?;
        Ok(MOCK_PNG.to_vec())
    }
}
