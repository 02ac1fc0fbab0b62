use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use site_vision::config::{
    self, AuditConfig, DEFAULT_POLL_INTERVAL_MS, SettleStrategy, parse_viewport,
};
use site_vision::{report, runner};

/// Site Vision - visual smoke-testing for multi-page static sites
#[derive(Parser, Debug)]
#[command(
    name = "site-vision",
    about = "Render every top-level page, verify structural elements, capture full-page screenshots",
    after_help = "ENVIRONMENT VARIABLES:\n\
        SITE_VISION_ORIGIN          Base origin the site is served on\n\
        SITE_VISION_PAGES_DIR       Directory scanned for page files\n\
        SITE_VISION_OUTPUT_DIR      Screenshot output directory\n\
        SITE_VISION_VIEWPORT        Viewport size as WxH\n\
        SITE_VISION_TIMEOUT_MS      Navigation timeout (ms)\n\
        SITE_VISION_SETTLE_MS       Post-navigation settle delay (ms)\n\
        SITE_VISION_READY_SELECTOR  Poll for this marker instead of a fixed delay"
)]
struct Args {
    /// Base origin the static site is served on
    #[arg(long, env = "SITE_VISION_ORIGIN", default_value = config::DEFAULT_ORIGIN)]
    origin: String,

    /// Directory scanned for eligible page files
    #[arg(long, env = "SITE_VISION_PAGES_DIR", default_value = config::DEFAULT_PAGES_DIR)]
    pages_dir: PathBuf,

    /// Output directory for screenshots
    #[arg(short, long, env = "SITE_VISION_OUTPUT_DIR", default_value = config::DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Viewport size as WxH (e.g. 1440x900)
    #[arg(long, env = "SITE_VISION_VIEWPORT", default_value = "1440x900")]
    viewport: String,

    /// Navigation timeout in milliseconds
    #[arg(long, env = "SITE_VISION_TIMEOUT_MS", default_value_t = config::DEFAULT_NAV_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Post-navigation settle delay in milliseconds
    #[arg(long, env = "SITE_VISION_SETTLE_MS", default_value_t = config::DEFAULT_SETTLE_MS)]
    settle_ms: u64,

    /// Poll for this readiness marker instead of sleeping a fixed delay
    #[arg(long, env = "SITE_VISION_READY_SELECTOR")]
    ready_selector: Option<String>,

    /// Output the run report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let viewport = parse_viewport(&args.viewport).ok_or_else(|| {
        format!(
            "Invalid viewport '{}'. Use WxH, e.g. 1440x900",
            args.viewport
        )
    })?;

    let settle = match args.ready_selector {
        Some(selector) if !selector.is_empty() => SettleStrategy::PollUntilPresent {
            selector,
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_wait: Duration::from_millis(args.settle_ms),
        },
        _ => SettleStrategy::FixedDelay(Duration::from_millis(args.settle_ms)),
    };

    let config = AuditConfig {
        origin: args.origin.trim_end_matches('/').to_string(),
        pages_dir: args.pages_dir,
        output_dir: args.output,
        viewport,
        nav_timeout: Duration::from_millis(args.timeout_ms),
        settle,
    };

    let run_report = runner::run(&config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run_report)?);
    } else {
        report::print_report(&run_report);
    }

    // Per-page failures are reported, not signaled through the exit code;
    // only fatal errors (discovery, launch) exit nonzero.
    Ok(())
}
