use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use pricewatch::extract::ListingExtractor;
use pricewatch::fetcher::PageFetcher;
use pricewatch::plugins::notifiers::EmailConfig;
use pricewatch::plugins::NotifierManager;
use pricewatch::scheduler::{AutoCheck, CheckMode};
use pricewatch::watcher::{TrackingRequest, Watcher};
use pricewatch::AppConfig;

/// Track product prices and get alerted on drops.
#[derive(Debug, Parser)]
#[command(name = "pricewatch", version, about)]
struct Cli {
    /// Product page URL to track
    #[arg(long)]
    url: Option<String>,

    /// Target price in the page's smallest currency unit
    #[arg(long)]
    target_price: Option<i64>,

    /// Watchlist file with one `URL,price` entry per line
    #[arg(long)]
    watchlist: Option<PathBuf>,

    /// Email address used as both sender and recipient of alerts
    #[arg(long)]
    email: String,

    /// Provider-issued app password for SMTP login
    #[arg(long)]
    app_password: String,

    /// Re-check automatically every N minutes
    #[arg(long, value_name = "MINUTES")]
    every: Option<u64>,
}

impl Cli {
    fn mode(&self) -> Result<CheckMode> {
        if let Some(path) = &self.watchlist {
            return Ok(CheckMode::Watchlist(path.clone()));
        }

        match (&self.url, self.target_price) {
            (Some(url), Some(target_price)) => Ok(CheckMode::Single(TrackingRequest {
                url: url.clone(),
                target_price,
            })),
            _ => anyhow::bail!("provide either --watchlist, or both --url and --target-price"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pricewatch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mode = cli.mode()?;

    if cli.email.trim().is_empty() || cli.app_password.trim().is_empty() {
        anyhow::bail!("email and app password must not be empty");
    }

    let config = AppConfig::load()?;

    let email_config = EmailConfig {
        smtp_host: config.smtp.host.clone(),
        smtp_port: config.smtp.port,
        address: cli.email.trim().to_string(),
        app_password: cli.app_password.trim().to_string(),
    };

    let watcher = Arc::new(Watcher::new(
        PageFetcher::new(&config.fetcher)?,
        ListingExtractor::new(),
        NotifierManager::with_default_notifiers(email_config),
    ));

    // One pass right away, scheduled repeats only on request.
    run_once(&watcher, &mode).await;

    let Some(interval_minutes) = cli.every else {
        return Ok(());
    };

    let mut auto_check = AutoCheck::new(Arc::clone(&watcher));
    auto_check.enable(interval_minutes, mode)?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    auto_check.disable();

    Ok(())
}

async fn run_once(watcher: &Watcher, mode: &CheckMode) {
    match mode {
        CheckMode::Single(request) => {
            watcher.check(request).await;
        }
        CheckMode::Watchlist(path) => {
            if let Err(e) = watcher.check_watchlist(path).await {
                tracing::error!("Error reading watchlist {}: {}", path.display(), e);
            }
        }
    }
}
