use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::extract::{Listing, ListingExtractor};
use crate::fetcher::PageFetcher;
use crate::plugins::{NotificationResult, NotifierManager, PriceAlert};
use crate::watchlist::{self, WatchEntry};
use crate::Result;

/// What to check: one product URL against one target price. Built fresh
/// for every check; nothing about it is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRequest {
    pub url: String,
    pub target_price: i64,
}

impl From<WatchEntry> for TrackingRequest {
    fn from(entry: WatchEntry) -> Self {
        Self {
            url: entry.url,
            target_price: entry.target_price,
        }
    }
}

/// Outcome of one full fetch -> extract -> evaluate -> notify pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub url: String,
    pub success: bool,
    pub listing: Option<Listing>,
    pub triggered: bool,
    pub notifications: Vec<(String, NotificationResult)>,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl CheckReport {
    pub fn notifications_sent(&self) -> usize {
        self.notifications.iter().filter(|(_, r)| r.success).count()
    }

    fn failed(url: &str, error: String, started: Instant) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            listing: None,
            triggered: false,
            notifications: Vec::new(),
            error: Some(error),
            checked_at: Utc::now(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Outcome of one batch pass over a watchlist file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistReport {
    pub reports: Vec<CheckReport>,
    pub warnings: Vec<String>,
}

/// Runs check cycles. Owns the fetcher, the extractor, and the notifier
/// set for the lifetime of the process.
pub struct Watcher {
    fetcher: PageFetcher,
    extractor: ListingExtractor,
    notifiers: NotifierManager,
}

impl Watcher {
    pub fn new(fetcher: PageFetcher, extractor: ListingExtractor, notifiers: NotifierManager) -> Self {
        Self {
            fetcher,
            extractor,
            notifiers,
        }
    }

    /// One check cycle. Every failure is folded into the report; this
    /// never returns an error, so a scheduled cycle can never take the
    /// timer down with it.
    pub async fn check(&self, request: &TrackingRequest) -> CheckReport {
        let started = Instant::now();

        let body = match self.fetcher.fetch(&request.url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error checking {}: {}", request.url, e);
                return CheckReport::failed(&request.url, e.to_string(), started);
            }
        };

        let listing = match self.extractor.extract(&body) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!("Error checking {}: {}", request.url, e);
                return CheckReport::failed(&request.url, e.to_string(), started);
            }
        };

        tracing::info!("{} / {}", listing.title, listing.price);

        let triggered = listing.at_or_below(request.target_price);
        let notifications = if triggered {
            let alert = PriceAlert {
                title: listing.title.clone(),
                price: listing.price,
                url: request.url.clone(),
            };
            self.notifiers.dispatch(&alert).await
        } else {
            tracing::info!("Price above target ({} > {})", listing.price, request.target_price);
            Vec::new()
        };

        CheckReport {
            url: request.url.clone(),
            success: true,
            listing: Some(listing),
            triggered,
            notifications,
            error: None,
            checked_at: Utc::now(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// One batch pass: every well-formed watchlist line gets a serial
    /// check cycle; malformed-price lines get one warning each.
    pub async fn check_watchlist(&self, path: &Path) -> Result<WatchlistReport> {
        let (entries, warnings) = watchlist::load(path)?;

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        let mut reports = Vec::with_capacity(entries.len());
        for entry in entries {
            let request = TrackingRequest::from(entry);
            reports.push(self.check(&request).await);
        }

        Ok(WatchlistReport { reports, warnings })
    }
}
