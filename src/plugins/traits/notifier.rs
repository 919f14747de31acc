use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A price drop that crossed the target threshold and should be announced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
    pub title: String,
    pub price: i64,
    pub url: String,
}

impl PriceAlert {
    /// Fixed alert subject line.
    pub fn subject(&self) -> &'static str {
        "Price Drop Alert"
    }

    /// Fixed alert body template embedding title, price, and URL.
    pub fn body(&self) -> String {
        format!(
            "{}\nCurrent Price: {}\nLink: {}",
            self.title, self.price, self.url
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn sent() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Trait for implementing notification channels (email, desktop toast, etc.)
///
/// Delivery is best-effort: implementations fold send failures into the
/// returned result where they can, and only return `Err` for failures that
/// occur before a send is attempted (e.g. a malformed address). Either way
/// the caller reports the failure and the check result stands.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in log lines and dispatch reports.
    fn name(&self) -> &str;

    async fn notify(
        &self,
        alert: &PriceAlert,
    ) -> Result<NotificationResult, Box<dyn std::error::Error + Send + Sync>>;
}
