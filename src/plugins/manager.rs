use super::notifiers::{DesktopToastNotifier, EmailConfig, EmailNotifier};
use super::traits::{NotificationResult, Notifier, PriceAlert};

pub type NotifierBox = Box<dyn Notifier>;

/// Holds the notification channels active for this run.
///
/// The set is assembled once at startup; platform capability is probed at
/// that point and not re-checked per alert.
pub struct NotifierManager {
    notifiers: Vec<NotifierBox>,
}

impl NotifierManager {
    pub fn new() -> Self {
        Self { notifiers: Vec::new() }
    }

    /// Email always; desktop toast only where the platform supports it.
    pub fn with_default_notifiers(email_config: EmailConfig) -> Self {
        let mut manager = Self::new();
        manager.register(Box::new(EmailNotifier::new(email_config)));

        if DesktopToastNotifier::supported() {
            manager.register(Box::new(DesktopToastNotifier::new()));
        }

        manager
    }

    pub fn register(&mut self, notifier: NotifierBox) {
        tracing::debug!("Registered notifier: {}", notifier.name());
        self.notifiers.push(notifier);
    }

    pub fn list_names(&self) -> Vec<&str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Send an alert through every registered channel, in registration
    /// order. A channel failure is logged and reported in its result; it
    /// never stops the remaining channels or the enclosing check.
    pub async fn dispatch(&self, alert: &PriceAlert) -> Vec<(String, NotificationResult)> {
        let mut results = Vec::with_capacity(self.notifiers.len());

        for notifier in &self.notifiers {
            let name = notifier.name().to_string();
            let result = match notifier.notify(alert).await {
                Ok(result) => result,
                Err(e) => NotificationResult::failed(e.to_string()),
            };

            if result.success {
                tracing::info!("Notification sent via {}", name);
            } else {
                tracing::warn!(
                    "Notification via {} failed: {}",
                    name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }

            results.push((name, result));
        }

        results
    }
}

impl Default for NotifierManager {
    fn default() -> Self {
        Self::new()
    }
}
