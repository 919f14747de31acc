use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::plugins::traits::{NotificationResult, Notifier, PriceAlert};

/// SMTP settings for alert mail. The user's address is both sender and
/// recipient; the password is a provider-issued app password, not the
/// account password.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub address: String,
    pub app_password: String,
}

pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        EmailNotifier { config }
    }

    fn build_message(&self, alert: &PriceAlert) -> Result<Message, Box<dyn std::error::Error + Send + Sync>> {
        let message = Message::builder()
            .from(self.config.address.parse()?)
            .to(self.config.address.parse()?)
            .subject(alert.subject())
            .body(alert.body())?;
        Ok(message)
    }

    fn build_transport(&self) -> Result<SmtpTransport, Box<dyn std::error::Error + Send + Sync>> {
        let credentials = Credentials::new(
            self.config.address.clone(),
            self.config.app_password.clone(),
        );

        // relay() is SMTP over implicit TLS; the default provider port is 465.
        let mailer = SmtpTransport::relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(mailer)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(
        &self,
        alert: &PriceAlert,
    ) -> Result<NotificationResult, Box<dyn std::error::Error + Send + Sync>> {
        let message = self.build_message(alert)?;
        let mailer = self.build_transport()?;

        match mailer.send(&message) {
            Ok(_response) => Ok(NotificationResult::sent()),
            Err(e) => Ok(NotificationResult::failed(e.to_string())),
        }
    }
}
