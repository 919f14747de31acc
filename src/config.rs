use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub fetcher: FetcherConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file, and
    /// environment variables with prefix "PRICEWATCH".
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Built-in defaults; a page fetch should look like a browser visit
            .set_default("fetcher.user_agent", "Mozilla/5.0")?
            .set_default("fetcher.accept_language", "en-US,en;q=0.9")?
            .set_default("fetcher.request_timeout", 30)?
            .set_default("smtp.host", "smtp.gmail.com")?
            .set_default("smtp.port", 465)?
            // Optional local overrides
            .add_source(File::with_name("config/pricewatch").required(false))
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetcher.user_agent.is_empty() {
            return Err(ConfigError::Message("Fetcher user_agent must not be empty".into()));
        }

        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message("Fetcher request_timeout must be greater than 0".into()));
        }

        if self.smtp.host.is_empty() {
            return Err(ConfigError::Message("SMTP host must not be empty".into()));
        }

        if self.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig {
                user_agent: "Mozilla/5.0".to_string(),
                accept_language: "en-US,en;q=0.9".to_string(),
                request_timeout: 30,
            },
            smtp: SmtpConfig {
                host: "smtp.gmail.com".to_string(),
                port: 465,
            },
        }
    }
}
