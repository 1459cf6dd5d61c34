use std::env;

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub redis_url: String,

    // Notifications
    pub mail_from: String,
    pub site_base_url: String,
    pub application_notice_to_org: bool,
    pub smtp: Option<SmtpConfig>,

    // Worker
    pub worker_poll_seconds: u64,
    pub email_max_retries: u32,
}

/// SMTP relay settings. Absent when `SMTP_HOST` is not set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        Ok(Self {
            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            redis_url: env::var("REDIS_URL").map_err(|_| ConfigError::Missing("REDIS_URL"))?,

            // Notifications
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "info@code4socialgood.org".to_string()),
            site_base_url: env::var("SITE_BASE_URL")
                .unwrap_or_else(|_| "http://dev.code4socialgood.org".to_string()),
            application_notice_to_org: env::var("APPLICATION_NOTICE_TO_ORG")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("APPLICATION_NOTICE_TO_ORG"))?,
            smtp: SmtpConfig::from_env()?,

            // Worker
            worker_poll_seconds: env::var("WORKER_POLL_SECONDS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("WORKER_POLL_SECONDS"))?,
            email_max_retries: env::var("EMAIL_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("EMAIL_MAX_RETRIES"))?,
        })
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(host) = env::var("SMTP_HOST") else {
            return Ok(None);
        };

        let port = match env::var("SMTP_PORT") {
            Ok(port) => port.parse().map_err(|_| ConfigError::Invalid("SMTP_PORT"))?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        Ok(Some(Self {
            host,
            port,
            user: env::var("SMTP_USER").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
        }))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable: {0}")]
    Invalid(&'static str),
}
