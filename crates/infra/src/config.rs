//! Configuration loading from environment variables.
//!
//! Unset variables fall back to defaults (logged at `info`); values that are
//! set but cannot be parsed are errors.

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::info;

use crate::notifier::dispatcher::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_NOTIFY_TIMEOUT};
use crate::notifier::EmailSettings;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Email API endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailApiConfig {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub replies_path: PathBuf,
    pub allowed_origins: Vec<String>,
    pub email: EmailSettings,
    /// `None` means messages are only logged.
    pub email_api: Option<EmailApiConfig>,
    pub notify_timeout: Duration,
    pub notify_max_in_flight: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            replies_path: PathBuf::from("./assets/replies.json"),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            email: EmailSettings::default(),
            email_api: None,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            notify_max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host: IpAddr = parse_or(&var, "BIND_HOST", defaults.bind_addr.ip())?;
        let port: u16 = parse_or(&var, "PORT", defaults.bind_addr.port())?;

        let replies_path = var("REPLIES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                info!(default = %defaults.replies_path.display(), "REPLIES_PATH not set, using default");
                defaults.replies_path.clone()
            });

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => {
                info!(default = ?defaults.allowed_origins, "ALLOWED_ORIGINS not set, using default");
                defaults.allowed_origins.clone()
            }
        };
        // Credentialed CORS cannot be combined with a wildcard origin.
        if let Some(origin) = allowed_origins.iter().find(|o| o.as_str() == "*") {
            return Err(ConfigError::Invalid {
                key: "ALLOWED_ORIGINS",
                value: origin.clone(),
                reason: "wildcard origin is not allowed with credentials; list origins explicitly".to_string(),
            });
        }

        let email = EmailSettings {
            from: var("EMAIL_FROM").unwrap_or(defaults.email.from),
            organizer: var("ORGANIZER_EMAIL"),
            event_name: var("EVENT_NAME").unwrap_or(defaults.email.event_name),
        };

        let email_api = var("EMAIL_API_URL").map(|url| EmailApiConfig {
            url,
            api_key: var("EMAIL_API_KEY"),
        });
        if email_api.is_none() {
            info!("EMAIL_API_URL not set, emails will only be logged");
        }

        let timeout_secs: u64 = parse_or(&var, "NOTIFY_TIMEOUT_SECS", defaults.notify_timeout.as_secs())?;
        let notify_max_in_flight: usize =
            parse_or(&var, "NOTIFY_MAX_IN_FLIGHT", defaults.notify_max_in_flight)?;
        if notify_max_in_flight == 0 || notify_max_in_flight > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid {
                key: "NOTIFY_MAX_IN_FLIGHT",
                value: notify_max_in_flight.to_string(),
                reason: format!("must be between 1 and {}", Semaphore::MAX_PERMITS),
            });
        }

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            replies_path,
            allowed_origins,
            email,
            email_api,
            notify_timeout: Duration::from_secs(timeout_secs),
            notify_max_in_flight,
        })
    }
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => {
            info!(%default, "{key} not set, using default");
            Ok(default)
        }
    }
}
