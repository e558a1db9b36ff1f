use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

pub const SERVICE_URL_ENV: &str = "KVCONSOLE_SERVICE_URL";
pub const NOTIFICATION_TTL_ENV: &str = "KVCONSOLE_NOTIFICATION_TTL_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Origin of the key-value service; `/health` and `/api/v1/*` hang off it.
    pub service_url: String,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }
}

impl ConsoleConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `KVCONSOLE_SERVICE_URL` and
    /// `KVCONSOLE_NOTIFICATION_TTL_MS` when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(SERVICE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            config.service_url = url;
        }

        if let Some(raw) = lookup(NOTIFICATION_TTL_ENV) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid {NOTIFICATION_TTL_ENV}={raw}"))?;
            config.notification_ttl = Duration::from_millis(millis);
        }

        Ok(config)
    }
}
