use std::str::FromStr;

use anyhow::{Context, Result};

use crate::compliance::regimes::{CSRD_THRESHOLD, EU_ETS_THRESHOLD};

/// Application configuration loaded from environment variables.
/// Every variable has a default; a present but malformed value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    /// kgCO2/MWh
    pub eu_ets_threshold: f64,
    /// kgCO2/MWh
    pub csrd_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            eu_ets_threshold: EU_ETS_THRESHOLD,
            csrd_threshold: CSRD_THRESHOLD,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            eu_ets_threshold: env_or("EU_ETS_THRESHOLD", defaults.eu_ets_threshold)?,
            csrd_threshold: env_or("CSRD_THRESHOLD", defaults.csrd_threshold)?,
        };

        for (key, value) in [
            ("EU_ETS_THRESHOLD", config.eu_ets_threshold),
            ("CSRD_THRESHOLD", config.csrd_threshold),
        ] {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "{key} must be a finite, non-negative number"
            );
        }

        Ok(config)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
