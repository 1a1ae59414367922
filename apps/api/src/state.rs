use crate::compliance::regimes::{default_regimes, Regime};
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds configuration only; datasets travel with each request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Regimes evaluated in compliance reports, built from the configured thresholds.
    pub regimes: Vec<Regime>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let regimes = default_regimes(config.eu_ets_threshold, config.csrd_threshold);
        Self { config, regimes }
    }
}
