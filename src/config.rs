use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::recommender::{RecommenderSettings, DEFAULT_BROWSE_ALPHA, DEFAULT_RESULT_LIMIT, DEFAULT_SEARCH_ALPHA};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration. Built from defaults with environment overrides;
/// command-line flags are applied on top by the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source_url: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub fallback_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub result_limit: usize,
    pub search_alpha: f64,
    pub browse_alpha: f64,
    pub proximity_prefilter: bool,
    pub session_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: None,
            catalog_path: None,
            fallback_path: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            result_limit: DEFAULT_RESULT_LIMIT,
            search_alpha: DEFAULT_SEARCH_ALPHA,
            browse_alpha: DEFAULT_BROWSE_ALPHA,
            proximity_prefilter: false,
            session_path: None,
        }
    }
}

impl Config {
    /// Reads `CAIPU_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable lookup.
    /// Unparseable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        config.source_url = get("CAIPU_SOURCE_URL");
        config.catalog_path = get("CAIPU_CATALOG_PATH").map(PathBuf::from);
        config.fallback_path = get("CAIPU_FALLBACK_PATH").map(PathBuf::from);
        config.session_path = get("CAIPU_SESSION_PATH").map(PathBuf::from);

        if let Some(secs) = get("CAIPU_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.request_timeout_secs = secs;
        }
        if let Some(limit) = get("CAIPU_RESULT_LIMIT").and_then(|v| v.parse().ok()) {
            config.result_limit = limit;
        }
        if let Some(alpha) = get("CAIPU_SEARCH_ALPHA").and_then(|v| v.parse::<f64>().ok()) {
            config.search_alpha = alpha;
        }
        if let Some(alpha) = get("CAIPU_BROWSE_ALPHA").and_then(|v| v.parse::<f64>().ok()) {
            config.browse_alpha = alpha;
        }
        if let Some(flag) = get("CAIPU_PROXIMITY_PREFILTER") {
            config.proximity_prefilter = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        config.clamp_alphas();
        config
    }

    fn clamp_alphas(&mut self) {
        self.search_alpha = unit(self.search_alpha, DEFAULT_SEARCH_ALPHA);
        self.browse_alpha = unit(self.browse_alpha, DEFAULT_BROWSE_ALPHA);
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn recommender_settings(&self) -> RecommenderSettings {
        RecommenderSettings {
            limit: self.result_limit,
            search_alpha: unit(self.search_alpha, DEFAULT_SEARCH_ALPHA),
            browse_alpha: unit(self.browse_alpha, DEFAULT_BROWSE_ALPHA),
            proximity_prefilter: self.proximity_prefilter,
        }
    }
}

fn unit(value: f64, default: f64) -> f64 {
    if value.is_nan() {
        default
    } else {
        value.clamp(0.0, 1.0)
    }
}
