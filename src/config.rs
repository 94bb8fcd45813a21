use std::path::PathBuf;

use crate::fetch::FetchStrategy;

/// Default record lifetime: one day.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Default ceiling on aggregate cache size.
pub const DEFAULT_CACHE_MAX_BYTES: u64 = 64 * 1024 * 1024;

/// Pause the bulk file loop after this many fetches.
pub const DEFAULT_PACING_EVERY: usize = 10;

/// Length of each pacing pause.
pub const DEFAULT_PACING_DELAY_MS: u64 = 100;

/// Runtime knobs for one analyzer instance.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub strategy: FetchStrategy,
    /// Cache directory; `None` selects the default location (or the
    /// `CARTOGRAPH_CACHE_DIR` override).
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub cache_max_bytes: u64,
    pub pacing_every: usize,
    pub pacing_delay_ms: u64,
    /// Token for the authenticated GitHub fallback; read from
    /// `GITHUB_TOKEN` when unset.
    pub github_token: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::Api,
            cache_dir: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_max_bytes: DEFAULT_CACHE_MAX_BYTES,
            pacing_every: DEFAULT_PACING_EVERY,
            pacing_delay_ms: DEFAULT_PACING_DELAY_MS,
            github_token: None,
        }
    }
}

impl AnalyzerConfig {
    /// Fills unset fields from the environment (`.env` files are loaded by
    /// the binary before this runs).
    pub fn with_env(mut self) -> Self {
        if self.cache_dir.is_none() {
            self.cache_dir = std::env::var_os("CARTOGRAPH_CACHE_DIR").map(PathBuf::from);
        }
        if self.github_token.is_none() {
            self.github_token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        }
        self
    }

    /// Directory the cache store should use.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("cartograph_cache"))
    }
}
