use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Upper bound applied to server TTLs, in seconds.
    #[serde(default = "default_ttl_ceiling_secs")]
    pub ttl_ceiling_secs: u32,

    /// Serve an expired entry when the network resolution fails.
    #[serde(default)]
    pub serve_stale: bool,

    #[serde(default = "default_stale_window_secs")]
    pub stale_window_secs: u32,

    /// Period of the background sweep. 0 disables it.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl CacheConfig {
    /// How long an expired entry is kept around before eviction.
    pub fn retention_secs(&self) -> u32 {
        if self.serve_stale {
            self.stale_window_secs
        } else {
            0
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ceiling_secs: default_ttl_ceiling_secs(),
            serve_stale: false,
            stale_window_secs: default_stale_window_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl_ceiling_secs() -> u32 {
    3600
}

fn default_stale_window_secs() -> u32 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_entries() -> usize {
    10_000
}
