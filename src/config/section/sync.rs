//! `[sync]` section configuration.
//!
//! ```toml
//! [sync]
//! debounce_ms = 1000   # Quiet period before a template edit is injected
//! backup = true        # Back up the config document once before the first sync
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub debounce_ms: u64,
    pub backup: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            backup: true,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::test_parse_config;

    #[test]
    fn test_sync_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.sync.debounce(), Duration::from_secs(1));
        assert!(config.sync.backup);
    }

    #[test]
    fn test_sync_override() {
        let config = test_parse_config("[sync]\ndebounce_ms = 250\nbackup = false");
        assert_eq!(config.sync.debounce(), Duration::from_millis(250));
        assert!(!config.sync.backup);
    }
}
