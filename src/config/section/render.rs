//! `[render]` section configuration.
//!
//! ```toml
//! [render]
//! strict_undefined = false                  # Any undefined access is an error
//! trim_blocks = false                       # Drop the newline after a block tag
//! lstrip_blocks = false                     # Strip whitespace before a block tag
//! system_prompt = "You are a helpful AI"    # Prepended by `add_system_prompt`
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub strict_undefined: bool,
    pub trim_blocks: bool,
    pub lstrip_blocks: bool,
    pub system_prompt: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            strict_undefined: false,
            trim_blocks: false,
            lstrip_blocks: false,
            system_prompt: "You are a helpful AI".to_string(),
        }
    }
}
