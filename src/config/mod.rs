//! Settings management for `chatplate.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Settings section definitions
//! │   ├── paths      # [paths]
//! │   ├── serve      # [serve]
//! │   ├── sync       # [sync]
//! │   └── render     # [render]
//! ├── types/         # ConfigError
//! └── mod.rs         # StudioConfig (this file)
//! ```
//!
//! The settings file is optional: without one every section takes its
//! defaults and paths resolve against the working directory.
//!
//! # Sections
//!
//! | Section     | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | `[paths]`   | Template root, UI asset root, fixtures file     |
//! | `[serve]`   | Live server (interface, ports, watch)           |
//! | `[sync]`    | Debounced template → config sync                |
//! | `[render]`  | Engine strictness, injected system prompt       |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{PathsConfig, RenderConfig, ServeConfig, SyncConfig};
pub use types::ConfigError;

use crate::{
    cli::{Cli, Commands, ServeArgs},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing chatplate.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Template root, UI root and fixtures file
    #[serde(default)]
    pub paths: PathsConfig,

    /// Live server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Debounced sync settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Render pipeline settings
    #[serde(default)]
    pub render: RenderConfig,
}

impl StudioConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the settings file. A missing file is not
    /// an error; defaults are used and the cwd becomes the root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, root) = match find_config_file(&cli.config) {
            Some(path) => {
                let config = Self::from_path(&path)?;
                let root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                crate::debug!("config"; "using {}", path.display());
                (config, root)
            }
            None => (Self::default(), cwd),
        };

        config.finalize(&root, cli);
        config.validate()?;
        Ok(config)
    }

    /// Resolve paths and apply command options.
    fn finalize(&mut self, root: &Path, cli: &Cli) {
        self.paths.normalize(root);

        if let Commands::Serve { serve_args } = &cli.command {
            self.apply_serve_args(serve_args);
        }
    }

    /// Apply serve arguments from CLI.
    fn apply_serve_args(&mut self, args: &ServeArgs) {
        Self::update_option(&mut self.serve.interface, args.interface.as_ref());
        Self::update_option(&mut self.serve.port, args.port.as_ref());
        Self::update_option(&mut self.serve.ws_port, args.ws_port.as_ref());
        if args.no_watch {
            self.serve.watch = false;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "[sync] debounce_ms must be greater than 0".into(),
            ));
        }
        if self.serve.port == self.serve.ws_port {
            return Err(ConfigError::Validation(format!(
                "[serve] port and ws_port must differ (both {})",
                self.serve.port
            )));
        }
        Ok(())
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }
}

/// Parse a settings snippet, asserting it has no unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> StudioConfig {
    let (parsed, ignored) = StudioConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
