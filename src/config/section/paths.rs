//! `[paths]` section configuration.
//!
//! Relative paths resolve against the directory holding `chatplate.toml`
//! (or the working directory when there is no settings file).
//!
//! ```toml
//! [paths]
//! templates = "templates"      # Template root (extract target, listing, watch)
//! ui = "ui"                    # Static UI assets (served under /static)
//! fixtures = "fixtures.toml"   # Render fixtures definition
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fixtures::FIXTURES_FILE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub templates: PathBuf,
    pub ui: PathBuf,
    pub fixtures: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates: PathBuf::from("templates"),
            ui: PathBuf::from("ui"),
            fixtures: PathBuf::from(FIXTURES_FILE),
        }
    }
}

impl PathsConfig {
    /// Make every path absolute relative to `root`.
    pub(crate) fn normalize(&mut self, root: &Path) {
        for path in [&mut self.templates, &mut self.ui, &mut self.fixtures] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }
}
