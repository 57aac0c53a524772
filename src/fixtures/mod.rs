//! Render fixtures: named example conversations plus token bindings.
//!
//! Loaded from `fixtures.toml` (see `default.toml` for the format). When the
//! file does not exist the embedded default set is used. The whole set is
//! replaced on reload; see [`crate::core::Session::reload_fixtures`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Embedded fixture set, used when no fixtures file exists.
const DEFAULT_FIXTURES: &str = include_str!("default.toml");

/// Well-known fixtures definition file name.
pub const FIXTURES_FILE: &str = "fixtures.toml";

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixtures `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixtures `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate test case `{0}`")]
    DuplicateCase(String),
}

/// One conversation turn. Keys other than `role`/`content` are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            extra: Map::new(),
        }
    }
}

/// A named render input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Extra top-level keys (e.g. `tools_json`), merged into the context.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FixturesFile {
    #[serde(default)]
    tokens: BTreeMap<String, String>,
    #[serde(default)]
    cases: Vec<TestCase>,
}

/// Immutable fixture set. Case order follows the definition file.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    cases: Vec<TestCase>,
    tokens: BTreeMap<String, String>,
}

impl Fixtures {
    /// Parse fixture definitions. `origin` is only used for error reporting.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, FixtureError> {
        let file: FixturesFile = toml::from_str(text).map_err(|source| FixtureError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        let mut seen = rustc_hash::FxHashSet::default();
        for case in &file.cases {
            if !seen.insert(case.name.as_str()) {
                return Err(FixtureError::DuplicateCase(case.name.clone()));
            }
        }

        Ok(Self {
            cases: file.cases,
            tokens: file.tokens,
        })
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Load `path` if it exists, otherwise fall back to the embedded set.
    pub fn load_or_builtin(path: &Path) -> Result<Self, FixtureError> {
        if path.is_file() {
            Self::load(path)
        } else {
            crate::debug!("fixtures"; "{} not found, using built-in cases", path.display());
            Ok(Self::builtin())
        }
    }

    pub fn builtin() -> Self {
        Self::parse(DEFAULT_FIXTURES, Path::new("<builtin>"))
            .expect("embedded default fixtures must be valid")
    }

    pub fn get(&self, name: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.cases.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn tokens(&self) -> &BTreeMap<String, String> {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
