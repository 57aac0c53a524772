//! Template and config document stores.
//!
//! Pure file I/O over the two artifacts the sync loop moves text between:
//!
//! ```text
//! templates/llama_template.jinja  <--extract/inject-->  tokenizer_config.json
//!       (TemplateArtifact)                               (ConfigDocument)
//! ```
//!
//! - `template` - template artifacts on the template root
//! - `document` - the JSON config document holding `chat_template`
//! - `backup`   - timestamped one-off copies (`<name>.<stamp>.<suffix>`)
//! - `roundtrip` - extract / inject between the two

mod backup;
mod document;
mod roundtrip;
mod template;


use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use backup::{BackupKind, create_backup};
pub use document::ConfigDocument;
pub use roundtrip::{extract, inject};
pub use template::{TemplateArtifact, TemplateStore};

/// Errors raised by the template and document stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("`{}` does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("`{}` is not a valid JSON document: {reason}", path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("no `{field}` found in `{}`", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("failed to read `{}`", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write `{}`", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Short kind name, used as the prefix of render errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::MalformedDocument { .. } => "MalformedDocument",
            Self::MissingField { .. } => "MissingField",
            Self::ReadError { .. } => "ReadError",
            Self::WriteError { .. } => "WriteError",
        }
    }

    fn write(path: &Path, source: io::Error) -> Self {
        Self::WriteError {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a UTF-8 file, mapping a missing file to `NotFound`.
pub(crate) fn read_text(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
        _ => StoreError::ReadError {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Write a whole file, creating missing parent directories.
pub(crate) fn write_text(path: &Path, content: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::write(path, e))?;
    }
    std::fs::write(path, content).map_err(|e| StoreError::write(path, e))
}
