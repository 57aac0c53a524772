use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::{ChangeEvent, ChangeKind};
use crate::core::Session;
use crate::store::TemplateStore;

/// Extensions the editor UI is built from.
const UI_EXTENSIONS: &[&str] = &[
    "html", "htm", "css", "js", "mjs", "json", "svg", "png", "ico", "woff", "woff2",
];

/// Roots the classifier compares event paths against (all normalized).
#[derive(Debug, Clone)]
pub struct WatchLayout {
    pub templates: PathBuf,
    pub ui: PathBuf,
    pub fixtures: PathBuf,
}

impl WatchLayout {
    pub fn from_session(session: &Session) -> Self {
        Self {
            templates: session.templates().root().to_path_buf(),
            ui: session.ui_root().to_path_buf(),
            fixtures: session.fixtures_path().to_path_buf(),
        }
    }
}

/// Domain category of one change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Template {
        path: PathBuf,
        /// Root-relative, `/`-separated
        name: String,
        kind: ChangeKind,
    },
    UiChanged,
    FixturesChanged,
}

impl Category {
    pub fn label(&self) -> String {
        match self {
            Self::Template { kind, .. } => format!("template:{}", kind.label()),
            Self::UiChanged => "ui:changed".into(),
            Self::FixturesChanged => "fixtures:changed".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("event path is not absolute: {}", .0.display())]
    RelativePath(PathBuf),

    #[error("template path is not valid UTF-8: {}", .0.display())]
    NonUtf8(PathBuf),
}

/// Classify one change; `Ok(None)` means "not ours, ignore".
///
/// Order matters: directories first, then templates, UI assets, fixtures.
pub fn classify(
    event: &ChangeEvent,
    layout: &WatchLayout,
) -> Result<Option<Category>, ClassifyError> {
    if event.is_directory {
        return Ok(None);
    }

    let path = &event.path;
    if !path.is_absolute() {
        return Err(ClassifyError::RelativePath(path.clone()));
    }

    if path.starts_with(&layout.templates) && TemplateStore::has_template_ext(path) {
        let name = relative_name(path, &layout.templates)
            .ok_or_else(|| ClassifyError::NonUtf8(path.clone()))?;
        return Ok(Some(Category::Template {
            path: path.clone(),
            name,
            kind: event.kind,
        }));
    }

    if path.starts_with(&layout.ui) && has_ui_ext(path) {
        return Ok(Some(Category::UiChanged));
    }

    if *path == layout.fixtures {
        return Ok(Some(Category::FixturesChanged));
    }

    Ok(None)
}

fn has_ui_ext(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| UI_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn relative_name(path: &Path, root: &Path) -> Option<String> {
    TemplateStore::new(root).relative(path)
}
