use std::path::{Path, PathBuf};

use notify::EventKind;
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};

use crate::utils::path::normalize_path;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

/// One path-level change, consumed immediately by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub is_directory: bool,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            kind,
            is_directory,
        }
    }

    /// Split a raw notify event into per-path changes.
    ///
    /// Metadata-only modifications, access events and editor temp files
    /// produce nothing. Renames become a delete of the old path and a create
    /// of the new one.
    pub fn from_notify(event: &notify::Event) -> Vec<Self> {
        let mut changes = Vec::with_capacity(event.paths.len());

        match event.kind {
            EventKind::Create(kind) => {
                let dir = match kind {
                    CreateKind::Folder => Some(true),
                    CreateKind::File => Some(false),
                    _ => None,
                };
                for path in &event.paths {
                    changes.push(Self::probe(path, ChangeKind::Created, dir));
                }
            }
            EventKind::Remove(kind) => {
                let dir = matches!(kind, RemoveKind::Folder);
                for path in &event.paths {
                    changes.push(Self::probe(path, ChangeKind::Deleted, Some(dir)));
                }
            }
            // mtime/atime/chmod noise
            EventKind::Modify(ModifyKind::Metadata(_)) => {}
            EventKind::Modify(ModifyKind::Name(mode)) => {
                for (i, path) in event.paths.iter().enumerate() {
                    let kind = match mode {
                        RenameMode::From => ChangeKind::Deleted,
                        RenameMode::To => ChangeKind::Created,
                        RenameMode::Both if i == 0 => ChangeKind::Deleted,
                        RenameMode::Both => ChangeKind::Created,
                        _ if path.exists() => ChangeKind::Created,
                        _ => ChangeKind::Deleted,
                    };
                    changes.push(Self::probe(path, kind, None));
                }
            }
            EventKind::Modify(_) => {
                for path in &event.paths {
                    changes.push(Self::probe(path, ChangeKind::Modified, None));
                }
            }
            EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
        }

        changes.retain(|c| !is_temp_file(&c.path));
        changes
    }

    /// Normalize the path; ask the filesystem when the event does not say
    /// whether it was a directory.
    fn probe(path: &Path, kind: ChangeKind, is_directory: Option<bool>) -> Self {
        let path = normalize_path(path);
        let is_directory = is_directory.unwrap_or_else(|| path.is_dir());
        Self::new(path, kind, is_directory)
    }
}

/// Check if path is a temp/backup file (editor artifacts, our own backups)
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "orig" | "swp" | "swo" | "swx" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
