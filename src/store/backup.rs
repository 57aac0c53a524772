use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::StoreError;

/// Which artifact a backup belongs to; decides the file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackupKind {
    /// Template artifact backup (`.bak`)
    Template,
    /// Config document backup (`.orig`)
    Config,
}

impl BackupKind {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Template => "bak",
            Self::Config => "orig",
        }
    }
}

/// Copy `path` to `<name>.<YYYYMMDD_HHMMSS>.<suffix>` next to it.
///
/// A same-second collision gets a `-N` disambiguator before the suffix.
pub fn create_backup(path: &Path, kind: BackupKind) -> Result<PathBuf, StoreError> {
    if !path.is_file() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }

    let target = free_backup_path(path, kind, Local::now());
    std::fs::copy(path, &target).map_err(|source| StoreError::WriteError {
        path: target.clone(),
        source,
    })?;

    crate::debug!("backup"; "{} -> {}", path.display(), target.display());
    Ok(target)
}

fn free_backup_path(path: &Path, kind: BackupKind, at: DateTime<Local>) -> PathBuf {
    let stamp = at.format("%Y%m%d_%H%M%S").to_string();
    let mut candidate = backup_path(path, &stamp, kind);
    let mut n = 1;
    while candidate.exists() {
        candidate = backup_path(path, &format!("{stamp}-{n}"), kind);
        n += 1;
    }
    candidate
}

fn backup_path(path: &Path, stamp: &str, kind: BackupKind) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.{stamp}.{}", kind.suffix()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_backup_name_format() {
        let at = Local.with_ymd_and_hms(2024, 6, 15, 14, 30, 45).unwrap();
        let path = free_backup_path(
            Path::new("/nonexistent/tokenizer_config.json"),
            BackupKind::Config,
            at,
        );
        assert_eq!(
            path,
            PathBuf::from("/nonexistent/tokenizer_config.json.20240615_143045.orig")
        );
    }

    #[test]
    fn test_create_backup_copies_content() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("x_template.jinja");
        std::fs::write(&src, "old").unwrap();

        let backup = create_backup(&src, BackupKind::Template).unwrap();
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "old");
        assert!(backup.to_string_lossy().ends_with(".bak"));
        assert_eq!(backup.parent(), src.parent());
    }

    #[test]
    fn test_same_second_backups_do_not_clobber() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("doc.json");
        std::fs::write(&src, "{}").unwrap();

        let at = Local::now();
        let first = free_backup_path(&src, BackupKind::Config, at);
        std::fs::write(&first, "{}").unwrap();
        let second = free_backup_path(&src, BackupKind::Config, at);

        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("-1.orig"));
    }

    #[test]
    fn test_backup_of_missing_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone.json");
        assert!(matches!(
            create_backup(&missing, BackupKind::Config),
            Err(StoreError::NotFound(_))
        ));
    }
}
