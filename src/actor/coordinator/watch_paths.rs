use std::path::PathBuf;

use notify::RecursiveMode;

use crate::core::Session;

/// Template and UI roots recursively; the fixtures file through its parent
/// directory, non-recursively.
pub(super) fn collect_watch_paths(session: &Session) -> Vec<(PathBuf, RecursiveMode)> {
    let mut paths = vec![
        (session.templates().root().to_path_buf(), RecursiveMode::Recursive),
        (session.ui_root().to_path_buf(), RecursiveMode::Recursive),
    ];

    if let Some(parent) = session.fixtures_path().parent() {
        paths.push((parent.to_path_buf(), RecursiveMode::NonRecursive));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_session;
    use tempfile::TempDir;

    #[test]
    fn test_collects_three_roots() {
        let temp = TempDir::new().unwrap();
        let session = test_session(temp.path());
        let paths = collect_watch_paths(&session);

        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0].0, session.templates().root());
        assert_eq!(paths[0].1, RecursiveMode::Recursive);
        assert_eq!(paths[1].0, session.ui_root());
        assert_eq!(paths[2].1, RecursiveMode::NonRecursive);
        assert!(session.fixtures_path().starts_with(&paths[2].0));
    }
}
