//! Process-wide mutable bindings, owned by one explicit object.
//!
//! ```text
//!                 ┌──────────── Arc<Session> ────────────┐
//! FsActor ───────>│ active binding    (RwLock)           │
//! SyncActor ─────>│ backup ledger     (Mutex<FxHashSet>) │
//! HTTP / WS ─────>│ fixtures          (ArcSwap)          │
//!                 └──────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::StudioConfig;
use crate::fixtures::{FixtureError, Fixtures};
use crate::render::{RenderOutcome, RenderRequest, Renderer};
use crate::store::{BackupKind, StoreError, TemplateStore, create_backup};
use crate::utils::path::normalize_path;

/// The template currently bound to a config document for live sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTemplate {
    #[serde(rename = "path")]
    pub template: PathBuf,
    pub config: PathBuf,
}

/// Shared state of one serve run.
pub struct Session {
    config: Arc<StudioConfig>,
    templates: TemplateStore,
    ui_root: PathBuf,
    fixtures_path: PathBuf,
    active: RwLock<Option<ActiveTemplate>>,
    backed_up: Mutex<FxHashSet<PathBuf>>,
    fixtures: ArcSwap<Fixtures>,
}

impl Session {
    /// Build a session, loading fixtures from the configured file.
    ///
    /// Roots are normalized so they compare equal to watcher event paths.
    pub fn new(config: Arc<StudioConfig>) -> Result<Self, FixtureError> {
        let fixtures_path = normalize_path(&config.paths.fixtures);
        let fixtures = Fixtures::load_or_builtin(&fixtures_path)?;
        Ok(Self::with_fixtures(config, fixtures))
    }

    pub fn with_fixtures(config: Arc<StudioConfig>, fixtures: Fixtures) -> Self {
        Self {
            templates: TemplateStore::new(normalize_path(&config.paths.templates)),
            ui_root: normalize_path(&config.paths.ui),
            fixtures_path: normalize_path(&config.paths.fixtures),
            active: RwLock::new(None),
            backed_up: Mutex::new(FxHashSet::default()),
            fixtures: ArcSwap::from_pointee(fixtures),
            config,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn ui_root(&self) -> &Path {
        &self.ui_root
    }

    pub fn fixtures_path(&self) -> &Path {
        &self.fixtures_path
    }

    // =========================================================================
    // Active binding
    // =========================================================================

    /// Bind `template` as the artifact synced into `config`.
    pub fn bind_active(&self, template: &Path, config: &Path) {
        let binding = ActiveTemplate {
            template: normalize_path(template),
            config: normalize_path(config),
        };
        crate::debug!("session"; "active template: {}", binding.template.display());
        *self.active.write() = Some(binding);
    }

    pub fn active(&self) -> Option<ActiveTemplate> {
        self.active.read().clone()
    }

    /// The active binding, failing if nothing is bound or the artifact is gone.
    pub fn require_active(&self) -> Result<ActiveTemplate, StoreError> {
        let Some(active) = self.active() else {
            return Err(StoreError::NotFound(self.templates.root().to_path_buf()));
        };
        if !active.template.is_file() {
            return Err(StoreError::NotFound(active.template));
        }
        Ok(active)
    }

    pub fn is_active_template(&self, path: &Path) -> bool {
        self.active
            .read()
            .as_ref()
            .is_some_and(|a| a.template == path)
    }

    pub fn clear_active(&self) {
        *self.active.write() = None;
    }

    /// Active template first, then the rest of the listing.
    pub fn list_templates(&self) -> Vec<String> {
        let mut names = self.templates.list();
        let active = self
            .active()
            .and_then(|a| self.templates.relative(&a.template));
        if let Some(active) = active
            && let Some(pos) = names.iter().position(|n| *n == active)
        {
            let name = names.remove(pos);
            names.insert(0, name);
        }
        names
    }

    // =========================================================================
    // Backups
    // =========================================================================

    /// Back `target` up unless this session already did.
    ///
    /// Returns the new backup path, or `None` when one already exists. The
    /// ledger entry is only recorded once the copy succeeded.
    pub fn backup_once(
        &self,
        target: &Path,
        kind: BackupKind,
    ) -> Result<Option<PathBuf>, StoreError> {
        let key = normalize_path(target);
        let mut ledger = self.backed_up.lock();
        if ledger.contains(&key) {
            return Ok(None);
        }
        let backup = create_backup(target, kind)?;
        ledger.insert(key);
        Ok(Some(backup))
    }

    // =========================================================================
    // Render / fixtures
    // =========================================================================

    /// Render against the current fixture snapshot.
    pub fn render(&self, request: &RenderRequest) -> RenderOutcome {
        let fixtures = self.fixtures();
        Renderer::new(&self.templates, &fixtures, &self.config.render).render(request)
    }

    pub fn fixtures(&self) -> Arc<Fixtures> {
        self.fixtures.load_full()
    }

    /// Re-read the fixtures file. On failure the previous set stays in place.
    pub fn reload_fixtures(&self) -> Result<usize, FixtureError> {
        let fixtures = Fixtures::load_or_builtin(&self.fixtures_path)?;
        let count = fixtures.len();
        self.fixtures.store(Arc::new(fixtures));
        Ok(count)
    }
}

#[cfg(test)]
pub(crate) fn test_session(root: &Path) -> Session {
    let mut config = StudioConfig::default();
    config.paths.normalize(root);
    std::fs::create_dir_all(&config.paths.templates).unwrap();
    Session::with_fixtures(Arc::new(config), Fixtures::builtin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_bind_and_require_active() {
        let temp = TempDir::new().unwrap();
        let session = test_session(temp.path());
        assert!(session.active().is_none());
        assert!(matches!(session.require_active(), Err(StoreError::NotFound(_))));

        let template = session.templates().root().join("a_template.jinja");
        fs::write(&template, "x").unwrap();
        let config = temp.path().join("tokenizer_config.json");
        session.bind_active(&template, &config);

        let active = session.require_active().unwrap();
        assert_eq!(active.template, normalize_path(&template));
        assert!(session.is_active_template(&normalize_path(&template)));
    }

    #[test]
    fn test_stale_binding_fails_explicitly() {
        let temp = TempDir::new().unwrap();
        let session = test_session(temp.path());
        let template = session.templates().root().join("gone.jinja");
        fs::write(&template, "x").unwrap();
        session.bind_active(&template, &temp.path().join("c.json"));

        fs::remove_file(&template).unwrap();
        assert!(session.active().is_some());
        assert!(matches!(
            session.require_active(),
            Err(StoreError::NotFound(path)) if path.ends_with("gone.jinja")
        ));

        session.clear_active();
        assert!(session.active().is_none());
    }

    #[test]
    fn test_backup_once() {
        let temp = TempDir::new().unwrap();
        let session = test_session(temp.path());
        let doc = temp.path().join("tokenizer_config.json");
        fs::write(&doc, "{}").unwrap();

        let first = session.backup_once(&doc, BackupKind::Config).unwrap();
        let second = session.backup_once(&doc, BackupKind::Config).unwrap();
        assert!(first.is_some());
        assert!(second.is_none());

        let backups = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".orig"))
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_failed_backup_not_recorded() {
        let temp = TempDir::new().unwrap();
        let session = test_session(temp.path());
        let doc = temp.path().join("late.json");

        assert!(session.backup_once(&doc, BackupKind::Config).is_err());
        fs::write(&doc, "{}").unwrap();
        assert!(session.backup_once(&doc, BackupKind::Config).unwrap().is_some());
    }

    #[test]
    fn test_list_templates_active_first() {
        let temp = TempDir::new().unwrap();
        let session = test_session(temp.path());
        let root = session.templates().root().to_path_buf();
        for name in ["a.jinja", "m.jinja", "z.jinja"] {
            fs::write(root.join(name), "").unwrap();
        }
        session.bind_active(&root.join("m.jinja"), &temp.path().join("c.json"));

        assert_eq!(session.list_templates(), ["m.jinja", "a.jinja", "z.jinja"]);
    }

    #[test]
    fn test_render_uses_session_templates() {
        let temp = TempDir::new().unwrap();
        let session = test_session(temp.path());
        fs::write(session.templates().root().join("t.jinja"), "{{ bos_token }}").unwrap();

        let outcome = session.render(&RenderRequest::new("t.jinja", "basic"));
        assert_eq!(outcome.content.as_deref(), Some("BOS_"));
    }

    #[test]
    fn test_reload_fixtures_swaps_and_keeps_on_error() {
        let temp = TempDir::new().unwrap();
        let session = test_session(temp.path());
        assert_eq!(session.fixtures().len(), 12);

        let path = session.fixtures_path().to_path_buf();
        fs::write(&path, "[[cases]]\nname = \"only\"\n").unwrap();
        assert_eq!(session.reload_fixtures().unwrap(), 1);
        assert_eq!(session.fixtures().names(), ["only"]);

        fs::write(&path, "[[cases]\n").unwrap();
        assert!(session.reload_fixtures().is_err());
        assert_eq!(session.fixtures().names(), ["only"]);
    }
}
