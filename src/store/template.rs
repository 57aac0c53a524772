use std::path::{Component, Path, PathBuf};

use jwalk::WalkDir;

use super::{StoreError, read_text, write_text};

/// Extension shared by the watcher filter and the template listing.
pub const TEMPLATE_EXT: &str = "jinja";

/// An extracted chat template on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateArtifact {
    pub path: PathBuf,
    pub content: String,
}

impl TemplateArtifact {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read an artifact from disk. Missing file → `NotFound`.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = read_text(path)?;
        Ok(Self::new(path, content))
    }

    /// Write the artifact, replacing any previous content.
    pub fn save(&self) -> Result<(), StoreError> {
        write_text(&self.path, &self.content)
    }
}

/// Template root: where artifacts are listed, resolved and created.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check the template extension.
    pub fn has_template_ext(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXT)
    }

    /// Default extraction target: `<root>/<model_id>_template.jinja`.
    pub fn default_destination(&self, model_id: &str) -> PathBuf {
        let name = sanitize_model_id(model_id);
        self.root.join(format!("{name}_template.{TEMPLATE_EXT}"))
    }

    /// Resolve a root-relative template name (as sent by the client).
    ///
    /// Names that escape the root are reported as `NotFound`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(name);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || name.is_empty() {
            return Err(StoreError::NotFound(self.root.join(rel)));
        }
        Ok(self.root.join(rel))
    }

    /// Root-relative, `/`-separated name of a path under the root.
    pub fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    /// Load an artifact by root-relative name.
    pub fn read(&self, name: &str) -> Result<TemplateArtifact, StoreError> {
        TemplateArtifact::load(&self.resolve(name)?)
    }

    /// All templates under the root, root-relative and sorted.
    pub fn list(&self) -> Vec<String> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        let mut names: Vec<_> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|p| Self::has_template_ext(p))
            .filter_map(|p| self.relative(&p))
            .collect();
        names.sort();
        names
    }
}

/// Keep model ids usable as a single file name component.
fn sanitize_model_id(model_id: &str) -> String {
    let cleaned: String = model_id
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "chat".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_destination() {
        let store = TemplateStore::new("/work/templates");
        assert_eq!(
            store.default_destination("foo"),
            PathBuf::from("/work/templates/foo_template.jinja")
        );
    }

    #[test]
    fn test_default_destination_sanitizes() {
        let store = TemplateStore::new("/t");
        assert_eq!(
            store.default_destination("org/model"),
            PathBuf::from("/t/org_model_template.jinja")
        );
        assert_eq!(
            store.default_destination("  "),
            PathBuf::from("/t/chat_template.jinja")
        );
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let store = TemplateStore::new("/t");
        assert!(store.resolve("a/b.jinja").is_ok());
        assert!(matches!(
            store.resolve("../secret.jinja"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.resolve("/etc/passwd"),
            Err(StoreError::NotFound(_))
        ));
        assert!(store.resolve("").is_err());
    }

    #[test]
    fn test_relative_uses_forward_slashes() {
        let store = TemplateStore::new("/t");
        let path = Path::new("/t").join("nested").join("x.jinja");
        assert_eq!(store.relative(&path).as_deref(), Some("nested/x.jinja"));
        assert_eq!(store.relative(Path::new("/elsewhere/x.jinja")), None);
    }

    #[test]
    fn test_has_template_ext() {
        assert!(TemplateStore::has_template_ext(Path::new("a.jinja")));
        assert!(!TemplateStore::has_template_ext(Path::new("a.jinja.bak")));
        assert!(!TemplateStore::has_template_ext(Path::new("a.json")));
    }
}
