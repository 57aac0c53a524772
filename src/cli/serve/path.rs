//! `/static/*` URL to UI-root path resolution.

use std::path::{Path, PathBuf};

/// Resolve a static URL path under `ui_root`. Anything escaping the root,
/// missing, or not a regular file yields `None`.
pub fn resolve_static(url_path: &str, ui_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url_path);

    // Reject paths with suspicious patterns early
    if clean.is_empty() || clean.contains("..") {
        return None;
    }

    // Canonicalize to resolve symlinks and verify the path stays under the root
    let canonical = ui_root.join(&clean).canonicalize().ok()?;
    let root_canonical = ui_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) || !canonical.is_file() {
        return None;
    }
    Some(canonical)
}

/// Normalize URL: decode, strip query string, trim slashes
pub fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let path = url.split('?').next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').to_string()
}
