//! `extract` and `inject` commands.

use std::path::Path;

use anyhow::Result;

use crate::config::StudioConfig;
use crate::log;
use crate::store::{TemplateStore, extract, inject};
use crate::utils::path::normalize_path;

/// Extract the template field into a template file.
pub fn run_extract(
    config: &StudioConfig,
    config_path: &Path,
    output: Option<&Path>,
    force: bool,
) -> Result<()> {
    let store = TemplateStore::new(&config.paths.templates);
    let extracted = extract(&normalize_path(config_path), output, force, &store)?;

    if let Some(backup) = &extracted.backup {
        log!("extract"; "previous template backed up to {}", backup.display());
    }
    log!("extract"; "Template extracted to {}", extracted.artifact.path.display());
    Ok(())
}

/// Write a template file back into the config document.
pub fn run_inject(template_path: &Path, config_path: &Path) -> Result<()> {
    inject(template_path, config_path)?;
    log!("inject"; "Template injected into {}", config_path.display());
    Ok(())
}
