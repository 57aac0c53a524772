//! Extract and inject: moving template text between the two stores.
//!
//! `inject(extract(doc), doc)` leaves the template field unchanged when the
//! artifact was not edited in between.

use std::path::{Path, PathBuf};

use super::{BackupKind, ConfigDocument, StoreError, TemplateArtifact, TemplateStore, create_backup};

/// Result of [`extract`].
#[derive(Debug, Clone)]
pub struct Extracted {
    pub artifact: TemplateArtifact,
    /// Backup of the previous destination content, if one was made.
    pub backup: Option<PathBuf>,
}

/// Write the document's template field to a template artifact.
///
/// Without `output` the artifact lands at the store's default destination.
/// An existing destination is backed up first unless `force` is set.
pub fn extract(
    config_path: &Path,
    output: Option<&Path>,
    force: bool,
    store: &TemplateStore,
) -> Result<Extracted, StoreError> {
    let doc = ConfigDocument::load(config_path)?;
    let template = doc.template()?;

    let destination = match output {
        Some(path) => path.to_path_buf(),
        None => store.default_destination(&doc.model_id()),
    };

    let backup = if destination.is_file() && !force {
        Some(create_backup(&destination, BackupKind::Template)?)
    } else {
        None
    };

    let artifact = TemplateArtifact::new(destination, template);
    artifact.save()?;

    crate::debug!("extract"; "{} -> {}", config_path.display(), artifact.path.display());
    Ok(Extracted { artifact, backup })
}

/// Write a template artifact's content into the document's template field.
///
/// Every other field keeps its value and position.
pub fn inject(template_path: &Path, config_path: &Path) -> Result<(), StoreError> {
    let artifact = TemplateArtifact::load(template_path)?;
    let mut doc = ConfigDocument::load(config_path)?;
    doc.set_template(artifact.content);
    doc.save()?;

    crate::debug!("inject"; "{} -> {}", template_path.display(), config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn backups_in(dir: &Path, suffix: &str) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(suffix))
            .count()
    }

    #[test]
    fn test_extract_to_default_destination() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("tokenizer_config.json");
        fs::write(&config, r#"{"chat_template": "Hi {{ name }}", "model_type": "foo"}"#).unwrap();
        let store = TemplateStore::new(temp.path().join("templates"));

        let extracted = extract(&config, None, false, &store).unwrap();

        let expected = temp.path().join("templates/foo_template.jinja");
        assert_eq!(extracted.artifact.path, expected);
        assert_eq!(fs::read_to_string(&expected).unwrap(), "Hi {{ name }}");
        assert!(extracted.backup.is_none());
        assert_eq!(backups_in(&temp.path().join("templates"), ".bak"), 0);
    }

    #[test]
    fn test_extract_model_id_falls_back_to_parent_dir() {
        let temp = TempDir::new().unwrap();
        let model_dir = temp.path().join("Llama-3");
        fs::create_dir_all(&model_dir).unwrap();
        let config = model_dir.join("tokenizer_config.json");
        fs::write(&config, r#"{"chat_template": "x"}"#).unwrap();
        let store = TemplateStore::new(temp.path().join("templates"));

        let extracted = extract(&config, None, false, &store).unwrap();
        assert!(extracted.artifact.path.ends_with("Llama-3_template.jinja"));
    }

    #[test]
    fn test_extract_backs_up_existing_destination() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("c.json");
        fs::write(&config, r#"{"chat_template": "new"}"#).unwrap();
        let out = temp.path().join("out.jinja");
        fs::write(&out, "old").unwrap();
        let store = TemplateStore::new(temp.path());

        let extracted = extract(&config, Some(&out), false, &store).unwrap();
        let backup = extracted.backup.unwrap();
        assert_eq!(fs::read_to_string(backup).unwrap(), "old");
        assert_eq!(fs::read_to_string(&out).unwrap(), "new");
    }

    #[test]
    fn test_extract_force_skips_backup() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("c.json");
        fs::write(&config, r#"{"chat_template": "new"}"#).unwrap();
        let out = temp.path().join("out.jinja");
        fs::write(&out, "old").unwrap();

        let extracted = extract(&config, Some(&out), true, &TemplateStore::new(temp.path())).unwrap();
        assert!(extracted.backup.is_none());
        assert_eq!(backups_in(temp.path(), ".bak"), 0);
    }

    #[test]
    fn test_extract_errors() {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path());

        let missing_field = temp.path().join("a.json");
        fs::write(&missing_field, r#"{"model_type": "foo"}"#).unwrap();
        assert!(matches!(
            extract(&missing_field, None, false, &store),
            Err(StoreError::MissingField { .. })
        ));

        let malformed = temp.path().join("b.json");
        fs::write(&malformed, "{ not json").unwrap();
        assert!(matches!(
            extract(&malformed, None, false, &store),
            Err(StoreError::MalformedDocument { .. })
        ));

        assert!(matches!(
            extract(&temp.path().join("none.json"), None, false, &store),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_roundtrip_keeps_template_field() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("tokenizer_config.json");
        let original = r#"{
  "add_bos_token": true,
  "chat_template": "{% for m in messages %}{{ m['content'] }}\n{% endfor %}",
  "model_type": "qwen",
  "eos_token": "<|im_end|>"
}
"#;
        fs::write(&config, original).unwrap();
        let store = TemplateStore::new(temp.path().join("templates"));

        let extracted = extract(&config, None, false, &store).unwrap();
        inject(&extracted.artifact.path, &config).unwrap();

        let after = ConfigDocument::load(&config).unwrap();
        let before = ConfigDocument::parse(&config, original).unwrap();
        assert_eq!(after.template().unwrap(), before.template().unwrap());
        assert_eq!(fs::read_to_string(&config).unwrap(), original);
    }

    #[test]
    fn test_inject_preserves_other_fields_and_unicode() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("c.json");
        fs::write(&config, r#"{"b": 1, "chat_template": "old", "a": "ünïcode"}"#).unwrap();
        let template = temp.path().join("t.jinja");
        fs::write(&template, "{{ '你好' }}").unwrap();

        inject(&template, &config).unwrap();

        let text = fs::read_to_string(&config).unwrap();
        assert!(text.contains("ünïcode"));
        assert!(text.contains("你好"));
        let doc = ConfigDocument::load(&config).unwrap();
        let keys: Vec<_> = doc.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "chat_template", "a"]);
    }

    #[test]
    fn test_inject_keeps_number_literals() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("tokenizer_config.json");
        let original = r#"{
  "chat_template": "x",
  "model_max_length": 1000000000000000019884624838656,
  "eps": 1e-05,
  "vocab_size": 32000
}
"#;
        fs::write(&config, original).unwrap();
        let store = TemplateStore::new(temp.path().join("templates"));

        let extracted = extract(&config, None, false, &store).unwrap();
        inject(&extracted.artifact.path, &config).unwrap();

        assert_eq!(fs::read_to_string(&config).unwrap(), original);
    }

    #[test]
    fn test_inject_errors() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("c.json");
        fs::write(&config, "[1, 2]").unwrap();
        let template = temp.path().join("t.jinja");

        assert!(matches!(inject(&template, &config), Err(StoreError::NotFound(_))));

        fs::write(&template, "x").unwrap();
        assert!(matches!(
            inject(&template, &config),
            Err(StoreError::MalformedDocument { .. })
        ));
    }
}
