use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use super::{StoreError, read_text, write_text};

/// Field holding the chat template text.
pub const TEMPLATE_FIELD: &str = "chat_template";

/// Field naming the model, used for the default extraction target.
pub const MODEL_ID_FIELD: &str = "model_type";

/// A parsed config document (`tokenizer_config.json`).
///
/// Field order is preserved (`serde_json/preserve_order`), so rewriting the
/// document only touches the template field.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    pub path: PathBuf,
    pub fields: Map<String, Value>,
    /// Whether the source ended with a newline (kept on rewrite).
    trailing_newline: bool,
}

impl ConfigDocument {
    /// Read and parse a document. Must be a JSON object.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = read_text(path)?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, StoreError> {
        let malformed = |reason: String| StoreError::MalformedDocument {
            path: path.to_path_buf(),
            reason,
        };

        let value: Value = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(malformed("top-level value is not an object".into()));
        };

        Ok(Self {
            path: path.to_path_buf(),
            fields,
            trailing_newline: text.ends_with('\n'),
        })
    }

    /// The template text. Absent → `MissingField`; non-string → malformed.
    pub fn template(&self) -> Result<&str, StoreError> {
        match self.fields.get(TEMPLATE_FIELD) {
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(StoreError::MalformedDocument {
                path: self.path.clone(),
                reason: format!("`{TEMPLATE_FIELD}` is not a string"),
            }),
            None => Err(StoreError::MissingField {
                path: self.path.clone(),
                field: TEMPLATE_FIELD,
            }),
        }
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.fields
            .insert(TEMPLATE_FIELD.to_string(), Value::String(template.into()));
    }

    /// Model identifier: the document field, else the parent directory name.
    pub fn model_id(&self) -> String {
        if let Some(Value::String(id)) = self.fields.get(MODEL_ID_FIELD)
            && !id.trim().is_empty()
        {
            return id.clone();
        }

        self.path
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Render as pretty JSON (2-space indent, non-ASCII kept verbatim).
    pub fn to_pretty(&self) -> String {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        // Map<String, Value> serialization cannot fail
        let _ = self.fields.serialize(&mut ser);

        let mut text = String::from_utf8(buf).unwrap_or_default();
        if self.trailing_newline {
            text.push('\n');
        }
        text
    }

    /// Rewrite the whole document in place.
    pub fn save(&self) -> Result<(), StoreError> {
        write_text(&self.path, &self.to_pretty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Result<ConfigDocument, StoreError> {
        ConfigDocument::parse(Path::new("/m/llama-3/tokenizer_config.json"), text)
    }

    #[test]
    fn test_template_field() {
        let d = doc(r#"{"chat_template": "Hi {{ name }}"}"#).unwrap();
        assert_eq!(d.template().unwrap(), "Hi {{ name }}");
    }

    #[test]
    fn test_missing_template_field() {
        let d = doc(r#"{"bos_token": "<s>"}"#).unwrap();
        assert!(matches!(
            d.template(),
            Err(StoreError::MissingField { field: TEMPLATE_FIELD, .. })
        ));
    }

    #[test]
    fn test_non_string_template_is_malformed() {
        let d = doc(r#"{"chat_template": [{"name": "default"}]}"#).unwrap();
        assert!(matches!(
            d.template(),
            Err(StoreError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            doc("{not json"),
            Err(StoreError::MalformedDocument { .. })
        ));
        assert!(matches!(
            doc("[1, 2]"),
            Err(StoreError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn test_model_id_fallback() {
        let d = doc(r#"{"model_type": "foo"}"#).unwrap();
        assert_eq!(d.model_id(), "foo");

        let d = doc(r#"{"chat_template": ""}"#).unwrap();
        assert_eq!(d.model_id(), "llama-3");
    }

    #[test]
    fn test_pretty_preserves_order_and_unicode() {
        let mut d = doc(r#"{"z": 1, "a": "héllo ✓", "chat_template": "x"}"#).unwrap();
        d.set_template("y");
        let out = d.to_pretty();

        assert_eq!(
            out,
            "{\n  \"z\": 1,\n  \"a\": \"héllo ✓\",\n  \"chat_template\": \"y\"\n}"
        );
    }

    #[test]
    fn test_trailing_newline_kept() {
        let d = doc("{\"a\": 1}\n").unwrap();
        assert!(d.to_pretty().ends_with("}\n"));
    }
}
