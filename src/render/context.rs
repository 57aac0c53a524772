//! Evaluation context assembly.
//!
//! Layers, later wins:
//!
//! ```text
//! test case fields → tokens → helpers → caller overrides
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::Local;
use minijinja::value::Value;
use minijinja::{Error, ErrorKind};

use super::{DiagnosticSink, RenderOptions};
use crate::fixtures::{Message, TestCase};

/// Key/value environment handed to the engine for one render.
#[derive(Debug, Default)]
pub struct RenderContext {
    values: BTreeMap<String, Value>,
}

impl RenderContext {
    pub fn build(
        case: &TestCase,
        tokens: &BTreeMap<String, String>,
        options: &RenderOptions,
        system_prompt: &str,
        sink: &DiagnosticSink,
    ) -> Self {
        let mut values = BTreeMap::new();

        for (key, value) in &case.extra {
            values.insert(key.clone(), json_value(value));
        }

        // Prepend on a copy; the stored case is shared by every render.
        let mut messages = case.messages.clone();
        if options.add_system_prompt == Some(true) {
            messages.insert(0, Message::new("system", system_prompt));
        }
        values.insert(
            "messages".into(),
            messages.iter().map(message_value).collect::<Value>(),
        );

        for (key, value) in tokens {
            values.insert(key.clone(), Value::from(value.as_str()));
        }

        values.insert("raise_exception".into(), sink.clone().into_value());
        values.insert("strftime_now".into(), Value::from_function(strftime_now));

        if let Some(flag) = options.add_generation_prompt {
            values.insert("add_generation_prompt".into(), Value::from(flag));
        }

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::from_iter(self.values)
    }
}

fn message_value(message: &Message) -> Value {
    let mut map: BTreeMap<String, Value> = message
        .extra
        .iter()
        .map(|(key, value)| (key.clone(), json_value(value)))
        .collect();
    map.insert("role".into(), Value::from(message.role.as_str()));
    map.insert("content".into(), Value::from(message.content.as_str()));
    Value::from_iter(map)
}

/// Convert a JSON value field by field.
///
/// Numbers keep their exact textual form in `serde_json`, which does not
/// survive `Value::from_serialize`, so they are narrowed here.
fn json_value(value: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match value {
        Json::Null => Value::from(()),
        Json::Bool(b) => Value::from(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => items.iter().map(json_value).collect(),
        Json::Object(fields) => Value::from_iter(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), json_value(value))),
        ),
    }
}

/// Current local time through a `strftime` format.
fn strftime_now(format: String) -> Result<String, Error> {
    let mut out = String::new();
    write!(out, "{}", Local::now().format(&format)).map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid strftime format `{format}`"),
        )
    })?;
    Ok(out)
}
