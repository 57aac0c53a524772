use std::sync::Arc;

use minijinja::value::{Object, ObjectRepr, Value};
use minijinja::{Error, State};
use parking_lot::Mutex;

/// `raise_exception(...)` as seen by the template.
///
/// Each call records a message and evaluation continues; the renderer
/// inspects the sink afterwards. One sink per render.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl DiagnosticSink {
    pub fn record(&self, message: impl Into<String>) {
        self.messages.lock().push(message.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn into_value(self) -> Value {
        Value::from_object(self)
    }
}

impl Object for DiagnosticSink {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn call(self: &Arc<Self>, _state: &State<'_, '_>, args: &[Value]) -> Result<Value, Error> {
        let message = match args {
            [] => "raise_exception called".to_string(),
            [arg] => arg
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| arg.to_string()),
            args => args
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        };
        crate::debug!("render"; "diagnostic: {}", message);
        self.record(message);
        Ok(Value::from(""))
    }
}
