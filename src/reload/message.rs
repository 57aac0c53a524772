//! Live Notification Protocol
//!
//! JSON messages exchanged with the editor over WebSocket. Every message is
//! an object tagged by `type`.
//!
//! # Server → client
//!
//! - `connected`: handshake, carries the server version
//! - `template_changed`: a template file was modified (`path` is root-relative)
//! - `template_list_changed`: templates were created or deleted
//! - `ui_changed`: static UI assets changed
//! - `test_data_changed`: the fixtures file was reloaded
//! - `render_update`: outcome of a render request
//!
//! # Client → server
//!
//! - `request_render`: same fields as `POST /api/render`

use serde::{Deserialize, Serialize};

use crate::render::{RenderOutcome, RenderRequest};

/// Push notification sent over WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// A template file was modified
    TemplateChanged {
        /// Root-relative, `/`-separated
        path: String,
    },

    /// The set of available templates changed; re-query the list
    TemplateListChanged,

    /// UI assets changed; reload them
    UiChanged,

    /// Fixtures were reloaded; re-query test cases and tokens
    TestDataChanged,

    /// Render result (exactly one of `content`/`error` is set)
    RenderUpdate {
        content: Option<String>,
        error: Option<String>,
    },
}

impl Notification {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn template_changed(path: impl Into<String>) -> Self {
        Self::TemplateChanged { path: path.into() }
    }

    /// Short event name, as serialized in `type`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::TemplateChanged { .. } => "template_changed",
            Self::TemplateListChanged => "template_list_changed",
            Self::UiChanged => "ui_changed",
            Self::TestDataChanged => "test_data_changed",
            Self::RenderUpdate { .. } => "render_update",
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!(r#"{{"type":"{}"}}"#, self.label()))
    }
}

impl From<RenderOutcome> for Notification {
    fn from(outcome: RenderOutcome) -> Self {
        Self::RenderUpdate {
            content: outcome.content,
            error: outcome.error,
        }
    }
}

/// Message sent by the editor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    RequestRender(RenderRequest),
}

impl ClientMessage {
    /// Parse from JSON string; unknown or malformed messages yield `None`
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
