//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Fallback editor page used when the UI root has no `index.html`
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{INDEX_HTML, IndexVars};
//!
//! let html = INDEX_HTML.render(&IndexVars { ws_port: 5001 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Placeholder replaced by the live WebSocket port.
    pub const WS_PORT_PLACEHOLDER: &str = "__WS_PORT__";

    /// Variables for index.html (both embedded and on-disk).
    pub struct IndexVars {
        pub ws_port: u16,
    }

    impl TemplateVars for IndexVars {
        fn apply(&self, content: &str) -> String {
            content.replace(WS_PORT_PLACEHOLDER, &self.ws_port.to_string())
        }
    }

    /// Minimal editor page: template list, test case picker, live output.
    pub const INDEX_HTML: Template<IndexVars> = Template::new(include_str!("serve/index.html"));
}

#[cfg(test)]
mod tests {
    use super::serve::{INDEX_HTML, IndexVars, WS_PORT_PLACEHOLDER};
    use super::TemplateVars;

    #[test]
    fn test_index_port_substituted() {
        let html = INDEX_HTML.render(&IndexVars { ws_port: 5123 });
        assert!(html.contains("5123"));
        assert!(!html.contains(WS_PORT_PLACEHOLDER));
        assert!(INDEX_HTML.content().contains(WS_PORT_PLACEHOLDER));
    }

    #[test]
    fn test_vars_apply_to_disk_pages() {
        let page = "<script>const port = __WS_PORT__;</script>";
        let out = IndexVars { ws_port: 9 }.apply(page);
        assert_eq!(out, "<script>const port = 9;</script>");
    }
}
