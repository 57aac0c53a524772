//! HTTP response helpers.

use anyhow::Result;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::utils::mime::types::{JSON, PLAIN};

/// A fully-built response, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::new(200, JSON, body),
            Err(e) => Self::error(500, &e.to_string()),
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status, JSON, body)
    }

    pub fn not_found() -> Self {
        Self::new(404, PLAIN, "404 Not Found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(405, PLAIN, "405 Method Not Allowed")
    }

    /// Server shutting down.
    pub fn unavailable() -> Self {
        Self::new(503, PLAIN, "503 Service Unavailable")
    }
}

/// Write `reply` to the client. HEAD requests get headers only.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let content_type = make_header("Content-Type", reply.content_type);
    let cache = make_header("Cache-Control", "no-store");

    if request.method() == &Method::Head {
        let response = Response::empty(StatusCode(reply.status))
            .with_header(content_type)
            .with_header(cache);
        request.respond(response)?;
        return Ok(());
    }

    let response = Response::from_data(reply.body)
        .with_status_code(StatusCode(reply.status))
        .with_header(content_type)
        .with_header(cache);
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_reply() {
        let reply = Reply::json(&["a.jinja", "b.jinja"]);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, JSON);
        assert_eq!(reply.body, br#"["a.jinja","b.jinja"]"#);
    }

    #[test]
    fn test_error_reply() {
        let reply = Reply::error(400, "bad \"body\"");
        assert_eq!(reply.status, 400);
        let value: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(value["error"], "bad \"body\"");
    }
}
