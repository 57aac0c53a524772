//! Query and render routes.
//!
//! | Method | Path                   | Reply                              |
//! |--------|------------------------|------------------------------------|
//! | GET    | `/`                    | editor page                        |
//! | GET    | `/static/<path>`       | file under the UI root             |
//! | GET    | `/api/files`           | template names, active first       |
//! | GET    | `/api/test-cases`      | case names in file order           |
//! | GET    | `/api/tokens`          | token map                          |
//! | GET    | `/api/active-template` | `{path, config}` or `null`         |
//! | POST   | `/api/render`          | `RenderOutcome`, also pushed to WS |

use std::fs;
use std::sync::Arc;

use tiny_http::Method;
use tokio::sync::mpsc;

use super::path::{normalize_url, resolve_static};
use super::response::Reply;
use crate::actor::messages::WsMsg;
use crate::core::Session;
use crate::embed::TemplateVars;
use crate::embed::serve::{INDEX_HTML, IndexVars};
use crate::reload::message::Notification;
use crate::render::RenderRequest;
use crate::utils::mime;

/// Everything a request handler may touch.
pub struct ServeContext {
    pub session: Arc<Session>,
    /// Absent when the actor system is not running
    pub notifier: Option<mpsc::UnboundedSender<WsMsg>>,
}

/// Route one request to its handler.
pub fn dispatch(method: &Method, url: &str, body: &str, ctx: &ServeContext) -> Reply {
    let path = normalize_url(url);

    match (method, path.as_str()) {
        (Method::Get | Method::Head, "" | "index.html") => index(ctx),
        (Method::Get | Method::Head, "api/files") => Reply::json(&ctx.session.list_templates()),
        (Method::Get | Method::Head, "api/test-cases") => {
            Reply::json(&ctx.session.fixtures().names())
        }
        (Method::Get | Method::Head, "api/tokens") => Reply::json(ctx.session.fixtures().tokens()),
        (Method::Get | Method::Head, "api/active-template") => {
            Reply::json(&ctx.session.active())
        }
        (Method::Post, "api/render") => render(body, ctx),
        (_, "api/render") => Reply::method_not_allowed(),
        (Method::Get | Method::Head, p) if p.starts_with("static/") => {
            static_file(&p["static/".len()..], ctx)
        }
        _ => Reply::not_found(),
    }
}

fn index(ctx: &ServeContext) -> Reply {
    let vars = IndexVars {
        ws_port: super::get_actual_ws_port(),
    };
    let on_disk = ctx.session.ui_root().join("index.html");
    let html = match fs::read_to_string(&on_disk) {
        Ok(page) => vars.apply(&page),
        Err(_) => INDEX_HTML.render(&vars),
    };
    Reply::new(200, mime::types::HTML, html)
}

fn static_file(rel: &str, ctx: &ServeContext) -> Reply {
    let Some(path) = resolve_static(rel, ctx.session.ui_root()) else {
        return Reply::not_found();
    };
    match fs::read(&path) {
        Ok(body) => Reply::new(200, mime::from_path(&path), body),
        Err(_) => Reply::not_found(),
    }
}

fn render(body: &str, ctx: &ServeContext) -> Reply {
    let request: RenderRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => return Reply::error(400, &format!("invalid render request: {e}")),
    };

    let outcome = ctx.session.render(&request);
    if let Some(tx) = &ctx.notifier {
        let _ = tx.send(WsMsg::Notify(Notification::from(outcome.clone())));
    }
    Reply::json(&outcome)
}
