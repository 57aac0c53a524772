//! Live editor server: HTTP query surface plus the actor system.

mod lifecycle;
mod path;
mod response;
mod routes;

use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Method, Request, Server};

use crate::actor::Coordinator;
use crate::config::StudioConfig;
use crate::core::Session;
use crate::store::extract;
use crate::utils::path::normalize_path;
use crate::{debug, log};
use routes::ServeContext;

/// Worker threads answering HTTP requests.
const HTTP_WORKERS: usize = 4;

/// Actual WebSocket port (may differ from the configured one if it was in use)
/// Updated by coordinator after WebSocket server binds successfully
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Update the actual WebSocket port (called by coordinator after binding)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn get_actual_ws_port() -> u16 {
    ACTUAL_WS_PORT.load(Ordering::Relaxed)
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    session: Arc<Session>,
    shutdown_rx: channel::Receiver<()>,
}

/// Prepare the session and bind the HTTP server without serving yet.
///
/// When `config_path` is given its template is extracted (backing up any
/// previous artifact) and bound as the active template.
pub fn bind_server(config: Arc<StudioConfig>, config_path: Option<&Path>) -> Result<BoundServer> {
    std::fs::create_dir_all(&config.paths.templates).with_context(|| {
        format!("failed to create {}", config.paths.templates.display())
    })?;

    let session = Arc::new(Session::new(Arc::clone(&config))?);

    if let Some(config_path) = config_path {
        let config_path = normalize_path(config_path);
        let extracted = extract(&config_path, None, false, session.templates())?;
        if let Some(backup) = &extracted.backup {
            log!("extract"; "previous template backed up to {}", backup.display());
        }
        log!("extract"; "Template extracted to {}", extracted.artifact.path.display());
        session.bind_active(&extracted.artifact.path, &config_path);
    }

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    set_actual_ws_port(config.serve.ws_port);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);
    debug!("serve"; "templates: {}", session.templates().root().display());

    Ok(BoundServer {
        server,
        addr,
        session,
        shutdown_rx,
    })
}

impl BoundServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the actors, then the request loop (blocking until shutdown).
    pub fn run(self) -> Result<()> {
        let config = self.session.config();
        let coordinator = Coordinator::new(Arc::clone(&self.session))
            .with_ws_port(config.serve.ws_port)
            .with_watch(config.serve.watch)
            .with_shutdown_signal(self.shutdown_rx);

        let ctx = Arc::new(ServeContext {
            session: Arc::clone(&self.session),
            notifier: Some(coordinator.notifier()),
        });

        let actor_handle = lifecycle::spawn_actors(coordinator);
        run_request_loop(&self.server, &ctx)?;
        lifecycle::wait_for_shutdown(actor_handle);
        Ok(())
    }
}

fn run_request_loop(server: &Server, ctx: &Arc<ServeContext>) -> Result<()> {
    // Renders must not block the query routes
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(HTTP_WORKERS)
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let ctx = Arc::clone(ctx);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &ctx) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(mut request: Request, ctx: &ServeContext) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::send(request, response::Reply::unavailable());
    }

    let mut body = String::new();
    if request.method() == &Method::Post {
        request
            .as_reader()
            .read_to_string(&mut body)
            .context("failed to read request body")?;
    }

    debug!("serve"; "{} {}", request.method(), request.url());
    let reply = routes::dispatch(request.method(), request.url(), &body, ctx);
    response::send(request, reply)
}
