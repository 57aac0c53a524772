//! Actor Coordinator - Wires up the live-sync actor system
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Wires up actors around one shared [`Session`]
//! - Runs them concurrently and tears them down in order

mod runtime;
mod watch_paths;

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::{FsActor, Outlets};
use super::messages::WsMsg;
use super::sync::SyncActor;
use super::ws::WsActor;
use crate::core::Session;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    session: Arc<Session>,
    ws_tx: mpsc::UnboundedSender<WsMsg>,
    ws_rx: mpsc::UnboundedReceiver<WsMsg>,
    ws_port: Option<u16>,
    watch: bool,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(session: Arc<Session>) -> Self {
        let (ws_tx, ws_rx) = mpsc::unbounded_channel();
        Self {
            session,
            ws_tx,
            ws_rx,
            ws_port: None,
            watch: true,
            shutdown_rx: None,
        }
    }

    /// Sender for pushes that originate outside the actors (HTTP renders).
    pub fn notifier(&self) -> mpsc::UnboundedSender<WsMsg> {
        self.ws_tx.clone()
    }

    /// Set WebSocket port.
    pub fn with_ws_port(mut self, port: u16) -> Self {
        self.ws_port = Some(port);
        self
    }

    /// Enable or disable the filesystem watcher.
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system until the shutdown signal (or until every actor
    /// has stopped on its own).
    pub async fn run(self) -> Result<()> {
        let session = self.session;

        if let Some(port) = self.ws_port {
            let interface = session.config().serve.interface;
            match crate::reload::server::start_ws_server_with_channel(interface, port, self.ws_tx.clone()) {
                Ok(actual_port) => crate::cli::serve::set_actual_ws_port(actual_port),
                Err(e) => crate::log!("actor"; "websocket server failed: {}", e),
            }
        }

        let (sync_actor, sync) = SyncActor::new(Arc::clone(&session));

        let fs_actor = if self.watch {
            let roots = watch_paths::collect_watch_paths(&session);
            let outlets = Outlets::new(Arc::clone(&session), sync.clone(), self.ws_tx.clone());
            let actor = FsActor::new(roots, outlets)
                .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
            Some(actor)
        } else {
            None
        };

        let ws_actor = WsActor::new(self.ws_rx, Arc::clone(&session));

        crate::debug!("actor"; "start");
        runtime::run_actors(
            runtime::Actors {
                fs: fs_actor,
                sync: sync_actor,
                ws: ws_actor,
            },
            sync,
            self.ws_tx,
            self.shutdown_rx,
        )
        .await;

        session.clear_active();
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
