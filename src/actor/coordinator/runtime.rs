use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::WsMsg;
use crate::actor::sync::{SyncActor, SyncHandle, SyncPhase};
use crate::actor::ws::WsActor;

/// Longest wait for one actor to wind down.
const STOP_TIMEOUT: Duration = Duration::from_millis(500);

pub(super) struct Actors {
    pub fs: Option<FsActor>,
    pub sync: SyncActor,
    pub ws: WsActor,
}

/// Run all actors concurrently, then stop them in dependency order:
/// watcher first (no new jobs), then the sync actor (pending job
/// cancelled), then the WebSocket hub. A shutdown signal cancels the
/// pending job ahead of that order.
pub(super) async fn run_actors(
    actors: Actors,
    sync: SyncHandle,
    ws_tx: mpsc::UnboundedSender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let fs_handle = actors.fs.map(|fs| tokio::spawn(fs.run()));
    let mut sync_handle = tokio::spawn(actors.sync.run());
    let mut ws_handle = tokio::spawn(actors.ws.run());

    if let Some(rx) = shutdown_rx {
        // Cancel the pending sync the moment the signal lands, before the
        // watcher is torn down, so no deadline can fire in between.
        let forward = sync.clone();
        let _ = tokio::task::spawn_blocking(move || {
            let _ = rx.recv();
            crate::debug!("actor"; "shutdown signal received");
            if forward.phase() == SyncPhase::Scheduled {
                crate::log!("sync"; "pending sync discarded");
            }
            forward.shutdown();
        })
        .await;
    } else {
        tokio::select! {
            _ = &mut sync_handle => {}
            _ = &mut ws_handle => {}
        }
    }

    // Dropping the watcher ends every subscription.
    if let Some(handle) = fs_handle {
        handle.abort();
        let _ = handle.await;
    }

    crate::debug!("actor"; "sending shutdown to sync");
    sync.shutdown();
    if !sync_handle.is_finished() {
        let _ = tokio::time::timeout(STOP_TIMEOUT, sync_handle).await;
    }

    let _ = ws_tx.send(WsMsg::Shutdown);
    if !ws_handle.is_finished() {
        let _ = tokio::time::timeout(STOP_TIMEOUT, ws_handle).await;
    }
}
