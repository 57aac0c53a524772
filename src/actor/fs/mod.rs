//! FileSystem Actor
//!
//! Watches the template root, the UI root and the fixtures file, and turns
//! each change into sync jobs and client notifications.
//!
//! Architecture:
//! ```text
//! Watcher → ChangeEvent → Classifier → Router → SyncHandle / WsMsg / Session
//! ```
//!
//! Coalescing of editor bursts happens downstream in the sync actor; this
//! actor reacts to every event immediately.

use std::sync::Arc;
use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::WsMsg;
use super::sync::SyncHandle;
use crate::core::Session;
use crate::reload::message::Notification;

// Domain classification (path + kind -> category).
mod classifier;
// Category -> side effects, pure.
mod router;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


pub use classifier::{Category, ClassifyError, WatchLayout, classify};
pub use router::{Action, route};
pub use types::{ChangeEvent, ChangeKind};
use watch_roots::WatchRoots;

/// How often missing watch roots are re-checked.
const MAINTAIN_INTERVAL: Duration = Duration::from_secs(2);

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle; dropping it ends every subscription
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    outlets: Outlets,
}

/// Where routed actions go.
pub struct Outlets {
    pub session: Arc<Session>,
    pub sync: SyncHandle,
    pub ws_tx: mpsc::UnboundedSender<WsMsg>,
    layout: WatchLayout,
}

impl Outlets {
    pub fn new(
        session: Arc<Session>,
        sync: SyncHandle,
        ws_tx: mpsc::UnboundedSender<WsMsg>,
    ) -> Self {
        let layout = WatchLayout::from_session(&session);
        Self {
            session,
            sync,
            ws_tx,
            layout,
        }
    }
}

impl FsActor {
    /// Create the actor and start watching right away.
    ///
    /// Events that arrive before [`run`](Self::run) is polled are buffered.
    pub fn new(
        roots: Vec<(std::path::PathBuf, notify::RecursiveMode)>,
        outlets: Outlets,
    ) -> notify::Result<Self> {
        // notify does not support async
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        // Missing roots are re-attached later.
        let mut watch_roots = WatchRoots::new(roots);
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            outlets,
        })
    }

    /// Run the actor event loop until the bridge closes or the task is aborted.
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let outlets = self.outlets;
        let mut watcher = self.watcher;
        let mut watch_roots = self.watch_roots;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Poll notify events and forward them to the async side.
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => handle_event(&event, &outlets),
                    None => break,
                },
                _ = tokio::time::sleep(MAINTAIN_INTERVAL) => watch_roots.maintain(&mut watcher),
            }
        }
        crate::debug!("watch"; "stopped");
    }
}

/// Classify and route every path of one raw event.
///
/// A bad path is logged and skipped; it never stops the loop.
pub fn handle_event(event: &notify::Event, outlets: &Outlets) {
    for change in ChangeEvent::from_notify(event) {
        handle_change(&change, outlets);
    }
}

pub fn handle_change(change: &ChangeEvent, outlets: &Outlets) {
    let category = match classify(change, &outlets.layout) {
        Ok(Some(category)) => category,
        Ok(None) => return,
        Err(e) => {
            crate::log!("watch"; "dropped event: {}", e);
            return;
        }
    };
    crate::debug!("watch"; "{}: {}", category.label(), change.path.display());

    let active = outlets.session.active();
    for action in route(category, active.as_ref()) {
        apply(action, outlets);
    }
}

fn apply(action: Action, outlets: &Outlets) {
    match action {
        Action::Sync(job) => {
            if !outlets.sync.schedule(&job.template, &job.config) {
                crate::debug!("watch"; "sync actor gone, skipping");
            }
        }
        Action::Notify(notification) => notify(outlets, notification),
        Action::ReloadFixtures => match outlets.session.reload_fixtures() {
            Ok(count) => {
                crate::log!("fixtures"; "reloaded {} test cases", count);
                notify(outlets, Notification::TestDataChanged);
            }
            Err(e) => crate::log!("error"; "fixtures reload failed, keeping previous set: {}", e),
        },
    }
}

fn notify(outlets: &Outlets, notification: Notification) {
    let _ = outlets.ws_tx.send(WsMsg::Notify(notification));
}
