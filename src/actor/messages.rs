//! Actor Message Definitions
//!
//! ```text
//! FsActor --Schedule--> SyncActor
//!    |
//!    +------Notify----> WsActor <--AddClient-- acceptor thread
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use crate::reload::message::Notification;

/// One template → config injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub template: PathBuf,
    pub config: PathBuf,
}

/// Messages to Sync Actor
#[derive(Debug)]
pub enum SyncMsg {
    /// Arm (or re-arm) the debounced injection; supersedes any pending one
    Schedule(SyncJob),
    /// Cancel anything pending and stop
    Shutdown,
}

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Push a notification to every client
    Notify(Notification),
    /// Add client
    AddClient(TcpStream),
    /// Shutdown
    Shutdown,
}
