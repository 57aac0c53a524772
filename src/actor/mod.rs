//! Actor System for the live authoring loop
//!
//! Message-passing concurrency for serve mode:
//!
//! ```text
//! FsActor --> SyncActor        (debounced template → config injection)
//! (watch) \
//!          +-> WsActor         (push notifications to the editor)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher and event classification
//! - `sync` - Debounced sync scheduler
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod sync;
pub mod ws;

pub use coordinator::Coordinator;
