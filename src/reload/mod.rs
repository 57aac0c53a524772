//! Live notification channel.
//!
//! ```text
//! FsActor / render requests --> WsActor --> editor (WebSocket)
//! ```
//!
//! - `message` - JSON protocol (`Notification`, `ClientMessage`)
//! - `server` - WebSocket acceptor feeding the WsActor

pub mod message;
pub mod server;
