//! WebSocket Actor - Bidirectional Communication
//!
//! This actor is responsible for:
//! - Managing WebSocket client connections
//! - Broadcasting notifications to all connected clients
//! - Answering `request_render` messages from clients
//!
//! # Architecture
//!
//! ```text
//! FsActor / HTTP --[Notify]--> WsActor --[broadcast]--> Clients
//!                                 ^                        |
//!                                 +---[request_render]-----+
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::core::Session;

/// A registered WebSocket client
struct RegisteredClient {
    id: u64,
    ws: WebSocket<TcpStream>,
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::UnboundedReceiver<WsMsg>,
    /// Connected clients (shared for broadcast + read threads)
    clients: Arc<Mutex<Vec<RegisteredClient>>>,
    /// Session used to answer render requests
    session: Arc<Session>,
    next_id: AtomicU64,
    /// Cleared on shutdown to stop the reader thread
    running: Arc<AtomicBool>,
}

impl WsActor {
    /// Create a new WsActor
    pub fn new(rx: mpsc::UnboundedReceiver<WsMsg>, session: Arc<Session>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            session,
            next_id: AtomicU64::new(1),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        let session = Arc::clone(&self.session);
        let running = Arc::clone(&self.running);
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader, session, running);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Notify(notification) => {
                    crate::debug!("ws"; "push {}", notification.label());
                    self.broadcast(Message::Text(notification.to_json().into()));
                }

                WsMsg::AddClient(stream) => {
                    self.add_client(stream);
                }

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        let mut clients = self.clients.lock();
        for mut client in clients.drain(..) {
            let _ = client.ws.close(None);
        }
    }
}
