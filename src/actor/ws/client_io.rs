use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::protocol::Message;

use super::delivery::send_or_drop;
use super::{RegisteredClient, WsActor};
use crate::core::Session;
use crate::reload::message::{ClientMessage, Notification};
use crate::render::RenderRequest;

/// Poll interval of the reader thread
const READ_POLL: Duration = Duration::from_millis(50);

impl WsActor {
    /// Add a new client connection
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Keep blocking mode during handshake, switch to non-blocking after
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let _ = ws.get_ref().set_nonblocking(true);

                let connected = Notification::connected();
                if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
                    crate::log!("ws"; "failed to send connected message: {}", e);
                    return;
                }

                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let mut clients = self.clients.lock();
                crate::debug!("ws"; "client {} connected (total: {})", id, clients.len() + 1);
                clients.push(RegisteredClient { id, ws });
            }
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
            }
        }
    }

    /// Background thread reading client messages (non-blocking poll).
    ///
    /// Render requests are collected under the lock and answered outside it,
    /// so a slow render never stalls broadcasts.
    pub(super) fn client_reader_loop(
        clients: Arc<Mutex<Vec<RegisteredClient>>>,
        session: Arc<Session>,
        running: Arc<AtomicBool>,
    ) {
        while running.load(Ordering::SeqCst) {
            std::thread::sleep(READ_POLL);

            let requests = Self::poll_clients(&clients);
            for (id, request) in requests {
                let outcome = session.render(&request);
                let msg = Message::Text(Notification::from(outcome).to_json().into());

                let mut guard = clients.lock();
                if let Some(pos) = guard.iter().position(|c| c.id == id)
                    && !send_or_drop(&mut guard[pos], msg)
                {
                    guard.remove(pos);
                }
            }
        }
    }

    /// Read whatever each client sent; drop closed connections.
    fn poll_clients(clients: &Mutex<Vec<RegisteredClient>>) -> Vec<(u64, RenderRequest)> {
        let mut requests = Vec::new();
        let mut guard = clients.lock();

        guard.retain_mut(|client| loop {
            match client.ws.read() {
                Ok(Message::Text(text)) => match ClientMessage::from_json(&text) {
                    Some(ClientMessage::RequestRender(request)) => {
                        crate::debug!("ws"; "client {} requests {}", client.id, request.template_path);
                        requests.push((client.id, request));
                    }
                    None => crate::debug!("ws"; "ignored client message: {}", text.as_str()),
                },
                Ok(Message::Close(_)) => return false,
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    return true;
                }
                Err(_) => return false,
            }
        });

        requests
    }
}
