use tungstenite::protocol::Message;

use super::{RegisteredClient, WsActor};

impl WsActor {
    /// Broadcast a message to all connected clients
    pub(super) fn broadcast(&self, msg: Message) {
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        clients.retain_mut(|client| send_or_drop(client, msg.clone()));
        crate::debug!("ws"; "broadcast to {} clients", count);
    }
}

/// Send to one client; `false` means the client is gone.
pub(super) fn send_or_drop(client: &mut RegisteredClient, msg: Message) -> bool {
    match client.ws.send(msg) {
        Ok(_) => true,
        Err(e) => {
            crate::debug!("ws"; "client {} disconnected: {}", client.id, e);
            false
        }
    }
}
