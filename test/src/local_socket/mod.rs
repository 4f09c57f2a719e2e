//! In-memory transport for E2E testing
//! Routes packets between the server and its clients without network I/O

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use arbor_client::transport::{
    PacketReceiver as ClientPacketReceiver, PacketSender as ClientPacketSender,
    RecvError as ClientRecvError, SendError as ClientSendError,
};
use arbor_server::transport::{
    PacketReceiver as ServerPacketReceiver, PacketSender as ServerPacketSender,
    RecvError as ServerRecvError, SendError as ServerSendError,
};
use arbor_shared::{ConnectionId, NetworkMessage};

type Queue<T> = Arc<Mutex<VecDeque<T>>>;
type ClientQueues = Arc<Mutex<HashMap<ConnectionId, Queue<Vec<u8>>>>>;

/// Shared packet queues: one inbound queue for the server and one per
/// client connection.
#[derive(Clone, Default)]
pub struct LocalHub {
    to_server: Queue<(ConnectionId, Vec<u8>)>,
    to_clients: ClientQueues,
}

impl LocalHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_socket(&self) -> (Box<dyn ServerPacketSender>, Box<dyn ServerPacketReceiver>) {
        let sender = LocalServerSender {
            to_clients: self.to_clients.clone(),
        };
        let receiver = LocalServerReceiver {
            queue: self.to_server.clone(),
        };
        (Box::new(sender), Box::new(receiver))
    }

    /// Opens the client end of `connection`. Packets the server sends to a
    /// connection without a client end fail to send.
    pub fn client_socket(
        &self,
        connection: ConnectionId,
    ) -> (Box<dyn ClientPacketSender>, Box<dyn ClientPacketReceiver>) {
        let inbound: Queue<Vec<u8>> = Arc::new(Mutex::new(VecDeque::new()));
        if let Ok(mut queues) = self.to_clients.lock() {
            queues.insert(connection, inbound.clone());
        }
        let sender = LocalClientSender {
            connection,
            queue: self.to_server.clone(),
        };
        let receiver = LocalClientReceiver { queue: inbound };
        (Box::new(sender), Box::new(receiver))
    }

    /// Decoded copies of the packets waiting for `connection`.
    pub fn peek_client(&self, connection: &ConnectionId) -> Vec<NetworkMessage> {
        let Some(queue) = self.client_queue(connection) else {
            return Vec::new();
        };
        let queue = queue.lock().expect("client queue poisoned");
        queue
            .iter()
            .filter_map(|bytes| NetworkMessage::decode(bytes).ok())
            .collect()
    }

    /// Decoded copies of the packets waiting for the server.
    pub fn peek_server(&self) -> Vec<(ConnectionId, NetworkMessage)> {
        let queue = self.to_server.lock().expect("server queue poisoned");
        queue
            .iter()
            .filter_map(|(connection, bytes)| {
                NetworkMessage::decode(bytes)
                    .ok()
                    .map(|message| (*connection, message))
            })
            .collect()
    }

    pub fn clear_client(&self, connection: &ConnectionId) {
        if let Some(queue) = self.client_queue(connection) {
            queue.lock().expect("client queue poisoned").clear();
        }
    }

    /// Queues raw bytes for the server as if `connection` had sent them.
    pub fn inject_to_server(&self, connection: ConnectionId, bytes: Vec<u8>) {
        self.to_server
            .lock()
            .expect("server queue poisoned")
            .push_back((connection, bytes));
    }

    /// Queues raw bytes for the client behind `connection`.
    pub fn inject_to_client(&self, connection: &ConnectionId, bytes: Vec<u8>) {
        if let Some(queue) = self.client_queue(connection) {
            queue.lock().expect("client queue poisoned").push_back(bytes);
        }
    }

    fn client_queue(&self, connection: &ConnectionId) -> Option<Queue<Vec<u8>>> {
        self.to_clients
            .lock()
            .expect("client queues poisoned")
            .get(connection)
            .cloned()
    }
}

// Server Socket Components

struct LocalServerSender {
    to_clients: ClientQueues,
}

impl ServerPacketSender for LocalServerSender {
    fn send(&self, connection: &ConnectionId, payload: &[u8]) -> Result<(), ServerSendError> {
        let queues = self.to_clients.lock().map_err(|_| ServerSendError)?;
        let queue = queues.get(connection).ok_or(ServerSendError)?;
        queue
            .lock()
            .map_err(|_| ServerSendError)?
            .push_back(payload.to_vec());
        Ok(())
    }
}

struct LocalServerReceiver {
    queue: Queue<(ConnectionId, Vec<u8>)>,
}

impl ServerPacketReceiver for LocalServerReceiver {
    fn receive(&mut self) -> Result<Option<(ConnectionId, Vec<u8>)>, ServerRecvError> {
        let mut queue = self.queue.lock().map_err(|_| ServerRecvError)?;
        Ok(queue.pop_front())
    }
}

// Client Socket Components

struct LocalClientSender {
    connection: ConnectionId,
    queue: Queue<(ConnectionId, Vec<u8>)>,
}

impl ClientPacketSender for LocalClientSender {
    fn send(&self, payload: &[u8]) -> Result<(), ClientSendError> {
        self.queue
            .lock()
            .map_err(|_| ClientSendError)?
            .push_back((self.connection, payload.to_vec()));
        Ok(())
    }
}

struct LocalClientReceiver {
    queue: Queue<Vec<u8>>,
}

impl ClientPacketReceiver for LocalClientReceiver {
    fn receive(&mut self) -> Result<Option<Vec<u8>>, ClientRecvError> {
        let mut queue = self.queue.lock().map_err(|_| ClientRecvError)?;
        Ok(queue.pop_front())
    }
}
