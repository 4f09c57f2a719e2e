use std::time::{Duration, Instant};

use arbor_client::{Client, ClientConfig, ClientEvent};
use arbor_server::{Server, ServerConfig, ServerEvent};
use arbor_shared::{AddOptions, ConnectionId, EntityKey, NetworkId, Node, Transform3D};

use crate::{protocol, Counter, LocalHub, ScriptedInput, Sun};

/// Events gathered during one [`TestSession::step`].
#[derive(Debug, Default)]
pub struct StepEvents {
    pub server: Vec<ServerEvent>,
    /// Indexed like [`TestSession::clients`]
    pub clients: Vec<Vec<ClientEvent>>,
}

impl StepEvents {
    pub fn client_saw(&self, index: usize, event: &ClientEvent) -> bool {
        self.clients
            .get(index)
            .is_some_and(|events| events.contains(event))
    }
}

/// A server and its clients wired through a [`LocalHub`], with a clock the
/// test advances by hand.
pub struct TestSession {
    pub hub: LocalHub,
    pub server: Server,
    pub clients: Vec<Client>,
    now: Instant,
    idle: ScriptedInput,
}

impl TestSession {
    pub fn new(client_count: usize) -> Self {
        Self::with_config(ServerConfig::default(), client_count)
    }

    pub fn with_config(config: ServerConfig, client_count: usize) -> Self {
        let hub = LocalHub::new();
        let (sender, receiver) = hub.server_socket();
        let server = Server::new(config, protocol(), sender, receiver);
        let mut session = Self {
            hub,
            server,
            clients: Vec::new(),
            now: Instant::now(),
            idle: ScriptedInput::new(),
        };
        for _ in 0..client_count {
            session.connect_client();
        }
        session
    }

    /// Connection id of the client at `index`.
    pub fn connection(index: usize) -> ConnectionId {
        ConnectionId(index as u64 + 1)
    }

    /// Opens a client end on the hub and has the server accept it.
    pub fn connect_client(&mut self) -> ConnectionId {
        let connection = Self::connection(self.clients.len());
        let (sender, receiver) = self.hub.client_socket(connection);
        self.clients.push(Client::new(
            ClientConfig::new(connection),
            protocol(),
            sender,
            receiver,
        ));
        self.server
            .accept_connection(connection)
            .expect("server accepts the connection");
        connection
    }

    pub fn client(&self, index: usize) -> &Client {
        &self.clients[index]
    }

    pub fn client_mut(&mut self, index: usize) -> &mut Client {
        &mut self.clients[index]
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance(&mut self, duration: Duration) -> Instant {
        self.now += duration;
        self.now
    }

    // Entities

    /// Spawns a server-side counter under the root and announces it.
    pub fn spawn_counter(&mut self, name: &str, value: i64) -> (EntityKey, NetworkId) {
        let node = Node::node_3d(name, Transform3D::default()).with_behavior(Counter::new(value));
        self.spawn_under_root(node)
    }

    pub fn spawn_sun(&mut self, name: &str) -> (EntityKey, NetworkId) {
        let node = Node::node_3d(name, Transform3D::default()).with_behavior(Sun::default());
        self.spawn_under_root(node)
    }

    pub fn spawn_under_root(&mut self, node: Node) -> (EntityKey, NetworkId) {
        let root = self.server.root();
        let key = self.server.scene_mut().spawn(node);
        let id = self
            .server
            .add_entity(&root, &key, AddOptions::default())
            .expect("server adds the entity");
        (key, id)
    }

    // Exchange

    /// Lets every client, then the server, drain what is waiting for them.
    pub fn deliver(&mut self) -> StepEvents {
        let mut events = StepEvents::default();
        for client in self.clients.iter_mut() {
            let received = client.receive().expect("client receives");
            events.clients.push(received.into_iter().collect());
        }
        let received = self.server.receive().expect("server receives");
        events.server.extend(received);
        events
    }

    /// One full round with idle input everywhere.
    pub fn step(&mut self) -> StepEvents {
        let idle = self.idle.clone();
        self.step_with(&idle, &[])
    }

    /// One full round: the clock passes an update interval, the server
    /// ticks, clients receive and tick, then the server receives. Clients
    /// without an entry in `client_inputs` use idle input.
    pub fn step_with(
        &mut self,
        server_input: &ScriptedInput,
        client_inputs: &[ScriptedInput],
    ) -> StepEvents {
        let interval = self.server.protocol().update_interval;
        let now = self.advance(interval + Duration::from_millis(5));
        self.server
            .tick(now, server_input)
            .expect("server ticks");

        let mut events = StepEvents::default();
        for (index, client) in self.clients.iter_mut().enumerate() {
            let mut seen: Vec<ClientEvent> = client
                .receive()
                .expect("client receives")
                .into_iter()
                .collect();
            let input = client_inputs.get(index).unwrap_or(&self.idle);
            seen.extend(client.tick(now, input).expect("client ticks"));
            events.clients.push(seen);
        }
        events
            .server
            .extend(self.server.receive().expect("server receives"));
        events
    }

    /// Runs `count` idle rounds.
    pub fn settle(&mut self, count: usize) {
        for _ in 0..count {
            self.step();
        }
    }
}
