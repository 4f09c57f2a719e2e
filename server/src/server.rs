use std::{collections::BTreeSet, time::Instant};

use log::{debug, info, warn};

use arbor_shared::{
    AddOptions, ClientInputUpdate, ConnectionId, EntityKey, HostType, InputManager, InputSource,
    ModalTracker, NetworkId, NetworkMessage, NetworkWorld, NoModals, Protocol, ReplicationScheduler,
    RpcCall, RpcDispatcher, RpcOutcome, RpcTarget, RpcValue, Scene, SceneListener, TickStage,
};

use crate::{
    transport::{PacketReceiver, PacketSender},
    ArborServerError, ServerConfig, ServerEvent, ServerEvents,
};

/// The authoritative host. Drive it by calling [`Server::receive`], running
/// game logic against the world and input queries, then [`Server::tick`].
/// Edges applied by `receive` stay visible until the following `tick`.
pub struct Server {
    config: ServerConfig,
    protocol: Protocol,
    world: NetworkWorld,
    input: InputManager,
    rpc: RpcDispatcher,
    scheduler: ReplicationScheduler,
    sender: Box<dyn PacketSender>,
    receiver: Box<dyn PacketReceiver>,
    connections: BTreeSet<ConnectionId>,
    listeners: Vec<Box<dyn SceneListener>>,
    modals: Box<dyn ModalTracker>,
}

impl Server {
    /// Create a new Server. The protocol is locked if it is not already.
    pub fn new<P: Into<Protocol>>(
        server_config: ServerConfig,
        protocol: P,
        sender: Box<dyn PacketSender>,
        receiver: Box<dyn PacketReceiver>,
    ) -> Self {
        let mut protocol: Protocol = protocol.into();
        if !protocol.is_locked() {
            protocol.lock();
        }
        let scheduler = ReplicationScheduler::new(
            protocol.update_interval,
            server_config.min_connected_peers,
            Instant::now(),
        );

        Self {
            input: InputManager::new(HostType::Server, &protocol.input_actions),
            world: NetworkWorld::new(HostType::Server),
            rpc: RpcDispatcher::new(HostType::Server),
            scheduler,
            sender,
            receiver,
            connections: BTreeSet::new(),
            listeners: Vec::new(),
            modals: Box::new(NoModals),
            config: server_config,
            protocol,
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn SceneListener>) {
        self.listeners.push(listener);
    }

    pub fn set_modal_tracker(&mut self, modals: Box<dyn ModalTracker>) {
        self.modals = modals;
    }

    // Accessors

    pub fn world(&self) -> &NetworkWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut NetworkWorld {
        &mut self.world
    }

    pub fn scene(&self) -> &Scene {
        self.world.scene()
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        self.world.scene_mut()
    }

    pub fn root(&self) -> EntityKey {
        self.world.root()
    }

    pub fn input(&self) -> &InputManager {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionId> {
        self.connections.iter()
    }

    pub fn is_connected(&self, connection: &ConnectionId) -> bool {
        self.connections.contains(connection)
    }

    /// Accepted connections plus the server itself.
    pub fn connected_peers(&self) -> usize {
        self.connections.len() + 1
    }

    // Connections

    pub fn accept_connection(&mut self, connection: ConnectionId) -> Result<(), ArborServerError> {
        if !self.connections.insert(connection) {
            debug!("connection {} was already accepted", connection);
            return Ok(());
        }
        info!("accepted connection {}", connection);
        if self.config.full_sync_on_connect {
            self.send_full_server_data(&connection)?;
        }
        Ok(())
    }

    /// Forgets `connection` and the input state of its player.
    pub fn disconnect(&mut self, connection: &ConnectionId) {
        if !self.connections.remove(connection) {
            return;
        }
        if let Some(player) = self.world.unregister_connection(connection) {
            if let Ok(id) = self.world.id_of(&player) {
                self.input.unregister_player(&id);
            }
        }
        info!("connection {} disconnected", connection);
    }

    /// Binds an entity as the player controlled by `connection` and starts
    /// tracking its input.
    pub fn register_player(
        &mut self,
        connection: ConnectionId,
        player: &EntityKey,
    ) -> Result<NetworkId, ArborServerError> {
        if !self.connections.contains(&connection) {
            return Err(ArborServerError::UnknownConnection { connection });
        }
        let id = self.world.register_player(connection, player)?;
        self.input.register_player(id);
        Ok(id)
    }

    /// Marks the entity controlled on the server host itself.
    pub fn set_local_player(&mut self, player: &EntityKey) -> Result<NetworkId, ArborServerError> {
        let id = self.world.id_of(player)?;
        self.input.set_local_player(id);
        Ok(id)
    }

    // Entities

    /// Adds a detached subtree under `owner` and announces it to every
    /// accepted connection.
    pub fn add_entity(
        &mut self,
        owner: &EntityKey,
        entity: &EntityKey,
        options: AddOptions,
    ) -> Result<NetworkId, ArborServerError> {
        let announced =
            self.world
                .add_server_entity(owner, entity, options, &mut self.listeners)?;
        if let Some(add) = announced {
            self.broadcast(&NetworkMessage::ServerAdd(add))?;
        }
        Ok(self.world.id_of(entity)?)
    }

    /// Removes a subtree, announces it, and drops the input state of any
    /// player inside it.
    pub fn remove_entity(&mut self, entity: &EntityKey) -> Result<NetworkId, ArborServerError> {
        let ids = self.subtree_ids(entity);
        let remove = self
            .world
            .remove_server_entity(entity, &mut self.listeners)?;
        self.unregister_players(&ids);
        let id = remove.id;
        self.broadcast(&NetworkMessage::ServerRemove(remove))?;
        Ok(id)
    }

    pub fn add_self_entity(
        &mut self,
        owner: &EntityKey,
        entity: &EntityKey,
    ) -> Result<NetworkId, ArborServerError> {
        Ok(self
            .world
            .add_self_entity(owner, entity, &mut self.listeners)?)
    }

    pub fn remove_self_entity(&mut self, entity: &EntityKey) -> Result<(), ArborServerError> {
        let ids = self.subtree_ids(entity);
        self.world
            .remove_self_entity(entity, &mut self.listeners)?;
        self.unregister_players(&ids);
        Ok(())
    }

    fn subtree_ids(&self, entity: &EntityKey) -> Vec<NetworkId> {
        let scene = self.world.scene();
        scene
            .descendants(entity)
            .iter()
            .filter_map(|key| scene.node(key).and_then(|node| node.id()))
            .collect()
    }

    fn unregister_players(&mut self, ids: &[NetworkId]) {
        for id in ids {
            if self.input.unregister_player(id) {
                debug!("dropped input state of removed player {}", id);
            }
        }
    }

    // Remote calls

    /// Queues `method` to run against `caller`'s counterpart on every client.
    pub fn rpc_clients(
        &mut self,
        caller: &EntityKey,
        method: &str,
        params: Vec<RpcValue>,
    ) -> Result<(), ArborServerError> {
        self.rpc.queue(
            self.world.scene(),
            caller,
            RpcTarget::Clients,
            method,
            params,
        )?;
        Ok(())
    }

    /// Queues `method` to run against `caller`'s counterpart on one client.
    pub fn rpc_client(
        &mut self,
        connection: ConnectionId,
        caller: &EntityKey,
        method: &str,
        params: Vec<RpcValue>,
    ) -> Result<(), ArborServerError> {
        if !self.connections.contains(&connection) {
            return Err(ArborServerError::UnknownConnection { connection });
        }
        self.rpc.queue(
            self.world.scene(),
            caller,
            RpcTarget::Client(connection),
            method,
            params,
        )?;
        Ok(())
    }

    // Replication

    /// Broadcasts every replicable and every owner mapping right away.
    /// Returns false when there was nothing to send.
    pub fn force_update_clients(&mut self) -> Result<bool, ArborServerError> {
        match self.world.collect_update(true)? {
            Some(update) => {
                self.broadcast(&NetworkMessage::ServerUpdate(update))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn send_full_server_data(&mut self, connection: &ConnectionId) -> Result<(), ArborServerError> {
        let data = self.world.full_server_data()?;
        debug!(
            "sending {} top-level entities to connection {}",
            data.entities.len(),
            connection
        );
        self.send(connection, &NetworkMessage::FullServerData(data))
    }

    // Incoming

    /// Drains the transport and handles every message from an accepted
    /// connection. Undecodable packets are logged and skipped; a failing
    /// call is reported as [`ServerEvent::RpcFailed`] and the drain goes on.
    /// Only transport failures end the drain early.
    pub fn receive(&mut self) -> Result<ServerEvents, ArborServerError> {
        let mut events = ServerEvents::new();
        while let Some((connection, payload)) = self.receiver.receive()? {
            if !self.connections.contains(&connection) {
                warn!("dropping packet from unaccepted connection {}", connection);
                continue;
            }
            let message = match NetworkMessage::decode(&payload) {
                Ok(message) => message,
                Err(error) => {
                    warn!("dropping packet from connection {}: {}", connection, error);
                    continue;
                }
            };
            self.handle_message(connection, message, &mut events)?;
        }
        Ok(events)
    }

    fn handle_message(
        &mut self,
        connection: ConnectionId,
        message: NetworkMessage,
        events: &mut ServerEvents,
    ) -> Result<(), ArborServerError> {
        match message {
            NetworkMessage::RpcCall(call) => self.handle_rpc(call, events),
            NetworkMessage::ClientInputUpdate(update) => {
                self.handle_input(connection, &update, events);
                Ok(())
            }
            NetworkMessage::RequestForceUpdate => {
                info!("connection {} requested a resync", connection);
                self.send_full_server_data(&connection)?;
                self.force_update_clients()?;
                events.push(ServerEvent::ForceUpdateRequested { connection });
                Ok(())
            }
            other => {
                warn!(
                    "server ignores {} from connection {}",
                    other.name(),
                    connection
                );
                Ok(())
            }
        }
    }

    fn handle_rpc(&mut self, call: RpcCall, events: &mut ServerEvents) -> Result<(), ArborServerError> {
        let (scene, identities) = self.world.scene_and_identities_mut();
        let outcome = self
            .rpc
            .handle(scene, identities, &self.protocol.rpc_methods, &call);
        let RpcCall { caller, method, .. } = call;
        events.push(match outcome {
            Ok(RpcOutcome::Invoked) => ServerEvent::RpcInvoked { caller, method },
            Ok(RpcOutcome::Dropped) => ServerEvent::RpcDropped { caller, method },
            Err(error) => {
                warn!("call {} from {} failed: {}", method, caller, error);
                ServerEvent::RpcFailed {
                    caller,
                    method,
                    error,
                }
            }
        });
        Ok(())
    }

    fn handle_input(
        &mut self,
        connection: ConnectionId,
        update: &ClientInputUpdate,
        events: &mut ServerEvents,
    ) {
        let owned = self
            .world
            .owners()
            .entity(&connection)
            .and_then(|player| self.world.id_of(&player).ok());
        if owned != Some(update.owner) {
            warn!(
                "connection {} sent input for player {} it does not control",
                connection, update.owner
            );
            return;
        }
        if self.input.apply_remote_update(update, self.modals.as_ref()) {
            events.push(ServerEvent::InputUpdated {
                player: update.owner,
            });
        }
    }

    // Tick

    /// Runs one tick: samples local input, settles remote edges, broadcasts
    /// changed replicables when the interval has elapsed, then flushes
    /// queued remote calls.
    pub fn tick(&mut self, now: Instant, source: &dyn InputSource) -> Result<(), ArborServerError> {
        for stage in TickStage::ORDER {
            match stage {
                // server identities resolve synchronously
                TickStage::Identity => {}
                TickStage::Input => {
                    self.input.update_local(source);
                    self.input.settle_remote();
                }
                TickStage::Replication => {
                    let peers = self.connected_peers();
                    if self.scheduler.server_update_due(now, peers) {
                        if let Some(update) = self.world.collect_update(false)? {
                            self.broadcast(&NetworkMessage::ServerUpdate(update))?;
                        }
                    }
                }
                TickStage::Rpc => self.flush_rpcs()?,
            }
        }
        Ok(())
    }

    fn flush_rpcs(&mut self) -> Result<(), ArborServerError> {
        for (target, call) in self.rpc.drain_outgoing() {
            let message = NetworkMessage::RpcCall(call);
            match target {
                RpcTarget::Clients => self.broadcast(&message)?,
                RpcTarget::Client(connection) => {
                    if self.connections.contains(&connection) {
                        self.send(&connection, &message)?;
                    } else {
                        debug!("dropping rpc for departed connection {}", connection);
                    }
                }
                RpcTarget::Server => warn!("server cannot address an rpc to itself"),
            }
        }
        Ok(())
    }

    // Outgoing

    fn send(&self, connection: &ConnectionId, message: &NetworkMessage) -> Result<(), ArborServerError> {
        let payload = message.encode()?;
        self.sender
            .send(connection, &payload)
            .map_err(|_| ArborServerError::Send {
                connection: *connection,
            })
    }

    fn broadcast(&self, message: &NetworkMessage) -> Result<(), ArborServerError> {
        if self.connections.is_empty() {
            return Ok(());
        }
        let payload = message.encode()?;
        for connection in &self.connections {
            self.sender
                .send(connection, &payload)
                .map_err(|_| ArborServerError::Send {
                    connection: *connection,
                })?;
        }
        Ok(())
    }
}
