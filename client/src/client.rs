use std::time::Instant;

use log::{debug, info, warn};

use arbor_shared::{
    ConnectionId, EntityKey, HostType, InputManager, InputSource, InputUpdateType, NetworkId,
    NetworkMessage, NetworkWorld, Protocol, ReplicationScheduler, RpcCall, RpcDispatcher,
    RpcOutcome, RpcTarget, RpcValue, Scene, SceneListener, TickStage, UpdateOutcome,
};

use crate::{
    transport::{PacketReceiver, PacketSender},
    ArborClientError, ClientConfig, ClientEvent, ClientEvents,
};

/// A replica of the server's scene. Nothing is sent to the server until the
/// first full snapshot has been merged.
pub struct Client {
    config: ClientConfig,
    protocol: Protocol,
    world: NetworkWorld,
    input: InputManager,
    rpc: RpcDispatcher,
    scheduler: ReplicationScheduler,
    sender: Box<dyn PacketSender>,
    receiver: Box<dyn PacketReceiver>,
    listeners: Vec<Box<dyn SceneListener>>,
}

impl Client {
    /// Create a new Client. The protocol is locked if it is not already.
    pub fn new<P: Into<Protocol>>(
        client_config: ClientConfig,
        protocol: P,
        sender: Box<dyn PacketSender>,
        receiver: Box<dyn PacketReceiver>,
    ) -> Self {
        let mut protocol: Protocol = protocol.into();
        if !protocol.is_locked() {
            protocol.lock();
        }
        let scheduler = ReplicationScheduler::new(protocol.update_interval, 0, Instant::now());

        Self {
            input: InputManager::new(HostType::Client, &protocol.input_actions),
            world: NetworkWorld::new(HostType::Client),
            rpc: RpcDispatcher::new(HostType::Client),
            scheduler,
            sender,
            receiver,
            listeners: Vec::new(),
            config: client_config,
            protocol,
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn SceneListener>) {
        self.listeners.push(listener);
    }

    // Accessors

    pub fn connection(&self) -> ConnectionId {
        self.config.connection
    }

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

    pub fn has_full_server_data(&self) -> bool {
        self.world.has_full_server_data()
    }

    /// The local copy of the entity with `id`.
    pub fn entity(&self, id: &NetworkId) -> Option<EntityKey> {
        self.world.entity(id)
    }

    /// The player entity this client controls, once the server has
    /// registered it and it has been replicated here.
    pub fn local_player(&mut self) -> Option<EntityKey> {
        let connection = self.config.connection;
        self.world.owner_entity(&connection)
    }

    /// Like [`local_player`](Self::local_player), but asks the server for a
    /// resync when the player cannot be found.
    pub fn resolve_local_player(&mut self) -> Option<EntityKey> {
        let connection = self.config.connection;
        self.world.resolve_owner(&connection)
    }

    // Self entities

    pub fn add_self_entity(
        &mut self,
        owner: &EntityKey,
        entity: &EntityKey,
    ) -> Result<NetworkId, ArborClientError> {
        Ok(self
            .world
            .add_self_entity(owner, entity, &mut self.listeners)?)
    }

    pub fn remove_self_entity(&mut self, entity: &EntityKey) -> Result<(), ArborClientError> {
        Ok(self
            .world
            .remove_self_entity(entity, &mut self.listeners)?)
    }

    // Remote calls

    /// Queues `method` to run against `caller`'s counterpart on the server.
    pub fn rpc_server(
        &mut self,
        caller: &EntityKey,
        method: &str,
        params: Vec<RpcValue>,
    ) -> Result<(), ArborClientError> {
        self.rpc.queue(
            self.world.scene(),
            caller,
            RpcTarget::Server,
            method,
            params,
        )?;
        Ok(())
    }

    // Incoming

    /// Drains the transport and applies every message from the server.
    /// Undecodable packets are logged and skipped. A message that fails to
    /// apply is reported as [`ClientEvent::MessageFailed`] and the drain goes
    /// on; only transport failures end it early.
    pub fn receive(&mut self) -> Result<ClientEvents, ArborClientError> {
        let mut events = ClientEvents::new();
        while let Some(payload) = self.receiver.receive()? {
            let message = match NetworkMessage::decode(&payload) {
                Ok(message) => message,
                Err(error) => {
                    warn!("dropping packet from the server: {}", error);
                    continue;
                }
            };
            let name = message.name();
            if let Err(error) = self.handle_message(message, &mut events) {
                warn!("could not apply {} from the server: {}", name, error);
                events.push(ClientEvent::MessageFailed {
                    message: name,
                    error,
                });
            }
        }
        Ok(events)
    }

    fn handle_message(
        &mut self,
        message: NetworkMessage,
        events: &mut ClientEvents,
    ) -> Result<(), ArborClientError> {
        match message {
            NetworkMessage::FullServerData(data) => {
                let added = self
                    .world
                    .apply_full_server_data(&self.protocol.types, &data)?;
                events.push(ClientEvent::FullSyncReceived);
                for key in added {
                    events.push(ClientEvent::EntityAdded(key));
                }
            }
            NetworkMessage::ServerAdd(add) => {
                if let Some(key) = self.world.apply_server_add(&self.protocol.types, &add)? {
                    events.push(ClientEvent::EntityAdded(key));
                }
            }
            NetworkMessage::ServerRemove(remove) => {
                if self.world.apply_server_remove(&remove)?.is_some() {
                    events.push(ClientEvent::EntityRemoved(remove.id));
                }
            }
            NetworkMessage::ServerUpdate(update) => {
                match self.world.apply_server_update(&update)? {
                    UpdateOutcome::Ignored => {
                        debug!("ignoring server update before full server data")
                    }
                    UpdateOutcome::Dropped { missing } => {
                        events.push(ClientEvent::UpdateDropped { missing })
                    }
                    UpdateOutcome::Applied { entities } => {
                        events.push(ClientEvent::EntitiesUpdated(entities))
                    }
                }
            }
            NetworkMessage::RpcCall(call) => {
                let (scene, identities) = self.world.scene_and_identities_mut();
                let outcome =
                    self.rpc
                        .handle(scene, identities, &self.protocol.rpc_methods, &call)?;
                let RpcCall { caller, method, .. } = call;
                events.push(match outcome {
                    RpcOutcome::Invoked => ClientEvent::RpcInvoked { caller, method },
                    RpcOutcome::Dropped => ClientEvent::RpcDropped { caller, method },
                });
            }
            other => warn!("client ignores {} from the server", other.name()),
        }
        Ok(())
    }

    // Tick

    /// Runs one tick: asks for a resync if one was requested, samples and
    /// sends local input, reports the update interval and flushes queued
    /// remote calls.
    pub fn tick(
        &mut self,
        now: Instant,
        source: &dyn InputSource,
    ) -> Result<ClientEvents, ArborClientError> {
        let mut events = ClientEvents::new();
        let synced = self.world.has_full_server_data();
        for stage in TickStage::ORDER {
            match stage {
                TickStage::Identity => {
                    if synced && self.world.identities_mut().take_resync_request() {
                        info!("requesting a forced update from the server");
                        self.send(&NetworkMessage::RequestForceUpdate)?;
                    }
                }
                TickStage::Input => {
                    let kind = self.input.update_local(source);
                    if synced {
                        self.send_input(kind)?;
                    }
                }
                TickStage::Replication => {
                    if self.scheduler.client_update_due(now, synced) {
                        events.push(ClientEvent::NetworkUpdateElapsed);
                    }
                }
                TickStage::Rpc => {
                    if synced {
                        self.flush_rpcs()?;
                    }
                }
            }
        }
        Ok(events)
    }

    fn send_input(&mut self, kind: InputUpdateType) -> Result<(), ArborClientError> {
        if self.input.local_player().is_none() {
            let Some(player) = self.local_player() else {
                return Ok(());
            };
            let id = self.world.id_of(&player)?;
            debug!("local player is {}", id);
            self.input.set_local_player(id);
        }
        if let Some(update) = self.input.outgoing_update(kind) {
            self.send(&NetworkMessage::ClientInputUpdate(update))?;
        }
        Ok(())
    }

    fn flush_rpcs(&mut self) -> Result<(), ArborClientError> {
        for (target, call) in self.rpc.drain_outgoing() {
            match target {
                RpcTarget::Server => self.send(&NetworkMessage::RpcCall(call))?,
                other => warn!("client cannot address an rpc to {:?}", other),
            }
        }
        Ok(())
    }

    fn send(&self, message: &NetworkMessage) -> Result<(), ArborClientError> {
        let payload = message.encode()?;
        self.sender.send(&payload)?;
        Ok(())
    }
}
