use log::warn;

use crate::{ConnectionId, EntityKey, HostType, IdentityTable, RpcCall, RpcValue, Scene};

use super::{RpcError, RpcMethods};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcTarget {
    Server,
    Clients,
    Client(ConnectionId),
}

impl RpcTarget {
    fn label(&self) -> &'static str {
        match self {
            RpcTarget::Server => "server",
            RpcTarget::Clients => "all clients",
            RpcTarget::Client(_) => "one client",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcOutcome {
    Invoked,
    /// The caller is unknown here, so the call was dropped
    Dropped,
}

/// Queues outgoing calls until the tick's rpc stage and executes incoming
/// ones against the local scene.
pub struct RpcDispatcher {
    host_type: HostType,
    outgoing: Vec<(RpcTarget, RpcCall)>,
}

impl RpcDispatcher {
    pub fn new(host_type: HostType) -> Self {
        Self {
            host_type,
            outgoing: Vec::new(),
        }
    }

    /// Queues `method` to run on the peer(s) named by `target`, against the
    /// counterpart of `caller`. Only servers address clients and only
    /// clients address the server.
    pub fn queue(
        &mut self,
        scene: &Scene,
        caller: &EntityKey,
        target: RpcTarget,
        method: &str,
        params: Vec<RpcValue>,
    ) -> Result<(), RpcError> {
        let allowed = match target {
            RpcTarget::Server => self.host_type == HostType::Client,
            RpcTarget::Clients | RpcTarget::Client(_) => self.host_type == HostType::Server,
        };
        if !allowed {
            return Err(RpcError::UsageError {
                target: target.label(),
                host_type: self.host_type,
            });
        }

        let node = scene.node(caller).ok_or(RpcError::CallerNotFound)?;
        let id = node.id().ok_or_else(|| RpcError::CallerHasNoIdentity {
            name: node.name().to_string(),
        })?;
        if id.is_self() {
            return Err(RpcError::SelfOnlyCaller { id });
        }

        self.outgoing.push((
            target,
            RpcCall {
                caller: id,
                method: method.to_string(),
                params,
            },
        ));
        Ok(())
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    pub fn drain_outgoing(&mut self) -> Vec<(RpcTarget, RpcCall)> {
        std::mem::take(&mut self.outgoing)
    }

    /// Executes an incoming call. An unknown caller drops the call (and, on
    /// a client, raises a resync); an unknown method is returned as an
    /// error.
    pub fn handle(
        &self,
        scene: &mut Scene,
        identities: &mut IdentityTable,
        methods: &RpcMethods,
        call: &RpcCall,
    ) -> Result<RpcOutcome, RpcError> {
        let Ok(key) = identities.resolve(&call.caller) else {
            warn!(
                "dropping rpc `{}` from unknown caller {}",
                call.method, call.caller
            );
            return Ok(RpcOutcome::Dropped);
        };
        let Some(node) = scene.node_mut(&key) else {
            warn!(
                "dropping rpc `{}`: caller {} is indexed but no longer alive",
                call.method, call.caller
            );
            return Ok(RpcOutcome::Dropped);
        };
        methods.invoke(node, &call.method, &call.params)?;
        Ok(RpcOutcome::Invoked)
    }
}
