use std::time::Duration;

use crate::{Behavior, Node, RpcError, RpcMethods, RpcValue, SpatialKind, TypeRegistry};

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

/// Everything both roles must agree on before any traffic flows: the types
/// the codec can re-create, the remote-callable methods, the input actions
/// and the update cadence.
pub struct Protocol {
    pub types: TypeRegistry,
    pub rpc_methods: RpcMethods,
    pub input_actions: Vec<String>,
    /// The duration between network updates
    pub update_interval: Duration,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            types: TypeRegistry::new(),
            rpc_methods: RpcMethods::new(),
            input_actions: Vec::new(),
            update_interval: Duration::from_millis(33),
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn update_interval(&mut self, duration: Duration) -> &mut Self {
        self.check_lock();
        self.update_interval = duration;
        self
    }

    pub fn add_node_type(&mut self, type_name: &str, kind: SpatialKind) -> &mut Self {
        self.check_lock();
        self.types.add_node_type(type_name, kind);
        self
    }

    pub fn add_behavior<B: Behavior + Default>(&mut self) -> &mut Self {
        self.check_lock();
        self.types.add_behavior::<B>();
        self
    }

    pub fn add_rpc<F>(&mut self, type_tag: &str, method: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Node, &[RpcValue]) -> Result<(), RpcError> + Send + Sync + 'static,
    {
        self.check_lock();
        self.rpc_methods.add_method(type_tag, method, handler);
        self
    }

    pub fn add_behavior_rpc<B, F>(&mut self, method: &str, handler: F) -> &mut Self
    where
        B: Behavior + Default,
        F: Fn(&mut B, &[RpcValue]) -> Result<(), RpcError> + Send + Sync + 'static,
    {
        self.check_lock();
        self.rpc_methods.add_behavior_method::<B, F>(method, handler);
        self
    }

    pub fn add_input_action(&mut self, action: &str) -> &mut Self {
        self.check_lock();
        if !self.input_actions.iter().any(|existing| existing == action) {
            self.input_actions.push(action.to_string());
        }
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_update_interval(&mut self, duration: Duration) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.update_interval = duration;
        Ok(self)
    }

    pub fn try_add_behavior<B: Behavior + Default>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.types.add_behavior::<B>();
        Ok(self)
    }

    pub fn try_add_input_action(&mut self, action: &str) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        Ok(self.add_input_action(action))
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
