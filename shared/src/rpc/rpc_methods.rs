use std::collections::HashMap;

use crate::{Behavior, Node, RpcValue};

use super::RpcError;

pub type RpcHandler = Box<dyn Fn(&mut Node, &[RpcValue]) -> Result<(), RpcError> + Send + Sync>;

/// Remote-callable methods keyed by declared type and method name. Built
/// into the [`Protocol`](crate::Protocol) so both sides agree on it before
/// any traffic flows.
#[derive(Default)]
pub struct RpcMethods {
    handlers: HashMap<String, HashMap<String, RpcHandler>>,
}

impl RpcMethods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for every entity whose declared type is `type_tag`.
    pub fn add_method<F>(&mut self, type_tag: &str, method: &str, handler: F)
    where
        F: Fn(&mut Node, &[RpcValue]) -> Result<(), RpcError> + Send + Sync + 'static,
    {
        self.handlers
            .entry(type_tag.to_string())
            .or_default()
            .insert(method.to_string(), Box::new(handler));
    }

    /// Registers a handler that receives the entity's behavior as `B`.
    pub fn add_behavior_method<B, F>(&mut self, method: &str, handler: F)
    where
        B: Behavior + Default,
        F: Fn(&mut B, &[RpcValue]) -> Result<(), RpcError> + Send + Sync + 'static,
    {
        let type_tag = B::default().type_tag();
        let method_name = method.to_string();
        self.add_method(type_tag, method, move |node, args| {
            let actual = node.declared_type().to_string();
            let behavior = node
                .behavior_as_mut::<B>()
                .ok_or_else(|| RpcError::BehaviorMismatch {
                    method: method_name.clone(),
                    expected: type_tag,
                    actual,
                })?;
            handler(behavior, args)
        });
    }

    pub fn contains(&self, type_tag: &str, method: &str) -> bool {
        self.handlers
            .get(type_tag)
            .is_some_and(|methods| methods.contains_key(method))
    }

    /// Runs `method` on `node`, looked up by the node's declared type.
    pub fn invoke(&self, node: &mut Node, method: &str, args: &[RpcValue]) -> Result<(), RpcError> {
        let handler = self
            .handlers
            .get(node.declared_type())
            .and_then(|methods| methods.get(method))
            .ok_or_else(|| RpcError::UnknownMethod {
                type_tag: node.declared_type().to_string(),
                method: method.to_string(),
            })?;
        handler(node, args)
    }
}
