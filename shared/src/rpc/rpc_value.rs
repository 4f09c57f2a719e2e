use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::RpcError;

/// Primitive argument of a remote call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RpcValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vec2(Vec2),
    Vec3(Vec3),
}

impl RpcValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            RpcValue::Nil => "nil",
            RpcValue::Bool(_) => "bool",
            RpcValue::Int(_) => "int",
            RpcValue::Float(_) => "float",
            RpcValue::String(_) => "string",
            RpcValue::Vec2(_) => "vec2",
            RpcValue::Vec3(_) => "vec3",
        }
    }
}

impl From<()> for RpcValue {
    fn from(_: ()) -> Self {
        RpcValue::Nil
    }
}

impl From<bool> for RpcValue {
    fn from(value: bool) -> Self {
        RpcValue::Bool(value)
    }
}

impl From<i32> for RpcValue {
    fn from(value: i32) -> Self {
        RpcValue::Int(i64::from(value))
    }
}

impl From<i64> for RpcValue {
    fn from(value: i64) -> Self {
        RpcValue::Int(value)
    }
}

impl From<f32> for RpcValue {
    fn from(value: f32) -> Self {
        RpcValue::Float(f64::from(value))
    }
}

impl From<f64> for RpcValue {
    fn from(value: f64) -> Self {
        RpcValue::Float(value)
    }
}

impl From<&str> for RpcValue {
    fn from(value: &str) -> Self {
        RpcValue::String(value.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(value: String) -> Self {
        RpcValue::String(value)
    }
}

impl From<Vec2> for RpcValue {
    fn from(value: Vec2) -> Self {
        RpcValue::Vec2(value)
    }
}

impl From<Vec3> for RpcValue {
    fn from(value: Vec3) -> Self {
        RpcValue::Vec3(value)
    }
}

/// Typed extraction of a handler argument.
pub trait FromRpcValue: Sized {
    const TYPE_NAME: &'static str;

    fn from_rpc_value(value: &RpcValue) -> Option<Self>;
}

impl FromRpcValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_rpc_value(value: &RpcValue) -> Option<Self> {
        match value {
            RpcValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl FromRpcValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_rpc_value(value: &RpcValue) -> Option<Self> {
        match value {
            RpcValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl FromRpcValue for f64 {
    const TYPE_NAME: &'static str = "float";

    // ints widen to floats
    fn from_rpc_value(value: &RpcValue) -> Option<Self> {
        match value {
            RpcValue::Float(value) => Some(*value),
            RpcValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }
}

impl FromRpcValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_rpc_value(value: &RpcValue) -> Option<Self> {
        match value {
            RpcValue::String(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl FromRpcValue for Vec2 {
    const TYPE_NAME: &'static str = "vec2";

    fn from_rpc_value(value: &RpcValue) -> Option<Self> {
        match value {
            RpcValue::Vec2(value) => Some(*value),
            _ => None,
        }
    }
}

impl FromRpcValue for Vec3 {
    const TYPE_NAME: &'static str = "vec3";

    fn from_rpc_value(value: &RpcValue) -> Option<Self> {
        match value {
            RpcValue::Vec3(value) => Some(*value),
            _ => None,
        }
    }
}

/// Reads argument `index` as `T`.
pub fn arg<T: FromRpcValue>(args: &[RpcValue], index: usize) -> Result<T, RpcError> {
    let value = args.get(index).ok_or(RpcError::MissingArgument { index })?;
    T::from_rpc_value(value).ok_or(RpcError::ArgumentType {
        index,
        expected: T::TYPE_NAME,
        actual: value.type_name(),
    })
}
