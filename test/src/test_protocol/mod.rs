//! Minimal protocol for E2E testing

use std::{any::Any, time::Duration};

use serde::{Deserialize, Serialize};

use arbor_shared::{
    arg, json, Behavior, BehaviorError, Persistable, Protocol, Replicable, Value,
};

/// Replicated and saved integer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub value: i64,
    #[serde(default)]
    pub label: String,
}

impl Counter {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            label: String::new(),
        }
    }
}

impl Behavior for Counter {
    fn type_tag(&self) -> &'static str {
        "Counter"
    }

    fn replicable(&self) -> Option<&dyn Replicable> {
        Some(self)
    }

    fn replicable_mut(&mut self) -> Option<&mut dyn Replicable> {
        Some(self)
    }

    fn persistable(&self) -> Option<&dyn Persistable> {
        Some(self)
    }

    fn persistable_mut(&mut self) -> Option<&mut dyn Persistable> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Replicable for Counter {
    fn write_network(&self) -> Value {
        json!({ "value": self.value })
    }

    fn read_network(&mut self, payload: &Value) -> Result<(), BehaviorError> {
        self.value = payload
            .get("value")
            .and_then(Value::as_i64)
            .ok_or_else(|| BehaviorError::Invalid {
                reason: "counter payload needs an integer `value`".to_string(),
            })?;
        Ok(())
    }
}

impl Persistable for Counter {
    fn write_save(&self) -> Value {
        json!({ "value": self.value, "label": self.label })
    }

    fn read_save(&mut self, payload: &Value) -> Result<(), BehaviorError> {
        *self = serde_json::from_value(payload.clone())?;
        Ok(())
    }
}

/// Remote-controlled light; replicated but never saved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sun {
    pub brightness: f64,
    pub flares: u32,
}

impl Behavior for Sun {
    fn type_tag(&self) -> &'static str {
        "Sun"
    }

    fn replicable(&self) -> Option<&dyn Replicable> {
        Some(self)
    }

    fn replicable_mut(&mut self) -> Option<&mut dyn Replicable> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Replicable for Sun {
    fn write_network(&self) -> Value {
        json!({ "brightness": self.brightness })
    }

    fn read_network(&mut self, payload: &Value) -> Result<(), BehaviorError> {
        self.brightness = payload
            .get("brightness")
            .and_then(Value::as_f64)
            .ok_or_else(|| BehaviorError::Invalid {
                reason: "sun payload needs a numeric `brightness`".to_string(),
            })?;
        Ok(())
    }
}

pub const JUMP: &str = "jump";
pub const FIRE: &str = "fire";

pub fn protocol() -> Protocol {
    Protocol::builder()
        .add_behavior::<Counter>()
        .add_behavior::<Sun>()
        .add_behavior_rpc::<Sun, _>("set_brightness", |sun, args| {
            sun.brightness = arg::<f64>(args, 0)?;
            Ok(())
        })
        .add_behavior_rpc::<Sun, _>("flare", |sun, _| {
            sun.flares += 1;
            Ok(())
        })
        .add_behavior_rpc::<Counter, _>("add", |counter, args| {
            counter.value += arg::<i64>(args, 0)?;
            Ok(())
        })
        .add_input_action(JUMP)
        .add_input_action(FIRE)
        .update_interval(Duration::from_millis(33))
        .build()
}
