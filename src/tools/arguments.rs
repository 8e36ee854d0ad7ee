//! Typed access to decoded tool call arguments.

use serde_json::{Map, Value};

use super::CONTEXT_VARIABLES;
use crate::error::SwarmError;
use crate::types::ContextVariables;

/// Decoded argument object for one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolArguments {
    value: Map<String, Value>,
}

impl ToolArguments {
    pub fn new(value: Map<String, Value>) -> Self {
        Self { value }
    }

    /// Decode the raw argument text sent by the model.
    ///
    /// Blank text decodes to an empty object; anything that is not a JSON
    /// object is rejected.
    pub fn parse(raw: &str) -> Result<Self, SwarmError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_str::<Value>(trimmed)? {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(SwarmError::InvalidArgument(format!(
                "tool arguments must be a JSON object, got {other}"
            ))),
        }
    }

    /// Get the raw JSON object.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.value
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.value.insert(key.into(), value);
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, SwarmError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| SwarmError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, SwarmError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| SwarmError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get a float argument.
    pub fn get_f64(&self, key: &str) -> Result<f64, SwarmError> {
        self.value
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| SwarmError::InvalidArgument(format!("Missing float argument: {key}")))
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, SwarmError> {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| SwarmError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Context snapshot injected by the dispatcher.
    ///
    /// Empty when the tool did not declare the context parameter.
    pub fn context_variables(&self) -> ContextVariables {
        match self.value.get(CONTEXT_VARIABLES) {
            Some(Value::Object(map)) => ContextVariables::from(map.clone()),
            _ => ContextVariables::new(),
        }
    }

    /// Deserialize the arguments (minus the context snapshot) into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, SwarmError> {
        let mut value = self.value.clone();
        value.remove(CONTEXT_VARIABLES);
        serde_json::from_value(Value::Object(value)).map_err(|e| {
            SwarmError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
