//! Typed access to tool call arguments.

use crate::error::MagpieError;

/// Wrapper around model-supplied tool arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        // Some models deliver arguments as a JSON-encoded string.
        let value = match value {
            serde_json::Value::String(raw) => {
                serde_json::from_str(raw.trim()).unwrap_or(serde_json::Value::String(raw))
            }
            other => other,
        };
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, MagpieError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| MagpieError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, MagpieError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| MagpieError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get an optional integer argument.
    pub fn get_i64_opt(&self, key: &str) -> Option<i64> {
        self.value.get(key).and_then(|v| v.as_i64())
    }

    /// Get a float argument.
    pub fn get_f64(&self, key: &str) -> Result<f64, MagpieError> {
        self.value
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| MagpieError::InvalidArgument(format!("Missing float argument: {key}")))
    }
}
