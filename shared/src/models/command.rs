//! Engine control command model.
//!
//! Commands are relayed verbatim to the engine's Unix control socket as a
//! single JSON object: `{"command": "...", "arguments": {...}}`. The
//! argument payload is opaque to Suriview; the engine validates it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

/// A control command destined for the engine.
///
/// # Example
///
/// ```
/// use shared::models::CommandRequest;
/// use shared::validator::Validate;
///
/// let request = CommandRequest::new("uptime");
/// assert!(request.validate().is_ok());
///
/// let empty = CommandRequest::new("");
/// assert!(empty.validate().is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommandRequest {
    /// The command verb, e.g. `uptime` or `reload-rules`.
    #[validate(length(min = 1, message = "Command cannot be empty"))]
    pub command: String,

    /// Optional command arguments, passed through to the engine untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl CommandRequest {
    /// Creates a command with no arguments.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: None,
        }
    }

    /// Attaches an argument payload.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// Renders the wire form sent over the control socket.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match &self.arguments {
            Some(arguments) => json!({
                "command": self.command,
                "arguments": arguments,
            }),
            None => json!({ "command": self.command }),
        }
    }
}
