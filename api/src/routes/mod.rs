//! API route definitions.
//!
//! This module organizes all HTTP routes for the Suriview API server.

mod command;
mod health;
mod rules;
mod stats;
mod stream;
mod update;

pub use command::command_routes;
pub use health::health_routes;
pub use rules::rules_routes;
pub use stats::stats_routes;
pub use stream::stream_routes;
pub use update::update_routes;

use serde::{Deserialize, Serialize};

/// Generic error body shared by the JSON endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description of the failure.
    pub error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
