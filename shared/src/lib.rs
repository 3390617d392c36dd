//! Suriview Shared Library
//!
//! This crate contains the domain logic shared by the Suriview API server
//! and CLI: EVE log parsing, bounded window reads, statistics aggregation,
//! live log following, and the engine control-socket client.
//!
//! # Modules
//!
//! - [`models`] - EVE event record and engine command types
//! - [`window`] - Bounded tail-window reads over the EVE log
//! - [`aggregate`] - Point-in-time statistics aggregators
//! - [`tail`] - Continuous line follower for live streaming
//! - [`control`] - Unix-socket client for the engine control channel
//! - [`rules`] - Rule-control file access
//! - [`update`] - External rule-update tool runner
//!
//! # Example
//!
//! ```
//! use shared::models::EveRecord;
//!
//! let record = EveRecord::decode(r#"{"event_type":"alert","alert":{"signature":"test"}}"#)
//!     .expect("valid EVE line");
//!
//! assert!(record.is_type("alert"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod aggregate;
pub mod control;
pub mod models;
pub mod rules;
pub mod tail;
pub mod update;
pub mod window;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
