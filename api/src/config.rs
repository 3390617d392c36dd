//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible
//! defaults matching a stock engine installation.

use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `SURIVIEW_HOST`: bind address (default: "0.0.0.0")
/// - `SURIVIEW_PORT`: listen port (default: 5001)
/// - `SURIVIEW_EVE_LOG`: path to the engine's EVE log
///   (default: "/var/log/suricata/eve.json")
/// - `SURIVIEW_CONTROL_SOCKET`: path to the engine's Unix control socket
///   (default: "/var/run/suricata/suricata-command.socket")
/// - `SURIVIEW_RULES_DIR`: directory holding the rule-control files
///   (default: "/etc/suricata")
/// - `SURIVIEW_UPDATE_COMMAND`: rule-update invocation, whitespace-split
///   into program and arguments (default: "suricata-update")
/// - `SURIVIEW_UPDATE_TIMEOUT_SECS`: update run timeout (default: 120)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Path to the engine's EVE log file.
    pub eve_log: PathBuf,
    /// Path to the engine's Unix-domain control socket.
    pub control_socket: PathBuf,
    /// Directory holding the editable rule-control files.
    pub rules_dir: PathBuf,
    /// Rule-update tool invocation.
    pub update_command: String,
    /// Bound on a single rule-update run.
    pub update_timeout: Duration,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `SURIVIEW_PORT` or `SURIVIEW_UPDATE_TIMEOUT_SECS`
    /// is set but cannot be parsed as a number.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("SURIVIEW_HOST").unwrap_or(defaults.host);
        let port = std::env::var("SURIVIEW_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()?
            .unwrap_or(defaults.port);

        let eve_log = std::env::var("SURIVIEW_EVE_LOG")
            .map_or(defaults.eve_log, PathBuf::from);
        let control_socket = std::env::var("SURIVIEW_CONTROL_SOCKET")
            .map_or(defaults.control_socket, PathBuf::from);
        let rules_dir = std::env::var("SURIVIEW_RULES_DIR")
            .map_or(defaults.rules_dir, PathBuf::from);

        let update_command =
            std::env::var("SURIVIEW_UPDATE_COMMAND").unwrap_or(defaults.update_command);
        let update_timeout = std::env::var("SURIVIEW_UPDATE_TIMEOUT_SECS")
            .ok()
            .map(|secs| secs.parse::<u64>())
            .transpose()?
            .map_or(defaults.update_timeout, Duration::from_secs);

        Ok(Self {
            host,
            port,
            eve_log,
            control_socket,
            rules_dir,
            update_command,
            update_timeout,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Panics
    ///
    /// Panics if the host and port combination cannot be parsed as a valid
    /// socket address.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address from config")
    }

    /// Splits the update command into a program and its arguments.
    #[must_use]
    pub fn update_invocation(&self) -> (String, Vec<String>) {
        let mut parts = self.update_command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        (program, parts.collect())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            eve_log: PathBuf::from("/var/log/suricata/eve.json"),
            control_socket: PathBuf::from("/var/run/suricata/suricata-command.socket"),
            rules_dir: PathBuf::from("/etc/suricata"),
            update_command: "suricata-update".to_string(),
            update_timeout: Duration::from_secs(120),
        }
    }
}
