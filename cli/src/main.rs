//! Suriview CLI
//!
//! Command-line interface for poking the engine without the web UI: send
//! control commands over the Unix socket and print quick aggregates from
//! the EVE log.
//!
//! # Usage
//!
//! ```bash
//! suriview --help
//! suriview command uptime
//! suriview command iface-stat --arguments '{"iface":"eth0"}'
//! suriview top-alerts
//! suriview counters
//! ```

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use shared::aggregate::{self, TopCounts};
use shared::control::EngineClient;
use shared::models::{CommandRequest, EveRecord};

/// Suriview CLI - engine control and quick log statistics
#[derive(Parser)]
#[command(name = "suriview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the engine's EVE log
    #[arg(
        long,
        env = "SURIVIEW_EVE_LOG",
        default_value = "/var/log/suricata/eve.json"
    )]
    eve_log: PathBuf,

    /// Path to the engine's Unix control socket
    #[arg(
        long,
        env = "SURIVIEW_CONTROL_SOCKET",
        default_value = "/var/run/suricata/suricata-command.socket"
    )]
    control_socket: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a control command to the engine
    Command {
        /// The command verb, e.g. `uptime` or `reload-rules`
        verb: String,

        /// Command arguments as a JSON object
        #[arg(long)]
        arguments: Option<String>,
    },
    /// Show the top alert signatures from the event log
    TopAlerts,
    /// Show the top DNS query names from the event log
    TopDns,
    /// Show the top TLS server names from the event log
    TopSni,
    /// Show the engine's latest performance counters
    Counters,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Command { verb, arguments }) => {
            let mut request = CommandRequest::new(verb);
            if let Some(raw) = arguments {
                let value = serde_json::from_str(&raw)
                    .context("--arguments must be a JSON object")?;
                request = request.with_arguments(value);
            }

            let mut client = EngineClient::connect(&cli.control_socket).await?;
            let reply = client.send_command(&request).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Some(Commands::TopAlerts) => {
            print_top("alert signatures", &aggregate::top_signatures(&cli.eve_log)?);
        }
        Some(Commands::TopDns) => {
            print_top("DNS queries", &aggregate::top_dns(&cli.eve_log)?);
        }
        Some(Commands::TopSni) => {
            print_top("TLS server names", &aggregate::top_tls_sni(&cli.eve_log)?);
        }
        Some(Commands::Counters) => match aggregate::latest_counters(&cli.eve_log)? {
            Some(snapshot) => {
                match snapshot.timestamp.as_deref() {
                    Some(timestamp) => println!("Counters at {timestamp}{}", age_suffix(timestamp)),
                    None => println!("Counters (record carried no timestamp)"),
                }
                println!("capture:   {}", serde_json::to_string(&snapshot.capture)?);
                println!("decoder:   {}", serde_json::to_string(&snapshot.decoder)?);
                println!("flow:      {}", serde_json::to_string(&snapshot.flow)?);
                println!("app_layer: {}", serde_json::to_string(&snapshot.app_layer)?);
            }
            None => println!("No stats record in the event log yet"),
        },
        None => {
            println!("Suriview CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_top(what: &str, top: &TopCounts) {
    if top.labels.is_empty() {
        println!("No {what} in the event log yet");
        return;
    }

    println!("Top {what}:");
    for (label, count) in top.labels.iter().zip(&top.values) {
        println!("{count:>8}  {label}");
    }
}

/// Renders how far behind "now" a stats timestamp is, when it parses.
fn age_suffix(timestamp: &str) -> String {
    let probe = EveRecord {
        timestamp: Some(timestamp.to_string()),
        event_type: None,
        payload: serde_json::Map::new(),
    };
    match probe.parsed_timestamp() {
        Some(parsed) => {
            let age = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
            format!(" ({}s ago)", age.num_seconds())
        }
        None => String::new(),
    }
}
