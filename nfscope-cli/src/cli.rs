//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use nfscope_core::types::{MessageType, NetworkEntity};
use nfscope_message_flow::timestamp::parse_millis;

/// nfscope -- 5G core message flow viewer.
///
/// Use `nfscope <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "nfscope", version, about, long_about = None)]
pub struct Cli {
    /// Path to the nfscope.toml configuration file.
    #[arg(short, long, default_value = "nfscope.toml", global = true)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconstruct and list the protocol message flow.
    Messages(MessagesArgs),

    /// Show cleaned raw log lines of one source.
    Logs(LogsArgs),

    /// Check the container runtime and every network function endpoint.
    Status,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- messages ----

/// List protocol events merged from every configured source.
#[derive(Args, Debug)]
pub struct MessagesArgs {
    /// Only read log lines at or after this instant (epoch ms or ISO-8601).
    #[arg(long, value_parser = parse_instant)]
    pub since: Option<i64>,

    /// Lines to read per source (clamped to max_tail).
    #[arg(long)]
    pub tail: Option<usize>,

    /// Keep events whose source or destination is one of these entities.
    #[arg(long = "entity", value_delimiter = ',', value_parser = parse_entity)]
    pub entities: Vec<NetworkEntity>,

    /// Keep events of these message types.
    #[arg(long = "type", value_delimiter = ',', value_parser = parse_message_type)]
    pub types: Vec<MessageType>,

    /// Case-insensitive search over message name, source and destination.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Hide events before this instant (epoch ms or ISO-8601).
    #[arg(long, value_parser = parse_instant)]
    pub start: Option<i64>,

    /// Hide events after this instant (epoch ms or ISO-8601).
    #[arg(long, value_parser = parse_instant)]
    pub end: Option<i64>,

    /// Re-poll every N seconds and print only new events. Ctrl-C stops.
    #[arg(short, long, value_name = "SECS")]
    pub watch: Option<u64>,

    /// Print the cleaned source line under each event (text output).
    #[arg(long)]
    pub raw: bool,
}

// ---- logs ----

/// Show the tail of one source's log.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Log source id (e.g. amf, smf).
    pub source: String,

    /// Number of lines (default 100).
    #[arg(long)]
    pub tail: Option<usize>,

    /// Keep printing new lines as they are written. Ctrl-C stops.
    #[arg(short, long)]
    pub follow: bool,
}

// ---- config ----

/// Manage nfscope configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, server, docker, message_flow, metrics, health).
        #[arg(long)]
        section: Option<String>,
    },
}

/// Accept either epoch milliseconds or an ISO-8601 timestamp.
pub fn parse_instant(value: &str) -> Result<i64, String> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| parse_millis(value))
        .ok_or_else(|| format!("'{value}' is neither epoch milliseconds nor ISO-8601"))
}

fn parse_entity(value: &str) -> Result<NetworkEntity, String> {
    NetworkEntity::from_str_loose(value).ok_or_else(|| {
        let known: Vec<&str> = NetworkEntity::ALL.iter().map(|e| e.as_str()).collect();
        format!("unknown entity '{value}' (expected one of {})", known.join(", "))
    })
}

fn parse_message_type(value: &str) -> Result<MessageType, String> {
    MessageType::from_str_loose(value).ok_or_else(|| {
        let known: Vec<&str> = MessageType::ALL.iter().map(|t| t.as_str()).collect();
        format!("unknown message type '{value}' (expected one of {})", known.join(", "))
    })
}
