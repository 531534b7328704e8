//! CLI argument definitions for nfscope-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use nfscope_core::config::NfscopeConfig;

/// nfscope message-flow daemon.
///
/// Reads the logs of the 5G core network-function containers and serves
/// the reconstructed protocol message flow over HTTP.
#[derive(Parser, Debug)]
#[command(name = "nfscope-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to nfscope.toml configuration file.
    ///
    /// A missing file falls back to built-in defaults.
    #[arg(short, long, default_value = "nfscope.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override the HTTP listen address.
    #[arg(long)]
    pub listen_addr: Option<String>,

    /// Override the HTTP port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Apply command-line overrides on top of file and environment values.
    pub fn apply_overrides(&self, config: &mut NfscopeConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(addr) = &self.listen_addr {
            config.server.listen_addr = addr.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
