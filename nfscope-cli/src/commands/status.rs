//! `nfscope status` command handler

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use nfscope_core::config::NfscopeConfig;
use nfscope_message_flow::{
    HttpNfProbe, LogSource, MessageFlowAggregator, NfHealthChecker, NfProbe, NfStatus,
};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `status` command.
///
/// Exits with the transport error code when the runtime is offline. Offline
/// network functions are reported but do not change the exit code.
pub async fn execute(config: &NfscopeConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let (handle, aggregator) = super::docker_aggregator(config)?;
    let nf_health = NfHealthChecker::new(Arc::new(HttpNfProbe::new()?), &config.health);

    let mut report = check(&aggregator, &nf_health).await;
    report.socket = if config.docker.socket_path.is_empty() {
        "local default".to_owned()
    } else {
        config.docker.socket_path.clone()
    };
    handle.release().await;

    writer.render(&report)?;

    match report.error {
        Some(reason) => Err(CliError::TransportUnavailable(reason)),
        None => Ok(()),
    }
}

/// Ping the log transport and probe every network function concurrently.
pub async fn check<S: LogSource, P: NfProbe>(
    aggregator: &MessageFlowAggregator<S>,
    nf_health: &NfHealthChecker<P>,
) -> StatusReport {
    let (runtime, network_functions) = tokio::join!(aggregator.health(), nf_health.check_all());
    let (status, error) = match runtime {
        Ok(()) => ("online", None),
        Err(e) => ("offline", Some(e.to_string())),
    };

    StatusReport {
        status: status.to_owned(),
        error,
        socket: String::new(),
        sources: aggregator.sources().to_vec(),
        network_functions,
    }
}

/// Container runtime reachability and network function health.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// `online` or `offline`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub socket: String,
    /// Configured log sources
    pub sources: Vec<String>,
    pub network_functions: Vec<NfStatus>,
}

impl Render for StatusReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let status = if self.error.is_none() {
            self.status.green().bold()
        } else {
            self.status.red().bold()
        };
        writeln!(w, "Container runtime: {status} ({})", self.socket)?;
        if let Some(error) = &self.error {
            writeln!(w, "  Error: {}", error.red())?;
        }
        writeln!(w, "  Sources: {}", self.sources.join(", "))?;

        if self.network_functions.is_empty() {
            return Ok(());
        }

        let online = self
            .network_functions
            .iter()
            .filter(|nf| nf.is_online())
            .count();
        writeln!(
            w,
            "Network functions: {online}/{} online",
            self.network_functions.len()
        )?;
        for nf in &self.network_functions {
            let state = format!("{:<7}", nf.status.as_str());
            let state = if nf.is_online() {
                state.green()
            } else {
                state.red()
            };
            let detail = match (&nf.http_status, &nf.error) {
                (Some(code), _) => format!("HTTP {code}, {}ms", nf.latency_ms),
                (None, Some(error)) => error.clone(),
                (None, None) => String::new(),
            };
            writeln!(w, "  {:<5} {} {} ({})", nf.name, state, nf.url, detail)?;
        }
        Ok(())
    }
}
