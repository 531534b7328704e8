//! Command handlers -- one module per subcommand

pub mod config;
pub mod logs;
pub mod messages;
pub mod status;

use std::sync::Arc;

use nfscope_core::config::NfscopeConfig;
use nfscope_message_flow::{DockerHandle, DockerLogSource, MessageFlowAggregator};

use crate::error::CliError;

/// Build an aggregator over the local container runtime.
///
/// The returned handle must be released once the command is done.
pub(crate) fn docker_aggregator(
    config: &NfscopeConfig,
) -> Result<(Arc<DockerHandle>, MessageFlowAggregator<DockerLogSource>), CliError> {
    let handle = Arc::new(DockerHandle::from_config(&config.docker));
    let source = Arc::new(DockerLogSource::new(Arc::clone(&handle)));
    let aggregator = MessageFlowAggregator::new(source, &config.message_flow)?;
    Ok((handle, aggregator))
}
