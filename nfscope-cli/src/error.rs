//! CLI-specific error types and exit code mapping

use nfscope_core::error::{FlowError, NfscopeError};
use nfscope_message_flow::MessageFlowError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The container runtime socket cannot be reached.
    #[error("container runtime not reachable: {0}")]
    TransportUnavailable(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other domain error from nfscope-core.
    #[error("{0}")]
    Core(NfscopeError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                         |
    /// |------|---------------------------------|
    /// | 0    | Success                         |
    /// | 1    | General / command error         |
    /// | 2    | Configuration error             |
    /// | 3    | Container runtime unreachable   |
    /// | 10   | IO error                        |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::TransportUnavailable(_) => 3,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<NfscopeError> for CliError {
    fn from(e: NfscopeError) -> Self {
        match e {
            NfscopeError::Config(inner) => Self::Config(inner.to_string()),
            NfscopeError::Flow(FlowError::TransportUnavailable(reason)) => {
                Self::TransportUnavailable(reason)
            }
            NfscopeError::Io(inner) => Self::Io(inner),
            other => Self::Core(other),
        }
    }
}

impl From<MessageFlowError> for CliError {
    fn from(e: MessageFlowError) -> Self {
        NfscopeError::from(e).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfscope_core::error::ConfigError;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_transport_unavailable() {
        let err = CliError::TransportUnavailable("socket missing".to_owned());
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        assert_eq!(CliError::Io(io_err).exit_code(), 10);
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("test error".to_owned());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_core_config_error_maps_to_config_exit_code() {
        let core_err = NfscopeError::Config(ConfigError::InvalidValue {
            field: "server.port".to_owned(),
            reason: "must be non-zero".to_owned(),
        });

        let cli_err: CliError = core_err.into();

        assert_eq!(cli_err.exit_code(), 2);
        assert!(cli_err.to_string().contains("server.port"));
    }

    #[test]
    fn test_transport_flow_error_maps_to_exit_code_3() {
        let flow_err = MessageFlowError::TransportUnavailable("connection refused".to_owned());

        let cli_err: CliError = flow_err.into();

        assert!(matches!(cli_err, CliError::TransportUnavailable(_)));
        assert_eq!(cli_err.exit_code(), 3);
    }

    #[test]
    fn test_unknown_source_is_general_error() {
        let flow_err = MessageFlowError::SourceNotFound {
            source_id: "pcf".to_owned(),
        };

        let cli_err: CliError = flow_err.into();

        assert_eq!(cli_err.exit_code(), 1);
        assert!(cli_err.to_string().contains("pcf"));
    }

    #[test]
    fn test_invalid_flow_config_maps_to_config_error() {
        let flow_err = MessageFlowError::Config {
            field: "message_flow.sources".to_owned(),
            reason: "must not be empty".to_owned(),
        };

        let cli_err: CliError = flow_err.into();

        assert_eq!(cli_err.exit_code(), 2);
    }
}
