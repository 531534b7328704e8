use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nfscope_cli::cli::{Cli, Commands};
use nfscope_cli::commands;
use nfscope_cli::error::CliError;
use nfscope_cli::output::OutputWriter;
use nfscope_core::config::NfscopeConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 진단 로그는 stderr로 보내 stdout 출력(JSON 포함)을 오염시키지 않음
    let filter = cli
        .log_level
        .as_deref()
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    // 이미 설치된 경우는 무시
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            use colored::Colorize;
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        Commands::Messages(args) => {
            let config = NfscopeConfig::load_or_default(&cli.config).await?;
            commands::messages::execute(args, &config, &writer).await
        }
        Commands::Logs(args) => {
            let config = NfscopeConfig::load_or_default(&cli.config).await?;
            commands::logs::execute(args, &config, &writer).await
        }
        Commands::Status => {
            let config = NfscopeConfig::load_or_default(&cli.config).await?;
            commands::status::execute(&config, &writer).await
        }
    }
}
