use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use nfscope_core::config::NfscopeConfig;
use nfscope_daemon::cli::DaemonCli;
use nfscope_daemon::server::{self, AppState};
use nfscope_daemon::{logging, metrics_server};
use nfscope_message_flow::{
    DockerHandle, DockerLogSource, HttpNfProbe, MessageFlowAggregator, NfHealthChecker,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = DaemonCli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // 로깅 초기화 전에 실패할 수 있으므로 stderr에도 출력
            eprintln!("nfscope-daemon: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: DaemonCli) -> Result<()> {
    // 설정: 기본값 <- 파일 <- 환경변수 <- CLI
    let mut config = NfscopeConfig::load_or_default(&cli.config).await?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    if cli.validate {
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(
        config = %cli.config.display(),
        sources = ?config.message_flow.sources,
        network_functions = config.health.network_functions.len(),
        "nfscope-daemon starting"
    );

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    // 컨테이너 런타임 핸들은 첫 조회 시 연결되고 종료 시 해제
    let handle = Arc::new(DockerHandle::from_config(&config.docker));
    let source = Arc::new(DockerLogSource::new(Arc::clone(&handle)));
    let aggregator = MessageFlowAggregator::new(source, &config.message_flow)?;
    let nf_health = NfHealthChecker::new(Arc::new(HttpNfProbe::new()?), &config.health);

    let shutdown = CancellationToken::new();
    let state = AppState::new(aggregator, nf_health).with_shutdown(shutdown.clone());
    let app = server::router(state, config.server.cors_permissive);
    let addr = server::listen_addr(&config.server)?;

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown signal received");
                signal.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signal"),
        }
    });

    let served = server::serve(addr, app, shutdown).await;

    if handle.release().await {
        tracing::info!("container runtime connection released");
    }
    tracing::info!("nfscope-daemon shut down");

    served
}
