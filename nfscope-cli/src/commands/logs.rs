//! `nfscope logs` command handler

use std::future::Future;
use std::io::Write;

use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, info};

use nfscope_core::config::NfscopeConfig;
use nfscope_message_flow::{LogSource, MessageFlowAggregator};

use crate::cli::LogsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `logs` command.
pub async fn execute(
    args: LogsArgs,
    config: &NfscopeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (handle, aggregator) = super::docker_aggregator(config)?;

    let result = if args.follow {
        let mut stdout = std::io::stdout();
        let stop = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        follow(&aggregator, &args.source, args.tail, writer, &mut stdout, stop)
            .await
            .map(|_| ())
    } else {
        match fetch_report(&aggregator, &args.source, args.tail).await {
            Ok(report) => writer.render(&report),
            Err(e) => Err(e),
        }
    };

    handle.release().await;
    result
}

/// Relay new lines of one source until the source ends or `stop` resolves.
///
/// Returns the number of lines written.
pub async fn follow<S: LogSource>(
    aggregator: &MessageFlowAggregator<S>,
    source: &str,
    tail: Option<usize>,
    writer: &OutputWriter,
    out: &mut dyn Write,
    stop: impl Future<Output = ()>,
) -> Result<usize, CliError> {
    let mut lines = aggregator.follow_logs(source, tail).await?;
    tokio::pin!(stop);

    let mut relayed = 0usize;
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            next = lines.next() => match next {
                Some(Ok(line)) => {
                    let record = LogLine {
                        source: source.to_owned(),
                        line,
                    };
                    writer.write_record(&record, out)?;
                    relayed += 1;
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }

    info!(source = %source, lines = relayed, "stopped following logs");
    Ok(relayed)
}

/// Read the cleaned tail of one configured source.
pub async fn fetch_report<S: LogSource>(
    aggregator: &MessageFlowAggregator<S>,
    source: &str,
    tail: Option<usize>,
) -> Result<LogsReport, CliError> {
    let lines = aggregator.fetch_logs(source, tail).await?;
    debug!(source = %source, lines = lines.len(), "raw log tail fetched");

    Ok(LogsReport {
        source: source.to_owned(),
        count: lines.len(),
        lines,
    })
}

/// Raw log tail of one source.
#[derive(Debug, Serialize)]
pub struct LogsReport {
    pub source: String,
    pub lines: Vec<String>,
    pub count: usize,
}

/// One line relayed by `logs --follow`.
#[derive(Debug, Serialize)]
pub struct LogLine {
    pub source: String,
    pub line: String,
}

impl Render for LogLine {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{} {}", source_prefix(&self.source).dimmed(), self.line)
    }
}

fn source_prefix(source: &str) -> String {
    format!("{source:>5} |")
}

impl Render for LogsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let prefix = source_prefix(&self.source);
        for line in &self.lines {
            writeln!(w, "{} {}", prefix.dimmed(), line)?;
        }
        if self.lines.is_empty() {
            writeln!(w, "{}", format!("no log lines for {}", self.source).yellow())?;
        }
        Ok(())
    }
}
