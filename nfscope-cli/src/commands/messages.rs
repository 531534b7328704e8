//! `nfscope messages` command handler

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use nfscope_core::config::NfscopeConfig;
use nfscope_core::types::{MessageType, ProtocolEvent};
use nfscope_message_flow::{FlowQuery, LogSource, MessageFilter, MessageFlowAggregator};

use crate::cli::MessagesArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `messages` command.
pub async fn execute(
    args: MessagesArgs,
    config: &NfscopeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (handle, aggregator) = super::docker_aggregator(config)?;

    let result = match args.watch {
        None => run_once(&aggregator, &args, writer).await,
        Some(secs) => watch(&aggregator, &args, writer, Duration::from_secs(secs.max(1))).await,
    };

    handle.release().await;
    result
}

/// Viewer filter assembled from the command-line flags.
pub fn build_filter(args: &MessagesArgs) -> MessageFilter {
    let mut filter = MessageFilter::new()
        .entities(args.entities.iter().copied())
        .types(args.types.iter().copied())
        .time_range(args.start, args.end);
    if let Some(search) = &args.search {
        filter = filter.search(search);
    }
    filter
}

fn base_query(args: &MessagesArgs) -> FlowQuery {
    FlowQuery {
        since: args.since,
        tail: args.tail,
    }
}

/// One aggregation round narrowed by the viewer filter.
pub async fn fetch_report<S: LogSource>(
    aggregator: &MessageFlowAggregator<S>,
    query: FlowQuery,
    filter: &MessageFilter,
) -> Result<MessagesReport, CliError> {
    let snapshot = aggregator.aggregate(query).await?;
    Ok(MessagesReport::new(
        snapshot.messages,
        filter,
        snapshot.failed_sources,
    ))
}

async fn run_once<S: LogSource>(
    aggregator: &MessageFlowAggregator<S>,
    args: &MessagesArgs,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let filter = build_filter(args);
    let report = fetch_report(aggregator, base_query(args), &filter)
        .await?
        .with_raw(args.raw);
    writer.render(&report)
}

async fn watch<S: LogSource>(
    aggregator: &MessageFlowAggregator<S>,
    args: &MessagesArgs,
    writer: &OutputWriter,
    period: Duration,
) -> Result<(), CliError> {
    let filter = build_filter(args);
    let mut state = WatchState::new(base_query(args));

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(period_secs = period.as_secs(), "watching message flow");

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("watch stopped");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let snapshot = match aggregator.aggregate(state.query()).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_transport() => {
                // 런타임이 잠시 내려간 경우에도 폴링은 계속
                warn!(error = %e, "container runtime unreachable, retrying next round");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let first = state.is_first_round();
        let fresh = state.advance(snapshot.messages);
        let report = MessagesReport::new(fresh, &filter, snapshot.failed_sources)
            .with_raw(args.raw)
            .with_header(first);

        if first || !report.messages.is_empty() {
            writer.render(&report)?;
        }
    }
}

/// How far back each watch round re-reads, in milliseconds.
///
/// Lines that reach the runtime later than this behind the newest event are
/// not shown.
pub const WATCH_LOOKBACK_MS: i64 = 10_000;

/// Identity of a printed event across rounds.
type EventKey = (i64, String);

fn event_key(event: &ProtocolEvent) -> EventKey {
    let text = event
        .raw_log
        .clone()
        .unwrap_or_else(|| event.message_name.clone());
    (event.timestamp_ms, text)
}

/// Poll bookkeeping for watch mode.
///
/// Each round re-reads a lookback window behind the newest instant seen and
/// prints every event in it that was not printed before. Events are keyed by
/// `(timestamp_ms, raw_log)` and counted, so repeated identical lines still
/// show up once per occurrence.
#[derive(Debug, Clone)]
pub struct WatchState {
    base: FlowQuery,
    lookback_ms: i64,
    last_ms: Option<i64>,
    printed: HashMap<EventKey, usize>,
    rounds: u64,
}

impl WatchState {
    pub fn new(base: FlowQuery) -> Self {
        Self::with_lookback(base, WATCH_LOOKBACK_MS)
    }

    pub fn with_lookback(base: FlowQuery, lookback_ms: i64) -> Self {
        Self {
            base,
            lookback_ms: lookback_ms.max(0),
            last_ms: None,
            printed: HashMap::new(),
            rounds: 0,
        }
    }

    /// Query for the next round.
    pub fn query(&self) -> FlowQuery {
        FlowQuery {
            since: self.cutoff().or(self.base.since),
            tail: self.base.tail,
        }
    }

    pub fn is_first_round(&self) -> bool {
        self.rounds == 0
    }

    /// Newest `timestamp_ms` seen so far.
    pub fn last_ms(&self) -> Option<i64> {
        self.last_ms
    }

    fn cutoff(&self) -> Option<i64> {
        self.last_ms.map(|last| last.saturating_sub(self.lookback_ms))
    }

    /// Keep events not printed yet and move the window forward.
    ///
    /// Events older than the current lookback window are dropped, since their
    /// print history may already be forgotten.
    pub fn advance(&mut self, events: Vec<ProtocolEvent>) -> Vec<ProtocolEvent> {
        self.rounds += 1;
        let cutoff = self.cutoff();

        let mut in_round: HashMap<EventKey, usize> = HashMap::new();
        let mut fresh = Vec::new();
        for event in events {
            if cutoff.is_some_and(|cutoff| event.timestamp_ms < cutoff) {
                continue;
            }
            self.last_ms = Some(self.last_ms.map_or(event.timestamp_ms, |last| {
                last.max(event.timestamp_ms)
            }));

            let key = event_key(&event);
            let occurrence = in_round.entry(key.clone()).or_insert(0);
            *occurrence += 1;
            let printed = self.printed.entry(key).or_insert(0);
            if *occurrence > *printed {
                *printed = *occurrence;
                fresh.push(event);
            }
        }

        if let Some(cutoff) = self.cutoff() {
            self.printed.retain(|(ms, _), _| *ms >= cutoff);
        }
        fresh
    }
}

/// Result of one `messages` round.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesReport {
    /// Events left after the viewer filter, in time order
    pub messages: Vec<ProtocolEvent>,
    /// Number of events in `messages`
    pub count: usize,
    /// Events before filtering
    pub total: usize,
    /// Sources whose logs could not be read this round
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_sources: Vec<String>,
    #[serde(skip)]
    raw: bool,
    #[serde(skip)]
    header: bool,
}

impl MessagesReport {
    pub fn new(
        events: Vec<ProtocolEvent>,
        filter: &MessageFilter,
        failed_sources: Vec<String>,
    ) -> Self {
        let total = events.len();
        let messages: Vec<ProtocolEvent> = if filter.is_empty() {
            events
        } else {
            events.into_iter().filter(|e| filter.matches(e)).collect()
        };
        Self {
            count: messages.len(),
            messages,
            total,
            failed_sources,
            raw: false,
            header: true,
        }
    }

    /// Show the cleaned source line under each event.
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Print the column header and summary line.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }
}

impl Render for MessagesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.header {
            writeln!(
                w,
                "{:<26} {:<5}    {:<5} {:<5} {:<13} {}",
                "TIME".bold(),
                "FROM".bold(),
                "TO".bold(),
                "TYPE".bold(),
                "DIRECTION".bold(),
                "MESSAGE".bold()
            )?;
        }

        for event in &self.messages {
            let kind = format!("{:<5}", event.message_type.as_str());
            let kind = match event.message_type {
                MessageType::Ngap => kind.cyan(),
                MessageType::Nas => kind.green(),
                MessageType::Http => kind.yellow(),
                MessageType::Pfcp => kind.magenta(),
                MessageType::Gtp => kind.blue(),
            };
            writeln!(
                w,
                "{:<26} {:<5} -> {:<5} {} {:<13} {}",
                event.timestamp,
                event.source.as_str(),
                event.destination.as_str(),
                kind,
                event.direction.as_str(),
                event.message_name
            )?;
            if self.raw {
                if let Some(raw) = &event.raw_log {
                    writeln!(w, "    {}", raw.dimmed())?;
                }
            }
        }

        if self.header {
            writeln!(w)?;
            let noun = if self.total == 1 { "event" } else { "events" };
            if self.count == self.total {
                writeln!(w, "{} {noun}", self.count)?;
            } else {
                writeln!(w, "{} of {} {noun}", self.count, self.total)?;
            }
        }
        if !self.failed_sources.is_empty() {
            writeln!(
                w,
                "{} {}",
                "unavailable sources:".yellow(),
                self.failed_sources.join(", ")
            )?;
        }

        Ok(())
    }
}
