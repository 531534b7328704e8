//! HTTP query surface.
//!
//! # Routes
//!
//! | route | success | failure |
//! |---|---|---|
//! | `GET /messages?since=&tail=` | `200 {messages, count}` | `500 {error}` when the log transport is unreachable |
//! | `GET /logs/{source}?tail=` | `200 {source, lines, count}` | `404` unknown source, `500` otherwise |
//! | `GET /logs/{source}/stream?tail=` | `200` event stream of `{timestamp, message, container}` | `404` unknown source, `500` otherwise |
//! | `GET /health` | `200 {status: "online"}` | `503 {status: "offline", error}` |
//! | `GET /nf-status` | `200 {functions, online, total}` | |
//! | `GET /nf-status/{id}` | `200` one NF status | `404` unknown NF |
//!
//! Malformed query parameters are rejected by the `Query` extractor with `400`.
//! Handlers are generic over [`LogSource`] and [`NfProbe`] so tests can serve
//! scripted sources and endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use futures::StreamExt;
use futures::future;
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use nfscope_core::config::ServerConfig;
use nfscope_core::metrics as m;
use nfscope_message_flow::{
    FlowQuery, LogSource, MessageFlowAggregator, MessageFlowError, NfHealthChecker, NfProbe,
    NfStatus,
};

/// Shared handler state.
pub struct AppState<S: LogSource, P: NfProbe> {
    pub aggregator: Arc<MessageFlowAggregator<S>>,
    pub nf_health: Arc<NfHealthChecker<P>>,
    /// Cancelled on shutdown; ends open log streams.
    pub shutdown: CancellationToken,
}

// derive(Clone) would demand `S: Clone` and `P: Clone`
impl<S: LogSource, P: NfProbe> Clone for AppState<S, P> {
    fn clone(&self) -> Self {
        Self {
            aggregator: Arc::clone(&self.aggregator),
            nf_health: Arc::clone(&self.nf_health),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S: LogSource, P: NfProbe> AppState<S, P> {
    pub fn new(aggregator: MessageFlowAggregator<S>, nf_health: NfHealthChecker<P>) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            nf_health: Arc::new(nf_health),
            shutdown: CancellationToken::new(),
        }
    }

    /// Use `shutdown` to end log streams when the server stops.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }
}

/// Query string of `GET /logs/{source}`.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub tail: Option<usize>,
}

/// Body of a successful `GET /logs/{source}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub source: String,
    pub lines: Vec<String>,
    pub count: usize,
}

/// One event of `GET /logs/{source}/stream`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogStreamEvent {
    /// When the line was relayed, RFC 3339 UTC
    pub timestamp: String,
    pub message: String,
    pub container: String,
}

/// Body of `GET /nf-status`.
#[derive(Debug, Serialize)]
pub struct NfStatusResponse {
    pub functions: Vec<NfStatus>,
    pub online: usize,
    pub total: usize,
}

/// Build the router with CORS and request tracing layers.
///
/// With `cors_permissive` unset no CORS headers are emitted, so browsers
/// only reach the API from the same origin.
pub fn router<S: LogSource, P: NfProbe>(state: AppState<S, P>, cors_permissive: bool) -> Router {
    let cors = if cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/messages", get(messages::<S, P>))
        .route("/logs/{source}", get(logs::<S, P>))
        .route("/logs/{source}/stream", get(log_stream::<S, P>))
        .route("/health", get(health::<S, P>))
        .route("/nf-status", get(nf_status::<S, P>))
        .route("/nf-status/{id}", get(nf_status_one::<S, P>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /messages`
pub async fn messages<S: LogSource, P: NfProbe>(
    State(state): State<AppState<S, P>>,
    Query(query): Query<FlowQuery>,
) -> Response {
    counter!(m::HTTP_REQUESTS_TOTAL, m::LABEL_ROUTE => "messages").increment(1);

    match state.aggregator.aggregate(query).await {
        Ok(snapshot) => {
            if !snapshot.failed_sources.is_empty() {
                warn!(
                    failed = ?snapshot.failed_sources,
                    count = snapshot.count,
                    "serving partial message flow"
                );
            }
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        Err(e) => {
            error!(error = %e, "message flow query failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch messages")
        }
    }
}

/// `GET /logs/{source}`
pub async fn logs<S: LogSource, P: NfProbe>(
    State(state): State<AppState<S, P>>,
    Path(source): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Response {
    counter!(m::HTTP_REQUESTS_TOTAL, m::LABEL_ROUTE => "logs").increment(1);

    match state.aggregator.fetch_logs(&source, query.tail).await {
        Ok(lines) => {
            let count = lines.len();
            (StatusCode::OK, Json(LogsResponse { source, lines, count })).into_response()
        }
        Err(e @ (MessageFlowError::SourceNotFound { .. } | MessageFlowError::InvalidSource(_))) => {
            warn!(source = %source, error = %e, "raw log request for unknown source");
            error_response(StatusCode::NOT_FOUND, &format!("Unknown source: {source}"))
        }
        Err(e) => {
            error!(source = %source, error = %e, "raw log fetch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch logs")
        }
    }
}

/// `GET /logs/{source}/stream`
///
/// Relays the source's new lines as server-sent events until the source ends,
/// the client disconnects, or the server shuts down. A read error ends the stream.
pub async fn log_stream<S: LogSource, P: NfProbe>(
    State(state): State<AppState<S, P>>,
    Path(source): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Response {
    counter!(m::HTTP_REQUESTS_TOTAL, m::LABEL_ROUTE => "logs_stream").increment(1);

    let lines = match state.aggregator.follow_logs(&source, query.tail).await {
        Ok(lines) => lines,
        Err(e @ (MessageFlowError::SourceNotFound { .. } | MessageFlowError::InvalidSource(_))) => {
            warn!(source = %source, error = %e, "log stream request for unknown source");
            return error_response(StatusCode::NOT_FOUND, &format!("Unknown source: {source}"));
        }
        Err(e) => {
            error!(source = %source, error = %e, "failed to attach to source logs");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to stream logs");
        }
    };

    let origin = source.clone();
    let events = lines
        .take_until(state.shutdown.clone().cancelled_owned())
        .inspect(move |line| {
            if let Err(e) = line {
                warn!(source = %origin, error = %e, "log stream ended by read error");
            }
        })
        .take_while(|line| future::ready(line.is_ok()))
        .filter_map(|line| future::ready(line.ok()))
        .map(move |message| {
            Event::default().json_data(LogStreamEvent {
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                message,
                container: source.clone(),
            })
        });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// `GET /nf-status`
pub async fn nf_status<S: LogSource, P: NfProbe>(State(state): State<AppState<S, P>>) -> Response {
    counter!(m::HTTP_REQUESTS_TOTAL, m::LABEL_ROUTE => "nf_status").increment(1);

    let functions = state.nf_health.check_all().await;
    let online = functions.iter().filter(|nf| nf.is_online()).count();
    let total = functions.len();
    if online < total {
        warn!(online, total, "some network functions are offline");
    }

    (
        StatusCode::OK,
        Json(NfStatusResponse {
            functions,
            online,
            total,
        }),
    )
        .into_response()
}

/// `GET /nf-status/{id}`
pub async fn nf_status_one<S: LogSource, P: NfProbe>(
    State(state): State<AppState<S, P>>,
    Path(id): Path<String>,
) -> Response {
    counter!(m::HTTP_REQUESTS_TOTAL, m::LABEL_ROUTE => "nf_status").increment(1);

    match state.nf_health.check_one(&id).await {
        Some(status) => (StatusCode::OK, Json(status)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, &format!("Unknown network function: {id}")),
    }
}

/// `GET /health`
pub async fn health<S: LogSource, P: NfProbe>(State(state): State<AppState<S, P>>) -> Response {
    counter!(m::HTTP_REQUESTS_TOTAL, m::LABEL_ROUTE => "health").increment(1);

    match state.aggregator.health().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "online" }))).into_response(),
        Err(e) => {
            warn!(error = %e, "container runtime unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "offline", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Parse `listen_addr:port` into a socket address.
pub fn listen_addr(config: &ServerConfig) -> Result<SocketAddr> {
    format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server listen address: {}", e))
}

/// Bind and serve until `shutdown` is cancelled.
///
/// In-flight requests finish before this returns.
pub async fn serve(addr: SocketAddr, app: Router, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;

    info!(listen_addr = %addr, "query server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("query server failed: {}", e))?;

    info!("query server stopped");
    Ok(())
}
