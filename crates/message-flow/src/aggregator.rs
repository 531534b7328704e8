//! 메시지 흐름 집계기 -- 다중 소스 조회, 분류, 시간순 병합
//!
//! [`MessageFlowAggregator`]는 한 번의 조회마다 다음을 수행합니다:
//! 1. 설정된 모든 소스를 동시에 조회 (소스별 실패는 빈 목록으로 대체)
//! 2. 라인별 정제, 타임스탬프 추출, 분류
//! 3. 전체 이벤트를 `timestamp_ms` 기준 안정 정렬
//!
//! 호출 사이에 상태를 보관하지 않습니다. 조회 future를 드롭하면
//! 진행 중인 모든 소스 조회도 함께 취소됩니다.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use futures::future::{self, join_all};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use nfscope_core::config::MessageFlowConfig;
use nfscope_core::metrics as m;
use nfscope_core::types::ProtocolEvent;

use crate::classifier::LineClassifier;
use crate::error::MessageFlowError;
use crate::source::{LineStream, LogSource};

/// 원시 로그 조회의 기본 tail 라인 수
pub const DEFAULT_LOG_TAIL: usize = 100;

/// 메시지 흐름 조회 조건
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowQuery {
    /// 이 시각(epoch 밀리초) 이후의 로그만 조회
    pub since: Option<i64>,
    /// 소스당 tail 라인 수 (없으면 설정 기본값)
    pub tail: Option<usize>,
}

impl FlowQuery {
    /// 조건 없는 조회를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// since 조건을 설정합니다.
    pub fn since(mut self, since_ms: i64) -> Self {
        self.since = Some(since_ms);
        self
    }

    /// tail 조건을 설정합니다.
    pub fn tail(mut self, tail: usize) -> Self {
        self.tail = Some(tail);
        self
    }
}

/// 한 번의 조회 결과
///
/// JSON 형태는 `{messages, count}`입니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowSnapshot {
    /// 시간순 정렬된 이벤트
    pub messages: Vec<ProtocolEvent>,
    /// 이벤트 수
    pub count: usize,
    /// 조회에 실패한 소스 (응답 본문에는 포함하지 않음)
    #[serde(skip)]
    pub failed_sources: Vec<String>,
}

/// 메시지 흐름 집계기
pub struct MessageFlowAggregator<S: LogSource> {
    source: Arc<S>,
    classifier: Arc<LineClassifier>,
    sources: Vec<String>,
    default_tail: usize,
    max_tail: usize,
}

impl<S: LogSource> MessageFlowAggregator<S> {
    /// 설정과 로그 소스로 집계기를 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정이 유효하지 않거나 표준 규칙 컴파일에 실패하면 에러를 반환합니다.
    pub fn new(source: Arc<S>, config: &MessageFlowConfig) -> Result<Self, MessageFlowError> {
        Self::with_classifier(source, Arc::new(LineClassifier::new()?), config)
    }

    /// 지정한 분류기로 집계기를 생성합니다.
    pub fn with_classifier(
        source: Arc<S>,
        classifier: Arc<LineClassifier>,
        config: &MessageFlowConfig,
    ) -> Result<Self, MessageFlowError> {
        config
            .validate()
            .map_err(|e| MessageFlowError::Config {
                field: "message_flow".to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            source,
            classifier,
            sources: config.sources.clone(),
            default_tail: config.default_tail,
            max_tail: config.max_tail,
        })
    }

    /// 설정된 소스 목록
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// 기본 tail
    pub fn default_tail(&self) -> usize {
        self.default_tail
    }

    /// 최대 tail
    pub fn max_tail(&self) -> usize {
        self.max_tail
    }

    /// 로그 소스
    pub fn log_source(&self) -> &Arc<S> {
        &self.source
    }

    /// 요청 tail을 `max_tail` 이하로 제한합니다.
    ///
    /// 0은 그대로 두며, 이 경우 소스는 라인을 반환하지 않습니다.
    pub fn clamp_tail(&self, requested: Option<usize>, fallback: usize) -> usize {
        requested.unwrap_or(fallback).min(self.max_tail)
    }

    /// 모든 소스를 조회하여 시간순 이벤트 목록을 만듭니다.
    ///
    /// 일부 소스의 실패는 해당 소스를 빈 목록으로 대체합니다.
    ///
    /// # Errors
    ///
    /// 모든 소스가 전송 계층 에러로 실패하면 `MessageFlowError::TransportUnavailable`
    pub async fn aggregate(&self, query: FlowQuery) -> Result<FlowSnapshot, MessageFlowError> {
        let started = Instant::now();
        let tail = self.clamp_tail(query.tail, self.default_tail);

        let fetches = self.sources.iter().map(|source_id| async move {
            let result = self.source.fetch(source_id, query.since, tail).await;
            (source_id.as_str(), result)
        });
        let results = join_all(fetches).await;

        let mut messages = Vec::new();
        let mut failed_sources = Vec::new();
        let mut transport_failures = 0usize;
        let mut last_transport_error = None;
        let mut total_lines = 0usize;

        for (source_id, result) in results {
            match result {
                Ok(lines) => {
                    total_lines += lines.len();
                    messages.extend(lines.iter().filter_map(|line| self.classifier.classify(line)));
                }
                Err(e) => {
                    warn!(source_id, error = %e, "failed to fetch logs, treating source as empty");
                    counter!(m::MESSAGE_FLOW_SOURCE_FAILURES_TOTAL, m::LABEL_SOURCE => source_id.to_owned())
                        .increment(1);
                    if e.is_transport() {
                        transport_failures += 1;
                        last_transport_error = Some(e.to_string());
                    }
                    failed_sources.push(source_id.to_owned());
                }
            }
        }

        if transport_failures == self.sources.len() {
            let reason = last_transport_error.unwrap_or_else(|| "no sources reachable".to_owned());
            error!(sources = self.sources.len(), reason = %reason, "log transport unreachable for every source");
            return Err(MessageFlowError::TransportUnavailable(reason));
        }

        // 안정 정렬: 같은 시각이면 소스 순서와 소스 내 라인 순서를 유지
        messages.sort_by_key(|event| event.timestamp_ms);

        counter!(m::MESSAGE_FLOW_LINES_FETCHED_TOTAL).increment(total_lines as u64);
        for event in &messages {
            counter!(m::MESSAGE_FLOW_EVENTS_TOTAL, m::LABEL_MESSAGE_TYPE => event.message_type.as_str())
                .increment(1);
        }
        histogram!(m::MESSAGE_FLOW_AGGREGATION_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        debug!(
            lines = total_lines,
            events = messages.len(),
            failed = failed_sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "message flow aggregated"
        );

        let count = messages.len();
        Ok(FlowSnapshot {
            messages,
            count,
            failed_sources,
        })
    }

    /// 소스 하나의 정제된 원시 로그 라인을 조회합니다.
    ///
    /// # Errors
    ///
    /// - 설정되지 않은 소스: `MessageFlowError::SourceNotFound`
    /// - 조회 실패: 로그 소스의 에러를 그대로 반환
    pub async fn fetch_logs(
        &self,
        source_id: &str,
        tail: Option<usize>,
    ) -> Result<Vec<String>, MessageFlowError> {
        self.ensure_configured(source_id)?;

        let tail = self.clamp_tail(tail, DEFAULT_LOG_TAIL);
        let lines = self.source.fetch(source_id, None, tail).await?;
        counter!(m::MESSAGE_FLOW_LINES_FETCHED_TOTAL).increment(lines.len() as u64);

        Ok(lines
            .iter()
            .map(|line| self.classifier.clean_line(line))
            .filter(|line| !line.is_empty())
            .collect())
    }

    /// 소스 하나의 로그를 계속 따라가며 정제된 라인을 내보냅니다.
    ///
    /// 최근 `tail` 라인(기본 100)부터 시작합니다.
    ///
    /// # Errors
    ///
    /// - 설정되지 않은 소스: `MessageFlowError::SourceNotFound`
    /// - 스트림을 열 수 없음: 로그 소스의 에러를 그대로 반환
    pub async fn follow_logs(
        &self,
        source_id: &str,
        tail: Option<usize>,
    ) -> Result<LineStream, MessageFlowError> {
        self.ensure_configured(source_id)?;

        let tail = self.clamp_tail(tail, DEFAULT_LOG_TAIL);
        let lines = self.source.follow(source_id, tail).await?;
        info!(source_id, tail, "following source logs");

        let classifier = self.classifier.clone();
        Ok(lines
            .filter_map(move |line| {
                let cleaned = match line {
                    Ok(line) => {
                        let clean = classifier.clean_line(&line);
                        (!clean.is_empty()).then_some(Ok(clean))
                    }
                    Err(e) => Some(Err(e)),
                };
                future::ready(cleaned)
            })
            .boxed())
    }

    /// 로그 전송 계층 연결 상태를 확인합니다.
    pub async fn health(&self) -> Result<(), MessageFlowError> {
        self.source.ping().await
    }

    fn ensure_configured(&self, source_id: &str) -> Result<(), MessageFlowError> {
        if self.sources.iter().any(|s| s == source_id) {
            Ok(())
        } else {
            Err(MessageFlowError::SourceNotFound {
                source_id: source_id.to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockLogSource;

    fn config(sources: &[&str]) -> MessageFlowConfig {
        MessageFlowConfig {
            sources: sources.iter().map(|s| (*s).to_owned()).collect(),
            ..MessageFlowConfig::default()
        }
    }

    fn aggregator(mock: MockLogSource, sources: &[&str]) -> MessageFlowAggregator<MockLogSource> {
        MessageFlowAggregator::new(Arc::new(mock), &config(sources)).unwrap()
    }

    #[tokio::test]
    async fn merges_sources_in_time_order() {
        let mock = MockLogSource::new()
            .with_lines("amf", &["2025-01-01T00:00:02.000Z Processing Initial UE Message"])
            .with_lines("smf", &["2025-01-01T00:00:01.000Z Establishing PFCP session"]);
        let agg = aggregator(mock, &["amf", "smf"]);

        let snapshot = agg.aggregate(FlowQuery::new()).await.unwrap();
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.messages[0].message_name, "Session Establishment Request");
        assert_eq!(snapshot.messages[1].message_name, "Initial UE Message");
    }

    #[tokio::test]
    async fn failing_source_degrades_to_empty() {
        let mock = MockLogSource::new()
            .with_lines("amf", &["2025-01-01T00:00:01.000Z Processing Initial UE Message"])
            .with_failing_source("smf");
        let agg = aggregator(mock, &["amf", "smf"]);

        let snapshot = agg.aggregate(FlowQuery::new()).await.unwrap();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.failed_sources, vec!["smf"]);
    }

    #[tokio::test]
    async fn all_sources_unreachable_is_an_error() {
        let mock = MockLogSource::new()
            .with_unreachable_source("amf")
            .with_unreachable_source("smf");
        let agg = aggregator(mock, &["amf", "smf"]);

        let err = agg.aggregate(FlowQuery::new()).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn all_sources_failing_without_transport_error_is_empty_success() {
        // 컨테이너가 없을 뿐 런타임은 응답함
        let agg = aggregator(MockLogSource::new(), &["amf", "smf"]);

        let snapshot = agg.aggregate(FlowQuery::new()).await.unwrap();
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.failed_sources.len(), 2);
    }

    #[tokio::test]
    async fn tail_is_clamped() {
        let agg = aggregator(MockLogSource::new(), &["amf"]);
        assert_eq!(agg.clamp_tail(None, 2000), 2000);
        assert_eq!(agg.clamp_tail(Some(0), 2000), 0);
        assert_eq!(agg.clamp_tail(Some(1_000_000), 2000), agg.max_tail());
    }

    #[tokio::test]
    async fn tail_limits_lines_per_source() {
        let mock = MockLogSource::new().with_lines(
            "amf",
            &[
                "2025-01-01T00:00:01.000Z Processing Initial UE Message",
                "2025-01-01T00:00:02.000Z Processing Uplink NAS Transport",
                "2025-01-01T00:00:03.000Z Sending Downlink NAS Transport",
            ],
        );
        let agg = aggregator(mock, &["amf"]);

        let snapshot = agg.aggregate(FlowQuery::new().tail(2)).await.unwrap();
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.messages[0].message_name, "Uplink NAS Transport");
    }

    #[tokio::test]
    async fn follow_logs_streams_cleaned_lines() {
        let mock = MockLogSource::new().with_lines(
            "smf",
            &[
                "2025-01-01T00:00:01.000Z old",
                "\u{1b}[33m2025-01-01T00:00:02.000Z PFCP session established\u{1b}[0m",
                "\u{3}",
            ],
        );
        let agg = aggregator(mock, &["smf"]);

        let lines: Vec<String> = agg
            .follow_logs("smf", Some(2))
            .await
            .unwrap()
            .map(|line| line.unwrap())
            .collect()
            .await;

        assert_eq!(lines, vec!["2025-01-01T00:00:02.000Z PFCP session established"]);
    }

    #[tokio::test]
    async fn follow_logs_rejects_unconfigured_source() {
        let agg = aggregator(MockLogSource::new(), &["amf"]);

        let result = agg.follow_logs("pcf", None).await;

        assert!(matches!(result, Err(MessageFlowError::SourceNotFound { .. })));
    }

    #[tokio::test]
    async fn zero_tail_reads_no_lines() {
        let mock = MockLogSource::new().with_lines(
            "amf",
            &["2025-01-01T00:00:01.000Z Processing Initial UE Message"],
        );
        let agg = aggregator(mock, &["amf"]);

        let snapshot = agg.aggregate(FlowQuery::new().tail(0)).await.unwrap();
        assert_eq!(snapshot.count, 0);
        assert!(snapshot.failed_sources.is_empty());

        let lines = agg.fetch_logs("amf", Some(0)).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn fetch_logs_rejects_unconfigured_source() {
        let agg = aggregator(MockLogSource::new().with_lines("amf", &[]), &["amf"]);
        let err = agg.fetch_logs("mme", None).await.unwrap_err();
        assert!(matches!(err, MessageFlowError::SourceNotFound { .. }));
    }

    #[tokio::test]
    async fn fetch_logs_returns_cleaned_lines() {
        let mock = MockLogSource::new().with_lines(
            "amf",
            &["\u{1b}[32m2025-01-01T00:00:01.000Z hello\u{1b}[0m", "\u{1}\u{2}"],
        );
        let agg = aggregator(mock, &["amf"]);

        let lines = agg.fetch_logs("amf", None).await.unwrap();
        assert_eq!(lines, vec!["2025-01-01T00:00:01.000Z hello"]);
    }

    #[tokio::test]
    async fn health_reports_ping_failure() {
        let agg = aggregator(MockLogSource::new().offline(), &["amf"]);
        assert!(agg.health().await.is_err());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = MessageFlowAggregator::new(Arc::new(MockLogSource::new()), &config(&[]));
        assert!(matches!(result, Err(MessageFlowError::Config { .. })));
    }

    #[test]
    fn snapshot_json_shape() {
        let snapshot = FlowSnapshot {
            messages: Vec::new(),
            count: 0,
            failed_sources: vec!["amf".to_owned()],
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json, serde_json::json!({"messages": [], "count": 0}));
    }
}
