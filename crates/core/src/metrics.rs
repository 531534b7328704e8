//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `nfscope_`
//! - 모듈명: `message_flow_`, `nf_health_`, `http_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(nfscope_core::metrics::MESSAGE_FLOW_LINES_FETCHED_TOTAL).increment(120);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 메시지 타입 레이블 키 (NGAP, NAS, HTTP, PFCP, GTP)
pub const LABEL_MESSAGE_TYPE: &str = "type";

/// 로그 소스 레이블 키 (amf, ausf, ...)
pub const LABEL_SOURCE: &str = "source";

/// HTTP 라우트 레이블 키 (/messages, /logs, /health)
pub const LABEL_ROUTE: &str = "route";

/// 네트워크 기능 레이블 키 (amf, smf, ...)
pub const LABEL_NF: &str = "nf";

/// NF 상태 레이블 키 (online, offline)
pub const LABEL_STATUS: &str = "status";

// ─── Message Flow 메트릭 ────────────────────────────────────────────

/// Message Flow: 모든 소스에서 가져온 원시 로그 라인 수 (counter)
pub const MESSAGE_FLOW_LINES_FETCHED_TOTAL: &str = "nfscope_message_flow_lines_fetched_total";

/// Message Flow: 분류된 프로토콜 이벤트 수 (counter, label: type)
pub const MESSAGE_FLOW_EVENTS_TOTAL: &str = "nfscope_message_flow_events_total";

/// Message Flow: 소스별 조회 실패 수 (counter, label: source)
pub const MESSAGE_FLOW_SOURCE_FAILURES_TOTAL: &str = "nfscope_message_flow_source_failures_total";

/// Message Flow: 한 번의 집계 라운드 소요 시간 (histogram, 초)
pub const MESSAGE_FLOW_AGGREGATION_DURATION_SECONDS: &str =
    "nfscope_message_flow_aggregation_duration_seconds";

// ─── NF Health 메트릭 ───────────────────────────────────────────────

/// NF Health: 네트워크 기능 상태 확인 수 (counter, label: nf, status)
pub const NF_HEALTH_PROBES_TOTAL: &str = "nfscope_nf_health_probes_total";

// ─── HTTP 메트릭 ────────────────────────────────────────────────────

/// HTTP: 라우트별 요청 수 (counter, label: route)
pub const HTTP_REQUESTS_TOTAL: &str = "nfscope_http_requests_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 집계 소요 시간 히스토그램 버킷 (초)
///
/// 1ms ~ 120s 범위 (소스 조회 타임아웃 상한 포함)
pub const AGGREGATION_DURATION_BUCKETS: [f64; 10] =
    [0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0, 120.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `nfscope-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Message Flow
    describe_counter!(
        MESSAGE_FLOW_LINES_FETCHED_TOTAL,
        "Total number of raw log lines fetched from all sources"
    );
    describe_counter!(
        MESSAGE_FLOW_EVENTS_TOTAL,
        "Total number of protocol events classified, per message type"
    );
    describe_counter!(
        MESSAGE_FLOW_SOURCE_FAILURES_TOTAL,
        "Total number of failed log fetches, per source"
    );
    describe_histogram!(
        MESSAGE_FLOW_AGGREGATION_DURATION_SECONDS,
        "Time to fetch, classify and merge one message flow round in seconds"
    );

    // NF Health
    describe_counter!(
        NF_HEALTH_PROBES_TOTAL,
        "Total number of network function health probes, per NF and result"
    );

    // HTTP
    describe_counter!(
        HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests served, per route"
    );
}
