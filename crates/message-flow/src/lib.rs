//! nfscope 메시지 흐름 재구성 엔진
//!
//! 여러 네트워크 기능(NF) 컨테이너의 순서 없는 텍스트 로그에서
//! 엔티티 간 프로토콜 교환(NGAP/NAS/HTTP/PFCP)의 시간순 목록을 재구성합니다.
//!
//! # 모듈 구성
//!
//! - [`timestamp`]: 라인 정제 및 선행 ISO-8601 타임스탬프 추출
//! - [`pattern`]: 프로토콜 계열별 순서 있는 분류 규칙 라이브러리
//! - [`classifier`]: 라인 하나를 프로토콜 이벤트로 변환 (첫 매칭 규칙 우선)
//! - [`source`]: 로그 소스 trait 및 Docker 구현
//! - [`aggregator`]: 다중 소스 동시 조회 및 시간순 병합
//! - [`filter`]: 표시 계층용 이벤트 필터
//! - [`health`]: 네트워크 기능 엔드포인트 상태 확인
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! LogSource(amf..nssf) -> clean -> timestamp -> PatternLibrary -> merge/sort -> FlowSnapshot
//!      |                                             |
//!  Docker logs API                       NGAP -> NAS -> HTTP -> PFCP
//! ```

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod filter;
pub mod health;
pub mod pattern;
pub mod source;
pub mod timestamp;

// --- 주요 타입 re-export ---

// 집계기
pub use aggregator::{FlowQuery, FlowSnapshot, MessageFlowAggregator};

// 분류
pub use classifier::LineClassifier;
pub use pattern::{EventDraft, PatternLibrary, PatternRule, ProtocolFamily};
pub use timestamp::TimestampExtractor;

// 로그 소스
pub use source::{DockerHandle, DockerLogSource, LineStream, LogSource};

// NF 상태 확인
pub use health::{HttpNfProbe, NfHealthChecker, NfProbe, NfState, NfStatus};

// 필터
pub use filter::MessageFilter;

// 에러
pub use error::MessageFlowError;
