//! nfscope 공통 크레이트
//!
//! 메시지 흐름 재구성 엔진, 데몬, CLI가 공유하는 도메인 타입,
//! 에러, 설정, 메트릭 이름을 정의합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, FlowError, NfscopeError};

// 설정
pub use config::NfscopeConfig;

// 도메인 타입
pub use types::{MessageDirection, MessageType, NetworkEntity, ProtocolEvent};
