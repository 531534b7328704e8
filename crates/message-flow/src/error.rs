//! 메시지 흐름 에러 타입
//!
//! [`MessageFlowError`]는 로그 조회, 패턴 컴파일, 집계 과정에서 발생하는 에러를 표현합니다.
//! `From<MessageFlowError> for NfscopeError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use nfscope_core::error::{ConfigError, FlowError, NfscopeError};

/// 메시지 흐름 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum MessageFlowError {
    /// 로그 소스(컨테이너)가 존재하지 않음
    #[error("log source not found: {source_id}")]
    SourceNotFound {
        /// 소스 ID
        source_id: String,
    },

    /// 로그 소스 조회 실패 (런타임이 에러 응답을 반환)
    #[error("failed to fetch logs from '{source_id}': {reason}")]
    SourceFetch {
        /// 소스 ID
        source_id: String,
        /// 실패 사유
        reason: String,
    },

    /// 로그 전송 계층(컨테이너 런타임)에 연결할 수 없음
    #[error("log transport unavailable: {0}")]
    TransportUnavailable(String),

    /// 컨테이너 이름으로 안전하지 않은 소스 ID
    #[error("invalid source id: {0}")]
    InvalidSource(String),

    /// 네트워크 기능 상태 확인 요청 실패 (연결 불가, 타임아웃 등)
    #[error("health probe to '{url}' failed: {reason}")]
    Probe {
        /// 요청 URL
        url: String,
        /// 실패 사유
        reason: String,
    },

    /// 분류 패턴 컴파일 실패
    #[error("pattern error: rule '{rule}': {reason}")]
    Pattern {
        /// 규칙 이름
        rule: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl MessageFlowError {
    /// 전송 계층 자체에 도달하지 못한 에러인지 확인합니다.
    ///
    /// 모든 소스가 이 종류의 에러로 실패하면 집계 전체가 실패로 처리됩니다.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportUnavailable(_))
    }
}

impl From<MessageFlowError> for NfscopeError {
    fn from(err: MessageFlowError) -> Self {
        match err {
            MessageFlowError::TransportUnavailable(reason) => {
                NfscopeError::Flow(FlowError::TransportUnavailable(reason))
            }
            MessageFlowError::SourceNotFound { source_id } => {
                NfscopeError::Flow(FlowError::SourceNotFound(source_id))
            }
            MessageFlowError::Config { field, reason } => {
                NfscopeError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => NfscopeError::Flow(FlowError::Query(other.to_string())),
        }
    }
}
