//! 에러 타입 -- 도메인별 에러 정의

/// nfscope 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum NfscopeError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 메시지 흐름 재구성 에러
    #[error("message flow error: {0}")]
    Flow(#[from] FlowError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NfscopeError {
    /// 로그 전송 계층(컨테이너 런타임)에 도달하지 못한 에러인지 확인합니다.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Flow(FlowError::TransportUnavailable(_)))
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 메시지 흐름 에러 (크레이트 경계용 요약)
///
/// 세부 에러는 `nfscope-message-flow`의 도메인 에러가 담고,
/// 여기서는 상위 레이어가 분기할 수 있는 수준으로만 구분합니다.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// 로그 전송 계층에 연결할 수 없음
    #[error("log transport unavailable: {0}")]
    TransportUnavailable(String),

    /// 로그 소스를 찾을 수 없음
    #[error("log source not found: {0}")]
    SourceNotFound(String),

    /// 조회 실패
    #[error("query failed: {0}")]
    Query(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: NfscopeError = ConfigError::InvalidValue {
            field: "server.port".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(err, NfscopeError::Config(_)));
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn transport_error_is_classified() {
        let err: NfscopeError = FlowError::TransportUnavailable("socket refused".to_owned()).into();
        assert!(err.is_transport());

        let err: NfscopeError = FlowError::SourceNotFound("mme".to_owned()).into();
        assert!(!err.is_transport());
    }

    #[test]
    fn io_error_converts_to_top_level() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: NfscopeError = io.into();
        assert!(matches!(err, NfscopeError::Io(_)));
        assert!(!err.is_transport());
    }
}
