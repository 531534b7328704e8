//! 설정 관리 -- nfscope.toml 파싱 및 런타임 설정
//!
//! [`NfscopeConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`NFSCOPE_SERVER_PORT=8080` 형식)
//! 3. 설정 파일 (`nfscope.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), nfscope_core::error::NfscopeError> {
//! use nfscope_core::config::NfscopeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = NfscopeConfig::load("nfscope.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = NfscopeConfig::parse("[message_flow]\ndefault_tail = 500")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, NfscopeError};

/// 로그 소스 ID 최대 길이
pub const MAX_SOURCE_ID_LEN: usize = 128;

/// 기본 로그 소스 목록 (컨테이너 이름)
pub const DEFAULT_SOURCES: [&str; 7] = ["amf", "ausf", "udm", "smf", "upf", "nrf", "nssf"];

/// 기본 네트워크 기능 엔드포인트 (id, 표시 이름, 상태 확인 URL)
pub const DEFAULT_NETWORK_FUNCTIONS: [(&str, &str, &str); 7] = [
    ("nrf", "NRF", "http://nrf:8080"),
    ("ausf", "AUSF", "http://ausf:8080"),
    ("udm", "UDM", "http://udm:8080"),
    ("nssf", "NSSF", "http://nssf:8080"),
    ("amf", "AMF", "http://amf:8000"),
    ("smf", "SMF", "http://smf:8080"),
    ("upf", "UPF", "http://upf:8080"),
];

/// nfscope 통합 설정
///
/// `nfscope.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NfscopeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// HTTP 조회 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 컨테이너 런타임 연결 설정
    #[serde(default)]
    pub docker: DockerConfig,
    /// 메시지 흐름 재구성 설정
    #[serde(default)]
    pub message_flow: MessageFlowConfig,
    /// 메트릭 익스포터 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// 네트워크 기능 상태 확인 설정
    #[serde(default)]
    pub health: HealthConfig,
}

impl NfscopeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, NfscopeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값에서 시작해 환경변수 오버라이드를 적용합니다.
    ///
    /// 파일이 존재하지만 읽거나 파싱할 수 없으면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, NfscopeError> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(NfscopeError::Config(ConfigError::FileNotFound { path })) => {
                warn!(path = %path, "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, NfscopeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NfscopeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                NfscopeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, NfscopeError> {
        toml::from_str(toml_str).map_err(|e| {
            NfscopeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `NFSCOPE_{SECTION}_{FIELD}`
    /// 예: `NFSCOPE_MESSAGE_FLOW_SOURCES=amf,smf`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "NFSCOPE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "NFSCOPE_GENERAL_LOG_FORMAT");

        // Server
        override_string(
            &mut self.server.listen_addr,
            "NFSCOPE_SERVER_LISTEN_ADDR",
        );
        override_u16(&mut self.server.port, "NFSCOPE_SERVER_PORT");
        override_bool(
            &mut self.server.cors_permissive,
            "NFSCOPE_SERVER_CORS_PERMISSIVE",
        );

        // Docker
        override_string(&mut self.docker.socket_path, "NFSCOPE_DOCKER_SOCKET_PATH");
        override_u64(&mut self.docker.timeout_secs, "NFSCOPE_DOCKER_TIMEOUT_SECS");

        // Message Flow
        override_csv(
            &mut self.message_flow.sources,
            "NFSCOPE_MESSAGE_FLOW_SOURCES",
        );
        override_usize(
            &mut self.message_flow.default_tail,
            "NFSCOPE_MESSAGE_FLOW_DEFAULT_TAIL",
        );
        override_usize(
            &mut self.message_flow.max_tail,
            "NFSCOPE_MESSAGE_FLOW_MAX_TAIL",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "NFSCOPE_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "NFSCOPE_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "NFSCOPE_METRICS_PORT");
        override_string(&mut self.metrics.endpoint, "NFSCOPE_METRICS_ENDPOINT");

        // Health
        override_u64(
            &mut self.health.probe_timeout_ms,
            "NFSCOPE_HEALTH_PROBE_TIMEOUT_MS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), NfscopeError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.server.port == 0 {
            return Err(invalid("server.port", "must be greater than 0"));
        }

        if self.docker.timeout_secs == 0 {
            return Err(invalid("docker.timeout_secs", "must be greater than 0"));
        }

        self.message_flow.validate()?;

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(invalid("metrics.port", "must be greater than 0"));
            }
            if !self.metrics.endpoint.starts_with('/') {
                return Err(invalid("metrics.endpoint", "must start with '/'"));
            }
        }

        self.health.validate()?;

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// HTTP 조회 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인드 주소
    pub listen_addr: String,
    /// 바인드 포트
    pub port: u16,
    /// 모든 origin 허용 여부 (뷰어가 다른 origin에서 폴링할 때 필요)
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_owned(),
            port: 3000,
            cors_permissive: true,
        }
    }
}

/// 컨테이너 런타임 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Docker 소켓 경로 (빈 문자열이면 플랫폼 기본 로컬 소켓)
    pub socket_path: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket_path: String::new(),
            timeout_secs: 120,
        }
    }
}

/// 메시지 흐름 재구성 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageFlowConfig {
    /// 조회할 로그 소스 (컨테이너 이름)
    pub sources: Vec<String>,
    /// 소스당 기본 tail 라인 수
    pub default_tail: usize,
    /// 요청이 지정할 수 있는 최대 tail 라인 수
    pub max_tail: usize,
}

impl Default for MessageFlowConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| (*s).to_owned()).collect(),
            default_tail: 2000,
            max_tail: 10_000,
        }
    }
}

impl MessageFlowConfig {
    /// 메시지 흐름 섹션의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), NfscopeError> {
        if self.sources.is_empty() {
            return Err(invalid(
                "message_flow.sources",
                "at least one source is required",
            ));
        }

        for (i, source) in self.sources.iter().enumerate() {
            if !is_valid_source_id(source) {
                return Err(invalid(
                    "message_flow.sources",
                    format!(
                        "invalid source id '{source}': expected 1-{MAX_SOURCE_ID_LEN} characters of [A-Za-z0-9_.-]"
                    ),
                ));
            }
            if self.sources[..i].contains(source) {
                return Err(invalid(
                    "message_flow.sources",
                    format!("duplicate source id '{source}'"),
                ));
            }
        }

        if self.default_tail == 0 {
            return Err(invalid("message_flow.default_tail", "must be greater than 0"));
        }

        if self.default_tail > self.max_tail {
            return Err(invalid(
                "message_flow.default_tail",
                format!("must not exceed max_tail ({})", self.max_tail),
            ));
        }

        Ok(())
    }
}

/// 메트릭 익스포터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 익스포터 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 바인드 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

/// 네트워크 기능 상태 확인 설정
///
/// ```toml
/// [health]
/// probe_timeout_ms = 3000
///
/// [[health.network_functions]]
/// id = "amf"
/// name = "AMF"
/// url = "http://amf:8000"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// NF 하나당 상태 확인 타임아웃 (밀리초)
    pub probe_timeout_ms: u64,
    /// 상태를 확인할 네트워크 기능 목록
    pub network_functions: Vec<NetworkFunctionConfig>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 3000,
            network_functions: DEFAULT_NETWORK_FUNCTIONS
                .iter()
                .map(|(id, name, url)| NetworkFunctionConfig {
                    id: (*id).to_owned(),
                    name: (*name).to_owned(),
                    url: (*url).to_owned(),
                })
                .collect(),
        }
    }
}

impl HealthConfig {
    /// 상태 확인 섹션의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), NfscopeError> {
        if self.probe_timeout_ms == 0 {
            return Err(invalid("health.probe_timeout_ms", "must be greater than 0"));
        }

        for (i, nf) in self.network_functions.iter().enumerate() {
            if !is_valid_source_id(&nf.id) {
                return Err(invalid(
                    "health.network_functions",
                    format!("invalid id '{}'", nf.id),
                ));
            }
            if self.network_functions[..i].iter().any(|other| other.id == nf.id) {
                return Err(invalid(
                    "health.network_functions",
                    format!("duplicate id '{}'", nf.id),
                ));
            }
            if !(nf.url.starts_with("http://") || nf.url.starts_with("https://")) {
                return Err(invalid(
                    "health.network_functions",
                    format!("url for '{}' must start with http:// or https://", nf.id),
                ));
            }
        }

        Ok(())
    }

    /// id로 네트워크 기능을 찾습니다.
    pub fn find(&self, id: &str) -> Option<&NetworkFunctionConfig> {
        self.network_functions.iter().find(|nf| nf.id == id)
    }
}

/// 상태를 확인할 네트워크 기능 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkFunctionConfig {
    /// 식별자 (보통 컨테이너 이름과 같음)
    pub id: String,
    /// 표시 이름 (비어 있으면 id를 대문자로)
    #[serde(default)]
    pub name: String,
    /// 상태 확인 URL
    pub url: String,
}

impl NetworkFunctionConfig {
    /// 표시 이름
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.id.to_uppercase()
        } else {
            self.name.clone()
        }
    }
}

/// 로그 소스 ID가 컨테이너 이름으로 안전한지 확인합니다.
///
/// 허용: 1~128자의 `[A-Za-z0-9_.-]`
pub fn is_valid_source_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SOURCE_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}

fn invalid(field: &str, reason: impl Into<String>) -> NfscopeError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = NfscopeConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.cors_permissive);
        assert!(config.docker.socket_path.is_empty());
        assert_eq!(config.docker.timeout_secs, 120);
        assert_eq!(
            config.message_flow.sources,
            vec!["amf", "ausf", "udm", "smf", "upf", "nrf", "nssf"]
        );
        assert_eq!(config.message_flow.default_tail, 2000);
        assert!(!config.metrics.enabled);
        assert_eq!(config.health.probe_timeout_ms, 3000);
        assert_eq!(config.health.network_functions.len(), 7);
        assert_eq!(
            config.health.find("amf").map(|nf| nf.url.as_str()),
            Some("http://amf:8000")
        );
    }

    #[test]
    fn zero_probe_timeout_is_rejected() {
        let mut config = NfscopeConfig::default();
        config.health.probe_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn network_function_name_defaults_to_upper_id() {
        let nf = NetworkFunctionConfig {
            id: "nssf".to_owned(),
            name: String::new(),
            url: "http://nssf:8080".to_owned(),
        };
        assert_eq!(nf.display_name(), "NSSF");
    }

    #[test]
    fn default_config_passes_validation() {
        NfscopeConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = NfscopeConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.message_flow.max_tail, 10_000);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[server]
port = 8080

[message_flow]
sources = ["amf", "smf"]
"#;
        let config = NfscopeConfig::parse(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        // listen_addr는 기본값 유지
        assert_eq!(config.server.listen_addr, "0.0.0.0");
        assert_eq!(config.message_flow.sources, vec!["amf", "smf"]);
        assert_eq!(config.message_flow.default_tail, 2000);
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = NfscopeConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            NfscopeError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = NfscopeConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = NfscopeConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_zero_port() {
        let mut config = NfscopeConfig::default();
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = NfscopeConfig::default();
        config.docker.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn validate_rejects_empty_sources() {
        let mut config = NfscopeConfig::default();
        config.message_flow.sources.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least one source"));
    }

    #[test]
    fn validate_rejects_duplicate_sources() {
        let mut config = NfscopeConfig::default();
        config.message_flow.sources = vec!["amf".to_owned(), "smf".to_owned(), "amf".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate source id 'amf'"));
    }

    #[test]
    fn validate_rejects_unsafe_source_id() {
        let mut config = NfscopeConfig::default();
        config.message_flow.sources = vec!["amf/../etc".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid source id"));
    }

    #[test]
    fn validate_rejects_zero_default_tail() {
        let mut config = NfscopeConfig::default();
        config.message_flow.default_tail = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_tail"));
    }

    #[test]
    fn validate_rejects_default_tail_above_max() {
        let mut config = NfscopeConfig::default();
        config.message_flow.default_tail = 20_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_tail"));
    }

    #[test]
    fn validate_checks_metrics_only_when_enabled() {
        let mut config = NfscopeConfig::default();
        config.metrics.endpoint = "metrics".to_owned();
        config.validate().unwrap();

        config.metrics.enabled = true;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("metrics.endpoint"));
    }

    #[test]
    fn source_id_rules() {
        assert!(is_valid_source_id("amf"));
        assert!(is_valid_source_id("open5gs-amf_1.local"));
        assert!(!is_valid_source_id(""));
        assert!(!is_valid_source_id("amf smf"));
        assert!(!is_valid_source_id("amf;rm"));
        assert!(is_valid_source_id(&"a".repeat(MAX_SOURCE_ID_LEN)));
        assert!(!is_valid_source_id(&"a".repeat(MAX_SOURCE_ID_LEN + 1)));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NFSCOPE_STR", "overridden") };
        override_string(&mut val, "TEST_NFSCOPE_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_NFSCOPE_STR") };
    }

    #[test]
    #[serial]
    fn env_override_u16_invalid_keeps_original() {
        let mut val = 3000u16;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NFSCOPE_U16_BAD", "70000") };
        override_u16(&mut val, "TEST_NFSCOPE_U16_BAD");
        assert_eq!(val, 3000);
        unsafe { std::env::remove_var("TEST_NFSCOPE_U16_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NFSCOPE_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_NFSCOPE_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_NFSCOPE_BOOL_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_csv_skips_empty_items() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NFSCOPE_CSV", "amf, smf,,upf ") };
        override_csv(&mut val, "TEST_NFSCOPE_CSV");
        assert_eq!(val, vec!["amf", "smf", "upf"]);
        unsafe { std::env::remove_var("TEST_NFSCOPE_CSV") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_NFSCOPE_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = NfscopeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = NfscopeConfig::parse(&toml_str).unwrap();
        assert_eq!(config.message_flow.sources, parsed.message_flow.sources);
        assert_eq!(config.metrics.endpoint, parsed.metrics.endpoint);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = NfscopeConfig::from_file("/nonexistent/path/nfscope.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NfscopeError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    #[serial]
    async fn load_or_default_falls_back_when_missing() {
        let config = NfscopeConfig::load_or_default("/nonexistent/path/nfscope.toml")
            .await
            .unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
