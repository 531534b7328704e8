//! 네트워크 기능 상태 확인 -- NF 엔드포인트별 HTTP 프로브
//!
//! [`NfHealthChecker`]는 설정된 각 NF의 URL에 요청을 보내고 응답 코드로 상태를 판정합니다.
//! 200~499 응답은 online, 5xx 응답이나 연결 실패와 타임아웃은 offline입니다.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use metrics::counter;
use serde::Serialize;
use tracing::debug;

use nfscope_core::config::{HealthConfig, NetworkFunctionConfig};
use nfscope_core::metrics as m;

use crate::error::MessageFlowError;

/// NF 엔드포인트 프로브 trait
///
/// 운영 코드는 [`HttpNfProbe`]를, 테스트는 응답 코드를 고정한 구현을 사용합니다.
/// 타임아웃은 [`NfHealthChecker`]가 적용합니다.
pub trait NfProbe: Send + Sync + 'static {
    /// URL에 요청을 보내고 HTTP 상태 코드를 반환합니다.
    fn probe(&self, url: &str) -> impl Future<Output = Result<u16, MessageFlowError>> + Send;
}

/// reqwest 기반 HTTP 프로브
#[derive(Debug, Clone)]
pub struct HttpNfProbe {
    client: reqwest::Client,
}

impl HttpNfProbe {
    /// HTTP 클라이언트를 생성합니다.
    ///
    /// # Errors
    ///
    /// TLS 백엔드 초기화에 실패하면 `MessageFlowError::Config`
    pub fn new() -> Result<Self, MessageFlowError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("nfscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MessageFlowError::Config {
                field: "health".to_owned(),
                reason: format!("failed to build http client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl NfProbe for HttpNfProbe {
    async fn probe(&self, url: &str) -> Result<u16, MessageFlowError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| MessageFlowError::Probe {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(response.status().as_u16())
    }
}

/// NF 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NfState {
    Online,
    Offline,
}

impl NfState {
    /// HTTP 상태 코드로 NF 상태를 판정합니다.
    pub fn from_status_code(code: u16) -> Self {
        if (200..500).contains(&code) {
            Self::Online
        } else {
            Self::Offline
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for NfState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NF 하나의 상태 확인 결과
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NfStatus {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: NfState,
    /// 응답을 받은 경우 HTTP 상태 코드
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// 응답을 받지 못한 사유
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 프로브 소요 시간 (밀리초)
    pub latency_ms: u64,
}

impl NfStatus {
    pub fn is_online(&self) -> bool {
        self.status == NfState::Online
    }
}

/// 설정된 NF 전체의 상태 확인기
pub struct NfHealthChecker<P: NfProbe> {
    probe: Arc<P>,
    functions: Vec<NetworkFunctionConfig>,
    timeout: Duration,
}

impl<P: NfProbe> NfHealthChecker<P> {
    /// `[health]` 설정으로 상태 확인기를 생성합니다.
    pub fn new(probe: Arc<P>, config: &HealthConfig) -> Self {
        Self {
            probe,
            functions: config.network_functions.clone(),
            timeout: Duration::from_millis(config.probe_timeout_ms),
        }
    }

    /// 설정된 NF 목록
    pub fn functions(&self) -> &[NetworkFunctionConfig] {
        &self.functions
    }

    /// NF 하나당 타임아웃
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 모든 NF를 동시에 확인합니다. 결과는 설정 순서를 따릅니다.
    pub async fn check_all(&self) -> Vec<NfStatus> {
        join_all(self.functions.iter().map(|nf| self.check(nf))).await
    }

    /// id로 NF 하나를 확인합니다. 설정에 없는 id면 `None`입니다.
    pub async fn check_one(&self, id: &str) -> Option<NfStatus> {
        let nf = self.functions.iter().find(|nf| nf.id == id)?;
        Some(self.check(nf).await)
    }

    async fn check(&self, nf: &NetworkFunctionConfig) -> NfStatus {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.probe.probe(&nf.url)).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let (status, http_status, error) = match outcome {
            Ok(Ok(code)) => (NfState::from_status_code(code), Some(code), None),
            Ok(Err(e)) => (NfState::Offline, None, Some(e.to_string())),
            Err(_) => (
                NfState::Offline,
                None,
                Some(format!("timed out after {}ms", self.timeout.as_millis())),
            ),
        };

        counter!(
            m::NF_HEALTH_PROBES_TOTAL,
            m::LABEL_NF => nf.id.clone(),
            m::LABEL_STATUS => status.as_str()
        )
        .increment(1);
        debug!(nf = %nf.id, url = %nf.url, %status, latency_ms, "network function probed");

        NfStatus {
            id: nf.id.clone(),
            name: nf.display_name(),
            url: nf.url.clone(),
            status,
            http_status,
            error,
            latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// URL별로 고정 응답을 돌려주는 프로브
    #[derive(Default)]
    struct FixedProbe {
        codes: HashMap<String, u16>,
        hang: Vec<String>,
    }

    impl NfProbe for FixedProbe {
        async fn probe(&self, url: &str) -> Result<u16, MessageFlowError> {
            if self.hang.iter().any(|u| u == url) {
                std::future::pending::<()>().await;
            }
            self.codes
                .get(url)
                .copied()
                .ok_or_else(|| MessageFlowError::Probe {
                    url: url.to_owned(),
                    reason: "connection refused".to_owned(),
                })
        }
    }

    fn nf(id: &str, url: &str) -> NetworkFunctionConfig {
        NetworkFunctionConfig {
            id: id.to_owned(),
            name: String::new(),
            url: url.to_owned(),
        }
    }

    fn checker(probe: FixedProbe, functions: Vec<NetworkFunctionConfig>) -> NfHealthChecker<FixedProbe> {
        let config = HealthConfig {
            probe_timeout_ms: 3000,
            network_functions: functions,
        };
        NfHealthChecker::new(Arc::new(probe), &config)
    }

    #[test]
    fn status_code_ranges() {
        assert_eq!(NfState::from_status_code(200), NfState::Online);
        assert_eq!(NfState::from_status_code(404), NfState::Online);
        assert_eq!(NfState::from_status_code(499), NfState::Online);
        assert_eq!(NfState::from_status_code(500), NfState::Offline);
        assert_eq!(NfState::from_status_code(503), NfState::Offline);
        assert_eq!(NfState::from_status_code(199), NfState::Offline);
    }

    #[tokio::test]
    async fn check_all_keeps_config_order_and_reports_each_state() {
        // Given: amf는 404, smf는 503, upf는 연결 거부
        let probe = FixedProbe {
            codes: HashMap::from([
                ("http://amf:8000".to_owned(), 404),
                ("http://smf:8080".to_owned(), 503),
            ]),
            ..FixedProbe::default()
        };
        let checker = checker(
            probe,
            vec![
                nf("amf", "http://amf:8000"),
                nf("smf", "http://smf:8080"),
                nf("upf", "http://upf:8080"),
            ],
        );

        // When
        let statuses = checker.check_all().await;

        // Then
        let ids: Vec<&str> = statuses.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["amf", "smf", "upf"]);
        assert!(statuses[0].is_online());
        assert_eq!(statuses[0].http_status, Some(404));
        assert_eq!(statuses[0].name, "AMF");
        assert_eq!(statuses[1].status, NfState::Offline);
        assert_eq!(statuses[1].http_status, Some(503));
        assert_eq!(statuses[2].status, NfState::Offline);
        assert!(statuses[2].error.as_deref().is_some_and(|e| e.contains("connection refused")));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_endpoint_is_offline_after_timeout() {
        let probe = FixedProbe {
            hang: vec!["http://nrf:8080".to_owned()],
            ..FixedProbe::default()
        };
        let checker = checker(probe, vec![nf("nrf", "http://nrf:8080")]);

        let status = checker.check_one("nrf").await.expect("nrf configured");

        assert_eq!(status.status, NfState::Offline);
        assert_eq!(status.error.as_deref(), Some("timed out after 3000ms"));
    }

    #[tokio::test]
    async fn check_one_unknown_id_is_none() {
        let checker = checker(FixedProbe::default(), vec![nf("amf", "http://amf:8000")]);

        assert!(checker.check_one("pcf").await.is_none());
    }

    #[test]
    fn status_serializes_camel_case() {
        let status = NfStatus {
            id: "amf".to_owned(),
            name: "AMF".to_owned(),
            url: "http://amf:8000".to_owned(),
            status: NfState::Online,
            http_status: Some(200),
            error: None,
            latency_ms: 4,
        };

        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["status"], "online");
        assert_eq!(json["httpStatus"], 200);
        assert_eq!(json["latencyMs"], 4);
        assert!(json.get("error").is_none());
    }
}
