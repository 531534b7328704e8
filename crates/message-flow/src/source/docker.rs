//! Docker 로그 소스 -- bollard 기반 [`LogSource`] 구현
//!
//! [`DockerHandle`]은 프로세스 전역에서 공유하는 런타임 클라이언트 핸들입니다.
//! 첫 조회 시 지연 연결하고, 이후 재사용하며, 종료 시 [`DockerHandle::release`]로 해제합니다.
//!
//! # 소스 ID 검증
//!
//! 컨테이너 이름으로 쓰이는 소스 ID는 API 호출 전에 검증합니다:
//! - 1~128자
//! - `[A-Za-z0-9_.-]` 문자만 허용

use std::sync::Arc;
use std::time::Duration;

use bollard::container::{LogOutput, LogsOptions};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use nfscope_core::config::{DockerConfig, is_valid_source_id};

use super::{LineStream, LogSource};
use crate::error::MessageFlowError;

/// 공유 Docker 클라이언트 핸들
///
/// 연결은 [`acquire`](Self::acquire) 첫 호출 시 생성되어 캐시됩니다.
pub struct DockerHandle {
    /// 소켓 경로 (`None`이면 플랫폼 기본 로컬 소켓)
    socket_path: Option<String>,
    /// 요청 타임아웃
    timeout: Duration,
    /// 캐시된 클라이언트
    client: Mutex<Option<Arc<bollard::Docker>>>,
}

impl DockerHandle {
    /// 플랫폼 기본 로컬 소켓을 사용하는 핸들을 생성합니다.
    pub fn local(timeout_secs: u64) -> Self {
        Self {
            socket_path: None,
            timeout: Duration::from_secs(timeout_secs),
            client: Mutex::new(None),
        }
    }

    /// 지정한 소켓 경로를 사용하는 핸들을 생성합니다.
    pub fn with_socket(socket_path: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            socket_path: Some(socket_path.into()),
            timeout: Duration::from_secs(timeout_secs),
            client: Mutex::new(None),
        }
    }

    /// `[docker]` 설정 섹션으로 핸들을 생성합니다.
    pub fn from_config(config: &DockerConfig) -> Self {
        if config.socket_path.is_empty() {
            Self::local(config.timeout_secs)
        } else {
            Self::with_socket(config.socket_path.clone(), config.timeout_secs)
        }
    }

    /// 요청 타임아웃
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 클라이언트를 반환합니다. 아직 연결하지 않았다면 지금 연결합니다.
    ///
    /// # Errors
    ///
    /// 클라이언트를 만들 수 없으면 `MessageFlowError::TransportUnavailable`
    pub async fn acquire(&self) -> Result<Arc<bollard::Docker>, MessageFlowError> {
        let mut guard = self.client.lock().await;
        if let Some(docker) = guard.as_ref() {
            return Ok(Arc::clone(docker));
        }

        let docker = match &self.socket_path {
            Some(path) => bollard::Docker::connect_with_socket(
                path,
                self.timeout.as_secs(),
                bollard::API_DEFAULT_VERSION,
            )
            .map_err(|e| {
                MessageFlowError::TransportUnavailable(format!(
                    "failed to connect to docker at {path}: {e}"
                ))
            })?,
            None => bollard::Docker::connect_with_local_defaults()
                .map_err(|e| {
                    MessageFlowError::TransportUnavailable(format!(
                        "failed to connect to docker: {e}"
                    ))
                })?
                .with_timeout(self.timeout),
        };

        info!(
            socket = self.socket_path.as_deref().unwrap_or("<local default>"),
            "docker client connected"
        );
        let docker = Arc::new(docker);
        *guard = Some(Arc::clone(&docker));
        Ok(docker)
    }

    /// 캐시된 클라이언트를 해제합니다.
    ///
    /// 해제할 클라이언트가 있었으면 `true`를 반환합니다.
    /// 진행 중인 조회가 들고 있는 참조는 그 조회가 끝날 때 함께 해제됩니다.
    pub async fn release(&self) -> bool {
        let released = self.client.lock().await.take().is_some();
        if released {
            info!("docker client released");
        }
        released
    }

    /// 현재 연결이 캐시되어 있는지 확인합니다.
    pub async fn is_connected(&self) -> bool {
        self.client.lock().await.is_some()
    }
}

/// Docker 컨테이너 로그를 읽는 로그 소스
pub struct DockerLogSource {
    handle: Arc<DockerHandle>,
}

impl DockerLogSource {
    /// 공유 핸들로 로그 소스를 생성합니다.
    pub fn new(handle: Arc<DockerHandle>) -> Self {
        Self { handle }
    }

    /// 공유 핸들
    pub fn handle(&self) -> &Arc<DockerHandle> {
        &self.handle
    }

    async fn collect_lines(
        &self,
        source_id: &str,
        since_ms: Option<i64>,
        tail: usize,
    ) -> Result<Vec<String>, MessageFlowError> {
        let docker = self.handle.acquire().await?;

        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            timestamps: true,
            tail: tail.to_string(),
            since: since_ms.map(|ms| ms.div_euclid(1000)).unwrap_or(0),
            ..Default::default()
        };

        let mut stream = std::pin::pin!(docker.logs(source_id, Some(options)));
        let mut lines = Vec::new();
        while let Some(frame) = stream.next().await {
            let frame = frame.map_err(|e| map_docker_error(source_id, e))?;
            push_frame_lines(&mut lines, frame);
        }
        Ok(lines)
    }
}

impl LogSource for DockerLogSource {
    async fn fetch(
        &self,
        source_id: &str,
        since_ms: Option<i64>,
        tail: usize,
    ) -> Result<Vec<String>, MessageFlowError> {
        if !is_valid_source_id(source_id) {
            return Err(MessageFlowError::InvalidSource(source_id.to_owned()));
        }

        let timeout = self.handle.timeout();
        let lines = tokio::time::timeout(timeout, self.collect_lines(source_id, since_ms, tail))
            .await
            .map_err(|_| {
                MessageFlowError::TransportUnavailable(format!(
                    "timed out after {}s fetching logs from '{source_id}'",
                    timeout.as_secs()
                ))
            })??;

        debug!(source_id, lines = lines.len(), "fetched container logs");
        Ok(lines)
    }

    async fn follow(&self, source_id: &str, tail: usize) -> Result<LineStream, MessageFlowError> {
        if !is_valid_source_id(source_id) {
            return Err(MessageFlowError::InvalidSource(source_id.to_owned()));
        }

        let docker = self.handle.acquire().await?;
        let options = LogsOptions::<String> {
            follow: true,
            stdout: true,
            stderr: true,
            timestamps: true,
            tail: tail.to_string(),
            ..Default::default()
        };

        let owner = source_id.to_owned();
        let lines = docker.logs(source_id, Some(options)).flat_map(move |frame| {
            let items: Vec<Result<String, MessageFlowError>> = match frame {
                Ok(frame) => {
                    let mut lines = Vec::new();
                    push_frame_lines(&mut lines, frame);
                    lines.into_iter().map(Ok).collect()
                }
                Err(e) => vec![Err(map_docker_error(&owner, e))],
            };
            futures::stream::iter(items)
        });

        debug!(source_id, tail, "following container logs");
        Ok(lines.boxed())
    }

    async fn ping(&self) -> Result<(), MessageFlowError> {
        let docker = self.handle.acquire().await?;
        docker
            .ping()
            .await
            .map_err(|e| MessageFlowError::TransportUnavailable(format!("ping failed: {e}")))?;
        Ok(())
    }
}

/// 역다중화된 로그 프레임을 라인 단위로 나눠 추가합니다.
///
/// 빈 라인은 버리고 stdin 프레임은 무시합니다.
fn push_frame_lines(lines: &mut Vec<String>, frame: LogOutput) {
    let message = match frame {
        LogOutput::StdOut { message }
        | LogOutput::StdErr { message }
        | LogOutput::Console { message } => message,
        LogOutput::StdIn { .. } => return,
    };

    let text = String::from_utf8_lossy(&message);
    lines.extend(
        text.split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned),
    );
}

/// bollard 에러를 도메인 에러로 변환합니다.
///
/// - 404 응답: `SourceNotFound`
/// - 기타 에러 응답: `SourceFetch`
/// - 연결/전송 실패: `TransportUnavailable`
fn map_docker_error(source_id: &str, err: bollard::errors::Error) -> MessageFlowError {
    match err {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => MessageFlowError::SourceNotFound {
            source_id: source_id.to_owned(),
        },
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } => MessageFlowError::SourceFetch {
            source_id: source_id.to_owned(),
            reason: format!("{status_code}: {message}"),
        },
        other => MessageFlowError::TransportUnavailable(other.to_string()),
    }
}
