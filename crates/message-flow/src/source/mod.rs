//! 로그 소스 추상화 -- "since T 이후 최근 N 라인" 조회 인터페이스
//!
//! [`LogSource`] trait은 컨테이너 런타임의 로그 API를 추상화합니다.
//! 운영 코드는 [`DockerLogSource`]를, 테스트는 mock 구현을 사용합니다.
//!
//! # 아키텍처
//!
//! ```text
//! ┌──────────────────────┐
//! │ MessageFlowAggregator│
//! └──────────┬───────────┘
//!            │
//!            ▼
//!      ┌───────────┐
//!      │ LogSource │ (trait)
//!      └───────────┘
//!         │      │
//!         ▼      ▼
//!   ┌────────┐ ┌──────┐
//!   │ Docker │ │ Mock │
//!   └───┬────┘ └──────┘
//!       │
//!       ▼
//!   Docker Daemon
//! ```

pub mod docker;

pub use docker::{DockerHandle, DockerLogSource};

use std::future::Future;

use futures::stream::BoxStream;

use crate::error::MessageFlowError;

/// 계속 이어지는 로그 라인 스트림
///
/// 스트림 도중의 에러는 항목으로 전달되며, 그 뒤에는 더 읽지 않습니다.
pub type LineStream = BoxStream<'static, Result<String, MessageFlowError>>;

/// 로그 소스 trait
///
/// 반환되는 라인에는 런타임이 붙인 라인별 타임스탬프 접두사가 포함됩니다.
/// 스트림 역다중화(8바이트 프레임 헤더)는 구현체의 책임입니다.
///
/// # 에러 처리
///
/// - 소스가 존재하지 않음: `MessageFlowError::SourceNotFound`
/// - 런타임이 에러 응답을 반환: `MessageFlowError::SourceFetch`
/// - 런타임에 연결할 수 없음: `MessageFlowError::TransportUnavailable`
pub trait LogSource: Send + Sync + 'static {
    /// 소스의 최근 로그 라인을 가져옵니다.
    ///
    /// # Arguments
    ///
    /// - `source_id`: 컨테이너 이름
    /// - `since_ms`: 이 시각(epoch 밀리초) 이후의 라인만 (없으면 제한 없음)
    /// - `tail`: 가져올 최대 라인 수 (가장 최근 것부터)
    fn fetch(
        &self,
        source_id: &str,
        since_ms: Option<i64>,
        tail: usize,
    ) -> impl Future<Output = Result<Vec<String>, MessageFlowError>> + Send;

    /// 런타임 연결 상태를 확인합니다.
    fn ping(&self) -> impl Future<Output = Result<(), MessageFlowError>> + Send;

    /// 최근 `tail` 라인부터 시작해 새로 기록되는 라인을 계속 읽습니다.
    ///
    /// 스트림은 소스가 끝나거나 소비자가 드롭할 때까지 이어집니다.
    /// 기본 구현은 `SourceFetch` 에러를 반환합니다.
    fn follow(
        &self,
        source_id: &str,
        tail: usize,
    ) -> impl Future<Output = Result<LineStream, MessageFlowError>> + Send {
        let _ = tail;
        let source_id = source_id.to_owned();
        async move {
            Err(MessageFlowError::SourceFetch {
                source_id,
                reason: "following is not supported by this source".to_owned(),
            })
        }
    }
}

/// 테스트용 Mock 로그 소스
///
/// 소스별로 고정 라인 또는 에러를 반환합니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockLogSource {
    /// 소스별 반환 라인
    pub lines: std::collections::HashMap<String, Vec<String>>,
    /// 조회 시 실패할 소스와 실패 종류 (true = 전송 계층 실패)
    pub failures: std::collections::HashMap<String, bool>,
    /// ping 실패 여부
    pub offline: bool,
}

#[cfg(test)]
impl MockLogSource {
    /// 빈 mock 소스를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 소스에 라인을 추가합니다.
    pub fn with_lines(mut self, source_id: &str, lines: &[&str]) -> Self {
        self.lines.insert(
            source_id.to_owned(),
            lines.iter().map(|l| (*l).to_owned()).collect(),
        );
        self
    }

    /// 소스 조회가 런타임 에러 응답으로 실패하도록 설정합니다.
    pub fn with_failing_source(mut self, source_id: &str) -> Self {
        self.failures.insert(source_id.to_owned(), false);
        self
    }

    /// 소스 조회가 전송 계층 에러로 실패하도록 설정합니다.
    pub fn with_unreachable_source(mut self, source_id: &str) -> Self {
        self.failures.insert(source_id.to_owned(), true);
        self
    }

    /// ping이 실패하도록 설정합니다.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }
}

#[cfg(test)]
impl LogSource for MockLogSource {
    async fn fetch(
        &self,
        source_id: &str,
        _since_ms: Option<i64>,
        tail: usize,
    ) -> Result<Vec<String>, MessageFlowError> {
        match self.failures.get(source_id) {
            Some(true) => {
                return Err(MessageFlowError::TransportUnavailable(
                    "mock transport failure".to_owned(),
                ));
            }
            Some(false) => {
                return Err(MessageFlowError::SourceFetch {
                    source_id: source_id.to_owned(),
                    reason: "mock failure".to_owned(),
                });
            }
            None => {}
        }

        let lines = self
            .lines
            .get(source_id)
            .ok_or_else(|| MessageFlowError::SourceNotFound {
                source_id: source_id.to_owned(),
            })?;
        let skip = lines.len().saturating_sub(tail);
        Ok(lines[skip..].to_vec())
    }

    async fn ping(&self) -> Result<(), MessageFlowError> {
        if self.offline {
            return Err(MessageFlowError::TransportUnavailable(
                "mock offline".to_owned(),
            ));
        }
        Ok(())
    }

    async fn follow(&self, source_id: &str, tail: usize) -> Result<LineStream, MessageFlowError> {
        use futures::StreamExt;

        let lines = self.fetch(source_id, None, tail).await?;
        Ok(futures::stream::iter(lines.into_iter().map(Ok)).boxed())
    }
}
