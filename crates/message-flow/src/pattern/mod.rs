//! 분류 패턴 라이브러리 -- 로그 라인을 프로토콜 이벤트 초안으로 바꾸는 규칙 목록
//!
//! 각 [`PatternRule`]은 정규식 매처와 빌더 함수의 쌍입니다.
//! [`PatternLibrary`]는 규칙을 선언 순서대로 보관하며 첫 번째 매칭 규칙이 이깁니다.
//! 구체적인 규칙이 일반적인 대체 규칙보다 앞에 와야 하므로
//! 키 기반 맵이 아닌 순서 있는 `Vec`으로 유지합니다.
//!
//! # 평가 순서
//! NGAP -> NAS -> HTTP -> PFCP
//!
//! # 규칙 추가
//! 새 메시지 타입은 해당 계열 모듈에 규칙 항목 하나만 추가하면 됩니다.
//!
//! ```ignore
//! PatternRule::new(
//!     "ngap.ng_reset",
//!     ProtocolFamily::Ngap,
//!     r"(?i)Processing NG Reset",
//!     |_| EventDraft::new(Gnb, Amf, MessageType::Ngap, "NG Reset", Indication),
//! )?
//! ```

mod http;
mod nas;
mod ngap;
mod pfcp;

use std::collections::BTreeMap;
use std::fmt;

use regex::{Captures, Regex};

use nfscope_core::types::{MessageDirection, MessageType, NetworkEntity};

use crate::error::MessageFlowError;

pub use http::destination_for_path;

/// 규칙 빌더 함수 -- 매칭된 캡처 그룹으로부터 이벤트 초안을 만듭니다.
pub type BuildFn = fn(&Captures<'_>) -> EventDraft;

/// 규칙이 속한 프로토콜 계열 (평가 그룹)
///
/// 결과 이벤트의 `messageType`과 항상 같지는 않습니다.
/// 예를 들어 PFCP 그룹의 Create SM Context 규칙은 HTTP 이벤트를 만듭니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolFamily {
    /// NGAP 규칙 그룹
    Ngap,
    /// NAS 규칙 그룹
    Nas,
    /// HTTP(SBI) 규칙 그룹
    Http,
    /// PFCP 규칙 그룹
    Pfcp,
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ngap => write!(f, "ngap"),
            Self::Nas => write!(f, "nas"),
            Self::Http => write!(f, "http"),
            Self::Pfcp => write!(f, "pfcp"),
        }
    }
}

/// 프로토콜 이벤트 초안 -- 규칙 빌더의 출력
///
/// id와 타임스탬프가 붙기 전의 구조적 필드만 담습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// 출발지 엔티티
    pub source: NetworkEntity,
    /// 목적지 엔티티
    pub destination: NetworkEntity,
    /// 메시지 타입
    pub message_type: MessageType,
    /// 메시지 이름
    pub message_name: String,
    /// 메시지 방향
    pub direction: MessageDirection,
    /// 캡처에서 추출한 하위 필드
    pub details: Option<BTreeMap<String, String>>,
}

impl EventDraft {
    /// 하위 필드 없는 초안을 생성합니다.
    pub fn new(
        source: NetworkEntity,
        destination: NetworkEntity,
        message_type: MessageType,
        message_name: impl Into<String>,
        direction: MessageDirection,
    ) -> Self {
        Self {
            source,
            destination,
            message_type,
            message_name: message_name.into(),
            direction,
            details: None,
        }
    }

    /// 하위 필드 하나를 추가합니다.
    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_owned(), value.into());
        self
    }
}

/// 분류 규칙 -- 매처와 빌더의 쌍
///
/// 생성 후 변경되지 않습니다.
#[derive(Clone)]
pub struct PatternRule {
    name: &'static str,
    family: ProtocolFamily,
    regex: Regex,
    build: BuildFn,
}

impl PatternRule {
    /// 규칙을 생성하고 정규식을 컴파일합니다.
    ///
    /// 대소문자 무시 등 플래그는 패턴 안에 `(?i)` 형태로 지정합니다.
    pub fn new(
        name: &'static str,
        family: ProtocolFamily,
        pattern: &str,
        build: BuildFn,
    ) -> Result<Self, MessageFlowError> {
        let regex = Regex::new(pattern).map_err(|e| MessageFlowError::Pattern {
            rule: name.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name,
            family,
            regex,
            build,
        })
    }

    /// 규칙 이름
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 규칙 그룹
    pub fn family(&self) -> ProtocolFamily {
        self.family
    }

    /// 정규식 원문
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// 라인에 매칭되면 빌더 출력을 반환합니다.
    pub fn apply(&self, line: &str) -> Option<EventDraft> {
        self.regex.captures(line).map(|caps| (self.build)(&caps))
    }
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRule")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("pattern", &self.regex.as_str())
            .finish()
    }
}

/// 순서 있는 분류 규칙 목록
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    /// 등록된 규칙 (선언 순서대로 평가)
    rules: Vec<PatternRule>,
}

impl PatternLibrary {
    /// 빈 라이브러리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 표준 규칙 세트 (NGAP, NAS, HTTP, PFCP 순)로 라이브러리를 생성합니다.
    pub fn standard() -> Result<Self, MessageFlowError> {
        let mut rules = ngap::rules()?;
        rules.extend(nas::rules()?);
        rules.extend(http::rules()?);
        rules.extend(pfcp::rules()?);
        Ok(Self { rules })
    }

    /// 규칙을 목록 끝에 추가합니다. 추가 순서대로 평가됩니다.
    pub fn register(mut self, rule: PatternRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// 첫 번째로 매칭되는 규칙과 그 빌더 출력을 반환합니다.
    pub fn first_match(&self, line: &str) -> Option<(&PatternRule, EventDraft)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(line).map(|draft| (rule, draft)))
    }

    /// 등록된 규칙 (평가 순서)
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// 등록된 규칙 수
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 규칙이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// 캡처 그룹 값을 가져옵니다. 그룹이 비어 있으면 빈 문자열입니다.
fn group<'a>(caps: &'a Captures<'_>, index: usize) -> &'a str {
    caps.get(index).map(|m| m.as_str()).unwrap_or_default()
}
