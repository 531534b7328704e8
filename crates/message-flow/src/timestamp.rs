//! 타임스탬프 추출 -- 로그 라인 정제 및 선행 ISO-8601 시각 추출
//!
//! 컨테이너 런타임은 `timestamps` 옵션으로 각 라인 앞에
//! `2025-01-01T00:00:01.123456789Z` 형식의 시각을 붙입니다.
//! [`TimestampExtractor`]는 ANSI 색상 코드와 제어 바이트를 제거한 뒤
//! 이 접두사를 추출하고 epoch 밀리초로 변환합니다.

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::MessageFlowError;

const ANSI_PATTERN: &str = r"\x1b\[[0-9;]*m";
const CONTROL_PATTERN: &str = r"[\x00-\x08]";
const TIMESTAMP_PATTERN: &str = r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z?)";

/// 타임스탬프 추출기
///
/// 정규식은 생성 시 한 번만 컴파일합니다. 모든 메서드는 순수 함수입니다.
#[derive(Debug, Clone)]
pub struct TimestampExtractor {
    ansi: Regex,
    control: Regex,
    timestamp: Regex,
}

impl TimestampExtractor {
    /// 새 추출기를 생성합니다.
    pub fn new() -> Result<Self, MessageFlowError> {
        Ok(Self {
            ansi: compile("timestamp.ansi", ANSI_PATTERN)?,
            control: compile("timestamp.control", CONTROL_PATTERN)?,
            timestamp: compile("timestamp.iso8601", TIMESTAMP_PATTERN)?,
        })
    }

    /// ANSI 이스케이프 시퀀스와 NUL..BS 제어 바이트를 제거하고 앞뒤 공백을 자릅니다.
    pub fn clean_line(&self, raw: &str) -> String {
        let without_ansi = self.ansi.replace_all(raw, "");
        self.control
            .replace_all(&without_ansi, "")
            .trim()
            .to_owned()
    }

    /// 정제된 라인의 선행 타임스탬프 문자열을 반환합니다.
    ///
    /// 타임스탬프가 라인 맨 앞에 없으면 `None`입니다.
    pub fn extract<'a>(&self, clean: &'a str) -> Option<&'a str> {
        self.timestamp
            .captures(clean)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// 원시 라인을 정제한 뒤 타임스탬프를 추출합니다.
    pub fn extract_raw(&self, raw: &str) -> Option<String> {
        let clean = self.clean_line(raw);
        self.extract(&clean).map(str::to_owned)
    }
}

/// 타임스탬프 문자열을 epoch 밀리초로 변환합니다.
///
/// 끝의 `Z`가 없어도 UTC로 해석합니다. 달력상 존재하지 않는 시각이면 `None`입니다.
pub fn parse_millis(timestamp: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(timestamp.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

fn compile(name: &str, pattern: &str) -> Result<Regex, MessageFlowError> {
    Regex::new(pattern).map_err(|e| MessageFlowError::Pattern {
        rule: name.to_owned(),
        reason: e.to_string(),
    })
}
