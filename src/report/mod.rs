//! 분석 결과 스키마와 파싱
//!
//! LLM 응답은 구조화 JSON을 기대하지만 언제든 자유 텍스트가 올 수 있다.
//! 파싱 실패는 에러가 아니라 원본 텍스트 표시로의 강등이다.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod export;
pub mod render;
pub mod stats;

/// 확인사항 우선순위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// 화면/JSON에 쓰는 한국어 라벨
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "높음",
            Priority::Medium => "보통",
            Priority::Low => "낮음",
        }
    }

    /// 라벨에서 우선순위 해석. 알 수 없는 값은 보통으로 처리해 그룹화에서 누락되지 않게 한다
    pub fn from_label(raw: &str) -> Self {
        match raw.trim() {
            "높음" => Priority::High,
            "낮음" => Priority::Low,
            "보통" => Priority::Medium,
            other => match other.to_ascii_lowercase().as_str() {
                "high" => Priority::High,
                "low" => Priority::Low,
                _ => Priority::Medium,
            },
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Priority::from_label(&raw))
    }
}

/// 구현 전 요청자에게 확인해야 하는 질문 하나
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClarificationItem {
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub question: String,

    #[serde(default)]
    pub reason: String,

    #[serde(default)]
    pub priority: Priority,

    /// 증강 분석에서만 채워지는 매뉴얼 근거
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_reference: Option<String>,
}

/// 매뉴얼 검색 메타데이터
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualSearchInfo {
    pub search_keywords: String,
    pub doc_count: usize,
}

/// 구조화 분석 결과.
///
/// 모든 필드는 기본값을 가진 명시적 스키마다. 키 존재 여부를 호출처마다
/// 검사하는 대신 빈 목록/빈 문자열이 기본값으로 들어온다.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    #[serde(default)]
    pub analysis_summary: String,

    /// 문서 증강이 수행됐을 때만 채워진다
    #[serde(default)]
    pub manual_references: Vec<String>,

    #[serde(default)]
    pub clarification_needed: Vec<ClarificationItem>,

    #[serde(default)]
    pub potential_issues: Vec<String>,

    #[serde(default)]
    pub business_impact: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_search_info: Option<ManualSearchInfo>,
}

/// 파싱 결과. 구조화에 실패한 응답은 원본 텍스트로 강등된다
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedAnalysis {
    Structured(AnalysisReport),
    Raw(String),
}

impl ParsedAnalysis {
    /// 구조화 결과에만 접근한다
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            ParsedAnalysis::Structured(report) => Some(report),
            ParsedAnalysis::Raw(_) => None,
        }
    }

    /// 확인사항 목록. 강등된 결과는 빈 목록으로 취급한다
    pub fn clarifications(&self) -> &[ClarificationItem] {
        self.report()
            .map(|r| r.clarification_needed.as_slice())
            .unwrap_or(&[])
    }

    /// 잠재적 문제점 목록. 강등된 결과는 빈 목록으로 취급한다
    pub fn potential_issues(&self) -> &[String] {
        self.report()
            .map(|r| r.potential_issues.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ParsedAnalysis::Raw(_))
    }
}

/// 구조화 파싱을 시도하고, 실패하면 원본 텍스트로 감싼다. 절대 실패하지 않는다
pub fn parse_analysis_result(raw: &str) -> ParsedAnalysis {
    match serde_json::from_str::<AnalysisReport>(raw) {
        Ok(report) => ParsedAnalysis::Structured(report),
        Err(_) => ParsedAnalysis::Raw(raw.to_string()),
    }
}
