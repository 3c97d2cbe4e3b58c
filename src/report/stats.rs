//! 요약 통계와 분석 인사이트

use serde::{Deserialize, Serialize};

use crate::report::{ParsedAnalysis, Priority};

/// 분석 결과 요약 통계. 저장하지 않고 (요구사항, 분석 결과) 쌍에서 매번 새로 계산한다
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// 요구사항 글자 수
    pub requirement_length: usize,

    /// 요구사항 단어 수
    pub requirement_words: usize,

    /// 확인사항 개수
    pub clarifications_count: usize,

    /// 잠재적 문제점 개수
    pub issues_count: usize,

    /// 긴급(높음) 확인사항 개수
    pub high_priority_count: usize,
}

impl SummaryStats {
    /// 순수 함수. 강등된 결과는 확인사항/문제점 0건으로 취급한다
    pub fn compute(requirement: &str, analysis: &ParsedAnalysis) -> Self {
        let mut stats = Self {
            requirement_length: requirement.chars().count(),
            requirement_words: requirement.split_whitespace().count(),
            ..Self::default()
        };

        if let Some(report) = analysis.report() {
            stats.clarifications_count = report.clarification_needed.len();
            stats.issues_count = report.potential_issues.len();
            stats.high_priority_count = report
                .clarification_needed
                .iter()
                .filter(|item| item.priority == Priority::High)
                .count();
        }

        stats
    }
}

/// 통계에서 인사이트 문구를 도출한다.
///
/// 규칙은 각각 독립적으로 평가되며 출력 순서는 고정이다. 여러 규칙이
/// 동시에 발화할 수 있다.
pub fn analysis_insights(stats: &SummaryStats) -> Vec<String> {
    let mut insights = Vec::new();

    if stats.high_priority_count > 3 {
        insights.push(
            "🔴 긴급 확인사항이 많습니다. 요구사항을 더 구체화할 필요가 있어 보입니다."
                .to_string(),
        );
    }

    if stats.clarifications_count > 8 {
        insights.push(
            "⚠️ 확인사항이 매우 많습니다. 요구사항을 단계별로 나누어 진행하는 것을 고려해보세요."
                .to_string(),
        );
    }

    if stats.clarifications_count < 3 {
        insights.push("✅ 비교적 명확한 요구사항입니다. 추가 확인사항이 적습니다.".to_string());
    }

    if stats.requirement_words < 10 {
        insights.push(
            "📝 요구사항이 너무 간단할 수 있습니다. 더 구체적인 설명이 있으면 더 정확한 분석이 가능합니다."
                .to_string(),
        );
    }

    insights
}
