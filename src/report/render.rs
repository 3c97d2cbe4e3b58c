//! 분석 결과 콘솔 렌더링

use crate::report::stats::SummaryStats;
use crate::report::{ClarificationItem, ParsedAnalysis, Priority};

/// 우선순위별 그룹화. 높음/보통/낮음 고정 순서이며, 그룹 안에서는
/// 병합이 만든 입력 순서를 그대로 유지한다 (2차 정렬 없음)
pub fn group_by_priority(
    items: &[ClarificationItem],
) -> Vec<(Priority, Vec<&ClarificationItem>)> {
    [Priority::High, Priority::Medium, Priority::Low]
        .into_iter()
        .map(|priority| {
            let group: Vec<&ClarificationItem> = items
                .iter()
                .filter(|item| item.priority == priority)
                .collect();
            (priority, group)
        })
        .collect()
}

fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴 높음",
        Priority::Medium => "🟡 보통",
        Priority::Low => "🟢 낮음",
    }
}

/// 분석 결과를 사람이 읽을 텍스트로 렌더링한다
pub fn render_analysis(analysis: &ParsedAnalysis) -> String {
    let report = match analysis {
        ParsedAnalysis::Structured(report) => report,
        // 강등된 결과는 원본 텍스트를 그대로 보여준다
        ParsedAnalysis::Raw(raw) => {
            return format!(
                "⚠️ 구조화된 분석 결과를 해석하지 못했습니다. 원본 응답을 표시합니다.\n\n{}\n",
                raw
            );
        }
    };

    let mut out = String::new();

    if !report.manual_references.is_empty() {
        out.push_str("📚 시스템 매뉴얼 참고사항\n");
        for (i, reference) in report.manual_references.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, reference));
        }
        out.push('\n');
    }

    if !report.analysis_summary.is_empty() {
        out.push_str("📝 요구사항 요약\n");
        out.push_str(&format!("  {}\n\n", report.analysis_summary));
    }

    if !report.business_impact.is_empty() {
        out.push_str("💼 비즈니스 영향도\n");
        out.push_str(&format!("  {}\n\n", report.business_impact));
    }

    if !report.clarification_needed.is_empty() {
        out.push_str("❓ 확인이 필요한 사항들\n");
        for (priority, group) in group_by_priority(&report.clarification_needed) {
            if group.is_empty() {
                continue;
            }
            out.push_str(&format!("  우선순위: {}\n", priority_badge(priority)));
            for (i, item) in group.iter().enumerate() {
                out.push_str(&format!("    {}. [{}] {}\n", i + 1, item.category, item.question));
                out.push_str(&format!("       이유: {}\n", item.reason));
                if let Some(reference) = &item.manual_reference {
                    out.push_str(&format!("       매뉴얼 참고: {}\n", reference));
                }
            }
        }
        out.push('\n');
    }

    if !report.potential_issues.is_empty() {
        out.push_str("⚠️ 잠재적 문제점들\n");
        for (i, issue) in report.potential_issues.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, issue));
        }
        out.push('\n');
    }

    if let Some(info) = &report.manual_search_info {
        out.push_str(&format!(
            "🔎 매뉴얼 검색: 키워드 \"{}\", 참조 문서 {}건\n",
            info.search_keywords, info.doc_count
        ));
    }

    out
}

/// 요약 통계 렌더링
pub fn render_stats(stats: &SummaryStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("  요구사항 길이: {}자\n", stats.requirement_length));
    out.push_str(&format!("  단어 수: {}개\n", stats.requirement_words));
    out.push_str(&format!("  확인사항: {}개\n", stats.clarifications_count));
    out.push_str(&format!("  잠재적 문제점: {}개\n", stats.issues_count));
    out.push_str(&format!(
        "  긴급 확인사항: {}개{}\n",
        stats.high_priority_count,
        if stats.high_priority_count > 0 { " (중요!)" } else { "" }
    ));
    out
}

/// 인사이트 렌더링
pub fn render_insights(insights: &[String]) -> String {
    let mut out = String::from("💡 분석 인사이트\n");
    for insight in insights {
        out.push_str(&format!("  {}\n", insight));
    }
    out
}

/// 체크리스트 렌더링
pub fn render_checklist(checklist: &str) -> String {
    format!("✅ 개발 체크리스트\n\n{}\n", checklist)
}
