use std::fs;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::TimeZone;
use tempfile::TempDir;

use reqlens_rs::analyzer::{AnalysisAggregator, AnalyzeError};
use reqlens_rs::config::Config;
use reqlens_rs::llm::client::LanguageModelGateway;
use reqlens_rs::report::export::{build_export_document, build_export_filename};
use reqlens_rs::report::stats::analysis_insights;
use reqlens_rs::session::AnalysisSession;

/// 기초 분석 응답: 확인사항 2건(높음 1건), 잠재적 문제점 1건
const ANALYSIS_JSON: &str = r#"{
    "analysis_summary": "엑셀 업로드 시 중복 데이터를 자동 제거해달라는 요구",
    "clarification_needed": [
        {
            "category": "데이터 처리",
            "question": "중복 판단 기준은 전체 행인가요, 특정 컬럼인가요?",
            "reason": "중복 기준에 따라 구현 방식과 처리 결과가 달라집니다.",
            "priority": "높음"
        },
        {
            "category": "UI/UX",
            "question": "제거된 행 수를 사용자에게 알려야 하나요?",
            "reason": "알림 여부에 따라 업로드 완료 화면 구성이 달라집니다.",
            "priority": "보통"
        }
    ],
    "potential_issues": [
        "대용량 파일에서 중복 검사 성능 저하"
    ],
    "business_impact": "데이터 정합성이 개선되지만 기존 업로드 절차가 변경됩니다."
}"#;

const CHECKLIST_MD: &str = "## 📋 개발 전 확인사항\n- [ ] 중복 판단 기준 확정 (담당자: 기획)\n\n## 🔧 개발 중 확인사항\n- [ ] 중복 제거 로직 구현 (담당자: 개발)\n\n## ✅ 개발 후 검증사항\n- [ ] 중복 제거 결과 검증 (담당자: 기획/개발)\n\n## 🚀 배포 전 최종 점검\n- [ ] 운영 데이터 백업 확인 (담당자: 전체)";

/// 분석/체크리스트 프롬프트를 구분해 고정 응답을 돌려주는 목 게이트웨이
struct MockGateway;

#[async_trait]
impl LanguageModelGateway for MockGateway {
    async fn complete(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _temperature: f64,
    ) -> Result<String> {
        if user_prompt.contains("체크리스트를 생성해주세요") {
            Ok(CHECKLIST_MD.to_string())
        } else {
            Ok(ANALYSIS_JSON.to_string())
        }
    }
}

struct FailingGateway;

#[async_trait]
impl LanguageModelGateway for FailingGateway {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _temperature: f64,
    ) -> Result<String> {
        anyhow::bail!("endpoint unreachable")
    }
}

const REQUIREMENT: &str = "엑셀 업로드 시 중복 데이터는 자동으로 제거해주세요";

#[tokio::test]
async fn test_full_analysis_flow() {
    let config = Config::default();
    let aggregator = AnalysisAggregator::new(Arc::new(MockGateway), None, &config);

    // 검색기가 없으므로 기초 분석 결과가 그대로 돌아온다
    let analysis_raw = aggregator.analyze(REQUIREMENT, &[]).await.unwrap();

    let mut session = AnalysisSession::new();
    session.begin_analysis(REQUIREMENT, &[], analysis_raw);

    let bundle = session.bundle().unwrap();
    assert!(!bundle.analysis.is_degraded());
    assert!(!bundle.analysis.clarifications().is_empty());

    // 요구사항 텍스트에서 파생된 통계
    assert_eq!(bundle.stats.requirement_length, 28);
    assert_eq!(bundle.stats.requirement_words, 7);
    assert_eq!(bundle.stats.clarifications_count, 2);
    assert_eq!(bundle.stats.issues_count, 1);
    assert_eq!(bundle.stats.high_priority_count, 1);

    let report = bundle.analysis.report().unwrap();
    assert!(report.manual_references.is_empty());
    assert!(report.manual_search_info.is_none());

    // 확인사항 2건(<3) + 단어 7개(<10) → 인사이트 2건
    let insights = analysis_insights(&bundle.stats);
    assert_eq!(insights.len(), 2);
    assert!(insights[0].contains("비교적 명확한 요구사항"));
    assert!(insights[1].contains("너무 간단할 수 있습니다"));

    // 체크리스트 생성 ("보통" 상세도): 4개 고정 구획이 순서대로 들어있다
    let checklist = aggregator
        .generate_checklist(&bundle.requirement, &bundle.analysis_raw, "보통")
        .await
        .unwrap();

    let pre_dev = checklist.find("개발 전 확인사항").unwrap();
    let in_dev = checklist.find("개발 중 확인사항").unwrap();
    let post_dev = checklist.find("개발 후 검증사항").unwrap();
    let pre_deploy = checklist.find("배포 전 최종 점검").unwrap();
    assert!(pre_dev < in_dev && in_dev < post_dev && post_dev < pre_deploy);

    assert!(session.attach_checklist(checklist));
    assert!(session.bundle().unwrap().checklist.is_some());
}

#[tokio::test]
async fn test_llm_unavailable_is_reported_not_panicked() {
    let config = Config::default();
    let aggregator = AnalysisAggregator::new(Arc::new(FailingGateway), None, &config);

    let err = aggregator.analyze(REQUIREMENT, &[]).await.unwrap_err();
    assert!(matches!(err, AnalyzeError::LlmUnavailable(_)));
    // 스택트레이스가 아니라 행동 가능한 안내 문구
    assert!(err.to_string().contains("API KEY"));
}

#[tokio::test]
async fn test_short_input_rejected_without_llm() {
    let config = Config::default();
    // 게이트웨이가 실패해도 입력 검증이 먼저 거부한다
    let aggregator = AnalysisAggregator::new(Arc::new(FailingGateway), None, &config);

    let result = aggregator.analyze("추가", &[]).await;
    assert!(matches!(result, Err(AnalyzeError::InvalidInput(_))));
}

#[tokio::test]
async fn test_export_writes_markdown_file() {
    let config = Config::default();
    let aggregator = AnalysisAggregator::new(Arc::new(MockGateway), None, &config);

    let analysis_raw = aggregator.analyze(REQUIREMENT, &[]).await.unwrap();
    let mut session = AnalysisSession::new();
    session.begin_analysis(REQUIREMENT, &[], analysis_raw);

    let checklist = aggregator
        .generate_checklist(REQUIREMENT, &session.bundle().unwrap().analysis_raw, "보통")
        .await
        .unwrap();
    session.attach_checklist(checklist);

    let bundle = session.bundle().unwrap();
    let at = chrono::Local.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
    let document = build_export_document(
        &bundle.requirement,
        &bundle.analysis_raw,
        bundle.checklist.as_deref().unwrap(),
        at,
    );
    let filename = build_export_filename(&bundle.requirement, at);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(&filename);
    fs::write(&path, &document).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("## 📝 원본 요구사항"));
    assert!(written.contains("## 📋 분석 결과"));
    assert!(written.contains("## ✅ 개발 체크리스트"));
    assert!(written.contains(REQUIREMENT));
    assert!(written.contains("개발 전 확인사항"));

    // 같은 입력과 같은 시각이면 문서는 바이트 단위로 동일하다
    let again = build_export_document(
        &bundle.requirement,
        &bundle.analysis_raw,
        bundle.checklist.as_deref().unwrap(),
        at,
    );
    assert_eq!(document, again);
}
