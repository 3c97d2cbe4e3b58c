#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use async_trait::async_trait;

    use crate::analyzer::aggregator::{merge_reports, AnalysisAggregator};
    use crate::analyzer::AnalyzeError;
    use crate::config::Config;
    use crate::llm::client::LanguageModelGateway;
    use crate::report::{parse_analysis_result, ManualSearchInfo, ParsedAnalysis};
    use crate::retriever::{DocumentRetriever, RetrievedDocument};

    const BASELINE_JSON: &str = r#"{
        "analysis_summary": "기초 분석 요약",
        "clarification_needed": [
            {"category": "데이터 처리", "question": "중복 판단 기준은?", "reason": "컬럼 기준에 따라 달라짐", "priority": "높음"},
            {"category": "UI/UX", "question": "결과 알림 여부는?", "reason": "화면 구성에 영향", "priority": "보통"}
        ],
        "potential_issues": ["성능 저하 가능성"],
        "business_impact": "기초 영향도"
    }"#;

    const AUGMENTED_JSON: &str = r#"{
        "analysis_summary": "매뉴얼 기반 요약",
        "manual_references": ["업로드 기능은 관리자 메뉴 3장 참고"],
        "clarification_needed": [
            {"category": "권한 관리", "question": "관리자만 업로드 가능한가요?", "reason": "매뉴얼상 업로드는 관리자 기능", "priority": "높음", "manual_reference": "관리자 매뉴얼 3장"}
        ],
        "potential_issues": ["기존 배치 정리 작업과 중복"],
        "business_impact": "증강 영향도"
    }"#;

    const CHECKLIST_MD: &str = "## 📋 개발 전 확인사항\n- [ ] 중복 기준 확정 (담당자: 기획)\n\n## 🔧 개발 중 확인사항\n- [ ] 업로드 검증 로직 구현 (담당자: 개발)\n\n## ✅ 개발 후 검증사항\n- [ ] 중복 제거 결과 검증 (담당자: 기획/개발)\n\n## 🚀 배포 전 최종 점검\n- [ ] 운영 데이터 백업 (담당자: 전체)";

    /// 프롬프트 내용으로 응답을 고르는 목 게이트웨이
    struct MockGateway {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        fail: bool,
        augmented_response: String,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                fail: false,
                augmented_response: AUGMENTED_JSON.to_string(),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn with_augmented_response(response: &str) -> Self {
            Self {
                augmented_response: response.to_string(),
                ..Self::new()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LanguageModelGateway for MockGateway {
        async fn complete(
            &self,
            _system_prompt: &str,
            user_prompt: &str,
            _temperature: f64,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(user_prompt.to_string());

            if self.fail {
                anyhow::bail!("connection refused");
            }
            if user_prompt.contains("검색할 키워드") {
                return Ok("엑셀 업로드 중복 제거".to_string());
            }
            if user_prompt.contains("관련 시스템 매뉴얼 내용:") {
                return Ok(self.augmented_response.clone());
            }
            if user_prompt.contains("체크리스트를 생성해주세요") {
                return Ok(CHECKLIST_MD.to_string());
            }
            Ok(BASELINE_JSON.to_string())
        }
    }

    struct MockRetriever {
        documents: Vec<RetrievedDocument>,
    }

    impl MockRetriever {
        fn with_documents() -> Self {
            Self {
                documents: vec![
                    RetrievedDocument {
                        content: "엑셀 업로드는 관리자 메뉴에서 제공한다".to_string(),
                        score: 1.1,
                    },
                    RetrievedDocument {
                        content: "중복 데이터 정리는 야간 배치로 수행한다".to_string(),
                        score: 0.9,
                    },
                ],
            }
        }

        fn empty() -> Self {
            Self {
                documents: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl DocumentRetriever for MockRetriever {
        async fn search(
            &self,
            _query: &str,
            _top_k: usize,
            _score_threshold: f64,
        ) -> Result<Vec<RetrievedDocument>> {
            Ok(self.documents.clone())
        }
    }

    const REQUIREMENT: &str = "엑셀 업로드 시 중복 데이터는 자동으로 제거해주세요";

    fn build_aggregator(
        gateway: Arc<MockGateway>,
        retriever: Option<Arc<dyn DocumentRetriever>>,
    ) -> AnalysisAggregator {
        AnalysisAggregator::new(gateway, retriever, &Config::default())
    }

    #[tokio::test]
    async fn test_rejects_empty_input_before_any_call() {
        let gateway = Arc::new(MockGateway::new());
        let aggregator = build_aggregator(gateway.clone(), None);

        let result = aggregator.analyze("   ", &[]).await;
        assert!(matches!(result, Err(AnalyzeError::InvalidInput(_))));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_short_input_before_any_call() {
        let gateway = Arc::new(MockGateway::new());
        let aggregator = build_aggregator(gateway.clone(), None);

        let result = aggregator.analyze("줄임말", &[]).await;
        assert!(matches!(result, Err(AnalyzeError::InvalidInput(_))));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_oversized_input_before_any_call() {
        let gateway = Arc::new(MockGateway::new());
        let aggregator = build_aggregator(gateway.clone(), None);

        let oversized = "가".repeat(2001);
        let result = aggregator.analyze(&oversized, &[]).await;
        assert!(matches!(result, Err(AnalyzeError::InvalidInput(_))));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_baseline_only_when_retriever_unavailable() {
        let gateway = Arc::new(MockGateway::new());
        let aggregator = build_aggregator(gateway.clone(), None);

        assert!(!aggregator.is_augmentation_available());

        let raw = aggregator.analyze(REQUIREMENT, &[]).await.unwrap();
        // 기초 분석 결과가 그대로 돌아온다
        assert_eq!(raw, BASELINE_JSON);
        assert_eq!(gateway.call_count(), 1);

        let report = parse_analysis_result(&raw);
        let report = report.report().unwrap();
        assert!(report.manual_references.is_empty());
        assert!(report.manual_search_info.is_none());
    }

    #[tokio::test]
    async fn test_llm_failure_surfaces_as_unavailable() {
        let gateway = Arc::new(MockGateway::failing());
        let aggregator = build_aggregator(gateway, None);

        let result = aggregator.analyze(REQUIREMENT, &[]).await;
        match result {
            Err(AnalyzeError::LlmUnavailable(message)) => {
                assert!(message.contains("connection refused"));
            }
            other => panic!("LlmUnavailable이어야 한다: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_merges_baseline_and_augmented() {
        let gateway = Arc::new(MockGateway::new());
        let retriever: Arc<dyn DocumentRetriever> = Arc::new(MockRetriever::with_documents());
        let aggregator = build_aggregator(gateway.clone(), Some(retriever));

        assert!(aggregator.is_augmentation_available());

        let raw = aggregator.analyze(REQUIREMENT, &[]).await.unwrap();
        let merged = match parse_analysis_result(&raw) {
            ParsedAnalysis::Structured(report) => report,
            ParsedAnalysis::Raw(raw) => panic!("병합 결과는 구조화되어야 한다: {}", raw),
        };

        // 확인사항은 기초 분석 항목이 앞, 증강 항목이 뒤
        assert_eq!(merged.clarification_needed.len(), 3);
        assert_eq!(merged.clarification_needed[0].category, "데이터 처리");
        assert_eq!(merged.clarification_needed[1].category, "UI/UX");
        assert_eq!(merged.clarification_needed[2].category, "권한 관리");

        assert_eq!(merged.potential_issues.len(), 2);
        assert_eq!(merged.potential_issues[0], "성능 저하 가능성");
        assert_eq!(merged.potential_issues[1], "기존 배치 정리 작업과 중복");

        assert!(merged.analysis_summary.contains("기초 분석 요약"));
        assert!(merged.analysis_summary.contains("[매뉴얼 기반 보강 분석]"));
        assert!(merged.analysis_summary.contains("매뉴얼 기반 요약"));
        assert!(merged.business_impact.contains("기초 영향도"));
        assert!(merged.business_impact.contains("증강 영향도"));

        assert_eq!(
            merged.manual_references,
            vec!["업로드 기능은 관리자 메뉴 3장 참고".to_string()]
        );
        let info = merged.manual_search_info.unwrap();
        assert_eq!(info.search_keywords, "엑셀 업로드 중복 제거");
        assert_eq!(info.doc_count, 2);

        // 키워드 생성 + 기초 분석 + 증강 분석 = 3회 호출
        assert_eq!(gateway.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unparseable_augmented_falls_back_to_baseline() {
        let gateway = Arc::new(MockGateway::with_augmented_response(
            "죄송합니다. JSON으로 정리하지 못했습니다.",
        ));
        let retriever: Arc<dyn DocumentRetriever> = Arc::new(MockRetriever::with_documents());
        let aggregator = build_aggregator(gateway, Some(retriever));

        let raw = aggregator.analyze(REQUIREMENT, &[]).await.unwrap();
        // 병합을 포기하고 기초 분석 텍스트를 그대로 돌려준다
        assert_eq!(raw, BASELINE_JSON);
    }

    #[tokio::test]
    async fn test_empty_retrieval_yields_baseline() {
        let gateway = Arc::new(MockGateway::new());
        let retriever: Arc<dyn DocumentRetriever> = Arc::new(MockRetriever::empty());
        let aggregator = build_aggregator(gateway.clone(), Some(retriever));

        let raw = aggregator.analyze(REQUIREMENT, &[]).await.unwrap();
        assert_eq!(raw, BASELINE_JSON);
        // 기초 분석 + 키워드 생성까지만 호출되고 증강 분석 호출은 없다
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_focus_areas_enter_the_prompt() {
        let gateway = Arc::new(MockGateway::new());
        let aggregator = build_aggregator(gateway.clone(), None);

        aggregator
            .analyze(REQUIREMENT, &["보안".to_string(), "성능".to_string()])
            .await
            .unwrap();

        let prompt = gateway.last_prompt();
        assert!(prompt.contains("특히 다음 영역에 집중해서 분석해주세요: 보안, 성능"));
    }

    #[tokio::test]
    async fn test_checklist_contains_fixed_sections_in_order() {
        let gateway = Arc::new(MockGateway::new());
        let aggregator = build_aggregator(gateway, None);

        let checklist = aggregator
            .generate_checklist(REQUIREMENT, BASELINE_JSON, "보통")
            .await
            .unwrap();

        let pre_dev = checklist.find("개발 전 확인사항").unwrap();
        let in_dev = checklist.find("개발 중 확인사항").unwrap();
        let post_dev = checklist.find("개발 후 검증사항").unwrap();
        let pre_deploy = checklist.find("배포 전 최종 점검").unwrap();
        assert!(pre_dev < in_dev && in_dev < post_dev && post_dev < pre_deploy);
    }

    #[tokio::test]
    async fn test_checklist_instruction_by_priority_level() {
        let gateway = Arc::new(MockGateway::new());
        let aggregator = build_aggregator(gateway.clone(), None);

        aggregator
            .generate_checklist(REQUIREMENT, BASELINE_JSON, "높음")
            .await
            .unwrap();
        assert!(gateway.last_prompt().contains("매우 상세하고 철저한"));

        aggregator
            .generate_checklist(REQUIREMENT, BASELINE_JSON, "낮음")
            .await
            .unwrap();
        assert!(gateway.last_prompt().contains("최소한의 항목들로"));

        // 알 수 없는 수준은 보통과 같은 안내 문구를 쓴다
        aggregator
            .generate_checklist(REQUIREMENT, BASELINE_JSON, "긴급")
            .await
            .unwrap();
        assert!(gateway.last_prompt().contains("실무에 필요한 핵심 항목들로"));
    }

    #[tokio::test]
    async fn test_checklist_failure_surfaces_as_unavailable() {
        let gateway = Arc::new(MockGateway::failing());
        let aggregator = build_aggregator(gateway, None);

        let result = aggregator
            .generate_checklist(REQUIREMENT, BASELINE_JSON, "보통")
            .await;
        assert!(matches!(result, Err(AnalyzeError::LlmUnavailable(_))));
    }

    #[test]
    fn test_merge_reports_concatenates_lists() {
        let baseline = match parse_analysis_result(BASELINE_JSON) {
            ParsedAnalysis::Structured(report) => report,
            ParsedAnalysis::Raw(_) => unreachable!(),
        };
        let augmented = match parse_analysis_result(AUGMENTED_JSON) {
            ParsedAnalysis::Structured(report) => report,
            ParsedAnalysis::Raw(_) => unreachable!(),
        };

        let expected: Vec<_> = baseline
            .clarification_needed
            .iter()
            .chain(augmented.clarification_needed.iter())
            .cloned()
            .collect();

        let merged = merge_reports(
            baseline,
            augmented,
            ManualSearchInfo {
                search_keywords: "키워드".to_string(),
                doc_count: 2,
            },
        );

        // 이어붙이기: 순서 유지, 중복 제거 없음
        assert_eq!(merged.clarification_needed, expected);
    }
}
