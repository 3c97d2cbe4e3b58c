//! 분석 오케스트레이터 - 기초 분석과 증강 분석을 병합하고 체크리스트를 생성한다

use std::sync::Arc;

use super::manual::{AugmentedAnalysis, ManualAugmentedAnalyzer, SystemContext};
use super::requirement::RequirementAnalyzer;
use super::AnalyzeError;
use crate::config::{AppConfig, Config};
use crate::llm::client::LanguageModelGateway;
use crate::report::{parse_analysis_result, AnalysisReport, ManualSearchInfo, ParsedAnalysis};
use crate::retriever::DocumentRetriever;

const CHECKLIST_SYSTEM_PROMPT: &str = "당신은 프로젝트 관리 전문가입니다. 실무에서 바로 사용할 수 있는 구체적이고 실행 가능한 체크리스트를 생성합니다.";

/// 병합 문서에서 증강 요약 앞에 붙는 구획 라벨
const AUGMENTED_SUMMARY_LABEL: &str = "[매뉴얼 기반 보강 분석]";
const AUGMENTED_IMPACT_LABEL: &str = "[매뉴얼 기반 영향도 분석]";

/// 분석 오케스트레이터
pub struct AnalysisAggregator {
    gateway: Arc<dyn LanguageModelGateway>,
    baseline: RequirementAnalyzer,
    augmented: ManualAugmentedAnalyzer,
    app: AppConfig,
    checklist_temperature: f64,
    verbose: bool,
}

impl AnalysisAggregator {
    pub fn new(
        gateway: Arc<dyn LanguageModelGateway>,
        retriever: Option<Arc<dyn DocumentRetriever>>,
        config: &Config,
    ) -> Self {
        let baseline = RequirementAnalyzer::new(gateway.clone(), config.llm.temperature);
        let augmented = ManualAugmentedAnalyzer::new(
            gateway.clone(),
            retriever,
            config.search.clone(),
            config.llm.temperature,
            config.verbose,
        );

        Self {
            gateway,
            baseline,
            augmented,
            app: config.app.clone(),
            checklist_temperature: config.llm.checklist_temperature,
            verbose: config.verbose,
        }
    }

    /// 증강 분석을 수행할 수 있는 상태인지
    pub fn is_augmentation_available(&self) -> bool {
        self.augmented.is_available()
    }

    /// 요구사항과 관련된 시스템 컨텍스트 미리보기 (상세 로그용)
    pub async fn system_context(&self, requirement: &str) -> Option<SystemContext> {
        if !self.augmented.is_available() {
            return None;
        }
        self.augmented.system_context(requirement).await
    }

    /// 외부 호출 전에 입력 단계에서 거부한다
    fn validate(&self, requirement: &str) -> Result<(), AnalyzeError> {
        let trimmed = requirement.trim();
        if trimmed.is_empty() {
            return Err(AnalyzeError::InvalidInput(
                "요구사항을 입력해주세요.".to_string(),
            ));
        }

        let chars = trimmed.chars().count();
        if chars < self.app.min_input_chars {
            return Err(AnalyzeError::InvalidInput(format!(
                "요구사항을 더 구체적으로 입력해주세요. (최소 {}자)",
                self.app.min_input_chars
            )));
        }
        if chars > self.app.max_input_chars {
            return Err(AnalyzeError::InvalidInput(format!(
                "요구사항이 너무 깁니다. (최대 {}자)",
                self.app.max_input_chars
            )));
        }

        Ok(())
    }

    /// 기초 분석은 항상 수행하고, 증강 분석이 가능하면 두 호출을 병행한 뒤 병합한다.
    ///
    /// 기초 분석 실패만 사용자에게 보이는 실패다. 증강 쪽의 실패와
    /// 병합 불가는 모두 기초 분석 결과 반환으로 조용히 축소된다.
    pub async fn analyze(
        &self,
        requirement: &str,
        focus_areas: &[String],
    ) -> Result<String, AnalyzeError> {
        self.validate(requirement)?;

        if !self.augmented.is_available() {
            return self
                .baseline
                .analyze(requirement, focus_areas)
                .await
                .map_err(|e| AnalyzeError::LlmUnavailable(e.to_string()));
        }

        let (baseline, augmented) = futures::join!(
            self.baseline.analyze(requirement, focus_areas),
            self.augmented.analyze(requirement, focus_areas),
        );

        let baseline_raw = baseline.map_err(|e| AnalyzeError::LlmUnavailable(e.to_string()))?;

        match augmented {
            Some(augmented) => Ok(self.merge(baseline_raw, &augmented)),
            None => Ok(baseline_raw),
        }
    }

    /// 두 결과가 모두 구조화 파싱에 성공할 때만 병합한다.
    /// 어느 쪽이든 실패하면 기초 분석 텍스트를 그대로 돌려준다
    fn merge(&self, baseline_raw: String, augmented: &AugmentedAnalysis) -> String {
        let baseline_report = match parse_analysis_result(&baseline_raw) {
            ParsedAnalysis::Structured(report) => report,
            ParsedAnalysis::Raw(_) => {
                if self.verbose {
                    eprintln!("⚠️ 기초 분석 결과가 구조화되지 않아 병합을 건너뜁니다.");
                }
                return baseline_raw;
            }
        };

        let augmented_report = match parse_analysis_result(&augmented.raw_text) {
            ParsedAnalysis::Structured(report) => report,
            ParsedAnalysis::Raw(_) => {
                if self.verbose {
                    eprintln!("⚠️ 증강 분석 결과가 구조화되지 않아 병합을 건너뜁니다.");
                }
                return baseline_raw;
            }
        };

        let search_info = ManualSearchInfo {
            search_keywords: augmented.search_keywords.clone(),
            doc_count: augmented.doc_count(),
        };
        let merged = merge_reports(baseline_report, augmented_report, search_info);

        match serde_json::to_string_pretty(&merged) {
            Ok(text) => text,
            // 직렬화 실패도 병합 포기로 흡수한다
            Err(_) => baseline_raw,
        }
    }

    /// 분석 결과로부터 역할 태그가 붙은 체크리스트를 생성한다.
    /// 재생성하면 이전 값을 덮어쓴다 (세션이 관리)
    pub async fn generate_checklist(
        &self,
        requirement: &str,
        analysis_raw: &str,
        priority_level: &str,
    ) -> Result<String, AnalyzeError> {
        let prompt = build_checklist_prompt(requirement, analysis_raw, priority_level);

        self.gateway
            .complete(CHECKLIST_SYSTEM_PROMPT, &prompt, self.checklist_temperature)
            .await
            .map_err(|e| AnalyzeError::LlmUnavailable(e.to_string()))
    }
}

/// 병합 정책.
///
/// - 요약/영향도: 기초 분석 뒤에 라벨 구획으로 증강 분석을 이어붙인다
/// - 확인사항/문제점: 기초 분석 항목이 앞, 증강 항목이 뒤 (중복 제거·재정렬 없음.
///   우선순위 정렬은 표시 시점의 책임이다)
/// - 매뉴얼 참고/검색 메타데이터: 증강 쪽 값을 그대로 가져온다
pub(crate) fn merge_reports(
    baseline: AnalysisReport,
    augmented: AnalysisReport,
    search_info: ManualSearchInfo,
) -> AnalysisReport {
    let mut merged = baseline;

    merged.analysis_summary = format!(
        "{}\n\n{}\n{}",
        merged.analysis_summary, AUGMENTED_SUMMARY_LABEL, augmented.analysis_summary
    );
    merged.manual_references = augmented.manual_references;
    merged
        .clarification_needed
        .extend(augmented.clarification_needed);
    merged.potential_issues.extend(augmented.potential_issues);
    merged.business_impact = format!(
        "{}\n\n{}\n{}",
        merged.business_impact, AUGMENTED_IMPACT_LABEL, augmented.business_impact
    );
    merged.manual_search_info = Some(search_info);

    merged
}

/// 체크리스트 상세도 안내 문구. 알 수 없는 수준은 "보통"과 같게 처리한다
fn checklist_instruction(priority_level: &str) -> &'static str {
    match priority_level.trim() {
        "높음" => "매우 상세하고 철저한 체크리스트를 만들어주세요.",
        "낮음" => "꼭 필요한 최소한의 항목들로 간단한 체크리스트를 만들어주세요.",
        _ => "실무에 필요한 핵심 항목들로 체크리스트를 만들어주세요.",
    }
}

fn build_checklist_prompt(requirement: &str, analysis_raw: &str, priority_level: &str) -> String {
    format!(
        r#"다음 요구사항 분석 결과를 바탕으로 개발자와 기획자가 사용할 수 있는 체크리스트를 생성해주세요.

우선순위: {priority_level}
{instruction}

요구사항: {requirement}
분석 결과: {analysis_raw}

체크리스트는 다음 형식으로 작성해주세요:
- [ ] 구체적인 확인/작업 항목 (담당자: 기획/개발/디자인)
- 각 항목은 실제로 체크할 수 있는 구체적인 내용이어야 합니다.
- 담당자를 명시하여 역할을 명확히 해주세요.

## 📋 개발 전 확인사항
- [ ] 예시 항목 (담당자: 기획)

## 🔧 개발 중 확인사항
- [ ] 예시 항목 (담당자: 개발)

## ✅ 개발 후 검증사항
- [ ] 예시 항목 (담당자: 기획/개발)

## 🚀 배포 전 최종 점검
- [ ] 예시 항목 (담당자: 전체)"#,
        priority_level = priority_level,
        instruction = checklist_instruction(priority_level),
        requirement = requirement,
        analysis_raw = analysis_raw,
    )
}
