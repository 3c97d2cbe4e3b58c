//! 기초 요구사항 분석기 - 문서 증강 없이 요구사항 텍스트만으로 분석한다

use anyhow::Result;
use std::sync::Arc;

use super::focus_instruction;
use crate::llm::client::LanguageModelGateway;

const SYSTEM_PROMPT: &str = "당신은 요구사항 분석 전문가입니다. 실무진이 놓치기 쉬운 세부사항들을 찾아 구체적인 확인 질문을 제시합니다. 특히 한국의 업무 환경과 시스템 특성을 고려합니다.";

/// 기초 분석기. 고정된 8가지 관점으로 확인 필요사항을 도출한다
pub struct RequirementAnalyzer {
    gateway: Arc<dyn LanguageModelGateway>,
    temperature: f64,
}

impl RequirementAnalyzer {
    pub fn new(gateway: Arc<dyn LanguageModelGateway>, temperature: f64) -> Self {
        Self {
            gateway,
            temperature,
        }
    }

    /// 단일 LLM 호출로 구조화 JSON 텍스트를 받아온다.
    /// 호출 실패는 Err로 돌려주고, 이 경계를 넘어 전파되는 예외는 없다
    pub async fn analyze(&self, requirement: &str, focus_areas: &[String]) -> Result<String> {
        let prompt = build_analysis_prompt(requirement, focus_areas);
        self.gateway
            .complete(SYSTEM_PROMPT, &prompt, self.temperature)
            .await
    }
}

fn build_analysis_prompt(requirement: &str, focus_areas: &[String]) -> String {
    format!(
        r#"당신은 시스템 분석 전문가입니다. 다음 사용자 요구사항을 분석하여 구현 전 반드시 요청자에게 확인이 필요한 사항들을 찾아주세요.

사용자 요구사항:
{requirement}
{focus_text}
분석해야 할 관점들:
1. 기능의 정확한 위치나 범위 (어디에, 어떤 화면에서, 어떤 조건에서)
2. 사용자 인터랙션 방식 (클릭, 팝업, 리다이렉션, 새창 등)
3. 데이터 처리 방식과 예외상황 처리
4. 권한과 접근 제어 (누가 사용할 수 있는지)
5. UI/UX 세부사항 (디자인, 아이콘, 텍스트, 위치 등)
6. 비즈니스 규칙의 적용 범위와 예외상황
7. 기존 기능과의 연동 및 영향도
8. 성능 및 보안 고려사항

실무에서 자주 발생하는 상황들을 고려해주세요:
- "메인 화면에 추가"라고 하면 구체적인 위치와 우선순위 확인 필요
- "계약서에 적용"이라고 하면 계약 유형별 예외사항 확인 필요
- "자동으로 처리"라고 하면 실패 시 대안 처리 방안 확인 필요

다음 JSON 형식으로 응답해주세요:
{{
    "analysis_summary": "요구사항 요약",
    "clarification_needed": [
        {{
            "category": "카테고리명",
            "question": "구체적인 확인 질문",
            "reason": "왜 이 확인이 필요한지 설명",
            "priority": "높음/보통/낮음"
        }}
    ],
    "potential_issues": [
        "예상되는 잠재적 문제점들"
    ],
    "business_impact": "비즈니스 영향도 분석"
}}"#,
        requirement = requirement,
        focus_text = focus_instruction(focus_areas),
    )
}
