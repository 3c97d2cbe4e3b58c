//! 매뉴얼 증강 분석기 - 사내 문서 검색 결과를 조건으로 붙여 분석한다
//!
//! 증강 분석은 전 과정이 최선 노력(best-effort)이다. 키워드 생성, 검색,
//! 분석 어느 단계가 실패해도 None으로 끝나고 기초 분석만 남는다.

use anyhow::Result;
use std::sync::Arc;

use super::focus_instruction;
use crate::config::SearchConfig;
use crate::llm::client::LanguageModelGateway;
use crate::retriever::{DocumentRetriever, RetrievedDocument};

const KEYWORD_SYSTEM_PROMPT: &str =
    "당신은 시스템 매뉴얼 검색을 돕는 도우미입니다. 요구사항에서 검색에 적합한 핵심 키워드만 간결하게 생성합니다.";

const ANALYSIS_SYSTEM_PROMPT: &str = "당신은 시스템 분석 전문가입니다. 사용자 요구사항과 시스템 매뉴얼 내용을 참고하여 구현 전 요청자에게 반드시 확인이 필요한 사항들을 분석합니다.";

/// 키워드 생성은 재현성이 중요하므로 낮은 온도로 고정한다
const KEYWORD_TEMPERATURE: f64 = 0.0;

/// 시스템 컨텍스트 미리보기 길이 (글자 수)
const CONTEXT_PREVIEW_CHARS: usize = 500;

/// 증강 분석 결과: 원본 구조화 텍스트 + 검색 메타데이터
#[derive(Debug, Clone)]
pub struct AugmentedAnalysis {
    pub raw_text: String,
    pub search_keywords: String,
    pub documents: Vec<RetrievedDocument>,
}

impl AugmentedAnalysis {
    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }
}

/// 요구사항과 관련된 시스템 컨텍스트 요약 (상세 로그용)
#[derive(Debug, Clone)]
pub struct SystemContext {
    pub search_keywords: String,
    pub doc_count: usize,
    pub content_preview: String,
}

/// 매뉴얼 증강 분석기
pub struct ManualAugmentedAnalyzer {
    gateway: Arc<dyn LanguageModelGateway>,
    retriever: Option<Arc<dyn DocumentRetriever>>,
    search: SearchConfig,
    temperature: f64,
    verbose: bool,
}

impl ManualAugmentedAnalyzer {
    pub fn new(
        gateway: Arc<dyn LanguageModelGateway>,
        retriever: Option<Arc<dyn DocumentRetriever>>,
        search: SearchConfig,
        temperature: f64,
        verbose: bool,
    ) -> Self {
        Self {
            gateway,
            retriever,
            search,
            temperature,
            verbose,
        }
    }

    /// 검색기가 구성되어 있어야 증강 분석이 가능하다
    pub fn is_available(&self) -> bool {
        self.retriever.is_some()
    }

    /// 매뉴얼에서 요구사항 관련 문단을 검색한다.
    /// 실패하거나 결과가 없으면 None
    async fn search_manual_content(
        &self,
        requirement: &str,
    ) -> Option<(String, Vec<RetrievedDocument>)> {
        let retriever = self.retriever.as_ref()?;

        let keyword_prompt = format!(
            "다음 사용자 요구사항과 관련된 시스템 매뉴얼 내용을 검색하기 위한 키워드를 생성해주세요.\n\n요구사항: {}\n\n검색할 키워드 (한국어):",
            requirement
        );
        let keywords = match self
            .gateway
            .complete(KEYWORD_SYSTEM_PROMPT, &keyword_prompt, KEYWORD_TEMPERATURE)
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                eprintln!("⚠️ 검색 키워드 생성에 실패했습니다: {}", e);
                return None;
            }
        };

        let documents = match retriever
            .search(&keywords, self.search.top_k, self.search.score_threshold)
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                eprintln!("⚠️ 매뉴얼 검색 중 오류가 발생했습니다: {}", e);
                return None;
            }
        };

        // 참고할 문서가 없으면 증강 분석이 보탤 것도 없다
        if documents.is_empty() {
            if self.verbose {
                println!("🔎 매뉴얼에서 관련 문단을 찾지 못했습니다. 기초 분석만 수행합니다.");
            }
            return None;
        }

        Some((keywords, documents))
    }

    /// 매뉴얼 내용을 참고한 증강 분석. 어떤 실패도 None으로 흡수한다
    pub async fn analyze(
        &self,
        requirement: &str,
        focus_areas: &[String],
    ) -> Option<AugmentedAnalysis> {
        let (keywords, documents) = self.search_manual_content(requirement).await?;

        let context_block = format_documents(&documents);
        let prompt = build_augmented_prompt(requirement, focus_areas, &context_block);

        match self
            .gateway
            .complete(ANALYSIS_SYSTEM_PROMPT, &prompt, self.temperature)
            .await
        {
            Ok(raw_text) => Some(AugmentedAnalysis {
                raw_text,
                search_keywords: keywords,
                documents,
            }),
            Err(e) => {
                eprintln!("⚠️ 매뉴얼 기반 분석 중 오류가 발생했습니다: {}", e);
                None
            }
        }
    }

    /// 요구사항과 관련된 시스템 컨텍스트 미리보기를 돌려준다
    pub async fn system_context(&self, requirement: &str) -> Option<SystemContext> {
        let (keywords, documents) = self.search_manual_content(requirement).await?;
        let formatted = format_documents(&documents);

        let content_preview = if formatted.chars().count() > CONTEXT_PREVIEW_CHARS {
            let truncated: String = formatted.chars().take(CONTEXT_PREVIEW_CHARS).collect();
            format!("{}...", truncated)
        } else {
            formatted
        };

        Some(SystemContext {
            search_keywords: keywords,
            doc_count: documents.len(),
            content_preview,
        })
    }
}

/// 검색된 문단들을 검색 순서 그대로 하나의 컨텍스트 블록으로 이어붙인다
fn format_documents(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_augmented_prompt(
    requirement: &str,
    focus_areas: &[String],
    manual_content: &str,
) -> String {
    format!(
        r#"사용자 요구사항과 시스템 매뉴얼 내용을 참고하여 구현 전 요청자에게 반드시 확인이 필요한 사항들을 분석해주세요.

사용자 요구사항:
{requirement}

관련 시스템 매뉴얼 내용:
{manual_content}
{focus_text}
매뉴얼 내용을 바탕으로 다음을 분석해주세요:
1. 현재 시스템의 관련 기능이나 제약사항
2. 기존 기능과의 연동 포인트
3. 시스템 아키텍처 상 고려사항
4. 데이터 구조나 비즈니스 로직 관련 확인사항
5. 권한이나 보안 정책 관련 사항

다음 JSON 형식으로 응답해주세요:
{{
    "analysis_summary": "요구사항과 시스템 매뉴얼 기반 종합 분석",
    "manual_references": [
        "매뉴얼에서 참고한 주요 내용들"
    ],
    "clarification_needed": [
        {{
            "category": "카테고리명",
            "question": "구체적인 확인 질문",
            "reason": "왜 이 확인이 필요한지 설명 (매뉴얼 내용 포함)",
            "priority": "높음/보통/낮음",
            "manual_reference": "관련 매뉴얼 섹션이나 내용"
        }}
    ],
    "potential_issues": [
        "매뉴얼 기반으로 예상되는 잠재적 문제점들"
    ],
    "business_impact": "비즈니스 영향도 분석 (기존 시스템과의 연관성 포함)"
}}"#,
        requirement = requirement,
        manual_content = manual_content,
        focus_text = focus_instruction(focus_areas),
    )
}
