//! 문서 검색기 - 관리형 검색 인덱스에서 요구사항 관련 문단을 조회한다

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::SearchConfig;

/// 검색 요청 대기 한도. 무한 대기 대신 실패로 강등한다
const SEARCH_TIMEOUT_SECS: u64 = 30;

/// 검색된 문단
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedDocument {
    pub content: String,
    pub score: f64,
}

/// 문서 검색 인터페이스.
///
/// 검색 결과는 인덱스가 돌려준 순위 순서를 그대로 유지한다.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f64,
    ) -> Result<Vec<RetrievedDocument>>;
}

/// Azure AI Search 기반 검색기
pub struct AzureSearchRetriever {
    config: SearchConfig,
    client: reqwest::Client,
}

impl AzureSearchRetriever {
    /// 검색 설정이 완전할 때만 생성한다. 설정이 없으면 증강 분석은 건너뛴다
    pub fn from_config(config: &SearchConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .ok()?;
        Some(Self {
            config: config.clone(),
            client,
        })
    }

    fn search_url(&self) -> String {
        format!(
            "https://{}.search.windows.net/indexes/{}/docs/search?api-version={}",
            self.config.service_name, self.config.index_name, self.config.api_version
        )
    }

    /// 검색 응답에서 문단 목록을 추출한다. 점수 하한에 못 미치는 항목은 버린다
    fn parse_response(
        body: &serde_json::Value,
        content_key: &str,
        score_threshold: f64,
    ) -> Vec<RetrievedDocument> {
        let Some(items) = body.get("value").and_then(|v| v.as_array()) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                let content = item.get(content_key)?.as_str()?.to_string();
                let score = item
                    .get("@search.score")
                    .and_then(|s| s.as_f64())
                    .unwrap_or(0.0);
                if score < score_threshold {
                    return None;
                }
                Some(RetrievedDocument { content, score })
            })
            .collect()
    }
}

#[async_trait]
impl DocumentRetriever for AzureSearchRetriever {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f64,
    ) -> Result<Vec<RetrievedDocument>> {
        let body = serde_json::json!({
            "search": query,
            "top": top_k,
        });

        let response = self
            .client
            .post(self.search_url())
            .header("api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("검색 서비스 호출에 실패했습니다")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("검색 서비스 오류 ({}): {}", status, text);
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .context("검색 응답을 해석할 수 없습니다")?;

        Ok(Self::parse_response(
            &payload,
            &self.config.content_key,
            score_threshold,
        ))
    }
}
