//! LLM 클라이언트 - 요구사항 분석이 사용하는 통합 LLM 호출 인터페이스

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;

mod providers;

use providers::ProviderClient;

/// 텍스트 완성 게이트웨이.
///
/// 대화는 항상 시스템 1턴 + 사용자 1턴으로 구성된다. 호출 실패는 Err로
/// 전달하며 재시도하지 않는다. 실패한 호출은 해당 기능을 축소시킬 뿐이다.
#[async_trait]
pub trait LanguageModelGateway: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
    ) -> Result<String>;
}

/// rig 기반 LLM 클라이언트
#[derive(Clone)]
pub struct LLMClient {
    config: Config,
    client: ProviderClient,
}

impl LLMClient {
    /// 새로운 LLM 클라이언트 생성. API KEY가 없으면 모든 분석이 불가능하므로 즉시 실패한다
    pub fn new(config: Config) -> Result<Self> {
        if !config.llm.is_configured() {
            anyhow::bail!(
                "LLM API KEY가 설정되지 않았습니다. REQLENS_LLM_API_KEY 환경변수 또는 reqlens.toml의 [llm] 설정을 확인해주세요."
            );
        }
        let client = ProviderClient::new(&config.llm)?;
        Ok(Self { client, config })
    }

    /// 모델 연결과 기능이 정상인지 확인한다
    pub async fn check_connection(&self) -> Result<()> {
        println!("🔄 모델 연결을 확인하고 있습니다...");
        match self
            .complete("System: You are a helpful assistant.", "Hello", 0.0)
            .await
        {
            Ok(_) => {
                println!("✅ 모델 연결 정상");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ 모델 연결 실패: {}", e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl LanguageModelGateway for LLMClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
    ) -> Result<String> {
        let agent = self.client.create_agent(
            &self.config.llm.model,
            system_prompt,
            &self.config.llm,
            temperature,
        );

        // 무한 대기 대신 시간 초과를 실패로 강등한다
        tokio::time::timeout(
            Duration::from_secs(self.config.llm.timeout_seconds),
            agent.prompt(user_prompt),
        )
        .await
        .map_err(|_| {
            anyhow::anyhow!(
                "LLM 응답이 {}초 안에 도착하지 않았습니다",
                self.config.llm.timeout_seconds
            )
        })?
    }
}
