use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// LLM Provider 종류
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 애플리케이션 설정
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// 앱 동작 설정
    #[serde(default)]
    pub app: AppConfig,

    /// LLM 모델 설정
    #[serde(default)]
    pub llm: LLMConfig,

    /// 문서 검색 설정
    #[serde(default)]
    pub search: SearchConfig,

    /// 상세 로그 출력 여부
    #[serde(default)]
    pub verbose: bool,
}

/// 앱 동작 설정
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// 요구사항 최대 입력 글자 수
    pub max_input_chars: usize,

    /// 요구사항 최소 입력 글자 수
    pub min_input_chars: usize,

    /// 내보내기 출력 디렉토리
    pub output_path: PathBuf,
}

/// LLM 모델 설정
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider 종류
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API 기본 주소. Azure OpenAI는 OpenAI 호환 엔드포인트로 지정한다
    pub api_base_url: String,

    /// 배포/모델 식별자
    pub model: String,

    /// 분석용 기본 온도
    pub temperature: f64,

    /// 체크리스트 생성용 온도
    pub checklist_temperature: f64,

    /// 최대 tokens
    pub max_tokens: u32,

    /// 호출 대기 한도 (초)
    pub timeout_seconds: u64,
}

/// 문서 검색 설정 (Azure AI Search)
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// 검색 서비스 이름
    pub service_name: String,

    /// 검색 인덱스 이름
    pub index_name: String,

    /// 검색 서비스 API KEY
    pub api_key: String,

    /// 검색 REST API 버전
    pub api_version: String,

    /// 문단 본문이 들어있는 필드 이름
    pub content_key: String,

    /// 검색 결과 최대 개수
    pub top_k: usize,

    /// 검색 점수 하한
    pub score_threshold: f64,
}

impl Config {
    /// 파일에서 설정 로드
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl LLMConfig {
    /// API KEY가 준비됐는지 확인한다. Ollama는 KEY가 필요 없다
    pub fn is_configured(&self) -> bool {
        self.provider == LLMProvider::Ollama || !self.api_key.trim().is_empty()
    }
}

impl SearchConfig {
    /// 검색 서비스/인덱스/KEY가 모두 있어야 증강 분석이 가능하다
    pub fn is_configured(&self) -> bool {
        !self.service_name.trim().is_empty()
            && !self.index_name.trim().is_empty()
            && !self.api_key.trim().is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 2000,
            min_input_chars: 5,
            output_path: PathBuf::from("./reqlens.out"),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("REQLENS_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.openai.com/v1"),
            model: String::from("gpt-4o-mini"),
            temperature: 0.3,
            checklist_temperature: 0.1,
            max_tokens: 8192,
            timeout_seconds: 120,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            service_name: std::env::var("REQLENS_SEARCH_SERVICE").unwrap_or_default(),
            index_name: std::env::var("REQLENS_SEARCH_INDEX").unwrap_or_default(),
            api_key: std::env::var("REQLENS_SEARCH_API_KEY").unwrap_or_default(),
            api_version: String::from("2023-11-01"),
            content_key: String::from("chunk"),
            top_k: 5,
            score_threshold: 0.7,
        }
    }
}
