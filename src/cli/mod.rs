use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, LLMProvider};
use crate::workflow::AnalysisRequest;

/// reqlens-rs - LLM 기반 요구사항 분석기
#[derive(Parser, Debug)]
#[command(name = "reqlens-rs")]
#[command(
    about = "Analyzes a free-text feature request with an LLM, surfaces the clarification questions that must be confirmed before implementation, cross-references an internal document corpus, and generates a role-tagged development checklist."
)]
#[command(version)]
pub struct Args {
    /// 분석할 요구사항 텍스트
    pub requirement: Option<String>,

    /// 요구사항을 읽어올 파일 경로
    #[arg(short = 'f', long)]
    pub input_file: Option<PathBuf>,

    /// 집중 분석 영역 (반복 지정 가능. 예: --focus UI/UX --focus 보안)
    #[arg(long = "focus")]
    pub focus_areas: Vec<String>,

    /// 체크리스트 상세도 (높음/보통/낮음)
    #[arg(long, default_value = "보통")]
    pub priority_level: String,

    /// 분석 후 체크리스트 생성
    #[arg(long)]
    pub checklist: bool,

    /// 분석 결과를 마크다운 파일로 내보내기
    #[arg(long)]
    pub export: bool,

    /// 내보내기 출력 디렉토리
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 설정 파일 경로
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// LLM Provider (openai, moonshot, deepseek, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API 기본 주소
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 배포/모델 식별자
    #[arg(long)]
    pub model: Option<String>,

    /// 분석 온도
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 최대 tokens 수
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 문서 검색 서비스 이름
    #[arg(long)]
    pub search_service: Option<String>,

    /// 문서 검색 인덱스 이름
    #[arg(long)]
    pub search_index: Option<String>,

    /// 문서 검색 API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// 검색 결과 최대 개수
    #[arg(long)]
    pub search_top_k: Option<usize>,

    /// 검색 점수 하한
    #[arg(long)]
    pub search_threshold: Option<f64>,

    /// 상세 로그 출력
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// CLI 인자를 (설정, 실행 요청)으로 변환한다
    pub fn into_parts(self) -> Result<(Config, AnalysisRequest)> {
        let mut config = if let Some(config_path) = &self.config {
            Config::from_file(config_path)
                .context(format!("설정 파일을 읽을 수 없습니다: {:?}", config_path))?
        } else {
            // 명시된 설정 파일이 없으면 기본 위치를 시도한다
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("reqlens.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).context(format!(
                    "기본 설정 파일을 읽을 수 없습니다: {:?}",
                    default_config_path
                ))?
            } else {
                Config::default()
            }
        };

        // LLM 설정 덮어쓰기
        if let Some(provider_str) = &self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 알 수 없는 provider: {}. 기본 provider를 사용합니다.",
                    provider_str
                );
            }
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }

        // 검색 설정 덮어쓰기
        if let Some(search_service) = self.search_service {
            config.search.service_name = search_service;
        }
        if let Some(search_index) = self.search_index {
            config.search.index_name = search_index;
        }
        if let Some(search_api_key) = self.search_api_key {
            config.search.api_key = search_api_key;
        }
        if let Some(search_top_k) = self.search_top_k {
            config.search.top_k = search_top_k;
        }
        if let Some(search_threshold) = self.search_threshold {
            config.search.score_threshold = search_threshold;
        }

        // 기타 설정
        if let Some(output_path) = self.output_path {
            config.app.output_path = output_path;
        }
        config.verbose = self.verbose;

        // 요구사항 텍스트: 인자 우선, 없으면 파일에서 읽는다
        let requirement = match (self.requirement, &self.input_file) {
            (Some(text), _) => text,
            (None, Some(path)) => std::fs::read_to_string(path)
                .context(format!("요구사항 파일을 읽을 수 없습니다: {:?}", path))?
                .trim()
                .to_string(),
            (None, None) => anyhow::bail!(
                "요구사항을 입력해주세요. 인자로 직접 전달하거나 --input-file로 파일을 지정할 수 있습니다."
            ),
        };

        let request = AnalysisRequest {
            requirement,
            focus_areas: self.focus_areas,
            priority_level: self.priority_level,
            with_checklist: self.checklist,
            export: self.export,
        };

        Ok((config, request))
    }
}
