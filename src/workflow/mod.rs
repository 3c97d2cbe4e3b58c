//! 실행 워크플로우 - 분석, 체크리스트 생성, 내보내기를 한 번에 수행한다

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::sync::Arc;

use crate::analyzer::AnalysisAggregator;
use crate::config::Config;
use crate::llm::client::{LLMClient, LanguageModelGateway};
use crate::report::stats::analysis_insights;
use crate::report::{export, render};
use crate::retriever::{AzureSearchRetriever, DocumentRetriever};
use crate::session::AnalysisSession;

/// 한 번의 분석 실행 요청
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// 분석할 요구사항 텍스트
    pub requirement: String,

    /// 집중 분석 영역
    pub focus_areas: Vec<String>,

    /// 체크리스트 상세도 (높음/보통/낮음)
    pub priority_level: String,

    /// 체크리스트 생성 여부
    pub with_checklist: bool,

    /// 마크다운 내보내기 여부
    pub export: bool,
}

/// 분석 워크플로우 시작
pub async fn launch(config: &Config, request: &AnalysisRequest) -> Result<()> {
    let llm_client = LLMClient::new(config.clone())?;

    if config.verbose {
        llm_client.check_connection().await?;
    }

    let gateway: Arc<dyn LanguageModelGateway> = Arc::new(llm_client);

    let retriever: Option<Arc<dyn DocumentRetriever>> =
        match AzureSearchRetriever::from_config(&config.search) {
            Some(retriever) => Some(Arc::new(retriever)),
            None => {
                println!("⚠️ 문서 검색 설정이 없어 기초 분석만 수행합니다.");
                None
            }
        };

    let aggregator = AnalysisAggregator::new(gateway, retriever, config);

    if config.verbose && aggregator.is_augmentation_available() {
        if let Some(context) = aggregator.system_context(&request.requirement).await {
            println!(
                "🔎 시스템 컨텍스트: 키워드 \"{}\", 문서 {}건\n{}",
                context.search_keywords, context.doc_count, context.content_preview
            );
        }
    }

    println!("🔍 요구사항을 분석하고 있습니다...");
    let analysis_raw = aggregator
        .analyze(&request.requirement, &request.focus_areas)
        .await?;

    let mut session = AnalysisSession::new();
    session.begin_analysis(&request.requirement, &request.focus_areas, analysis_raw);

    {
        let bundle = session.bundle().context("분석 결과가 없습니다.")?;

        println!("\n📋 분석 결과\n");
        println!("{}", render::render_stats(&bundle.stats));
        println!("{}", render::render_analysis(&bundle.analysis));

        let insights = analysis_insights(&bundle.stats);
        if !insights.is_empty() {
            println!("{}", render::render_insights(&insights));
        }
    }

    if request.with_checklist {
        println!("📝 체크리스트를 생성하고 있습니다...");
        let (requirement, analysis_raw) = match session.bundle() {
            Some(bundle) => (bundle.requirement.clone(), bundle.analysis_raw.clone()),
            None => (request.requirement.clone(), String::new()),
        };

        match aggregator
            .generate_checklist(&requirement, &analysis_raw, &request.priority_level)
            .await
        {
            Ok(checklist) => {
                println!("\n{}", render::render_checklist(&checklist));
                session.attach_checklist(checklist);
            }
            // 체크리스트 실패는 분석 결과까지 무효화하지 않는다
            Err(e) => eprintln!("⚠️ 체크리스트 생성에 실패했습니다: {}", e),
        }
    }

    if request.export {
        let path = save_export(config, &session)?;
        println!("💾 분석 결과를 저장했습니다: {}", path.display());
    }

    Ok(())
}

/// 세션의 현재 묶음을 마크다운 파일로 저장한다
fn save_export(config: &Config, session: &AnalysisSession) -> Result<std::path::PathBuf> {
    let bundle = session
        .bundle()
        .context("내보낼 분석 결과가 없습니다.")?;

    let now = Local::now();
    let document = export::build_export_document(
        &bundle.requirement,
        &bundle.analysis_raw,
        bundle.checklist.as_deref().unwrap_or("(생성되지 않음)"),
        now,
    );
    let filename = export::build_export_filename(&bundle.requirement, now);

    fs::create_dir_all(&config.app.output_path).context("출력 디렉토리를 만들 수 없습니다")?;
    let path = config.app.output_path.join(filename);
    fs::write(&path, document).context("분석 결과 파일을 쓸 수 없습니다")?;

    Ok(path)
}
