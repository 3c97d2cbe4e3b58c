//! 분석 결과 마크다운 내보내기

use chrono::{DateTime, Local};
use regex::Regex;
use std::sync::LazyLock;

/// 파일명에 쓸 수 없는 문자 구간 (한글/영숫자 이외)
static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z가-힣]+").expect("invalid slug pattern"));

/// 파일명 접두어로 쓰는 요구사항 앞부분 글자 수
const SLUG_PREFIX_CHARS: usize = 20;

/// 원본 요구사항 / 분석 결과 / 체크리스트를 고정 구획으로 묶은 마크다운 문서.
///
/// 같은 입력과 같은 시각이면 바이트 단위로 동일한 문서가 나온다.
pub fn build_export_document(
    requirement: &str,
    analysis_raw: &str,
    checklist: &str,
    generated_at: DateTime<Local>,
) -> String {
    format!(
        r#"# 요구사항 분석 결과

생성 일시: {}

## 📝 원본 요구사항

{}

## 📋 분석 결과

{}

## ✅ 개발 체크리스트

{}
"#,
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        requirement,
        analysis_raw,
        checklist,
    )
}

/// 요구사항 앞부분을 슬러그로 만든 파일시스템 안전 파일명.
/// 타임스탬프가 붙어 실행 단위 유일성을 가진다
pub fn build_export_filename(requirement: &str, at: DateTime<Local>) -> String {
    let prefix: String = requirement.trim().chars().take(SLUG_PREFIX_CHARS).collect();
    let slug = SLUG_PATTERN
        .replace_all(&prefix, "_")
        .trim_matches('_')
        .to_string();
    let slug = if slug.is_empty() {
        "요구사항".to_string()
    } else {
        slug
    };

    format!("요구사항분석_{}_{}.md", slug, at.format("%Y%m%d_%H%M%S"))
}
