//! 解決内容のキーワード分類
//!
//! 解決テキストを小文字化し、部分一致で判定する（単語境界は見ない）。
//! ルールは上から順に評価し、最初に一致したものを採用する。

use crate::types::ResolutionCategory;

/// 分類ルール: (判定関数, ラベル)
type Rule = (fn(&str) -> bool, ResolutionCategory);

/// 優先順に並んだ分類ルール表
const RULES: &[Rule] = &[
    (is_setok_or_rerun, ResolutionCategory::SetokRerun),
    (is_timeout, ResolutionCategory::ProcessTimeout),
    (is_data_or_db, ResolutionCategory::DataDb),
    (is_configuration, ResolutionCategory::Configuration),
    (is_application_or_job, ResolutionCategory::ApplicationJob),
    (is_manual, ResolutionCategory::ManualIntervention),
    (is_resolved_ok, ResolutionCategory::ResolvedOk),
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn is_setok_or_rerun(text: &str) -> bool {
    contains_any(text, &["setok", "rerun"])
}

fn is_timeout(text: &str) -> bool {
    text.contains("timeout")
}

fn is_data_or_db(text: &str) -> bool {
    contains_any(text, &["datos", "base de datos", "db"])
}

fn is_configuration(text: &str) -> bool {
    contains_any(text, &["configuracion", "configuración"])
}

fn is_application_or_job(text: &str) -> bool {
    contains_any(text, &["aplicacion", "aplicación", "job"])
}

fn is_manual(text: &str) -> bool {
    contains_any(text, &["manual", "intervencion"])
}

fn is_resolved_ok(text: &str) -> bool {
    text.contains("ok") && contains_any(text, &["finaliza", "resuelto"])
}

/// 解決テキストを8種のラベルのいずれかに分類
///
/// # Examples
/// ```
/// use incident_ai_common::{categorize_resolution, ResolutionCategory};
///
/// assert_eq!(
///     categorize_resolution("Job timeout, manual rerun needed"),
///     ResolutionCategory::SetokRerun
/// );
/// ```
pub fn categorize_resolution(resolution: &str) -> ResolutionCategory {
    let lower = resolution.to_lowercase();
    RULES
        .iter()
        .find(|(matches, _)| matches(&lower))
        .map(|(_, category)| *category)
        .unwrap_or(ResolutionCategory::Other)
}
