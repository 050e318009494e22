//! 恒久対策候補の解析
//!
//! 外部の生成AI（Oracle）にプロンプトを送り、応答JSONを判定に変換する。
//! 1件の失敗で全体を止めない: 失敗は否定判定として返す。

mod gemini;
mod types;

pub use gemini::GeminiClient;
pub use types::IncidentAnalysis;

use crate::error::Result;
use crate::loader::IncidentRow;
use incident_ai_common::{build_candidate_prompt, categorize_resolution, parse_verdict, Verdict};
use std::future::Future;

/// JSON応答を返す生成AI
pub trait Oracle {
    /// プロンプトを送り、モデルの応答テキスト（JSON想定）を返す
    fn generate_json(&self, prompt: &str) -> impl Future<Output = Result<String>>;
}

/// 障害1件を判定（失敗時は否定判定）
pub async fn analyze_incident<O: Oracle>(
    oracle: &O,
    subject: &str,
    description: &str,
    resolution: &str,
) -> Verdict {
    let prompt = build_candidate_prompt(subject, description, resolution);

    match request_verdict(oracle, &prompt).await {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("Error al llamar a Gemini para el incidente '{}': {}", subject, e);
            tracing::warn!(subject, error = %e, "oracle call failed");
            Verdict::failed(e)
        }
    }
}

async fn request_verdict<O: Oracle>(oracle: &O, prompt: &str) -> Result<Verdict> {
    let response = oracle.generate_json(prompt).await?;
    tracing::debug!(response_len = response.len(), "oracle response");
    Ok(parse_verdict(&response)?)
}

/// 障害1行を分類・判定
pub async fn analyze_row<O: Oracle>(oracle: &O, row: &IncidentRow) -> IncidentAnalysis {
    let verdict = analyze_incident(oracle, &row.subject, &row.description, &row.resolution).await;
    IncidentAnalysis {
        verdict,
        category: categorize_resolution(&row.resolution),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IncidentAiError;
    use incident_ai_common::ResolutionCategory;
    use std::sync::Mutex;

    struct FixedOracle(&'static str);

    impl Oracle for FixedOracle {
        async fn generate_json(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingOracle;

    impl Oracle for FailingOracle {
        async fn generate_json(&self, _prompt: &str) -> Result<String> {
            Err(IncidentAiError::ApiCall("HTTP 503".into()))
        }
    }

    #[derive(Default)]
    struct RecordingOracle {
        prompts: Mutex<Vec<String>>,
    }

    impl Oracle for RecordingOracle {
        async fn generate_json(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(r#"{"es_candidato": false, "razon": "ok"}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_valid_response() {
        let oracle = FixedOracle(r#"{"es_candidato": true, "razon": "Se repite cada semana"}"#);
        let verdict = analyze_incident(&oracle, "a", "b", "c").await;
        assert!(verdict.is_candidate);
        assert_eq!(verdict.reason, "Se repite cada semana");
    }

    #[tokio::test]
    async fn test_invalid_json_degrades() {
        let verdict = analyze_incident(&FixedOracle("esto no es JSON"), "a", "b", "c").await;
        assert!(!verdict.is_candidate);
        assert!(verdict.reason.starts_with("Error en la llamada a Gemini:"));
    }

    #[tokio::test]
    async fn test_call_failure_degrades() {
        let verdict = analyze_incident(&FailingOracle, "a", "b", "c").await;
        assert!(!verdict.is_candidate);
        assert!(verdict.reason.starts_with("Error en la llamada a Gemini:"));
        assert!(verdict.reason.contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_prompt_contains_fields() {
        let oracle = RecordingOracle::default();
        analyze_incident(&oracle, "Caída", "Servicio sin respuesta", "reinicio").await;
        let prompts = oracle.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Asunto: Caída"));
        assert!(prompts[0].contains("Resolución: reinicio"));
    }

    #[tokio::test]
    async fn test_analyze_row_classifies() {
        let row = IncidentRow {
            cells: Vec::new(),
            subject: "s".into(),
            description: "d".into(),
            resolution: "Se hace rerun".into(),
        };
        let analysis = analyze_row(&FixedOracle("{}"), &row).await;
        assert_eq!(analysis.category, ResolutionCategory::SetokRerun);
        assert!(!analysis.verdict.is_candidate);
    }
}
