//! Gemini API連携
//!
//! generateContent を JSON モード（responseMimeType = application/json）で呼び出し、
//! 応答テキストを返す。判定のパースは呼び出し側で行う。

use super::Oracle;
use crate::config::Config;
use crate::error::{IncidentAiError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// APIキーはURLに載せずヘッダーで送る
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Gemini クライアント
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout_seconds: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// 接続先を差し替える（プロキシ・ローカル検証用）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.get_api_key()?, config.model.clone(), config.timeout_seconds)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

impl Oracle for GeminiClient {
    async fn generate_json(&self, prompt: &str) -> Result<String> {
        let body = build_request(prompt);

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Gemini request");

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(%status, "Gemini response");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IncidentAiError::ApiCall(format!("HTTP {}: {}", status, text.trim())));
        }

        let payload: GeminiResponse = response.json().await?;
        extract_text(payload)
    }
}

fn build_request(prompt: &str) -> GeminiRequest<'_> {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    }
}

/// 最初の候補のテキストパートを連結して返す
fn extract_text(payload: GeminiResponse) -> Result<String> {
    let Some(candidate) = payload.candidates.into_iter().next() else {
        let reason = payload
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "sin candidatos".to_string());
        return Err(IncidentAiError::ApiParse(format!("respuesta vacía ({})", reason)));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "desconocido".to_string());
        return Err(IncidentAiError::ApiParse(format!("respuesta sin texto ({})", reason)));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(build_request("hola")).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [ { "parts": [ { "text": "hola" } ] } ],
                "generationConfig": { "responseMimeType": "application/json" }
            })
        );
    }

    #[test]
    fn test_extract_text() {
        let payload = parse(json!({
            "candidates": [{
                "content": { "parts": [ { "text": "{\"es_candidato\": true," }, { "text": " \"razon\": \"x\"}" } ] },
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(extract_text(payload).unwrap(), "{\"es_candidato\": true, \"razon\": \"x\"}");
    }

    #[test]
    fn test_blocked_prompt() {
        let payload = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        let err = extract_text(payload).unwrap_err();
        assert!(matches!(err, IncidentAiError::ApiParse(ref m) if m.contains("SAFETY")));
    }

    #[test]
    fn test_candidate_without_text() {
        let payload = parse(json!({ "candidates": [ { "finishReason": "MAX_TOKENS" } ] }));
        let err = extract_text(payload).unwrap_err();
        assert!(matches!(err, IncidentAiError::ApiParse(ref m) if m.contains("MAX_TOKENS")));
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new("k".into(), "gemini-2.0-flash".into(), 5).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(client.model(), "gemini-2.0-flash");
        assert!(!client.endpoint().contains("key="));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_api_key() {
        // 閉じたローカルポートへ接続して送信エラーを起こす
        let client = GeminiClient::new("SECRET-KEY-123".into(), "gemini-2.0-flash".into(), 5)
            .unwrap()
            .with_base_url("http://127.0.0.1:1/v1beta/models");

        let err = client.generate_json("hola").await.unwrap_err();
        assert!(matches!(err, IncidentAiError::ApiCall(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));

        let verdict = crate::analyzer::analyze_incident(&client, "Caída", "d", "r").await;
        assert!(!verdict.is_candidate);
        assert!(verdict.reason.starts_with("Error en la llamada a Gemini:"));
        assert!(!verdict.reason.contains("SECRET-KEY-123"));
    }
}
