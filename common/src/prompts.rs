//! プロンプト生成モジュール
//!
//! 障害1件（件名・説明・解決内容）から Gemini への判定プロンプトを生成する。

/// 恒久対策候補の判定プロンプト生成
///
/// # Arguments
/// * `subject` - 件名（Asunto）
/// * `description` - 説明（Descripción）
/// * `resolution` - 解決内容（Resolución）
///
/// # Returns
/// `es_candidato` と `razon` を持つJSONオブジェクトを要求するプロンプト
pub fn build_candidate_prompt(subject: &str, description: &str, resolution: &str) -> String {
    format!(
        r#"Analiza el siguiente incidente y determina si es un candidato para una mejora definitiva. Proporciona una razón concisa.
Asunto: {subject}
Descripción: {description}
Resolución: {resolution}

Formato de respuesta JSON:
{{
  "es_candidato": boolean,
  "razon": "string"
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_fields() {
        let prompt = build_candidate_prompt("Caída de batch", "El job no terminó", "rerun");
        assert!(prompt.contains("Asunto: Caída de batch"));
        assert!(prompt.contains("Descripción: El job no terminó"));
        assert!(prompt.contains("Resolución: rerun"));
    }

    #[test]
    fn test_prompt_requests_json_fields() {
        let prompt = build_candidate_prompt("a", "b", "c");
        assert!(prompt.contains("\"es_candidato\": boolean"));
        assert!(prompt.contains("\"razon\": \"string\""));
        assert!(prompt.contains("mejora definitiva"));
    }
}
