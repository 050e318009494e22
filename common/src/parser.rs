//! APIレスポンスパーサー
//!
//! Gemini の JSON モード応答テキストを判定（Verdict）に変換する。
//! 応答は JSON オブジェクトでなければならない（コードブロック等の抽出はしない）。

use crate::error::{Error, Result};
use crate::types::Verdict;
use serde_json::Value;

/// `razon` が無い場合の理由文
pub const MISSING_REASON: &str = "No se pudo obtener la razón del análisis de Gemini.";

/// 判定レスポンスをパース
///
/// - `es_candidato`: bool はそのまま、"true"/"false" 文字列も受け付ける。それ以外は false
/// - `razon`: 文字列はそのまま、欠落/null は固定文、その他はJSON表記
///
/// # Returns
/// * `Ok(Verdict)` - パース成功
/// * `Err` - JSONとして不正、またはオブジェクトでない場合
pub fn parse_verdict(response: &str) -> Result<Verdict> {
    let value: Value = serde_json::from_str(response.trim())?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::Parse(format!("se esperaba un objeto JSON: {}", value)))?;

    let is_candidate = match object.get("es_candidato") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    };

    let reason = match object.get("razon") {
        None | Some(Value::Null) => MISSING_REASON.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Ok(Verdict { is_candidate, reason })
}
