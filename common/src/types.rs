//! 解析結果の型定義
//!
//! CLIとテストで共有される型と定数:
//! - Verdict: Gemini による恒久対策候補の判定
//! - ResolutionCategory: 解決内容のキーワード分類
//! - 入出力シートの列名・シート名

use serde::{Deserialize, Serialize};

/// 入力シートの列名（大文字小文字・アクセント区別あり）
pub const COL_REQUEST_TYPE: &str = "Tipo de solicitud";
pub const COL_SUBJECT: &str = "Asunto";
pub const COL_DESCRIPTION: &str = "Descripción";
pub const COL_RESOLUTION: &str = "Resolución";

/// 解析対象とする「Tipo de solicitud」の値（完全一致）
pub const INCIDENT_REQUEST_TYPE: &str = "Incidente";

/// 出力列名
pub const COL_IS_CANDIDATE: &str = "Gemini_Es_Candidato_Mejora";
pub const COL_REASON: &str = "Gemini_Razon_Mejora";
pub const COL_RESOLUTION_GROUP: &str = "Grupo_Resolucion";

/// 追加される3列（この順で末尾に付与）
pub const DERIVED_COLUMNS: [&str; 3] = [COL_IS_CANDIDATE, COL_REASON, COL_RESOLUTION_GROUP];

/// 出力シート名
pub const OUTPUT_SHEET_NAME: &str = "Analisis_Gemini_Incidentes";

/// 1件の障害に対する判定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_candidate: bool,
    pub reason: String,
}

impl Verdict {
    /// API呼び出し失敗時の否定判定
    pub fn failed(detail: impl std::fmt::Display) -> Self {
        Self {
            is_candidate: false,
            reason: format!("Error en la llamada a Gemini: {}", detail),
        }
    }
}

/// 解決内容の分類ラベル（8種固定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResolutionCategory {
    SetokRerun,
    ProcessTimeout,
    DataDb,
    Configuration,
    ApplicationJob,
    ManualIntervention,
    ResolvedOk,
    Other,
}

impl ResolutionCategory {
    /// 全ラベル（優先順）
    pub const ALL: [ResolutionCategory; 8] = [
        ResolutionCategory::SetokRerun,
        ResolutionCategory::ProcessTimeout,
        ResolutionCategory::DataDb,
        ResolutionCategory::Configuration,
        ResolutionCategory::ApplicationJob,
        ResolutionCategory::ManualIntervention,
        ResolutionCategory::ResolvedOk,
        ResolutionCategory::Other,
    ];

    /// シートに書き込むラベル文字列
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionCategory::SetokRerun => "Setok/Rerun de Job",
            ResolutionCategory::ProcessTimeout => "Timeout de Proceso",
            ResolutionCategory::DataDb => "Problema de Datos/DB",
            ResolutionCategory::Configuration => "Problema de Configuración",
            ResolutionCategory::ApplicationJob => "Error en Aplicación/Job",
            ResolutionCategory::ManualIntervention => "Intervención Manual",
            ResolutionCategory::ResolvedOk => "Resuelto OK (Genérico)",
            ResolutionCategory::Other => "Otro Tipo de Resolución",
        }
    }
}

impl std::fmt::Display for ResolutionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
