use incident_ai_common::{ResolutionCategory, Verdict};
use serde::{Deserialize, Serialize};

/// 障害1件分の解析結果（判定 + 解決分類）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentAnalysis {
    pub verdict: Verdict,
    pub category: ResolutionCategory,
}
