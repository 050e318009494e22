//! 一括処理: 読み込み → (1件ずつ) 分類 + 判定 → 書き込み
//!
//! すべて逐次実行。1件の判定が終わってから次の件に進む。

use crate::analyzer::{analyze_row, IncidentAnalysis, Oracle};
use crate::error::{IncidentAiError, Result};
use crate::export::write_report;
use crate::loader::{load_incidents, IncidentTable};
use incident_ai_common::{categorize_resolution, ResolutionCategory, OUTPUT_SHEET_NAME};
use std::collections::BTreeMap;
use std::path::Path;

/// 実行オプション
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 進捗表示の間隔（件数）。0 で表示しない
    pub progress_interval: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { progress_interval: 10 }
    }
}

/// 実行結果の集計
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total_rows: usize,
    pub incidents: usize,
    pub candidates: usize,
    pub categories: BTreeMap<ResolutionCategory, usize>,
    /// 出力シートを書き込んだか
    pub written: bool,
}

impl RunSummary {
    fn from_table(table: &IncidentTable) -> Self {
        Self {
            total_rows: table.total_rows,
            incidents: table.len(),
            ..Default::default()
        }
    }

    fn record(&mut self, category: ResolutionCategory, is_candidate: bool) {
        *self.categories.entry(category).or_insert(0) += 1;
        if is_candidate {
            self.candidates += 1;
        }
    }
}

/// 解析を実行し、結果シートを書き込む
pub async fn run_analysis<O: Oracle>(path: &Path, oracle: &O, options: &RunOptions) -> Result<RunSummary> {
    let table = load_incidents(path)?;
    let mut summary = RunSummary::from_table(&table);

    if table.is_empty() {
        println!("No se encontraron incidentes de tipo 'Incidente' en el archivo para analizar.");
        return Ok(summary);
    }

    println!("Iniciando análisis de incidentes con Gemini (esto puede tomar tiempo si hay muchos tickets)...");
    tracing::debug!(sheet = %table.sheet_name, incidents = table.len(), "analysis started");

    let analyses = analyze_table(&table, oracle, options).await;
    for analysis in &analyses {
        summary.record(analysis.category, analysis.verdict.is_candidate);
    }

    write_report(path, &table, &analyses)?;
    summary.written = true;

    println!(
        "Análisis completado. Los resultados se han guardado en la pestaña '{}' del archivo '{}'.",
        OUTPUT_SHEET_NAME,
        path.display()
    );
    Ok(summary)
}

/// 進捗表示（interval 件ごと）
pub fn progress_notice(done: usize, interval: usize) -> Option<String> {
    if interval > 0 && done % interval == 0 {
        Some(format!("Procesados {} incidentes...", done))
    } else {
        None
    }
}

/// 全障害を順に判定（結果は入力と同じ順序）
pub async fn analyze_table<O: Oracle>(
    table: &IncidentTable,
    oracle: &O,
    options: &RunOptions,
) -> Vec<IncidentAnalysis> {
    analyze_table_with_progress(table, oracle, options, |notice| println!("{}", notice)).await
}

/// `analyze_table` の進捗出力先を差し替え可能にした版
pub async fn analyze_table_with_progress<O, F>(
    table: &IncidentTable,
    oracle: &O,
    options: &RunOptions,
    mut on_progress: F,
) -> Vec<IncidentAnalysis>
where
    O: Oracle,
    F: FnMut(String),
{
    let mut analyses = Vec::with_capacity(table.len());

    for (idx, row) in table.incidents.iter().enumerate() {
        analyses.push(analyze_row(oracle, row).await);

        if let Some(notice) = progress_notice(idx + 1, options.progress_interval) {
            on_progress(notice);
        }
    }

    analyses
}

/// API を呼ばずに分類のみ行う（ファイルは変更しない）
pub fn classify_only(path: &Path) -> Result<RunSummary> {
    let table = load_incidents(path)?;
    let mut summary = RunSummary::from_table(&table);
    for row in &table.incidents {
        summary.record(categorize_resolution(&row.resolution), false);
    }
    Ok(summary)
}

/// 集計を表示
pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("Filas leídas: {}", summary.total_rows);
    println!("Incidentes: {}", summary.incidents);
    if summary.written {
        println!("Candidatos a mejora definitiva: {}", summary.candidates);
    }
    if !summary.categories.is_empty() {
        println!("Grupos de resolución:");
        for (category, count) in &summary.categories {
            println!("  {}: {}", category, count);
        }
    }
}

/// 致命的エラーの表示文
pub fn fatal_message(err: &IncidentAiError, path: &Path) -> String {
    match err {
        IncidentAiError::FileNotFound(_) => format!(
            "Error: El archivo '{}' no fue encontrado. Por favor, asegúrate de que la ruta es correcta y el archivo existe.",
            path.display()
        ),
        other => format!("Ocurrió un error inesperado al procesar el archivo: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_record() {
        let mut summary = RunSummary::default();
        summary.record(ResolutionCategory::Other, true);
        summary.record(ResolutionCategory::Other, false);
        summary.record(ResolutionCategory::ProcessTimeout, false);
        assert_eq!(summary.candidates, 1);
        assert_eq!(summary.categories[&ResolutionCategory::Other], 2);
        assert_eq!(summary.categories[&ResolutionCategory::ProcessTimeout], 1);
    }

    #[test]
    fn test_progress_notice_interval() {
        let notices: Vec<String> = (1..=25).filter_map(|n| progress_notice(n, 10)).collect();
        assert_eq!(
            notices,
            vec!["Procesados 10 incidentes...", "Procesados 20 incidentes..."]
        );
        assert!((1..=25).all(|n| progress_notice(n, 0).is_none()));
    }

    struct CountingOracle(std::sync::atomic::AtomicUsize);

    impl Oracle for CountingOracle {
        async fn generate_json(&self, _prompt: &str) -> Result<String> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(r#"{"es_candidato": false, "razon": "puntual"}"#.to_string())
        }
    }

    fn table_of(n: usize) -> IncidentTable {
        let incidents = (0..n)
            .map(|i| crate::loader::IncidentRow {
                cells: Vec::new(),
                subject: format!("Incidente {}", i),
                description: "d".to_string(),
                resolution: if i % 2 == 0 { "rerun" } else { "timeout" }.to_string(),
            })
            .collect();
        IncidentTable {
            sheet_name: "Tickets".to_string(),
            columns: Vec::new(),
            incidents,
            total_rows: n,
        }
    }

    #[tokio::test]
    async fn test_analyze_table_reports_progress() {
        let table = table_of(23);
        let oracle = CountingOracle(Default::default());
        let options = RunOptions { progress_interval: 10 };

        let mut notices = Vec::new();
        let analyses =
            analyze_table_with_progress(&table, &oracle, &options, |n| notices.push(n)).await;

        assert_eq!(analyses.len(), 23);
        assert_eq!(oracle.0.load(std::sync::atomic::Ordering::SeqCst), 23);
        assert_eq!(analyses[0].category, ResolutionCategory::SetokRerun);
        assert_eq!(analyses[1].category, ResolutionCategory::ProcessTimeout);
        assert_eq!(
            notices,
            vec!["Procesados 10 incidentes...", "Procesados 20 incidentes..."]
        );

        let mut silent = Vec::new();
        let quiet = RunOptions { progress_interval: 0 };
        analyze_table_with_progress(&table, &oracle, &quiet, |n| silent.push(n)).await;
        assert!(silent.is_empty());
    }

    #[test]
    fn test_fatal_message_file_not_found() {
        let err = IncidentAiError::FileNotFound("x.xlsx".into());
        let msg = fatal_message(&err, Path::new("x.xlsx"));
        assert!(msg.starts_with("Error: El archivo 'x.xlsx' no fue encontrado."));
    }

    #[test]
    fn test_fatal_message_other() {
        let err = IncidentAiError::MissingColumn("Asunto".into());
        let msg = fatal_message(&err, Path::new("x.xlsx"));
        assert!(msg.starts_with("Ocurrió un error inesperado al procesar el archivo:"));
        assert!(msg.contains("Asunto"));
    }
}
