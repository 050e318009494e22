//! 障害チケット読み込みモジュール
//!
//! Excelの先頭シートを読み、「Tipo de solicitud」が "Incidente" の行だけを取り出す。
//! 先頭行を見出し行とみなす。

mod cell;

pub use cell::{cell_to_text, float_to_text};

use crate::error::{IncidentAiError, Result};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use incident_ai_common::{
    COL_DESCRIPTION, COL_REQUEST_TYPE, COL_RESOLUTION, COL_SUBJECT, INCIDENT_REQUEST_TYPE,
};
use std::collections::HashMap;
use std::path::Path;

/// 障害1行
#[derive(Debug, Clone)]
pub struct IncidentRow {
    /// 元の全セル（件名・説明・解決内容はテキスト化済み）
    pub cells: Vec<Data>,
    pub subject: String,
    pub description: String,
    pub resolution: String,
}

/// 読み込み結果
#[derive(Debug, Clone)]
pub struct IncidentTable {
    /// 読み込んだシート名
    pub sheet_name: String,
    /// 元の列名（元の順序）
    pub columns: Vec<String>,
    /// 障害行（元の行順）
    pub incidents: Vec<IncidentRow>,
    /// 見出しを除くデータ行数
    pub total_rows: usize,
}

impl IncidentTable {
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }
}

/// xlsx 拡張子チェック
pub fn ensure_xlsx(path: &Path) -> Result<()> {
    let is_xlsx = path
        .extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);
    if is_xlsx {
        Ok(())
    } else {
        Err(IncidentAiError::UnsupportedFormat(path.display().to_string()))
    }
}

/// Excelファイルから障害を読み込む
pub fn load_incidents(path: &Path) -> Result<IncidentTable> {
    if !path.exists() {
        return Err(IncidentAiError::FileNotFound(path.display().to_string()));
    }
    ensure_xlsx(path)?;

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IncidentAiError::EmptySheet(path.display().to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    table_from_range(&sheet_name, &range)
}

/// シートの範囲から障害テーブルを構築
pub fn table_from_range(sheet_name: &str, range: &Range<Data>) -> Result<IncidentTable> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| IncidentAiError::EmptySheet(sheet_name.to_string()))?;
    let columns = header_names(header);

    let request_type_idx = column_index(&columns, COL_REQUEST_TYPE)?;
    let subject_idx = column_index(&columns, COL_SUBJECT)?;
    let description_idx = column_index(&columns, COL_DESCRIPTION)?;
    let resolution_idx = column_index(&columns, COL_RESOLUTION)?;

    let mut incidents = Vec::new();
    let mut total_rows = 0;

    for row in rows {
        total_rows += 1;
        if !is_incident(row.get(request_type_idx)) {
            continue;
        }

        let mut cells = row.to_vec();
        cells.resize(columns.len(), Data::Empty);

        let subject = cell_to_text(&cells[subject_idx]);
        let description = cell_to_text(&cells[description_idx]);
        let resolution = cell_to_text(&cells[resolution_idx]);

        cells[subject_idx] = Data::String(subject.clone());
        cells[description_idx] = Data::String(description.clone());
        cells[resolution_idx] = Data::String(resolution.clone());

        incidents.push(IncidentRow {
            cells,
            subject,
            description,
            resolution,
        });
    }

    Ok(IncidentTable {
        sheet_name: sheet_name.to_string(),
        columns,
        incidents,
        total_rows,
    })
}

/// 完全一致（大文字小文字区別・トリムなし）
fn is_incident(cell: Option<&Data>) -> bool {
    matches!(cell, Some(Data::String(s)) if s == INCIDENT_REQUEST_TYPE)
}

/// 見出し名を生成（空は "Unnamed: N"、重複は ".1", ".2" を付与）
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell {
                Data::Empty => format!("Unnamed: {}", idx),
                Data::String(s) => s.clone(),
                other => cell_to_text(other),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn column_index(columns: &[String], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| IncidentAiError::MissingColumn(name.to_string()))
}
