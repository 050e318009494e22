//! 結果シートの書き込み
//!
//! 既存ブックの全シート（出力シート以外）を読み直し、出力シートを末尾に追加した
//! 新しいブックをメモリ上で組み立てる。同じディレクトリの一時ファイルに保存してから
//! 元ファイルへリネームするため、途中で失敗しても元ファイルは壊れない。
//!
//! 既存シートはセル値・数式（キャッシュ値付き）・非表示状態を引き継ぐ。
//! 書式・列幅・結合セルは保持しない。

use crate::analyzer::IncidentAnalysis;
use crate::error::{IncidentAiError, Result};
use crate::loader::{ensure_xlsx, float_to_text, IncidentTable};
use calamine::{open_workbook, Data, Range, Reader, SheetVisible, Xlsx};
use incident_ai_common::{DERIVED_COLUMNS, OUTPUT_SHEET_NAME};
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Excelセル文字列の上限
const MAX_CELL_CHARS: usize = 32_767;

/// セル書き込み用の書式
struct CellFormats {
    datetime: Format,
    duration: Format,
}

impl CellFormats {
    fn new() -> Self {
        Self {
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
            duration: Format::new().set_num_format("[h]:mm:ss"),
        }
    }
}

/// 引き継ぐ既存シート
struct SourceSheet {
    name: String,
    values: Range<Data>,
    formulas: Range<String>,
    hidden: bool,
}

/// 解析結果を同じファイルの出力シートとして書き込む
pub fn write_report(path: &Path, table: &IncidentTable, analyses: &[IncidentAnalysis]) -> Result<()> {
    if analyses.len() != table.len() {
        return Err(IncidentAiError::ExcelWrite(format!(
            "número de resultados ({}) distinto al de incidentes ({})",
            analyses.len(),
            table.len()
        )));
    }
    if !path.exists() {
        return Err(IncidentAiError::FileNotFound(path.display().to_string()));
    }
    ensure_xlsx(path)?;

    let existing = read_sheets_except(path, OUTPUT_SHEET_NAME)?;
    let buffer = build_workbook(&existing, table, analyses)?;
    replace_file(path, &buffer)?;

    tracing::debug!(
        path = %path.display(),
        sheets = existing.len() + 1,
        rows = table.len(),
        "workbook replaced"
    );
    Ok(())
}

/// 指定名以外の全シートを順序どおり読み込む
fn read_sheets_except(path: &Path, skip: &str) -> Result<Vec<SourceSheet>> {
    let mut source: Xlsx<_> = open_workbook(path)?;
    let hidden: HashMap<String, bool> = source
        .sheets_metadata()
        .iter()
        .map(|s| (s.name.clone(), !matches!(s.visible, SheetVisible::Visible)))
        .collect();
    let names = source.sheet_names();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        if name == skip {
            tracing::debug!(sheet = %name, "dropping previous output sheet");
            continue;
        }
        let values = source.worksheet_range(&name)?;
        let formulas = source.worksheet_formula(&name)?;
        let hidden = hidden.get(&name).copied().unwrap_or(false);
        sheets.push(SourceSheet {
            name,
            values,
            formulas,
            hidden,
        });
    }
    Ok(sheets)
}

/// 既存シート + 出力シートのブックをバッファに生成
fn build_workbook(
    existing: &[SourceSheet],
    table: &IncidentTable,
    analyses: &[IncidentAnalysis],
) -> Result<Vec<u8>> {
    let formats = CellFormats::new();
    let mut workbook = Workbook::new();

    for sheet in existing {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        copy_sheet(worksheet, sheet, &formats)?;
        if sheet.hidden {
            worksheet.set_hidden(true);
        }
    }

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(OUTPUT_SHEET_NAME)?;
    write_output_sheet(worksheet, table, analyses, &formats)?;

    Ok(workbook.save_to_buffer()?)
}

/// 数式セルは数式 + キャッシュ値、それ以外は値をそのまま書く
fn copy_sheet(worksheet: &mut Worksheet, sheet: &SourceSheet, formats: &CellFormats) -> Result<()> {
    let formulas = absolute_cells(&sheet.formulas);

    for (&(row, col), formula) in &formulas {
        let cached = formula_result(sheet.values.get_value((row, col)));
        let formula = Formula::new(formula.as_str()).set_result(cached);
        worksheet.write_formula(row, col_num(col as usize)?, formula)?;
    }

    for ((row, col), cell) in absolute_cells(&sheet.values) {
        if formulas.contains_key(&(row, col)) {
            continue;
        }
        write_cell(worksheet, row, col_num(col as usize)?, cell, formats)?;
    }
    Ok(())
}

/// 使用セルを絶対座標で取り出す
fn absolute_cells<T: calamine::CellType>(range: &Range<T>) -> HashMap<(u32, u32), &T> {
    let Some((start_row, start_col)) = range.start() else {
        return HashMap::new();
    };
    range
        .used_cells()
        .map(|(row, col, cell)| ((start_row + row as u32, start_col + col as u32), cell))
        .collect()
}

fn formula_result(cached: Option<&Data>) -> String {
    match cached {
        None | Some(Data::Empty) => String::new(),
        Some(Data::Float(f)) => float_to_text(*f),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Bool(true)) => "TRUE".to_string(),
        Some(Data::Bool(false)) => "FALSE".to_string(),
        Some(Data::DateTime(dt)) => float_to_text(dt.as_f64()),
        Some(Data::String(s)) | Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => s.clone(),
        Some(Data::Error(e)) => e.to_string(),
    }
}

/// 出力シート: 元の列 + 追加3列、インデックス列なし
fn write_output_sheet(
    worksheet: &mut Worksheet,
    table: &IncidentTable,
    analyses: &[IncidentAnalysis],
    formats: &CellFormats,
) -> Result<()> {
    let headers = table.columns.iter().map(String::as_str).chain(DERIVED_COLUMNS);
    for (col, header) in headers.enumerate() {
        worksheet.write_string(0, col_num(col)?, header)?;
    }

    let derived_start = table.columns.len();
    for (idx, (incident, analysis)) in table.incidents.iter().zip(analyses).enumerate() {
        let row = idx as u32 + 1;
        for (col, cell) in incident.cells.iter().enumerate() {
            write_cell(worksheet, row, col_num(col)?, cell, formats)?;
        }
        worksheet.write_boolean(row, col_num(derived_start)?, analysis.verdict.is_candidate)?;
        worksheet.write_string(
            row,
            col_num(derived_start + 1)?,
            truncate_chars(&analysis.verdict.reason, MAX_CELL_CHARS),
        )?;
        worksheet.write_string(row, col_num(derived_start + 2)?, analysis.category.label())?;
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Data,
    formats: &CellFormats,
) -> Result<()> {
    match cell {
        Data::Empty => {}
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Data::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        Data::Int(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        Data::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Data::DateTime(dt) => {
            let format = if dt.is_duration() { &formats.duration } else { &formats.datetime };
            worksheet.write_number_with_format(row, col, dt.as_f64(), format)?;
        }
        Data::Error(e) => {
            worksheet.write_string(row, col, e.to_string())?;
        }
    }
    Ok(())
}

fn col_num(col: usize) -> Result<u16> {
    u16::try_from(col)
        .map_err(|_| IncidentAiError::ExcelWrite(format!("columna fuera de rango: {}", col)))
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// 一時ファイルに書き出してから元ファイルを置き換える
fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
