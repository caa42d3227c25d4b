//! 入力ファイル読み込み
//!
//! 拡張子で判定し、CSVは共通ライブラリ、xlsx/xls/odsはcalamineで読む。
//! どちらも同じ行マッピング（列名エイリアス・CTR変換・除外ルール）を通る。

use crate::error::{GscIntentError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use gsc_intent_common::{parse_csv_str, rows_from_records, DatasetSummary, HeaderAliases, QueryRow};
use std::path::Path;

/// 読み込んだデータセット
#[derive(Debug, Clone)]
pub struct Dataset {
    pub rows: Vec<QueryRow>,
    pub summary: DatasetSummary,
}

/// 列名エイリアスを用意（追加ファイルがあれば既定の後ろに足す）
pub fn load_aliases(path: Option<&Path>) -> Result<HeaderAliases> {
    let mut aliases = HeaderAliases::default();
    if let Some(path) = path {
        if !path.exists() {
            return Err(GscIntentError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        aliases.extend_from_json(&content)?;
    }
    Ok(aliases)
}

/// Search Consoleのエクスポートを読み込む
///
/// # Arguments
/// * `path` - .csv / .xlsx / .xls / .ods
/// * `aliases` - 列名エイリアス
pub fn load_file(path: &Path, aliases: &HeaderAliases) -> Result<Dataset> {
    if !path.exists() {
        return Err(GscIntentError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let (rows, columns) = match extension.as_str() {
        "csv" => {
            let content = std::fs::read_to_string(path)?;
            parse_csv_str(&content, aliases)?
        }
        "xlsx" | "xlsm" | "xls" | "ods" => read_sheet(path, aliases)?,
        _ => return Err(GscIntentError::UnsupportedFormat(path.display().to_string())),
    };

    let summary = DatasetSummary::from_rows(&rows, &columns);
    tracing::info!(
        file = %path.display(),
        rows = summary.rows,
        total_clicks = summary.total_clicks,
        total_impressions = summary.total_impressions,
        "データセット読み込み完了"
    );

    Ok(Dataset { rows, summary })
}

/// 先頭シートの1行目をヘッダーとして読む
fn read_sheet(path: &Path, aliases: &HeaderAliases) -> Result<(Vec<QueryRow>, Vec<String>)> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| GscIntentError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| GscIntentError::Spreadsheet("シートがありません".into()))?
        .map_err(|e| GscIntentError::Spreadsheet(e.to_string()))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(row) => row.iter().map(|c| cell_to_string(c).trim().to_string()).collect(),
        None => Vec::new(),
    };

    let records: Vec<Vec<String>> = sheet_rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    let rows = rows_from_records(&headers, records, aliases)?;
    Ok((rows, headers))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}
