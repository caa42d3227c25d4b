//! Search Consoleエクスポート取り込みモジュール
//!
//! ヘッダー付きCSV（またはシートから取り出した行）をQueryRowに変換する。
//! - 列名はHeaderAliasesで解決
//! - CTRは「22%」「0,22%」「0.22」「22」の各表記に対応
//! - クエリが空、または表示回数0の行は黙って除外

use crate::columns::{ColumnField, HeaderAliases};
use crate::error::{Error, Result};
use crate::types::QueryRow;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    // 先頭の数値部分（"12abc" → 12）
    static ref NUMBER_PREFIX_RE: Regex =
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap();
}

/// 取り込み結果の概要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub total_clicks: u64,
    pub total_impressions: u64,
    pub columns: Vec<String>,
}

impl DatasetSummary {
    pub fn from_rows(rows: &[QueryRow], columns: &[String]) -> Self {
        Self {
            rows: rows.len(),
            total_clicks: rows.iter().map(|r| r.clicks).sum(),
            total_impressions: rows.iter().map(|r| r.impressions).sum(),
            columns: columns.to_vec(),
        }
    }
}

/// CSV文字列からQueryRowを読み込む
///
/// # Arguments
/// * `content` - ヘッダー行付きのCSV文字列
/// * `aliases` - 列名エイリアス
///
/// # Returns
/// * `Ok((Vec<QueryRow>, Vec<String>))` - 有効な行と検出した列名
/// * `Err(Error::NoValidRows)` - 有効な行が0件
pub fn parse_csv_str(content: &str, aliases: &HeaderAliases) -> Result<(Vec<QueryRow>, Vec<String>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let rows = rows_from_records(&headers, records, aliases)?;
    Ok((rows, headers))
}

/// ヘッダーと行データからQueryRowを組み立てる（CSV/シート共通）
pub fn rows_from_records<I>(
    headers: &[String],
    records: I,
    aliases: &HeaderAliases,
) -> Result<Vec<QueryRow>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let rows: Vec<QueryRow> = records
        .into_iter()
        .filter_map(|record| {
            let lookup = |header: &str| {
                headers
                    .iter()
                    .position(|h| h == header)
                    .and_then(|idx| record.get(idx))
                    .map(String::as_str)
            };
            build_row(aliases, lookup)
        })
        .collect();

    if rows.is_empty() {
        return Err(Error::NoValidRows {
            columns: headers.to_vec(),
        });
    }

    Ok(rows)
}

/// 1行分のセルから QueryRow を作る
///
/// 掲載順位とCTRは小数点の `,` を `.` に読み替える（"4,2" → 4.2、切り捨てて4にはしない）。
/// クリック数・表示回数は読み替えない。CTRの規則は [`parse_ctr`]。
fn build_row<'a, F>(aliases: &HeaderAliases, lookup: F) -> Option<QueryRow>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let query = aliases
        .resolve(ColumnField::Query, &lookup)
        .unwrap_or("")
        .trim()
        .to_string();
    let clicks = parse_count(aliases.resolve(ColumnField::Clicks, &lookup).unwrap_or("0"));
    let impressions =
        parse_count(aliases.resolve(ColumnField::Impressions, &lookup).unwrap_or("0"));
    let ctr = parse_ctr(aliases.resolve(ColumnField::Ctr, &lookup).unwrap_or("0"));
    let position = parse_number(
        &aliases
            .resolve(ColumnField::Position, &lookup)
            .unwrap_or("0")
            .replacen(',', ".", 1),
    )
    .unwrap_or(0.0);

    if query.is_empty() || impressions == 0 {
        return None;
    }

    Some(QueryRow {
        query,
        clicks,
        impressions,
        ctr,
        position,
    })
}

/// CTRセルを0.0〜1.0の割合に変換
///
/// - `%` を含む場合: 数値 / 100（"22%" → 0.22, "0.22%" → 0.0022）
/// - 含まない場合: 1以下ならそのまま、1超なら百分率とみなして / 100
/// - 解析不能なら0.0
///
/// 小数点の `,` は `.` として読む（"2,5%" → 0.025）。掲載順位も同じ扱い。
pub fn parse_ctr(raw: &str) -> f64 {
    let value = if raw.contains('%') {
        parse_number(&raw.replacen('%', "", 1).replacen(',', ".", 1)).map(|v| v / 100.0)
    } else {
        parse_number(&raw.replacen(',', ".", 1)).map(|v| if v > 1.0 { v / 100.0 } else { v })
    };
    value.unwrap_or(0.0)
}

/// 先頭の数値部分を読む（前後の空白・単位などは無視）
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return Some(value);
        }
    }
    NUMBER_PREFIX_RE
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn parse_count(raw: &str) -> u64 {
    parse_number(raw)
        .filter(|v| *v > 0.0)
        .map(|v| v.round() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<(Vec<QueryRow>, Vec<String>)> {
        parse_csv_str(content, &HeaderAliases::default())
    }

    // =============================================
    // parse_ctr テスト
    // =============================================

    #[test]
    fn test_parse_ctr_percent() {
        assert!((parse_ctr("22%") - 0.22).abs() < 1e-12);
        assert!((parse_ctr("0.22%") - 0.0022).abs() < 1e-12);
        assert!((parse_ctr("2,5%") - 0.025).abs() < 1e-12);
        assert!((parse_ctr(" 10 %") - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_parse_ctr_fraction() {
        assert!((parse_ctr("0.22") - 0.22).abs() < 1e-12);
        assert!((parse_ctr("1") - 1.0).abs() < 1e-12);
        assert!((parse_ctr("0,05") - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_parse_ctr_whole_percent_without_sign() {
        assert!((parse_ctr("22") - 0.22).abs() < 1e-12);
        assert!((parse_ctr("1.5") - 0.015).abs() < 1e-12);
    }

    #[test]
    fn test_parse_ctr_invalid() {
        assert_eq!(parse_ctr(""), 0.0);
        assert_eq!(parse_ctr("n/a"), 0.0);
    }

    // =============================================
    // parse_number テスト
    // =============================================

    #[test]
    fn test_parse_number_prefix() {
        assert_eq!(parse_number("12abc"), Some(12.0));
        assert_eq!(parse_number(" 3.5 "), Some(3.5));
        assert_eq!(parse_number("-2"), Some(-2.0));
        assert_eq!(parse_number("1e2"), Some(100.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    // =============================================
    // parse_csv_str テスト
    // =============================================

    #[test]
    fn test_parse_csv_english_headers() {
        let content = "Query,Clicks,Impressions,CTR,Position\n\
                       buy shoes online,10,100,10%,3.0\n\
                       how to clean shoes,5,200,2.5%,8.0\n";
        let (rows, columns) = parse(content).unwrap();

        assert_eq!(columns, vec!["Query", "Clicks", "Impressions", "CTR", "Position"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].query, "buy shoes online");
        assert_eq!(rows[0].clicks, 10);
        assert_eq!(rows[0].impressions, 100);
        assert!((rows[0].ctr - 0.10).abs() < 1e-12);
        assert!((rows[1].ctr - 0.025).abs() < 1e-12);
        assert_eq!(rows[1].position, 8.0);
    }

    #[test]
    fn test_parse_csv_french_headers_with_bom() {
        let content = "\u{feff}Requêtes les plus fréquentes,Clics,Impressions,CTR,Position\n\
                       \"escape game paris\",12,340,\"3,53%\",\"4,2\"\n";
        let (rows, columns) = parse(content).unwrap();

        assert_eq!(columns[0], "Requêtes les plus fréquentes");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].query, "escape game paris");
        assert_eq!(rows[0].clicks, 12);
        assert!((rows[0].ctr - 0.0353).abs() < 1e-12);
        assert!((rows[0].position - 4.2).abs() < 1e-12);
    }

    #[test]
    fn test_position_decimal_comma_is_not_truncated() {
        let content = "Query,Clicks,Impressions,CTR,Position\n\
                       a,1,10,10%,\"4,2\"\n\
                       b,1,10,10%,\"10,6\"\n\
                       c,1,10,10%,\"1 234\"\n";
        let (rows, _) = parse(content).unwrap();
        assert!((rows[0].position - 4.2).abs() < 1e-12);
        assert!((rows[1].position - 10.6).abs() < 1e-12);
        // 桁区切りの空白以降は読まない
        assert_eq!(rows[2].position, 1.0);
    }

    #[test]
    fn test_parse_csv_drops_empty_query_and_zero_impressions() {
        let content = "Query,Clicks,Impressions,CTR,Position\n\
                       ,3,30,10%,2\n\
                       \"   \",3,30,10%,2\n\
                       no impressions,0,0,0%,5\n\
                       missing impressions,1,,1%,5\n\
                       kept,1,10,10%,5\n";
        let (rows, _) = parse(content).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].query, "kept");
        assert!(rows.iter().all(|r| !r.query.is_empty() && r.impressions > 0));
    }

    #[test]
    fn test_parse_csv_trims_query() {
        let content = "query,impressions\n  padded query  ,7\n";
        let (rows, _) = parse(content).unwrap();
        assert_eq!(rows[0].query, "padded query");
        assert_eq!(rows[0].clicks, 0);
        assert_eq!(rows[0].ctr, 0.0);
    }

    #[test]
    fn test_parse_csv_short_rows_are_tolerated() {
        let content = "Query,Clicks,Impressions,CTR,Position\nshort row,1,10\n";
        let (rows, _) = parse(content).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].position, 0.0);
    }

    #[test]
    fn test_parse_csv_no_valid_rows_reports_columns() {
        let content = "Keyword,Volume\nshoes,100\n";
        let err = parse(content).unwrap_err();

        match err {
            Error::NoValidRows { columns } => {
                assert_eq!(columns, vec!["Keyword".to_string(), "Volume".to_string()]);
            }
            other => panic!("Expected NoValidRows, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_csv_header_only() {
        let err = parse("Query,Clicks,Impressions,CTR,Position\n").unwrap_err();
        assert!(matches!(err, Error::NoValidRows { .. }));
    }

    #[test]
    fn test_dataset_summary() {
        let content = "Query,Clicks,Impressions,CTR,Position\n\
                       a,10,100,10%,3\n\
                       b,5,200,2.5%,8\n";
        let (rows, columns) = parse(content).unwrap();
        let summary = DatasetSummary::from_rows(&rows, &columns);

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.total_clicks, 15);
        assert_eq!(summary.total_impressions, 300);
        assert_eq!(summary.columns.len(), 5);
    }
}
