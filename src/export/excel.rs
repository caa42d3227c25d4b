//! Excel出力
//!
//! 3シート構成:
//! - Requêtes: 分類済みクエリ
//! - Matrice: 順位区分 × 意図（件数 / 平均CTR）
//! - Intentions: 意図ごとのLLM申告値と実測集計

use crate::analyzer::AnalysisReport;
use crate::error::{GscIntentError, Result};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

fn xlsx_err(e: XlsxError) -> GscIntentError {
    GscIntentError::ExcelGeneration(e.to_string())
}

pub fn generate_excel(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_background_color(Color::RGB(0xF5F5F5));
    let percent_format = Format::new().set_num_format("0.00%");
    let decimal_format = Format::new().set_num_format("0.0");
    let low_data_format = Format::new().set_italic().set_font_color(Color::RGB(0x999999));

    write_queries_sheet(
        workbook.add_worksheet(),
        report,
        &header_format,
        &percent_format,
        &decimal_format,
    )
    .map_err(xlsx_err)?;

    write_matrix_sheet(
        workbook.add_worksheet(),
        report,
        &header_format,
        &percent_format,
        &low_data_format,
    )
    .map_err(xlsx_err)?;

    write_intentions_sheet(workbook.add_worksheet(), report, &header_format, &decimal_format)
        .map_err(xlsx_err)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    workbook.save(output_path).map_err(xlsx_err)?;

    tracing::debug!(path = %output_path.display(), "Excel出力完了");
    Ok(())
}

fn write_header(worksheet: &mut Worksheet, headers: &[&str], format: &Format) -> std::result::Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, format)?;
    }
    Ok(())
}

fn write_queries_sheet(
    worksheet: &mut Worksheet,
    report: &AnalysisReport,
    header_format: &Format,
    percent_format: &Format,
    decimal_format: &Format,
) -> std::result::Result<(), XlsxError> {
    worksheet.set_name("Requêtes")?;
    write_header(
        worksheet,
        &["Requête", "Intention", "Confiance", "Clics", "Impressions", "CTR", "Position"],
        header_format,
    )?;
    worksheet.set_column_width(0, 40.0)?;
    worksheet.set_column_width(1, 24.0)?;

    for (idx, query) in report.classified_queries.iter().enumerate() {
        let row = idx as u32 + 1;
        worksheet.write_string(row, 0, &query.row.query)?;
        worksheet.write_string(row, 1, &query.intention)?;
        worksheet.write_number_with_format(row, 2, query.confidence, decimal_format)?;
        worksheet.write_number(row, 3, query.row.clicks as f64)?;
        worksheet.write_number(row, 4, query.row.impressions as f64)?;
        worksheet.write_number_with_format(row, 5, query.row.ctr, percent_format)?;
        worksheet.write_number_with_format(row, 6, query.row.position, decimal_format)?;
    }

    Ok(())
}

/// 意図ごとに「件数」「CTR」の2列
fn write_matrix_sheet(
    worksheet: &mut Worksheet,
    report: &AnalysisReport,
    header_format: &Format,
    percent_format: &Format,
    low_data_format: &Format,
) -> std::result::Result<(), XlsxError> {
    worksheet.set_name("Matrice")?;
    worksheet.write_string_with_format(0, 0, "Position", header_format)?;

    let intentions: Vec<&str> = report
        .matrix
        .first()
        .map(|row| row.cells.iter().map(|c| c.intention.as_str()).collect())
        .unwrap_or_default();

    for (idx, name) in intentions.iter().enumerate() {
        let col = 1 + idx as u16 * 2;
        worksheet.write_string_with_format(0, col, format!("{} (n)", name), header_format)?;
        worksheet.write_string_with_format(0, col + 1, format!("{} CTR", name), header_format)?;
    }

    for (row_idx, matrix_row) in report.matrix.iter().enumerate() {
        let row = row_idx as u32 + 1;
        worksheet.write_string(row, 0, matrix_row.position.label())?;
        for (idx, cell) in matrix_row.cells.iter().enumerate() {
            let col = 1 + idx as u16 * 2;
            if cell.low_data {
                worksheet.write_number_with_format(row, col, cell.count as f64, low_data_format)?;
            } else {
                worksheet.write_number(row, col, cell.count as f64)?;
            }
            worksheet.write_number_with_format(row, col + 1, cell.mean_ctr, percent_format)?;
        }
    }

    Ok(())
}

fn write_intentions_sheet(
    worksheet: &mut Worksheet,
    report: &AnalysisReport,
    header_format: &Format,
    decimal_format: &Format,
) -> std::result::Result<(), XlsxError> {
    worksheet.set_name("Intentions")?;
    write_header(
        worksheet,
        &[
            "Nom",
            "Description",
            "Volume",
            "Signal linguistique",
            "Exemples",
            "CTR moyen",
            "Position moyenne",
            "Clics",
            "Impressions",
            "Quick wins",
        ],
        header_format,
    )?;
    worksheet.set_column_width(1, 50.0)?;
    worksheet.set_column_width(4, 40.0)?;

    let analysis = report.typed_analysis();
    for (idx, (intention, details)) in analysis
        .intentions
        .iter()
        .zip(&report.intention_details)
        .enumerate()
    {
        let row = idx as u32 + 1;
        worksheet.write_string(row, 0, &intention.nom)?;
        worksheet.write_string(row, 1, &intention.description)?;
        worksheet.write_number(row, 2, intention.volume)?;
        worksheet.write_string(row, 3, &intention.signal_linguistique)?;
        worksheet.write_string(row, 4, intention.exemples.join(", "))?;
        // LLM申告値（割合かパーセントかはLLM次第なのでそのまま）
        worksheet.write_number(row, 5, intention.ctr_moyen)?;
        worksheet.write_number_with_format(row, 6, intention.position_moyenne, decimal_format)?;
        worksheet.write_number(row, 7, details.total_clicks as f64)?;
        worksheet.write_number(row, 8, details.total_impressions as f64)?;
        let wins = details
            .quick_wins
            .iter()
            .map(|q| q.row.query.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        worksheet.write_string(row, 9, wins)?;
    }

    Ok(())
}
