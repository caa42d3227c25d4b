pub mod excel;
pub mod json;

use crate::analyzer::AnalysisReport;
use crate::cli::ExportFormat;
use crate::error::Result;
use std::path::{Path, PathBuf};

const DEFAULT_STEM: &str = "gsc-intent-report";

fn output_path_for_format(output: &Path, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", DEFAULT_STEM, extension))
    } else {
        output.with_extension(extension)
    }
}

/// レポートを指定形式で書き出す
///
/// # Returns
/// 書き出したファイルのパス
pub fn export_report(
    report: &AnalysisReport,
    format: &ExportFormat,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let path = output_path_for_format(output, "xlsx");
        println!("- Excelを生成中...");
        excel::generate_excel(report, &path)?;
        println!("✔ Excel出力: {}", path.display());
        written.push(path);
    }

    if matches!(format, ExportFormat::Json | ExportFormat::Both) {
        let path = output_path_for_format(output, "json");
        json::write_report(report, &path)?;
        println!("✔ JSON出力: {}", path.display());
        written.push(path);
    }

    Ok(written)
}
