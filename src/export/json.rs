//! JSONレポートの読み書き

use crate::analyzer::AnalysisReport;
use crate::error::{GscIntentError, Result};
use std::path::Path;

pub fn write_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn read_report(path: &Path) -> Result<AnalysisReport> {
    if !path.exists() {
        return Err(GscIntentError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
