//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No JSON found in response")]
    NoJsonFound,

    /// 有効な行が1件も残らなかった（検出した列名を添えて報告）
    #[error("有効なデータが見つかりません。列: {}", columns.join(", "))]
    NoValidRows { columns: Vec<String> },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
