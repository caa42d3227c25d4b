use thiserror::Error;

#[derive(Error, Debug)]
pub enum GscIntentError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`gsc-intent config --set-api-key YOUR_KEY` で設定するか --api-key を指定してください")]
    MissingApiKey,

    /// プロバイダごとのキー形式チェックに失敗（ネットワーク呼び出し前）
    #[error("Invalid {provider} API key format")]
    InvalidApiKey { provider: &'static str },

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("未対応のファイル形式です: {0}（csv / xlsx / xls / ods）")]
    UnsupportedFormat(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("{0}")]
    EmptyResponse(String),

    #[error("スプレッドシート読み込みエラー: {0}")]
    Spreadsheet(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] gsc_intent_common::Error),
}

pub type Result<T> = std::result::Result<T, GscIntentError>;
