//! GSC Intent Common Library
//!
//! CLIとHTTPゲートウェイで共有される型と解析ロジック
//! （ネットワーク・ファイルI/Oを持たない純粋な処理のみ）

pub mod types;
pub mod columns;
pub mod error;
pub mod ingest;
pub mod prompts;
pub mod parser;
pub mod classifier;
pub mod matrix;

pub use types::{
    AnalysisResult, ClassifiedQuery, Insights, Intention, LinguisticPatterns, QueryRow,
    UNCLASSIFIED,
};
pub use columns::{ColumnField, HeaderAliases};
pub use error::{Error, Result};
pub use ingest::{parse_csv_str, rows_from_records, parse_ctr, DatasetSummary};
pub use prompts::{build_analysis_prompt, MAX_PROMPT_ROWS};
pub use parser::{extract_json, parse_analysis_response, ParsedAnalysis};
pub use classifier::{classify_queries, score_intention};
pub use matrix::{
    build_matrix, intention_details, is_quick_win, IntentionDetails, MatrixCell, MatrixRow,
    PositionBucket,
};
