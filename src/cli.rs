use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gsc-intent")]
#[command(about = "Search Console 検索意図分析ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTPゲートウェイを起動（POST /api/analyze, GET /health）
    Serve {
        /// 待ち受けアドレス（省略時は設定ファイルの bind_addr）
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// エクスポートファイルを読み込んで概要を表示
    Inspect {
        /// Search ConsoleのCSV / xlsx
        #[arg(required = true)]
        file: PathBuf,

        /// 追加の列名エイリアス（JSON）
        #[arg(long)]
        aliases: Option<PathBuf>,
    },

    /// LLMで検索意図を発見し、全クエリを分類
    Analyze {
        /// Search ConsoleのCSV / xlsx
        #[arg(required = true)]
        file: PathBuf,

        /// AIプロバイダ（省略時は設定ファイルの provider）
        #[arg(long)]
        provider: Option<AiProvider>,

        /// APIキー（省略時は環境変数 → 設定ファイル）
        #[arg(long)]
        api_key: Option<String>,

        /// ブランド名
        #[arg(long)]
        brand: Option<String>,

        /// 業種
        #[arg(long)]
        sector: Option<String>,

        /// 出力JSONファイル（デフォルト: 入力ファイル名.report.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 追加の列名エイリアス（JSON）
        #[arg(long)]
        aliases: Option<PathBuf>,
    },

    /// 保存済みの解析JSONで再分類（LLMは呼ばない）
    Classify {
        /// Search ConsoleのCSV / xlsx
        #[arg(required = true)]
        file: PathBuf,

        /// 解析JSON（LLMの解析結果、またはレポートJSON）
        #[arg(short, long, required = true)]
        analysis: PathBuf,

        /// 出力JSONファイル
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 追加の列名エイリアス（JSON）
        #[arg(long)]
        aliases: Option<PathBuf>,
    },

    /// レポートJSONからExcel/JSONを生成
    Export {
        /// 入力レポートJSON
        #[arg(required = true)]
        input: PathBuf,

        /// 出力形式 (excel/json/both)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// プロバイダを設定（変更すると保存済みキーは消える）
        #[arg(long)]
        set_provider: Option<AiProvider>,

        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Excel,
    Json,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use excel, json, or both", s)),
        }
    }
}
