use clap::Parser;
use gsc_intent::{analyzer, cli, config, error, export, gateway, ingest, llm};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG優先、なければ --verbose で debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "gsc_intent=debug" } else { "gsc_intent=info" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load()?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            let client = llm::HttpCompletionClient::from_config(&config)?;
            println!("🌐 gsc-intent - ゲートウェイ起動: http://{}\n", bind_addr);
            gateway::run_http(Arc::new(client), &bind_addr).await?;
        }

        Commands::Inspect { file, aliases } => {
            println!("📊 gsc-intent - 読み込み確認\n");

            let aliases = ingest::load_aliases(aliases.as_deref())?;
            let dataset = ingest::load_file(&file, &aliases)?;
            let summary = &dataset.summary;

            println!("✔ {} requêtes chargées", summary.rows);
            println!("  Total clics: {}", summary.total_clicks);
            println!("  Total impressions: {}", summary.total_impressions);
            println!("  列: {}", summary.columns.join(", "));
        }

        Commands::Analyze { file, provider, api_key, brand, sector, output, aliases } => {
            println!("🔍 gsc-intent - 検索意図分析\n");

            let provider = provider.unwrap_or(config.provider);
            let api_key = match api_key {
                Some(key) => key,
                None => config.get_api_key(provider)?,
            };

            // 1. 読み込み
            println!("[1/3] データを読み込み中...");
            let aliases = ingest::load_aliases(aliases.as_deref())?;
            let dataset = ingest::load_file(&file, &aliases)?;
            println!("✔ {} requêtes chargées\n", dataset.summary.rows);

            // 2. LLM解析
            println!("[2/3] AI解析中... ({})", provider.display_name());
            let client = llm::HttpCompletionClient::from_config(&config)?;
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner());
            spinner.set_message("Analyse IA en cours...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let outcome = analyzer::run_analysis(
                &client,
                analyzer::AnalysisRequest {
                    provider,
                    api_key: &api_key,
                    queries: &dataset.rows,
                    brand: brand.as_deref(),
                    sector: sector.as_deref(),
                },
            )
            .await;
            spinner.finish_and_clear();
            let outcome = outcome?;
            println!("✔ 解析完了\n");

            // 3. 結果保存
            let report = analyzer::AnalysisReport::from_outcome(outcome, Some(dataset.summary));
            println!("{}", report.render_text());

            println!("[3/3] 結果を保存中...");
            let output = output.unwrap_or_else(|| default_report_path(&file));
            export::json::write_report(&report, &output)?;
            println!("✔ 結果を保存: {}", output.display());

            println!("\n✅ 分析完了");
        }

        Commands::Classify { file, analysis, output, aliases } => {
            println!("🏷  gsc-intent - 再分類\n");

            let aliases = ingest::load_aliases(aliases.as_deref())?;
            let dataset = ingest::load_file(&file, &aliases)?;

            if !analysis.exists() {
                return Err(error::GscIntentError::FileNotFound(analysis.display().to_string()));
            }
            let content = std::fs::read_to_string(&analysis)?;
            let raw = analyzer::analysis_from_json(&content)?;

            let report = analyzer::reclassify(raw, &dataset.rows, Some(dataset.summary));
            println!("{}", report.render_text());

            let output = output.unwrap_or_else(|| default_report_path(&file));
            export::json::write_report(&report, &output)?;
            println!("✔ 結果を保存: {}", output.display());
        }

        Commands::Export { input, format, output } => {
            println!("📄 gsc-intent - エクスポート\n");

            let report = export::json::read_report(&input)?;
            let output = output.unwrap_or_else(|| {
                input.parent().unwrap_or_else(|| Path::new(".")).to_path_buf()
            });
            export::export_report(&report, &format, &output)?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Config { set_provider, set_api_key, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(provider) = set_provider {
                config.set_provider(provider);
                changed = true;
                println!("✔ プロバイダを設定しました: {}", provider.display_name());
            }

            if let Some(key) = set_api_key {
                config.provider.validate_key(key.trim())?;
                config.set_api_key(&key);
                changed = true;
                println!("✔ APIキーを設定しました");
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  プロバイダ: {}", config.provider.display_name());
                println!("  モデル: {}", config.model_for(config.provider));
                println!("  最大トークン: {}", config.max_tokens);
                println!("  待ち受け: {}", config.bind_addr);
                println!("  APIキー: {}", if config.api_key.is_some() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

/// 入力ファイルの隣に <名前>.report.json
fn default_report_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("gsc-intent");
    input.with_file_name(format!("{}.report.json", stem))
}
