//! 解析パイプライン
//!
//! キー検証 → プロンプト生成 → LLM呼び出し（1回） → JSON抽出 → 決定的分類。
//! HTTPゲートウェイとCLIの両方がここを通る。

mod report;

pub use report::AnalysisReport;

use crate::ai_provider::AiProvider;
use crate::error::Result;
use crate::llm::CompletionClient;
use gsc_intent_common::{
    build_analysis_prompt, classify_queries, extract_json, parse_analysis_response,
    AnalysisResult, ClassifiedQuery, DatasetSummary, QueryRow,
};
use serde_json::Value;

/// 解析リクエスト
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub provider: AiProvider,
    pub api_key: &'a str,
    pub queries: &'a [QueryRow],
    pub brand: Option<&'a str>,
    pub sector: Option<&'a str>,
}

/// 解析結果
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// LLMが返したJSON（そのまま呼び出し側へ返す）
    pub raw: Value,
    /// 分類に使った型付きビュー
    pub analysis: AnalysisResult,
    /// 入力と同じ順序・同じ件数
    pub classified: Vec<ClassifiedQuery>,
}

/// 1回分の解析を実行
///
/// キー形式が不正ならネットワーク呼び出しの前にエラーを返す。
pub async fn run_analysis(
    client: &dyn CompletionClient,
    request: AnalysisRequest<'_>,
) -> Result<AnalysisOutcome> {
    request.provider.validate_key(request.api_key)?;

    let prompt = build_analysis_prompt(request.queries, request.brand, request.sector);
    tracing::info!(
        provider = %request.provider,
        queries = request.queries.len(),
        "検索意図の解析を開始"
    );

    let response = client
        .complete(request.provider, request.api_key, &prompt)
        .await?;

    let parsed = parse_analysis_response(&response)?;
    let classified = classify_queries(request.queries, &parsed.analysis.intentions);

    let classified_count = classified.iter().filter(|q| q.is_classified()).count();
    tracing::info!(
        intentions = parsed.analysis.intentions.len(),
        classified = classified_count,
        unclassified = classified.len() - classified_count,
        "分類完了"
    );

    Ok(AnalysisOutcome {
        raw: parsed.raw,
        analysis: parsed.analysis,
        classified,
    })
}

/// 保存済みの解析JSONを読む
///
/// LLMの生レスポンス（前後に地の文があってもよい）とレポートJSONの両方を受け付ける。
/// レポートJSONなら `analysis` の中身を返す。
pub fn analysis_from_json(content: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(extract_json(content)?)?;
    match value.get("analysis") {
        Some(inner) if inner.is_object() && value.get("intentions").is_none() => Ok(inner.clone()),
        _ => Ok(value),
    }
}

/// 解析JSONで再分類してレポートを作る（LLMは呼ばない）
pub fn reclassify(raw: Value, queries: &[QueryRow], summary: Option<DatasetSummary>) -> AnalysisReport {
    let analysis = AnalysisResult::from_raw(&raw);
    let classified = classify_queries(queries, &analysis.intentions);
    AnalysisReport::new(raw, &analysis, classified, summary)
}
