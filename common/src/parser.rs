//! LLMレスポンスパーサー
//!
//! 自由記述のレスポンスからJSONオブジェクトを取り出し、
//! 解析結果としてパースする。

use crate::error::{Error, Result};
use crate::types::AnalysisResult;
use serde_json::Value;

/// パース済みの解析結果
///
/// `raw` はLLMが返したJSONそのもの（未知のフィールドも保持して呼び出し側へ返す）。
/// `analysis` は分類に使う型付きビュー。
#[derive(Debug, Clone)]
pub struct ParsedAnalysis {
    pub raw: Value,
    pub analysis: AnalysisResult,
}

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 最初の `{` から最後の `}` までを貪欲に取り出す。
/// 地の文に波括弧が含まれると壊れる点は既知の制約。
///
/// # Examples
/// ```
/// use gsc_intent_common::extract_json;
///
/// let response = "Voici l'analyse : {\"intentions\": []} Bonne lecture.";
/// assert_eq!(extract_json(response).unwrap(), "{\"intentions\": []}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response.find('{').ok_or(Error::NoJsonFound)?;
    let end = response.rfind('}').ok_or(Error::NoJsonFound)?;
    if end < start {
        return Err(Error::NoJsonFound);
    }
    Ok(&response[start..=end])
}

/// 解析レスポンスをパース
///
/// # Returns
/// * `Ok(ParsedAnalysis)` - JSONとして読めた場合
/// * `Err(Error::NoJsonFound)` - `{...}` が見つからない
/// * `Err(Error::Json)` - JSONとして不正
///
/// 型付きビューは寛容に読む。intentionsが配列でなければ意図は空（全クエリが未分類）、
/// 型の違うフィールドはその値だけデフォルトになる。
pub fn parse_analysis_response(response: &str) -> Result<ParsedAnalysis> {
    let json_str = extract_json(response)?;
    let raw: Value = serde_json::from_str(json_str)?;
    let analysis = AnalysisResult::from_raw(&raw);
    Ok(ParsedAnalysis { raw, analysis })
}
