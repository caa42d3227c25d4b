//! 解析データの型定義
//!
//! CLIとHTTPゲートウェイで共有される型:
//! - QueryRow: Search Consoleエクスポートの1行
//! - Intention: LLMが発見した検索意図
//! - AnalysisResult: LLMレスポンス全体（意図・言語パターン・インサイト）
//! - ClassifiedQuery: 意図を割り当てたQueryRow

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// どの意図にもスコアが付かなかったクエリのラベル
pub const UNCLASSIFIED: &str = "Non classifiée";

/// Search Consoleの1行（取り込み後は不変）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    pub query: String,
    pub clicks: u64,
    pub impressions: u64,
    /// 0.0〜1.0の割合
    pub ctr: f64,
    pub position: f64,
}

/// LLMが発見した検索意図
///
/// フィールド名はプロンプトで要求したJSONスキーマに合わせる。
/// volume / ctr_moyen / position_moyenne はLLMの申告値で再計算しない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intention {
    #[serde(default, deserialize_with = "lenient_string")]
    pub nom: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub volume: f64,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub exemples: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub signal_linguistique: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub ctr_moyen: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub position_moyenne: f64,
}

/// 言語パターン
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinguisticPatterns {
    #[serde(deserialize_with = "lenient_strings")]
    pub mots_recurrents: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub structures_questions: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub modificateurs_temporels: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub termes_comparatifs: Vec<String>,
}

/// 戦略インサイト（3つの自由記述）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insights {
    #[serde(deserialize_with = "lenient_string")]
    pub biggest_opportunity: String,
    #[serde(deserialize_with = "lenient_string")]
    pub biggest_friction: String,
    #[serde(deserialize_with = "lenient_string")]
    pub quick_win: String,
}

/// LLM解析結果
///
/// 型の崩れは要素・フィールド単位で吸収する。1つの意図の `volume` が
/// 文字列でも、他のフィールドと他の意図はそのまま読める。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient_list")]
    pub intentions: Vec<Intention>,
    #[serde(default, deserialize_with = "lenient_struct")]
    pub patterns_linguistiques: LinguisticPatterns,
    #[serde(default, deserialize_with = "lenient_struct")]
    pub insights: Insights,
}

impl AnalysisResult {
    /// LLMのJSONから型付きビューを作る（オブジェクトでなければ空）
    pub fn from_raw(raw: &Value) -> Self {
        serde_json::from_value(raw.clone()).unwrap_or_default()
    }
}

/// 意図を割り当てたクエリ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedQuery {
    #[serde(flatten)]
    pub row: QueryRow,
    /// 割り当てた意図名（該当なしは UNCLASSIFIED）
    pub intention: String,
    /// 加算スコア（確率ではない）
    pub confidence: f64,
}

impl ClassifiedQuery {
    pub fn is_classified(&self) -> bool {
        self.intention != UNCLASSIFIED
    }
}

// =============================================
// LLM出力の寛容な読み取り（null や型違いはデフォルト値）
// =============================================

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// 数値、または "12" や "3,5%" のような数値文字列
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .replace(',', ".")
            .parse()
            .unwrap_or_default(),
        _ => 0.0,
    })
}

/// 文字列の要素だけ残す
fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// 読めない要素（オブジェクト以外など）だけを捨てる
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_struct<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}
