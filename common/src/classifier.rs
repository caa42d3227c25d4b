//! クエリ分類モジュール
//!
//! LLMが発見した意図に対して、各クエリを語彙の重なりで採点し
//! 最高スコアの意図を1つ割り当てる（LLM呼び出しなし・決定的）。
//!
//! ## 採点
//! - 言語シグナル（`,` / `;` 区切り）の断片がクエリに含まれるごとに +0.4
//! - 例クエリごとに 共通トークン数 / max(トークン数) × 0.6 を加算
//!
//! 正規化も上限もない。シグナル断片や例が多い意図ほど有利になる。

use crate::types::{ClassifiedQuery, Intention, QueryRow, UNCLASSIFIED};

/// シグナル断片1件あたりの加点
pub const SIGNAL_WEIGHT: f64 = 0.4;
/// 例クエリとの重なり率に掛ける重み
pub const EXAMPLE_WEIGHT: f64 = 0.6;

/// 全クエリを分類する（意図リストは読むだけ）
pub fn classify_queries(queries: &[QueryRow], intentions: &[Intention]) -> Vec<ClassifiedQuery> {
    queries
        .iter()
        .map(|q| classify_query(q, intentions))
        .collect()
}

/// 1クエリを分類する
///
/// スコアが現在の最高値を「上回った」ときだけ更新するため、
/// 同点なら先に出現した意図が勝つ。どの意図も0なら未分類。
pub fn classify_query(query: &QueryRow, intentions: &[Intention]) -> ClassifiedQuery {
    let mut best_name = UNCLASSIFIED;
    let mut best_score = 0.0;

    for intention in intentions {
        let score = score_intention(&query.query, intention);
        if score > best_score {
            best_name = intention.nom.as_str();
            best_score = score;
        }
    }

    ClassifiedQuery {
        row: query.clone(),
        intention: best_name.to_string(),
        confidence: best_score,
    }
}

/// (クエリ, 意図) の加算スコア
pub fn score_intention(query: &str, intention: &Intention) -> f64 {
    let query_lower = query.to_lowercase();
    let query_tokens: Vec<&str> = query_lower.split(' ').collect();
    let mut score = 0.0;

    if !intention.signal_linguistique.is_empty() {
        let signals = intention.signal_linguistique.to_lowercase();
        for signal in signals.split(|c: char| c == ',' || c == ';') {
            // 空の断片（末尾カンマ等）はどのクエリにも含まれる
            if query_lower.contains(signal.trim()) {
                score += SIGNAL_WEIGHT;
            }
        }
    }

    for example in &intention.exemples {
        let example_lower = example.to_lowercase();
        let example_tokens: Vec<&str> = example_lower.split(' ').collect();
        let common = example_tokens
            .iter()
            .filter(|token| query_tokens.contains(token))
            .count();
        let denominator = example_tokens.len().max(query_tokens.len());
        score += (common as f64 / denominator as f64) * EXAMPLE_WEIGHT;
    }

    score
}
