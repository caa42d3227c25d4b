//! 解析レポート
//!
//! LLMの解析JSON・分類済みクエリと、そこから集計したマトリクス/意図詳細をまとめる。
//! CLIの表示とエクスポートの入力になる。

use super::AnalysisOutcome;
use gsc_intent_common::{
    build_matrix, intention_details, AnalysisResult, ClassifiedQuery, DatasetSummary,
    IntentionDetails, MatrixRow,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<DatasetSummary>,
    /// LLMが返したJSON
    pub analysis: Value,
    pub classified_queries: Vec<ClassifiedQuery>,
    pub matrix: Vec<MatrixRow>,
    /// 意図の発見順
    pub intention_details: Vec<IntentionDetails>,
}

impl AnalysisReport {
    pub fn new(
        raw: Value,
        analysis: &AnalysisResult,
        classified: Vec<ClassifiedQuery>,
        summary: Option<DatasetSummary>,
    ) -> Self {
        let matrix = build_matrix(&classified, &analysis.intentions);
        let intention_details = analysis
            .intentions
            .iter()
            .map(|i| intention_details(&classified, &i.nom))
            .collect();

        Self {
            summary,
            analysis: raw,
            classified_queries: classified,
            matrix,
            intention_details,
        }
    }

    pub fn from_outcome(outcome: AnalysisOutcome, summary: Option<DatasetSummary>) -> Self {
        Self::new(outcome.raw, &outcome.analysis, outcome.classified, summary)
    }

    /// 解析JSONの型付きビュー（読めなければ空）
    pub fn typed_analysis(&self) -> AnalysisResult {
        AnalysisResult::from_raw(&self.analysis)
    }

    pub fn unclassified_count(&self) -> usize {
        self.classified_queries
            .iter()
            .filter(|q| !q.is_classified())
            .count()
    }

    /// 端末表示用テキスト
    pub fn render_text(&self) -> String {
        let analysis = self.typed_analysis();
        let mut out = String::new();

        if let Some(summary) = &self.summary {
            let _ = writeln!(out, "{} requêtes chargées", summary.rows);
            let _ = writeln!(
                out,
                "Total clics: {} / Total impressions: {}\n",
                summary.total_clicks, summary.total_impressions
            );
        }

        let _ = writeln!(out, "== Insights ==");
        let _ = writeln!(out, "  Opportunité : {}", analysis.insights.biggest_opportunity);
        let _ = writeln!(out, "  Friction    : {}", analysis.insights.biggest_friction);
        let _ = writeln!(out, "  Quick win   : {}", analysis.insights.quick_win);

        let _ = writeln!(out, "\n== Intentions ==");
        for (intention, details) in analysis.intentions.iter().zip(&self.intention_details) {
            let _ = writeln!(out, "▸ {} ({} requêtes)", intention.nom, intention.volume);
            if !intention.description.is_empty() {
                let _ = writeln!(out, "    {}", intention.description);
            }
            let _ = writeln!(
                out,
                "    Clics: {} / Impressions: {}",
                details.total_clicks, details.total_impressions
            );
            let distribution = details
                .position_distribution
                .iter()
                .map(|(bucket, count)| format!("{}: {}", bucket, count))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "    Positions: {}", distribution);
            for query in &details.top_queries {
                let _ = writeln!(
                    out,
                    "    - {} (clics {}, pos {:.1})",
                    query.row.query, query.row.clicks, query.row.position
                );
            }
            if !details.quick_wins.is_empty() {
                let wins = details
                    .quick_wins
                    .iter()
                    .map(|q| q.row.query.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(out, "    Quick wins: {}", wins);
            }
        }

        let _ = writeln!(out, "\n== Matrice position × intention ==");
        for row in &self.matrix {
            let cells = row
                .cells
                .iter()
                .map(|cell| {
                    let mark = if cell.low_data { " ⚠" } else { "" };
                    format!(
                        "{}: {} ({:.1}%){}",
                        cell.intention,
                        cell.count,
                        cell.mean_ctr * 100.0,
                        mark
                    )
                })
                .collect::<Vec<_>>()
                .join(" | ");
            let _ = writeln!(out, "{:<6} {}", row.position.label(), cells);
        }

        let _ = writeln!(
            out,
            "\nNon classifiées: {} / {}",
            self.unclassified_count(),
            self.classified_queries.len()
        );

        out
    }
}
