//! 集計モジュール（順位 × 意図マトリクス / 意図ごとの詳細）
//!
//! 分類済みクエリを読むだけの集計。LLMの申告値は使わない。

use crate::types::{ClassifiedQuery, Intention};
use serde::{Deserialize, Serialize};

/// セルの件数がこれ未満ならデータ不足扱い
pub const LOW_DATA_THRESHOLD: usize = 5;
/// クイックウィンとみなす表示回数（これを超える）
pub const QUICK_WIN_MIN_IMPRESSIONS: u64 = 100;
/// 意図詳細に載せる上位クエリ数
pub const TOP_QUERIES: usize = 5;

/// 掲載順位の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionBucket {
    #[serde(rename = "P1-3")]
    Top3,
    #[serde(rename = "P4-7")]
    Top7,
    #[serde(rename = "P8-10")]
    Top10,
    #[serde(rename = "P11+")]
    Beyond,
}

impl PositionBucket {
    pub const ALL: [PositionBucket; 4] = [
        PositionBucket::Top3,
        PositionBucket::Top7,
        PositionBucket::Top10,
        PositionBucket::Beyond,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PositionBucket::Top3 => "P1-3",
            PositionBucket::Top7 => "P4-7",
            PositionBucket::Top10 => "P8-10",
            PositionBucket::Beyond => "P11+",
        }
    }

    /// 平均掲載順位（小数）から区分を決める
    ///
    /// 区分は隙間なく連続（3.5はP1-3、7.2はP4-7）。1未満（不明）はどこにも入らない。
    /// P11+ に上限はなく、100位を超える順位もP11+に入る。
    pub fn for_position(position: f64) -> Option<Self> {
        if position < 1.0 || position.is_nan() {
            None
        } else if position < 4.0 {
            Some(PositionBucket::Top3)
        } else if position < 8.0 {
            Some(PositionBucket::Top7)
        } else if position < 11.0 {
            Some(PositionBucket::Top10)
        } else {
            Some(PositionBucket::Beyond)
        }
    }

    pub fn contains(&self, position: f64) -> bool {
        Self::for_position(position) == Some(*self)
    }
}

impl std::fmt::Display for PositionBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// マトリクスの1セル
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixCell {
    pub intention: String,
    pub count: usize,
    /// セル内クエリのCTR平均（0件なら0）
    pub mean_ctr: f64,
    /// 0 < count < LOW_DATA_THRESHOLD
    pub low_data: bool,
    pub queries: Vec<ClassifiedQuery>,
}

/// マトリクスの1行（順位区分）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixRow {
    pub position: PositionBucket,
    pub cells: Vec<MatrixCell>,
}

/// 意図ごとの詳細（アコーディオン表示用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentionDetails {
    pub intention: String,
    pub total_clicks: u64,
    pub total_impressions: u64,
    /// クリック数の多い順（同数は元の順序）
    pub top_queries: Vec<ClassifiedQuery>,
    /// PositionBucket::ALL の順
    pub position_distribution: Vec<(PositionBucket, usize)>,
    pub quick_wins: Vec<ClassifiedQuery>,
}

/// 順位4〜10かつ表示回数が閾値超え
pub fn is_quick_win(query: &ClassifiedQuery) -> bool {
    let position = query.row.position;
    (4.0..=10.0).contains(&position) && query.row.impressions > QUICK_WIN_MIN_IMPRESSIONS
}

/// 順位区分 × 意図のマトリクスを作成
///
/// 列は意図の発見順。未分類クエリは列を持たない。
pub fn build_matrix(classified: &[ClassifiedQuery], intentions: &[Intention]) -> Vec<MatrixRow> {
    PositionBucket::ALL
        .iter()
        .map(|bucket| {
            let cells = intentions
                .iter()
                .map(|intention| {
                    let queries: Vec<ClassifiedQuery> = classified
                        .iter()
                        .filter(|q| q.intention == intention.nom && bucket.contains(q.row.position))
                        .cloned()
                        .collect();
                    let count = queries.len();
                    let mean_ctr = if count > 0 {
                        queries.iter().map(|q| q.row.ctr).sum::<f64>() / count as f64
                    } else {
                        0.0
                    };

                    MatrixCell {
                        intention: intention.nom.clone(),
                        count,
                        mean_ctr,
                        low_data: count > 0 && count < LOW_DATA_THRESHOLD,
                        queries,
                    }
                })
                .collect();

            MatrixRow {
                position: *bucket,
                cells,
            }
        })
        .collect()
}

/// 意図1件の詳細を集計
pub fn intention_details(classified: &[ClassifiedQuery], intention_name: &str) -> IntentionDetails {
    let queries: Vec<&ClassifiedQuery> = classified
        .iter()
        .filter(|q| q.intention == intention_name)
        .collect();

    let total_clicks: u64 = queries.iter().map(|q| q.row.clicks).sum();
    let total_impressions: u64 = queries.iter().map(|q| q.row.impressions).sum();

    // 入力は並べ替えない（コピーをソート）
    let mut sorted = queries.clone();
    sorted.sort_by(|a, b| b.row.clicks.cmp(&a.row.clicks));
    let top_queries = sorted.into_iter().take(TOP_QUERIES).cloned().collect();

    let position_distribution = PositionBucket::ALL
        .iter()
        .map(|bucket| {
            let count = queries.iter().filter(|q| bucket.contains(q.row.position)).count();
            (*bucket, count)
        })
        .collect();

    let quick_wins = queries
        .iter()
        .filter(|q| is_quick_win(q))
        .map(|q| (*q).clone())
        .collect();

    IntentionDetails {
        intention: intention_name.to_string(),
        total_clicks,
        total_impressions,
        top_queries,
        position_distribution,
        quick_wins,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QueryRow, UNCLASSIFIED};

    fn classified(query: &str, intention: &str, clicks: u64, impressions: u64, ctr: f64, position: f64) -> ClassifiedQuery {
        ClassifiedQuery {
            row: QueryRow {
                query: query.to_string(),
                clicks,
                impressions,
                ctr,
                position,
            },
            intention: intention.to_string(),
            confidence: 0.4,
        }
    }

    fn named(nom: &str) -> Intention {
        Intention {
            nom: nom.to_string(),
            ..Default::default()
        }
    }

    // =============================================
    // PositionBucket テスト
    // =============================================

    #[test]
    fn test_bucket_integer_positions() {
        assert_eq!(PositionBucket::for_position(1.0), Some(PositionBucket::Top3));
        assert_eq!(PositionBucket::for_position(3.0), Some(PositionBucket::Top3));
        assert_eq!(PositionBucket::for_position(4.0), Some(PositionBucket::Top7));
        assert_eq!(PositionBucket::for_position(7.0), Some(PositionBucket::Top7));
        assert_eq!(PositionBucket::for_position(8.0), Some(PositionBucket::Top10));
        assert_eq!(PositionBucket::for_position(10.0), Some(PositionBucket::Top10));
        assert_eq!(PositionBucket::for_position(11.0), Some(PositionBucket::Beyond));
        assert_eq!(PositionBucket::for_position(150.0), Some(PositionBucket::Beyond));
    }

    #[test]
    fn test_bucket_fractional_positions() {
        assert_eq!(PositionBucket::for_position(3.5), Some(PositionBucket::Top3));
        assert_eq!(PositionBucket::for_position(7.9), Some(PositionBucket::Top7));
        assert_eq!(PositionBucket::for_position(10.4), Some(PositionBucket::Top10));
    }

    #[test]
    fn test_bucket_unknown_position() {
        assert_eq!(PositionBucket::for_position(0.0), None);
        assert_eq!(PositionBucket::for_position(f64::NAN), None);
    }

    #[test]
    fn test_bucket_labels() {
        let labels: Vec<&str> = PositionBucket::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(labels, vec!["P1-3", "P4-7", "P8-10", "P11+"]);
        assert_eq!(serde_json::to_value(PositionBucket::Beyond).unwrap(), "P11+");
    }

    // =============================================
    // build_matrix テスト
    // =============================================

    #[test]
    fn test_build_matrix_means_and_counts() {
        let queries = vec![
            classified("a", "Achat", 10, 100, 0.10, 2.0),
            classified("b", "Achat", 5, 100, 0.20, 3.0),
            classified("c", "Prix", 1, 50, 0.04, 15.0),
            classified("d", UNCLASSIFIED, 1, 50, 0.50, 2.0),
        ];
        let intentions = vec![named("Achat"), named("Prix")];

        let matrix = build_matrix(&queries, &intentions);

        assert_eq!(matrix.len(), 4);
        assert_eq!(matrix[0].position, PositionBucket::Top3);
        let achat_top = &matrix[0].cells[0];
        assert_eq!(achat_top.intention, "Achat");
        assert_eq!(achat_top.count, 2);
        assert!((achat_top.mean_ctr - 0.15).abs() < 1e-12);
        assert!(achat_top.low_data);

        let prix_top = &matrix[0].cells[1];
        assert_eq!(prix_top.count, 0);
        assert_eq!(prix_top.mean_ctr, 0.0);
        assert!(!prix_top.low_data);

        let prix_beyond = &matrix[3].cells[1];
        assert_eq!(prix_beyond.count, 1);
        assert_eq!(prix_beyond.queries[0].row.query, "c");
    }

    #[test]
    fn test_build_matrix_beyond_has_no_upper_cap() {
        let queries = vec![
            classified("a", "Achat", 0, 20, 0.0, 100.0),
            classified("b", "Achat", 0, 20, 0.0, 100.5),
            classified("c", "Achat", 0, 20, 0.0, 240.0),
        ];
        let matrix = build_matrix(&queries, &[named("Achat")]);
        assert_eq!(matrix[3].position, PositionBucket::Beyond);
        assert_eq!(matrix[3].cells[0].count, 3);
    }

    #[test]
    fn test_build_matrix_low_data_threshold() {
        let queries: Vec<ClassifiedQuery> = (0..5)
            .map(|i| classified(&format!("q{}", i), "Achat", 1, 10, 0.1, 5.0))
            .collect();
        let matrix = build_matrix(&queries, &[named("Achat")]);
        assert_eq!(matrix[1].cells[0].count, 5);
        assert!(!matrix[1].cells[0].low_data);
    }

    #[test]
    fn test_build_matrix_no_intentions() {
        let matrix = build_matrix(&[classified("a", UNCLASSIFIED, 1, 1, 0.0, 1.0)], &[]);
        assert_eq!(matrix.len(), 4);
        assert!(matrix.iter().all(|row| row.cells.is_empty()));
    }

    // =============================================
    // intention_details テスト
    // =============================================

    #[test]
    fn test_intention_details() {
        let queries = vec![
            classified("a", "Achat", 3, 150, 0.02, 5.0),
            classified("b", "Achat", 9, 80, 0.11, 2.0),
            classified("c", "Achat", 9, 300, 0.03, 9.0),
            classified("d", "Prix", 50, 900, 0.05, 6.0),
            classified("e", "Achat", 1, 20, 0.05, 12.0),
        ];

        let details = intention_details(&queries, "Achat");

        assert_eq!(details.total_clicks, 22);
        assert_eq!(details.total_impressions, 550);
        let top: Vec<&str> = details.top_queries.iter().map(|q| q.row.query.as_str()).collect();
        assert_eq!(top, vec!["b", "c", "a", "e"]);
        assert_eq!(
            details.position_distribution,
            vec![
                (PositionBucket::Top3, 1),
                (PositionBucket::Top7, 1),
                (PositionBucket::Top10, 1),
                (PositionBucket::Beyond, 1),
            ]
        );
        let wins: Vec<&str> = details.quick_wins.iter().map(|q| q.row.query.as_str()).collect();
        assert_eq!(wins, vec!["a", "c"]);
        // 入力の順序は変わらない
        assert_eq!(queries[0].row.query, "a");
    }

    #[test]
    fn test_intention_details_top_limit() {
        let queries: Vec<ClassifiedQuery> = (0..8)
            .map(|i| classified(&format!("q{}", i), "Achat", i, 10, 0.1, 5.0))
            .collect();
        let details = intention_details(&queries, "Achat");
        assert_eq!(details.top_queries.len(), TOP_QUERIES);
        assert_eq!(details.top_queries[0].row.clicks, 7);
    }

    #[test]
    fn test_is_quick_win_bounds() {
        assert!(is_quick_win(&classified("a", "x", 0, 101, 0.0, 4.0)));
        assert!(is_quick_win(&classified("a", "x", 0, 101, 0.0, 10.0)));
        assert!(!is_quick_win(&classified("a", "x", 0, 100, 0.0, 5.0)));
        assert!(!is_quick_win(&classified("a", "x", 0, 500, 0.0, 3.9)));
        assert!(!is_quick_win(&classified("a", "x", 0, 500, 0.0, 10.5)));
    }
}
