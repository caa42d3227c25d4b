//! 列名エイリアスモジュール
//!
//! Search Consoleのエクスポートは言語設定で列名が変わるため、
//! フィールドごとに候補の列名を優先順に持つ。

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 取り込み対象のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnField {
    Query,
    Clicks,
    Impressions,
    Ctr,
    Position,
}

impl ColumnField {
    pub const ALL: [ColumnField; 5] = [
        ColumnField::Query,
        ColumnField::Clicks,
        ColumnField::Impressions,
        ColumnField::Ctr,
        ColumnField::Position,
    ];
}

impl std::fmt::Display for ColumnField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnField::Query => write!(f, "query"),
            ColumnField::Clicks => write!(f, "clicks"),
            ColumnField::Impressions => write!(f, "impressions"),
            ColumnField::Ctr => write!(f, "ctr"),
            ColumnField::Position => write!(f, "position"),
        }
    }
}

/// フィールド → 列名候補（優先順）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderAliases {
    aliases: HashMap<ColumnField, Vec<String>>,
}

impl Default for HeaderAliases {
    /// Search Console（仏語/英語UI）の既定列名
    fn default() -> Self {
        let mut aliases = HashMap::new();
        aliases.insert(
            ColumnField::Query,
            to_owned(&[
                "Requêtes les plus fréquentes",
                "Requêtes",
                "Top queries",
                "Requête",
                "Query",
                "query",
            ]),
        );
        aliases.insert(ColumnField::Clicks, to_owned(&["Clicks", "Clics", "clicks"]));
        aliases.insert(ColumnField::Impressions, to_owned(&["Impressions", "impressions"]));
        aliases.insert(ColumnField::Ctr, to_owned(&["CTR", "ctr"]));
        aliases.insert(ColumnField::Position, to_owned(&["Position", "position"]));
        Self { aliases }
    }
}

impl HeaderAliases {
    /// フィールドの列名候補
    pub fn candidates(&self, field: ColumnField) -> &[String] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 候補の末尾に列名を追加（既定の候補が優先される）
    pub fn push(&mut self, field: ColumnField, header: impl Into<String>) {
        let header = header.into();
        let entry = self.aliases.entry(field).or_default();
        if !entry.contains(&header) {
            entry.push(header);
        }
    }

    /// JSON（`{"query": ["Keyword"], "clicks": ["Visits"]}`）で候補を追加
    pub fn extend_from_json(&mut self, json: &str) -> Result<()> {
        let extra: HashMap<ColumnField, Vec<String>> = serde_json::from_str(json)?;
        for field in ColumnField::ALL {
            if let Some(headers) = extra.get(&field) {
                for header in headers {
                    self.push(field, header.clone());
                }
            }
        }
        Ok(())
    }

    /// 候補順に見て最初の「空でない」セル値を返す
    ///
    /// 列が存在しても値が空なら次の候補を見る。
    pub fn resolve<'a, F>(&self, field: ColumnField, lookup: F) -> Option<&'a str>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        self.candidates(field)
            .iter()
            .filter_map(|header| lookup(header.as_str()))
            .find(|value| !value.is_empty())
    }
}

fn to_owned(headers: &[&str]) -> Vec<String> {
    headers.iter().map(|h| h.to_string()).collect()
}
