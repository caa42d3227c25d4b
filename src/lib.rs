//! gsc-intent
//!
//! Search Consoleのクエリから検索意図をLLMで発見し、
//! 全クエリを決定的ルールで分類する（CLI / HTTPゲートウェイ）。

pub mod ai_provider;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod gateway;
pub mod ingest;
pub mod llm;
