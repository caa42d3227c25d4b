//! 実APIでの疎通確認（GEMINI_API_KEY がなければスキップ）

use gsc_intent::ai_provider::AiProvider;
use gsc_intent::analyzer::{run_analysis, AnalysisRequest};
use gsc_intent::config::Config;
use gsc_intent::llm::HttpCompletionClient;
use gsc_intent_common::QueryRow;

#[tokio::test]
async fn gemini_analysis_integration() {
    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("GEMINI_API_KEY not set; skipping integration test");
            return;
        }
    };

    let queries: Vec<QueryRow> = [
        ("prix agence seo", 20, 400, 0.05, 6.2),
        ("agence seo lyon", 35, 500, 0.07, 3.1),
        ("comment faire du seo", 4, 300, 0.013, 12.0),
        ("seo c'est quoi", 2, 250, 0.008, 15.4),
    ]
    .into_iter()
    .map(|(query, clicks, impressions, ctr, position)| QueryRow {
        query: query.to_string(),
        clicks,
        impressions,
        ctr,
        position,
    })
    .collect();

    let client = HttpCompletionClient::from_config(&Config::default()).expect("client build failed");
    let outcome = run_analysis(
        &client,
        AnalysisRequest {
            provider: AiProvider::Gemini,
            api_key: &api_key,
            queries: &queries,
            brand: None,
            sector: Some("SEO"),
        },
    )
    .await
    .expect("gemini analysis failed");

    assert_eq!(outcome.classified.len(), queries.len());
    assert!(outcome.raw.is_object());
}
