use super::{send_json, ProviderSettings};
use crate::ai_provider::AiProvider;
use crate::error::{GscIntentError, Result};
use serde::{Deserialize, Serialize};

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

pub(super) async fn complete(
    client: &reqwest::Client,
    settings: &ProviderSettings,
    api_key: &str,
    prompt: &str,
) -> Result<String> {
    let body = GeminiRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: settings.max_tokens,
        },
    };

    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        settings.gemini_base_url, settings.gemini_model
    );
    let request = client.post(url).query(&[("key", api_key)]);

    let response: GeminiResponse = send_json(request, &body, AiProvider::Gemini).await?;
    extract_text(response)
}

/// 先頭候補のテキストパートを連結
fn extract_text(response: GeminiResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GscIntentError::EmptyResponse("Empty Gemini response".into()));
    }
    Ok(text)
}
