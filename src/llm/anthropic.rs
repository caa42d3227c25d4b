use super::{send_json, ProviderSettings};
use crate::ai_provider::AiProvider;
use crate::error::{GscIntentError, Result};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub(super) async fn complete(
    client: &reqwest::Client,
    settings: &ProviderSettings,
    api_key: &str,
    prompt: &str,
) -> Result<String> {
    let body = MessagesRequest {
        model: &settings.anthropic_model,
        max_tokens: settings.max_tokens,
        messages: vec![Message {
            role: "user",
            content: prompt,
        }],
    };

    let request = client
        .post(format!("{}/v1/messages", settings.anthropic_base_url))
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION);

    let response: MessagesResponse = send_json(request, &body, AiProvider::Anthropic).await?;
    extract_text(response)
}

/// 先頭のコンテンツブロックがテキストであること
fn extract_text(response: MessagesResponse) -> Result<String> {
    let block = response
        .content
        .into_iter()
        .next()
        .ok_or_else(|| GscIntentError::EmptyResponse("Empty Anthropic response".into()))?;

    if block.kind != "text" {
        return Err(GscIntentError::ApiParse("Unexpected Anthropic response type".into()));
    }

    Ok(block.text.unwrap_or_default())
}
