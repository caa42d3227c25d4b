use super::{send_json, ProviderSettings};
use crate::ai_provider::AiProvider;
use crate::error::{GscIntentError, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response: choices[0].message.content
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

pub(super) async fn complete(
    client: &reqwest::Client,
    settings: &ProviderSettings,
    api_key: &str,
    prompt: &str,
) -> Result<String> {
    let body = ChatCompletionRequest {
        model: &settings.openai_model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens: settings.max_tokens,
        response_format: ResponseFormat { kind: "text" },
    };

    let request = client
        .post(format!("{}/v1/chat/completions", settings.openai_base_url))
        .bearer_auth(api_key);

    let response: ChatCompletionResponse = send_json(request, &body, AiProvider::Openai).await?;
    extract_text(response)
}

fn extract_text(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| GscIntentError::EmptyResponse("Empty OpenAI response".into()))
}
