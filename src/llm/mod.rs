//! LLMプロバイダ連携
//!
//! プロバイダごとに1回だけ非ストリーミングで補完を要求し、
//! 各社のレスポンス形状からテキストを取り出す。
//! - anthropic: Messages API
//! - openai: Chat Completions API
//! - gemini: generateContent API

mod anthropic;
mod gemini;
mod openai;

use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::{GscIntentError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// テキスト補完クライアント
///
/// パイプラインとゲートウェイはこのトレイト越しに呼ぶ（テストでは差し替え）。
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, provider: AiProvider, api_key: &str, prompt: &str) -> Result<String>;
}

/// プロバイダ接続設定
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub anthropic_model: String,
    pub openai_model: String,
    pub gemini_model: String,
    pub anthropic_base_url: String,
    pub openai_base_url: String,
    pub gemini_base_url: String,
    pub max_tokens: u32,
}

impl ProviderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            anthropic_model: config.model_for(AiProvider::Anthropic).to_string(),
            openai_model: config.model_for(AiProvider::Openai).to_string(),
            gemini_model: config.model_for(AiProvider::Gemini).to_string(),
            anthropic_base_url: config.base_url_for(AiProvider::Anthropic).to_string(),
            openai_base_url: config.base_url_for(AiProvider::Openai).to_string(),
            gemini_base_url: config.base_url_for(AiProvider::Gemini).to_string(),
            max_tokens: config.max_tokens,
        }
    }
}

/// reqwestによる実クライアント
pub struct HttpCompletionClient {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl HttpCompletionClient {
    pub fn new(settings: ProviderSettings, timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GscIntentError::Config(format!("HTTPクライアント生成エラー: {}", e)))?;
        Ok(Self { client, settings })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(ProviderSettings::from_config(config), config.timeout_seconds)
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, provider: AiProvider, api_key: &str, prompt: &str) -> Result<String> {
        // 呼び出し側で検証済みでも、ここを直接使う経路のために再確認
        provider.validate_key(api_key)?;

        tracing::debug!(provider = %provider, prompt_chars = prompt.len(), "LLM呼び出し開始");
        let text = match provider {
            AiProvider::Anthropic => anthropic::complete(&self.client, &self.settings, api_key, prompt).await?,
            AiProvider::Openai => openai::complete(&self.client, &self.settings, api_key, prompt).await?,
            AiProvider::Gemini => gemini::complete(&self.client, &self.settings, api_key, prompt).await?,
        };
        tracing::debug!(provider = %provider, response_chars = text.len(), "LLM呼び出し完了");

        Ok(text)
    }
}

/// 通信エラー
///
/// Gemini はURLのクエリにAPIキーを載せるため、メッセージからURLを外す。
fn transport_error(provider: AiProvider, e: reqwest::Error) -> GscIntentError {
    GscIntentError::ApiCall(format!("{}: {}", provider.display_name(), e.without_url()))
}

/// JSONをPOSTしてレスポンスを型に読む（各プロバイダ共通）
async fn send_json<B, R>(request: reqwest::RequestBuilder, body: &B, provider: AiProvider) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !status.is_success() {
        return Err(GscIntentError::ApiCall(format!(
            "{} API error {}: {}",
            provider.display_name(),
            status,
            text
        )));
    }

    serde_json::from_str(&text).map_err(|e| {
        GscIntentError::ApiParse(format!("{} response: {}", provider.display_name(), e))
    })
}
