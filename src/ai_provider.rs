//! LLMプロバイダ定義
//!
//! 3社のプロバイダと、ネットワーク呼び出し前に行うキー形式チェック。

use crate::error::{GscIntentError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Anthropic,
    Openai,
    Gemini,
}

impl AiProvider {
    pub const ALL: [AiProvider; 3] = [AiProvider::Anthropic, AiProvider::Openai, AiProvider::Gemini];

    /// リクエストで使う識別子
    pub fn wire_name(&self) -> &'static str {
        match self {
            AiProvider::Anthropic => "anthropic",
            AiProvider::Openai => "openai",
            AiProvider::Gemini => "gemini",
        }
    }

    /// 表示名（エラーメッセージ用）
    pub fn display_name(&self) -> &'static str {
        match self {
            AiProvider::Anthropic => "Anthropic",
            AiProvider::Openai => "OpenAI",
            AiProvider::Gemini => "Gemini",
        }
    }

    /// APIキーを読む環境変数
    pub fn api_key_env(&self) -> &'static str {
        match self {
            AiProvider::Anthropic => "ANTHROPIC_API_KEY",
            AiProvider::Openai => "OPENAI_API_KEY",
            AiProvider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.wire_name() == name)
    }

    /// キーの接頭辞チェック
    ///
    /// OpenAIは `sk-` だが Anthropic の `sk-ant-` は受け付けない。
    pub fn accepts_key(&self, api_key: &str) -> bool {
        match self {
            AiProvider::Anthropic => api_key.starts_with("sk-ant-"),
            AiProvider::Openai => api_key.starts_with("sk-") && !api_key.starts_with("sk-ant-"),
            AiProvider::Gemini => api_key.starts_with("AI"),
        }
    }

    pub fn validate_key(&self, api_key: &str) -> Result<()> {
        if self.accepts_key(api_key) {
            Ok(())
        } else {
            Err(GscIntentError::InvalidApiKey {
                provider: self.display_name(),
            })
        }
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}
