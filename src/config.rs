use crate::ai_provider::AiProvider;
use crate::error::{GscIntentError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 選択中のプロバイダ
    pub provider: AiProvider,
    /// 選択中プロバイダのAPIキー（プロバイダ切替でクリア）
    pub api_key: Option<String>,
    pub anthropic_model: String,
    pub openai_model: String,
    pub gemini_model: String,
    /// 出力トークン上限
    pub max_tokens: u32,
    /// ゲートウェイの待ち受けアドレス
    pub bind_addr: String,
    pub anthropic_base_url: String,
    pub openai_base_url: String,
    pub gemini_base_url: String,
    /// HTTPタイムアウト（未設定ならクライアント既定＝無制限）
    pub timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: AiProvider::Anthropic,
            api_key: None,
            anthropic_model: "claude-sonnet-4-5".into(),
            openai_model: "gpt-4o".into(),
            gemini_model: "gemini-2.0-flash-exp".into(),
            max_tokens: 4096,
            bind_addr: "127.0.0.1:3000".into(),
            anthropic_base_url: "https://api.anthropic.com".into(),
            openai_base_url: "https://api.openai.com".into(),
            gemini_base_url: "https://generativelanguage.googleapis.com".into(),
            timeout_seconds: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込み（存在しなければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GscIntentError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("gsc-intent").join("config.json"))
    }

    /// プロバイダを切り替える（別のプロバイダならキーを消す）
    pub fn set_provider(&mut self, provider: AiProvider) {
        if self.provider != provider {
            self.api_key = None;
        }
        self.provider = provider;
    }

    /// キーを保存（前後の空白は除去、空ならクリア）
    pub fn set_api_key(&mut self, key: &str) {
        let key = key.trim();
        self.api_key = if key.is_empty() { None } else { Some(key.to_string()) };
    }

    /// 使用するAPIキー（環境変数を優先）
    pub fn get_api_key(&self, provider: AiProvider) -> Result<String> {
        if let Ok(key) = std::env::var(provider.api_key_env()) {
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
        }

        if provider != self.provider {
            return Err(GscIntentError::MissingApiKey);
        }
        self.api_key.clone().ok_or(GscIntentError::MissingApiKey)
    }

    pub fn model_for(&self, provider: AiProvider) -> &str {
        match provider {
            AiProvider::Anthropic => &self.anthropic_model,
            AiProvider::Openai => &self.openai_model,
            AiProvider::Gemini => &self.gemini_model,
        }
    }

    pub fn base_url_for(&self, provider: AiProvider) -> &str {
        let url = match provider {
            AiProvider::Anthropic => &self.anthropic_base_url,
            AiProvider::Openai => &self.openai_base_url,
            AiProvider::Gemini => &self.gemini_base_url,
        };
        url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_models() {
        let config = Config::default();
        assert_eq!(config.model_for(AiProvider::Anthropic), "claude-sonnet-4-5");
        assert_eq!(config.model_for(AiProvider::Openai), "gpt-4o");
        assert_eq!(config.model_for(AiProvider::Gemini), "gemini-2.0-flash-exp");
        assert_eq!(config.max_tokens, 4096);
        assert!(config.timeout_seconds.is_none());
    }

    #[test]
    fn test_switching_provider_clears_key() {
        let mut config = Config::default();
        config.set_api_key("sk-ant-xxx");
        config.set_provider(AiProvider::Anthropic);
        assert_eq!(config.api_key.as_deref(), Some("sk-ant-xxx"));

        config.set_provider(AiProvider::Gemini);
        assert_eq!(config.provider, AiProvider::Gemini);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_set_api_key_trims_and_clears() {
        let mut config = Config::default();
        config.set_api_key("  AIzaKey  ");
        assert_eq!(config.api_key.as_deref(), Some("AIzaKey"));
        config.set_api_key("   ");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.set_provider(AiProvider::Openai);
        config.set_api_key("sk-test");
        config.save_to(&path).expect("設定保存失敗");

        let loaded = Config::load_from(&path).expect("設定読み込み失敗");
        assert_eq!(loaded.provider, AiProvider::Openai);
        assert_eq!(loaded.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.provider, AiProvider::Anthropic);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"provider": "gemini", "max_tokens": 1024}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider, AiProvider::Gemini);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.openai_model, "gpt-4o");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = Config {
            openai_base_url: "http://127.0.0.1:9999/".into(),
            ..Default::default()
        };
        assert_eq!(config.base_url_for(AiProvider::Openai), "http://127.0.0.1:9999");
    }
}
