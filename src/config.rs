use crate::error::{IncidentAiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// APIキーを読む環境変数
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub input_path: Option<PathBuf>,
    pub timeout_seconds: u64,
    pub progress_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".into(),
            input_path: None,
            timeout_seconds: 120,
            progress_interval: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| IncidentAiError::Config("no se encontró el directorio home".into()))?;
        Ok(home.join(".config").join("incident-ai").join("config.json"))
    }

    /// APIキー取得（環境変数を優先）
    pub fn get_api_key(&self) -> Result<String> {
        Self::resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    fn resolve_api_key(env_key: Option<String>, stored: Option<&str>) -> Result<String> {
        env_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| stored.filter(|k| !k.trim().is_empty()).map(str::to_string))
            .ok_or(IncidentAiError::MissingApiKey)
    }

    /// 入力ファイル取得（CLI引数を優先）
    pub fn resolve_input(&self, cli_input: Option<PathBuf>) -> Result<PathBuf> {
        cli_input
            .or_else(|| self.input_path.clone())
            .ok_or(IncidentAiError::MissingInput)
    }
}
