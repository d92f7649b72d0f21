use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::model::catalog::Region;

pub const APP_DIR_NAME: &str = "completionist_hub";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
const LM_STUDIO_ENDPOINT: &str = "http://localhost:1234/v1/chat/completions";
const LM_STUDIO_MODEL: &str = "local-model";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceProvider {
    Gemini,
    /// Any OpenAI-style `/v1/chat/completions` server, e.g. LM Studio.
    OpenAiCompatible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    pub provider: AdviceProvider,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    /// Pause before each retry. Its length is the number of retries.
    pub retry_delays_ms: Vec<u64>,
    pub request_timeout_secs: u64,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            provider: AdviceProvider::Gemini,
            endpoint: None,
            model: None,
            api_key_env: "GEMINI_API_KEY".into(),
            temperature: 0.7,
            retry_delays_ms: vec![1000, 2000, 4000],
            request_timeout_secs: 30,
        }
    }
}

impl AdviceConfig {
    pub fn endpoint(&self) -> &str {
        match (&self.endpoint, self.provider) {
            (Some(endpoint), _) => endpoint,
            (None, AdviceProvider::Gemini) => GEMINI_ENDPOINT,
            (None, AdviceProvider::OpenAiCompatible) => LM_STUDIO_ENDPOINT,
        }
    }

    pub fn model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model,
            (None, AdviceProvider::Gemini) => GEMINI_MODEL,
            (None, AdviceProvider::OpenAiCompatible) => LM_STUDIO_MODEL,
        }
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub advice: AdviceConfig,
    /// Per-region map background (URL or file path). Blank unsets the built-in.
    pub map_images: BTreeMap<Region, String>,
    /// Where progress files live. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push(APP_DIR_NAME);
            path
        })
    }
}

pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR_NAME);
    path
}

fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Reads `config.json`, writing the defaults on first run. Never fails.
pub fn load_config() -> AppConfig {
    let path = config_path();
    match fs::read_to_string(&path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {}: {e}", path.display());
            AppConfig::default()
        }),
        Err(_) => {
            let config = AppConfig::default();
            save_config(&config);
            config
        }
    }
}

pub fn save_config(config: &AppConfig) {
    let path = config_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    match serde_json::to_string_pretty(config) {
        Ok(json) => {
            if let Err(e) = fs::write(&path, json) {
                log::warn!("Could not write {}: {e}", path.display());
            }
        }
        Err(e) => log::warn!("Could not serialize config: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_provider() {
        let mut advice = AdviceConfig::default();
        assert_eq!(advice.endpoint(), GEMINI_ENDPOINT);
        assert_eq!(advice.model(), GEMINI_MODEL);

        advice.provider = AdviceProvider::OpenAiCompatible;
        assert_eq!(advice.endpoint(), LM_STUDIO_ENDPOINT);

        advice.model = Some("mistral".into());
        assert_eq!(advice.model(), "mistral");
    }

    #[test]
    fn default_retry_schedule_is_one_two_four_seconds() {
        let delays = AdviceConfig::default().retry_delays();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let raw = r#"{
            "advice": { "provider": "open_ai_compatible" },
            "map_images": { "velen": "/maps/velen.png" }
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.advice.provider, AdviceProvider::OpenAiCompatible);
        assert_eq!(config.advice.retry_delays_ms, vec![1000, 2000, 4000]);
        assert_eq!(
            config.map_images.get(&Region::Velen).map(String::as_str),
            Some("/maps/velen.png")
        );
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn data_dir_override_wins() {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/tmp/hub")),
            ..Default::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/hub"));
    }
}
