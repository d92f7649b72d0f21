use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

use crate::config::{AdviceConfig, AdviceProvider};
use crate::model::advice::{AdviceError, AdvicePrompt};

/// Turns a prompt into text. Implementations block the calling thread.
pub trait AdviceGenerator: Send + Sync {
    fn generate(&self, prompt: &AdvicePrompt) -> Result<String, AdviceError>;
}

/* =========================
   Gemini
   ========================= */

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .find(|t| !t.trim().is_empty())
    }
}

pub struct GeminiClient {
    client: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiClient {
    pub fn new(config: &AdviceConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}:generateContent",
                config.endpoint().trim_end_matches('/'),
                config.model()
            ),
            api_key: config.api_key(),
            api_key_env: config.api_key_env.clone(),
        })
    }
}

impl AdviceGenerator for GeminiClient {
    fn generate(&self, prompt: &AdvicePrompt) -> Result<String, AdviceError> {
        let Some(key) = &self.api_key else {
            return Err(AdviceError::MissingApiKey(self.api_key_env.clone()));
        };

        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.prompt.clone(),
                }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: prompt.system.clone(),
                }],
            },
        };

        let resp = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", key)
            .json(&req)
            .send()
            .map_err(|e| AdviceError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AdviceError::Status(resp.status().as_u16()));
        }

        resp.json::<GenerateContentResponse>()
            .map_err(|e| AdviceError::Decode(e.to_string()))?
            .first_text()
            .ok_or(AdviceError::EmptyResponse)
    }
}

/* =========================
   OpenAI-compatible (LM Studio)
   ========================= */

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: String,
}

pub struct ChatCompletionsClient {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(config: &AdviceConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.endpoint().to_string(),
            model: config.model().to_string(),
            temperature: config.temperature,
            api_key: config.api_key(),
        })
    }
}

impl AdviceGenerator for ChatCompletionsClient {
    fn generate(&self, prompt: &AdvicePrompt) -> Result<String, AdviceError> {
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: prompt.prompt.clone(),
                },
            ],
        };

        let mut builder = self.client.post(&self.url).json(&req);
        // Local servers run without a key.
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .map_err(|e| AdviceError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AdviceError::Status(resp.status().as_u16()));
        }

        resp.json::<ChatCompletionResponse>()
            .map_err(|e| AdviceError::Decode(e.to_string()))?
            .choices
            .into_iter()
            .map(|c| c.message.content)
            .find(|t| !t.trim().is_empty())
            .ok_or(AdviceError::EmptyResponse)
    }
}

/// Stands in when the configured client could not be built.
pub struct UnavailableGenerator {
    reason: String,
}

impl UnavailableGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AdviceGenerator for UnavailableGenerator {
    fn generate(&self, _prompt: &AdvicePrompt) -> Result<String, AdviceError> {
        Err(AdviceError::Unavailable(self.reason.clone()))
    }
}

/* =========================
   Retry
   ========================= */

/// Retries retryable failures, sleeping `delays[n]` before retry `n + 1`.
pub struct RetryingGenerator<G> {
    inner: G,
    delays: Vec<Duration>,
}

impl<G: AdviceGenerator> RetryingGenerator<G> {
    pub fn new(inner: G, delays: Vec<Duration>) -> Self {
        Self { inner, delays }
    }
}

impl<G: AdviceGenerator> AdviceGenerator for RetryingGenerator<G> {
    fn generate(&self, prompt: &AdvicePrompt) -> Result<String, AdviceError> {
        let mut retries = 0;
        loop {
            match self.inner.generate(prompt) {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && retries < self.delays.len() => {
                    let delay = self.delays[retries];
                    retries += 1;
                    log::warn!(
                        "Advice attempt {retries} failed ({e}), retrying in {}ms",
                        delay.as_millis()
                    );
                    thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Builds the configured client wrapped in the retry policy.
pub fn build_generator(config: &AdviceConfig) -> anyhow::Result<Box<dyn AdviceGenerator>> {
    let delays = config.retry_delays();
    let generator: Box<dyn AdviceGenerator> = match config.provider {
        AdviceProvider::Gemini => Box::new(RetryingGenerator::new(GeminiClient::new(config)?, delays)),
        AdviceProvider::OpenAiCompatible => Box::new(RetryingGenerator::new(
            ChatCompletionsClient::new(config)?,
            delays,
        )),
    };
    Ok(generator)
}
