use super::{PromptRefiner, RefineError, SYSTEM_PROMPT, user_message};
use crate::APP_USER_AGENT;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{Instrument, debug, error, info_span};
use url::Url;

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_MAX_TOKENS: u32 = 100;

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    base_url: Url,
    api_key: SecretString,
    model: String,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiConfig {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`.
    #[must_use]
    pub fn new(base_url: Url, api_key: SecretString) -> Self {
        Self {
            base_url,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    // legacy completions shape
    text: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl Choice {
    fn into_text(self) -> Option<String> {
        self.message.and_then(|m| m.content).or(self.text)
    }
}

/// [`PromptRefiner`] backed by `POST {base_url}/chat/completions`.
#[derive(Clone, Debug)]
pub struct OpenAiRefiner {
    client: Client,
    endpoint: Url,
    config: OpenAiConfig,
}

impl OpenAiRefiner {
    /// # Errors
    /// Returns an error if the endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, RefineError> {
        let endpoint = endpoint_url(&config.base_url, "chat/completions")?;
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }
}

/// Append `path` to `base` keeping every segment of `base`.
fn endpoint_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

fn classify(err: reqwest::Error) -> RefineError {
    if err.is_timeout() {
        RefineError::Timeout
    } else {
        RefineError::Http(err)
    }
}

#[async_trait]
impl PromptRefiner for OpenAiRefiner {
    async fn refine(&self, original_prompt: &str) -> Result<String, RefineError> {
        let user = user_message(original_prompt);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        };

        let span = info_span!(
            "llm.request",
            llm.model = %self.config.model,
            http.url = %self.endpoint
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .instrument(span)
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());

            error!("Refinement request failed: {status}, {message}");

            return Err(RefineError::Upstream { status, message });
        }

        let completion: ChatResponse = response.json().await.map_err(classify)?;
        let refined = completion
            .choices
            .into_iter()
            .next()
            .and_then(Choice::into_text)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        debug!(chars = refined.len(), "Prompt refined");

        Ok(refined)
    }
}
