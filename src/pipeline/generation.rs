//! Text-generation capability: one blocking `generate` call behind a trait,
//! an OpenAI-compatible HTTP client, and a scripted mock for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationOptions {
    pub const ANALYSIS: Self = Self {
        temperature: 0.3,
        max_output_tokens: 1000,
    };
    pub const RECOMMENDATIONS: Self = Self {
        temperature: 0.4,
        max_output_tokens: 1500,
    };
    pub const MEAL_PLAN: Self = Self {
        temperature: 0.5,
        max_output_tokens: 2000,
    };
    pub const REPORT: Self = Self {
        temperature: 0.3,
        max_output_tokens: 2500,
    };
}

/// Every way a generation call can fail. A response that does not parse
/// into the requested shape is `MalformedResponse`, same category as a
/// transport failure for callers.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("AI generation is not configured. Set HEALTHWISE_LLM_API_KEY to enable it")]
    NotConfigured,

    #[error("The text-generation service could not be reached: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("The text-generation service returned an error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Text-generation client abstraction (allows mocking).
pub trait GenerationClient {
    fn generate(&self, prompt: &str, options: &GenerationOptions)
        -> Result<String, GenerationError>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl ChatCompletionsClient {
    /// Build a client with a bounded request timeout.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(GenerationError::NotConfigured)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            client,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GenerationClient for ChatCompletionsClient {
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_output_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout_secs)
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(GenerationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::MalformedResponse("Response had no content".into()))
    }
}

/// One scripted mock outcome.
pub enum MockReply {
    Text(String),
    Fail(GenerationError),
}

/// Mock generation client for testing. Replays scripted replies in order
/// and records every prompt it receives.
#[derive(Default)]
pub struct MockGenerationClient {
    replies: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<(String, GenerationOptions)>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, text: &str) -> Self {
        self.push(MockReply::Text(text.to_string()));
        self
    }

    pub fn with_failure(self, error: GenerationError) -> Self {
        self.push(MockReply::Fail(error));
        self
    }

    fn push(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Prompts and options received so far, in call order.
    pub fn calls(&self) -> Vec<(String, GenerationOptions)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl GenerationClient for MockGenerationClient {
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((prompt.to_string(), *options));

        match self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail(error)) => Err(error),
            None => Err(GenerationError::Network("no scripted reply left".into())),
        }
    }
}
