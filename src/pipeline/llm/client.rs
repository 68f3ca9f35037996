//! Model client: trait, HTTP implementation, and scripted test double.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::models::ChatTurn;
use crate::pipeline::llm::capability::classify_rejection;
use crate::pipeline::TriageError;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_TOKENS: u32 = 4096;

/// Per-call invocation knobs.
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    /// Ask the provider for `response_format: json_object`.
    pub json_mode: bool,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            json_mode: false,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

impl InvokeOptions {
    /// Options for calls that must return machine-parseable JSON.
    pub fn strict_json() -> Self {
        Self {
            json_mode: true,
            temperature: 0.0,
            ..Self::default()
        }
    }
}

/// Abstraction over the triage model provider.
///
/// The pipeline only ever talks to this trait so tests can substitute
/// [`ScriptedModelClient`].
pub trait ModelClient: Send + Sync {
    /// Send the conversation plus a system prompt, return the raw
    /// assistant text.
    fn invoke(
        &self,
        turns: &[ChatTurn],
        system_prompt: &str,
        options: &InvokeOptions,
    ) -> Result<String, TriageError>;
}

// ── HTTP client ─────────────────────────────────────────────

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: ChoiceMessage,
}

#[derive(Deserialize, Default)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// OpenAI-compatible chat completions client with bearer auth.
#[derive(Debug)]
pub struct HttpModelClient {
    base_url: String,
    api_key: String,
    model_id: String,
    client: reqwest::blocking::Client,
}

impl HttpModelClient {
    /// Build a client from configuration. Fails with a Configuration
    /// error when no API key is set.
    pub fn new(config: &AppConfig) -> Result<Self, TriageError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            TriageError::Configuration(
                "TRIAGE_API_KEY is required. Set it in the environment or .env.".to_string(),
            )
        })?;

        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .build()
            .map_err(|e| TriageError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
            model_id: config.model_id.clone(),
            client,
        })
    }

    fn build_request<'a>(
        &'a self,
        turns: &'a [ChatTurn],
        system_prompt: &'a str,
        options: &InvokeOptions,
        json_mode: bool,
    ) -> ChatCompletionRequest<'a> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: system_prompt,
        });
        for turn in turns {
            messages.push(WireMessage {
                role: turn.role.as_str(),
                content: &turn.content,
            });
        }
        ChatCompletionRequest {
            model: &self.model_id,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: options.temperature,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        }
    }

    fn send_once(
        &self,
        turns: &[ChatTurn],
        system_prompt: &str,
        options: &InvokeOptions,
        json_mode: bool,
    ) -> Result<String, SendFailure> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request(turns, system_prompt, options, json_mode);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(options.timeout)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    SendFailure::Retryable(TriageError::Transport(format!(
                        "Failed to connect to {}: {e}",
                        self.base_url
                    )))
                } else if e.is_timeout() {
                    SendFailure::Retryable(TriageError::Transport(format!(
                        "Request timed out after {}s",
                        options.timeout.as_secs()
                    )))
                } else {
                    SendFailure::Retryable(TriageError::Transport(e.to_string()))
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(SendFailure::Fatal(TriageError::Configuration(
                "Model API 401 Unauthorized. Check TRIAGE_API_KEY is correct and not expired."
                    .to_string(),
            )));
        }
        if status.as_u16() == 403 {
            return Err(SendFailure::Fatal(TriageError::Configuration(
                "Model API 403 Forbidden. Check the API key has access to the requested model."
                    .to_string(),
            )));
        }
        if !status.is_success() {
            let body_text = response.text().unwrap_or_default();
            if json_mode {
                let check = classify_rejection(status.as_u16(), &body_text);
                if check.retry_without_feature {
                    warn!(
                        event = "json_mode_unsupported",
                        status = status.as_u16(),
                        "provider rejected response_format, retrying without it"
                    );
                    return Err(SendFailure::JsonModeUnsupported);
                }
            }
            let error = TriageError::Provider {
                status: status.as_u16(),
                body: body_text,
            };
            return if status.is_server_error() {
                Err(SendFailure::Retryable(error))
            } else {
                Err(SendFailure::Fatal(error))
            };
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| SendFailure::Fatal(TriageError::Transport(e.to_string())))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        Ok(text.trim().to_string())
    }
}

enum SendFailure {
    Retryable(TriageError),
    Fatal(TriageError),
    JsonModeUnsupported,
}

impl ModelClient for HttpModelClient {
    fn invoke(
        &self,
        turns: &[ChatTurn],
        system_prompt: &str,
        options: &InvokeOptions,
    ) -> Result<String, TriageError> {
        let mut json_mode = options.json_mode;
        let mut last_error = None;
        let mut attempt = 0;
        while attempt < MAX_RETRIES {
            match self.send_once(turns, system_prompt, options, json_mode) {
                Ok(text) => return Ok(text),
                Err(SendFailure::Fatal(e)) => return Err(e),
                Err(SendFailure::JsonModeUnsupported) => {
                    // One-time downgrade; does not consume a retry.
                    json_mode = false;
                    continue;
                }
                Err(SendFailure::Retryable(e)) => {
                    attempt += 1;
                    if attempt < MAX_RETRIES {
                        let backoff = INITIAL_BACKOFF * 2u32.pow(attempt - 1);
                        debug!(
                            event = "model_retry",
                            attempt,
                            backoff_ms = backoff.as_millis() as u64,
                            error = %e,
                        );
                        std::thread::sleep(backoff);
                    }
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| TriageError::Transport("model invocation failed".to_string())))
    }
}

// ── Scripted test double ────────────────────────────────────

/// Model client that replays a fixed script of responses.
///
/// Each invocation consumes the next scripted response; once the script
/// is exhausted the last response repeats. `call_count` exposes how
/// many invocations happened.
pub struct ScriptedModelClient {
    responses: Vec<String>,
    calls: Mutex<usize>,
}

impl ScriptedModelClient {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            calls: Mutex::new(0),
        }
    }

    /// Convenience for a single fixed response.
    pub fn single(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ModelClient for ScriptedModelClient {
    fn invoke(
        &self,
        _turns: &[ChatTurn],
        _system_prompt: &str,
        _options: &InvokeOptions,
    ) -> Result<String, TriageError> {
        let mut calls = self.calls.lock().unwrap();
        let index = (*calls).min(self.responses.len().saturating_sub(1));
        *calls += 1;
        self.responses
            .get(index)
            .cloned()
            .ok_or_else(|| TriageError::Transport("no scripted response".to_string()))
    }
}
