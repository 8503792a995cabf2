/// LLM Client: the single point of entry for all chat-completion calls in Quill.
///
/// ARCHITECTURAL RULE: No other module may call the completion endpoint directly.
/// Handlers go through `CompletionGateway`; `LlmClient` is the production implementation
/// against any OpenAI-compatible `/chat/completions` endpoint.
///
/// One request per call. No retries, no caching: identical prompts are sent again.
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::credentials::ResolvedCredentials;
use crate::errors::AppError;

pub mod prompts;

const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Outcome of one completion call. Never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletionResult {
    Success { text: String },
    Failure { reason: String },
}

impl CompletionResult {
    /// Converts a failure into the handler error type, keeping its reason.
    pub fn into_text(self) -> Result<String, AppError> {
        match self {
            CompletionResult::Success { text } => Ok(text),
            CompletionResult::Failure { reason } => Err(AppError::Llm(reason)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sampling parameters
// ────────────────────────────────────────────────────────────────────────────

/// Effective sampling parameters sent with a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Client-supplied overrides; absent fields take the operation's defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SamplingOverride {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Per-operation defaults and the ceiling on `max_tokens`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingProfile {
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_tokens_ceiling: u32,
}

impl SamplingProfile {
    pub const fn new(temperature: f32, max_tokens: u32, max_tokens_ceiling: u32) -> Self {
        Self {
            temperature,
            max_tokens,
            max_tokens_ceiling,
        }
    }

    /// Applies overrides, rejecting temperature outside [0, 1] and max_tokens outside [1, ceiling].
    pub fn resolve(&self, overrides: Option<&SamplingOverride>) -> Result<Sampling, AppError> {
        let temperature = overrides
            .and_then(|o| o.temperature)
            .unwrap_or(self.temperature);
        let max_tokens = overrides
            .and_then(|o| o.max_tokens)
            .unwrap_or(self.max_tokens);

        if !(0.0..=1.0).contains(&temperature) {
            return Err(AppError::Validation(format!(
                "temperature must be between 0 and 1, got {temperature}"
            )));
        }
        if max_tokens == 0 || max_tokens > self.max_tokens_ceiling {
            return Err(AppError::Validation(format!(
                "max_tokens must be between 1 and {}, got {max_tokens}",
                self.max_tokens_ceiling
            )));
        }

        Ok(Sampling {
            temperature,
            max_tokens,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gateway trait
// ────────────────────────────────────────────────────────────────────────────

/// The completion gateway. Implementations must not panic or return errors:
/// every fault is reported as `CompletionResult::Failure`.
///
/// Carried in `AppState` as `Arc<dyn CompletionGateway>`.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(
        &self,
        credentials: &ResolvedCredentials,
        system: &str,
        user: &str,
        sampling: Sampling,
    ) -> CompletionResult;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI-compatible chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// LlmClient
// ────────────────────────────────────────────────────────────────────────────

/// HTTP client for OpenAI-compatible endpoints. Credentials are per call,
/// since every session may bring its own key and base URL.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
}

impl LlmClient {
    pub fn new() -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
        })
    }

    /// Makes one call and returns the trimmed content of the first choice.
    pub async fn call(
        &self,
        credentials: &ResolvedCredentials,
        system: &str,
        user: &str,
        sampling: Sampling,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: credentials.model.as_str(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
        };

        let response = self
            .client
            .post(chat_completions_url(&credentials.base_url))
            .bearer_auth(&credentials.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                credentials.model.as_str(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionGateway for LlmClient {
    async fn complete(
        &self,
        credentials: &ResolvedCredentials,
        system: &str,
        user: &str,
        sampling: Sampling,
    ) -> CompletionResult {
        match self.call(credentials, system, user, sampling).await {
            Ok(text) => CompletionResult::Success { text },
            Err(e) => {
                warn!("LLM call failed: {e}");
                CompletionResult::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// Deserializes a structured reply, tolerating markdown code fences around the JSON.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_json_fences(text))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(opened) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let opened = opened.trim_start();
    opened
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(opened)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_chat_completions_url_handles_trailing_slash() {
        assert_eq!(
            chat_completions_url("https://api.deepseek.com/"),
            "https://api.deepseek.com/chat/completions"
        );
        assert_eq!(
            chat_completions_url("https://llm.example.org/v1"),
            "https://llm.example.org/v1/chat/completions"
        );
    }

    #[test]
    fn test_sampling_defaults_apply() {
        let profile = SamplingProfile::new(0.3, 3000, 4000);
        let sampling = profile.resolve(None).unwrap();
        assert_eq!(
            sampling,
            Sampling {
                temperature: 0.3,
                max_tokens: 3000
            }
        );
    }

    #[test]
    fn test_sampling_override_within_bounds() {
        let profile = SamplingProfile::new(0.3, 3000, 4000);
        let overrides = SamplingOverride {
            temperature: Some(0.9),
            max_tokens: Some(4000),
        };
        let sampling = profile.resolve(Some(&overrides)).unwrap();
        assert_eq!(sampling.temperature, 0.9);
        assert_eq!(sampling.max_tokens, 4000);
    }

    #[test]
    fn test_sampling_rejects_out_of_range() {
        let profile = SamplingProfile::new(0.4, 1500, 2000);
        for overrides in [
            SamplingOverride {
                temperature: Some(1.5),
                max_tokens: None,
            },
            SamplingOverride {
                temperature: Some(-0.1),
                max_tokens: None,
            },
            SamplingOverride {
                temperature: None,
                max_tokens: Some(0),
            },
            SamplingOverride {
                temperature: None,
                max_tokens: Some(2001),
            },
        ] {
            assert!(matches!(
                profile.resolve(Some(&overrides)),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_failure_maps_to_llm_error() {
        let failure = CompletionResult::Failure {
            reason: "HTTP error: connection refused".to_string(),
        };
        match failure.into_text() {
            Err(AppError::Llm(reason)) => assert!(reason.contains("connection refused")),
            other => panic!("expected Llm error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_failure_not_panic() {
        let client = LlmClient::new().unwrap();
        let credentials = ResolvedCredentials {
            api_key: "sk-test".to_string(),
            // Port 9 (discard) on localhost: connection is refused immediately.
            base_url: "http://127.0.0.1:9".to_string(),
            model: crate::credentials::ModelId::DeepseekChat,
        };
        let result = client
            .complete(
                &credentials,
                "system",
                "user",
                Sampling {
                    temperature: 0.3,
                    max_tokens: 10,
                },
            )
            .await;
        match result {
            CompletionResult::Failure { reason } => assert!(!reason.is_empty()),
            CompletionResult::Success { .. } => panic!("expected failure"),
        }
    }
}
