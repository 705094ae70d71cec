// Delegate conversion service: the external model invoked as the primary
// conversion strategy. Every failure class is treated the same way by the
// caller (fall back to the local transform), but the taxonomy is kept for
// logging and tests.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Classified delegate failure
#[derive(thiserror::Error, Debug)]
pub enum DelegateError {
    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Unauthorized - invalid API key")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Empty response from delegate")]
    Empty,

    #[error("Missing API key: set PORTAGE_API_KEY or GROQ_API_KEY")]
    MissingApiKey,
}

/// External conversion service, invoked as a black box with a prompt
#[async_trait]
pub trait Delegate: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, DelegateError>;
}

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const GROQ_MODEL: &str = "llama3-70b-8192";

const SYSTEM_PROMPT: &str = "You are an expert PHP to Node.js converter. Your job is to:\n\
1. Analyze the uploaded PHP code.\n\
2. Convert it to TypeScript/Node.js using Express.js conventions.\n\
3. Use proper TypeScript syntax and types.\n\
4. Include proper error handling and async/await patterns.\n\
5. Add helpful comments explaining the conversion.\n\
\n\
IMPORTANT: Return ONLY the TypeScript code wrapped in ```typescript``` code blocks.\n\
Do NOT include explanations, markdown, or any other content outside the code blocks.\n\
\n\
Examples:\n\
- PHP functions → TypeScript functions with proper typing\n\
- PHP arrays → TypeScript interfaces and arrays\n\
- PHP classes → TypeScript classes with proper access modifiers\n\
- PHP database queries → TypeScript with proper async/await patterns";

/// Delegate backed by the Groq OpenAI-compatible chat completions API
pub struct GroqDelegate {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl GroqDelegate {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            api_url: GROQ_API_URL.to_string(),
        }
    }

    /// Build from `PORTAGE_API_KEY` (falling back to `GROQ_API_KEY`)
    pub fn from_env() -> Result<Self, DelegateError> {
        let api_key = std::env::var("PORTAGE_API_KEY")
            .or_else(|_| std::env::var("GROQ_API_KEY"))
            .map_err(|_| DelegateError::MissingApiKey)?;
        if api_key.is_empty() {
            return Err(DelegateError::MissingApiKey);
        }
        Ok(Self::new(api_key))
    }

    /// Point the client at a different endpoint, used by tests
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Pull a human-readable message out of an API error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.pointer("/message"))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| "Bad Request - check your API key and model name".to_string())
}

#[async_trait]
impl Delegate for GroqDelegate {
    async fn complete(&self, prompt: &str) -> Result<String, DelegateError> {
        debug!("making request to delegate API");
        let body = serde_json::json!({
            "model": GROQ_MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0.1,
            "max_tokens": 4000,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DelegateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DelegateError::Transport(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(DelegateError::Empty);
        }
        Ok(content)
    }
}

/// Map an HTTP status to the delegate error taxonomy
pub fn classify_status(status: u16, body: &str) -> DelegateError {
    match status {
        401 => DelegateError::Unauthorized,
        429 => DelegateError::RateLimited,
        400 => DelegateError::BadRequest(error_message(body)),
        other => DelegateError::Transport(format!("unexpected status {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            classify_status(401, ""),
            DelegateError::Unauthorized
        ));
        assert!(matches!(
            classify_status(429, ""),
            DelegateError::RateLimited
        ));
        assert!(matches!(
            classify_status(400, "{}"),
            DelegateError::BadRequest(_)
        ));
        assert!(matches!(
            classify_status(503, ""),
            DelegateError::Transport(_)
        ));
    }

    #[test]
    fn test_system_prompt_includes_conversion_examples() {
        assert!(SYSTEM_PROMPT.contains("Examples:"));
        assert!(SYSTEM_PROMPT.contains("PHP functions → TypeScript functions with proper typing"));
        assert!(SYSTEM_PROMPT
            .contains("PHP database queries → TypeScript with proper async/await patterns"));
    }

    #[test]
    fn test_bad_request_message_extraction() {
        let body = r#"{"error":{"message":"model not found"}}"#;
        match classify_status(400, body) {
            DelegateError::BadRequest(msg) => assert_eq!(msg, "model not found"),
            other => panic!("expected BadRequest, got {other:?}"),
        }

        let flat = r#"{"message":"nope"}"#;
        match classify_status(400, flat) {
            DelegateError::BadRequest(msg) => assert_eq!(msg, "nope"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }
}
