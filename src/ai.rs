use std::time::Duration;

use async_trait::async_trait;
use backoff::{Error as BackoffError, ExponentialBackoff, future::retry};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Local;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use thiserror::Error;

use crate::models::ExtractedRoutine;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

pub const FALLBACK_QUOTES: &[&str] = &[
    "Never give up! Every rep counts.",
    "Pain is temporary, glory is forever.",
    "Sweat now, shine later.",
    "Your only limit is you.",
    "Discipline is doing what you hate as if you loved it.",
];

const EXPLAIN_FALLBACK: &str = "No explanation available right now.";
const CHAT_FALLBACK: &str = "The assistant is unreachable right now. Try again in a moment.";

/// Soft-path answer: ancillary AI features degrade to a canned fallback
/// instead of disrupting the workout flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Fresh(String),
    Degraded(String),
}

impl Answer {
    pub fn text(&self) -> &str {
        match self {
            Answer::Fresh(t) | Answer::Degraded(t) => t,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Answer::Degraded(_))
    }
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("missing API key – run `gymscan config set gemini_api_key <KEY>` or set GEMINI_API_KEY")]
    MissingApiKey,
    #[error("http error: {0}")]
    Http(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("could not read a workout plan from the AI response: {0}")]
    InvalidResponse(String),
    #[error("rate limited")]
    RateLimited,
}

/// One chat exchange kept in the in-memory conversation history.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// The AI collaborator, injected so command handlers and tests can swap
/// in deterministic fixtures. `extract` is the one hard-failing path;
/// the rest never error.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn extract(&self, data: &[u8], mime: &str) -> Result<Vec<ExtractedRoutine>, AiError>;
    async fn explain(&self, exercise: &str, muscle_group: &str) -> Answer;
    async fn chat(&self, message: &str, history: &[ChatTurn]) -> Answer;
    async fn quote(&self) -> Answer;
}

/// Gemini-backed implementation over the generateContent REST endpoint.
pub struct GeminiAssistant {
    http: Client,
    api_key: String,
}

impl GeminiAssistant {
    pub fn new(api_key: String) -> Result<Self, AiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AiError::Http(e.to_string()))?;

        Ok(Self { http, api_key })
    }

    /// Single-turn request: one anonymous content holding `parts`.
    async fn generate(&self, parts: Vec<Value>) -> Result<String, AiError> {
        self.generate_contents(json!([{ "parts": parts }])).await
    }

    /// Sends a `contents` payload and returns the concatenated text of
    /// the first candidate. Transient failures (network, 429, 5xx) retry
    /// with exponential backoff; other statuses fail permanently.
    async fn generate_contents(&self, contents: Value) -> Result<String, AiError> {
        if self.api_key.is_empty() {
            return Err(AiError::MissingApiKey);
        }

        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, GEMINI_MODEL);
        let body = json!({ "contents": contents });

        let operation = || async {
            let response = self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| BackoffError::transient(AiError::Http(e.to_string())))?;

            let status = response.status();
            if status.is_success() {
                let payload: Value = response
                    .json()
                    .await
                    .map_err(|e| BackoffError::permanent(AiError::InvalidResponse(e.to_string())))?;
                Ok(payload)
            } else {
                let message = response.text().await.unwrap_or_default();
                match status {
                    StatusCode::TOO_MANY_REQUESTS => {
                        Err(BackoffError::transient(AiError::RateLimited))
                    }
                    _ if status.as_u16() >= 500 => Err(BackoffError::transient(AiError::Api {
                        status: status.as_u16(),
                        message,
                    })),
                    _ => Err(BackoffError::permanent(AiError::Api {
                        status: status.as_u16(),
                        message,
                    })),
                }
            }
        };

        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(4),
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let payload: Value = retry(backoff, operation).await?;

        let parts = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| AiError::InvalidResponse("no candidates in response".to_string()))?;

        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AiError::InvalidResponse("empty candidate text".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl Assistant for GeminiAssistant {
    async fn extract(&self, data: &[u8], mime: &str) -> Result<Vec<ExtractedRoutine>, AiError> {
        let prompt = "Analyze the attached workout plan document (image or PDF). \
            Detect whether the plan is split into multiple days/routines and separate them. \
            Respond with ONLY a JSON array of objects shaped like \
            {\"routineName\": string, \"exercises\": [{\"name\": string, \"sets\": number, \
            \"reps\": string, \"muscleGroup\": string, \"notes\": string?, \
            \"restTime\": number? (seconds)}]}. No prose, no markdown.";

        let parts = vec![
            json!({ "inline_data": { "mime_type": mime, "data": BASE64.encode(data) } }),
            json!({ "text": prompt }),
        ];

        let text = self.generate(parts).await?;
        let cleaned = strip_code_fences(&text);
        serde_json::from_str(cleaned).map_err(|e| AiError::InvalidResponse(e.to_string()))
    }

    async fn explain(&self, exercise: &str, muscle_group: &str) -> Answer {
        let prompt = format!(
            "Briefly explain how to perform the exercise \"{exercise}\" for {muscle_group}. \
             Three key form cues and one safety tip."
        );

        match self.generate(vec![json!({ "text": prompt })]).await {
            Ok(text) => Answer::Fresh(text),
            Err(_) => Answer::Degraded(EXPLAIN_FALLBACK.to_string()),
        }
    }

    async fn chat(&self, message: &str, history: &[ChatTurn]) -> Answer {
        // The whole conversation goes up as alternating role-tagged
        // contents, current message last.
        let mut contents: Vec<Value> = history
            .iter()
            .map(|turn| json!({ "role": turn.role.as_str(), "parts": [{ "text": turn.text }] }))
            .collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": message }] }));

        match self.generate_contents(Value::Array(contents)).await {
            Ok(text) => Answer::Fresh(text),
            Err(_) => Answer::Degraded(CHAT_FALLBACK.to_string()),
        }
    }

    async fn quote(&self) -> Answer {
        let prompt = "Generate one short motivational gym quote. Respond with the quote only.";
        match self.generate(vec![json!({ "text": prompt })]).await {
            Ok(text) => Answer::Fresh(text.trim().to_string()),
            Err(_) => Answer::Degraded(fallback_quote().to_string()),
        }
    }
}

/// Rotates through the canned quotes.
pub fn fallback_quote() -> &'static str {
    let idx = Local::now().timestamp().unsigned_abs() as usize % FALLBACK_QUOTES.len();
    FALLBACK_QUOTES[idx]
}

/// Models wrap JSON in markdown fences more often than not; strip them
/// before parsing.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_code_fences_handles_fenced_and_bare_json() {
        assert_eq!(strip_code_fences("```json\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fences("```\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fences("  [1,2]  "), "[1,2]");
    }

    #[test]
    fn fallback_quote_comes_from_the_fixed_set() {
        assert!(FALLBACK_QUOTES.contains(&fallback_quote()));
    }

    #[tokio::test]
    async fn missing_key_fails_extraction_and_degrades_soft_paths() {
        let assistant = GeminiAssistant::new(String::new()).unwrap();

        let err = assistant.extract(b"fake", "image/png").await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey));

        let explain = assistant.explain("Bench Press", "chest").await;
        assert!(explain.is_degraded());
        assert_eq!(explain.text(), EXPLAIN_FALLBACK);

        let chat = assistant.chat("hello", &[]).await;
        assert!(chat.is_degraded());

        let quote = assistant.quote().await;
        assert!(quote.is_degraded());
        assert!(FALLBACK_QUOTES.contains(&quote.text()));
    }
}
