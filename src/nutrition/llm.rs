use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::ParseError;
use crate::config::LlmConfig;

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 150;

/// Single-shot text completion.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ParseError>;
}

pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a nutritionist expert. Analyze this food and return ONLY a JSON object with calories and macros.

Food to analyze: "{text}"

Rules:
1. Return valid JSON only
2. Format: {{"calories": number, "protein": number, "carbs": number, "fat": number}}
3. Use realistic values
4. All numbers should be positive
5. Calories should roughly equal: (protein*4 + carbs*4 + fat*9)

Example responses:
- "2 eggs": {{"calories": 140, "protein": 12, "carbs": 0, "fat": 10}}
- "slice of bread": {{"calories": 80, "protein": 3, "carbs": 15, "fat": 1}}
- "chicken breast": {{"calories": 165, "protein": 31, "carbs": 0, "fat": 3.6}}"#
    )
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completions client (OpenRouter by default).
#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenRouterClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn complete(&self, prompt: &str) -> Result<String, ParseError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", "https://localhost:3000")
            .header("X-Title", "Calorie Tracker")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "completion request failed");
                ParseError::ServiceUnavailable("Service unavailable".into())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "completion endpoint returned an error");
            return Err(ParseError::ServiceUnavailable("Failed to parse meal".into()));
        }

        let data: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "completion response is not valid JSON");
            ParseError::InvalidResponseFormat(e.to_string())
        })?;
        debug!(choices = data.choices.len(), "completion received");

        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ParseError::InvalidResponseFormat("Empty response from API".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_text_and_examples() {
        let prompt = build_prompt("oatmeal with honey");
        assert!(prompt.contains(r#"Food to analyze: "oatmeal with honey""#));
        assert!(prompt.contains(r#""2 eggs": {"calories": 140"#));
        assert!(prompt.contains("protein*4 + carbs*4 + fat*9"));
    }

    #[test]
    fn request_body_carries_sampling_limits() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let v = serde_json::to_value(&request).unwrap();
        assert_eq!(v["max_tokens"], 150);
        assert_eq!(v["messages"][0]["role"], "user");
        assert!((v["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }
}
