use super::TextProvider;
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Groq serves the OpenAI chat-completions wire format, so one client covers
/// both; pick the endpoint with `base_url`.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct ChatCompletionsClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Groq endpoint with the default model.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new(api_key, GROQ_BASE_URL, DEFAULT_MODEL)
    }

    fn first_choice(response: ChatResponse) -> Result<String, PipelineError> {
        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::SummaryService("no choices in response".to_string()))
    }
}

#[async_trait]
impl TextProvider for ChatCompletionsClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<String, PipelineError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.7,
            max_tokens: 2000,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::SummaryService(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::SummaryService(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::SummaryService(format!("failed to parse response: {}", e)))?;

        Self::first_choice(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_choice_extracts_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Revenue trends up." } }
            ]
        }))
        .unwrap();
        assert_eq!(
            ChatCompletionsClient::first_choice(response).unwrap(),
            "Revenue trends up."
        );
    }

    #[test]
    fn test_empty_choices_is_summary_error() {
        let response: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(
            ChatCompletionsClient::first_choice(response).unwrap_err(),
            PipelineError::SummaryService(_)
        ));
    }

    #[test]
    fn test_groq_constructor_defaults() {
        let client = ChatCompletionsClient::groq("k");
        assert_eq!(client.base_url, GROQ_BASE_URL);
        assert_eq!(client.model(), DEFAULT_MODEL);
    }
}
