use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse, Part};
use crate::ai::{ChatAnswer, ChatService, TokenUsage};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest {
    contents: Vec<Content>,
}

pub struct GeminiChatClient {
    http: GeminiHttpClient,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn answer_from_body(body: &str) -> Result<ChatAnswer> {
        let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
            Error::Parse(format!(
                "Gemini chat response did not decode: {}; raw response: {}",
                e, body
            ))
        })?;

        let text = response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| {
                Error::Parse(format!(
                    "No candidate text in Gemini chat response; raw response: {}",
                    body
                ))
            })?;

        let usage = response.usage_metadata.ok_or_else(|| {
            Error::Parse(format!(
                "No usage metadata in Gemini chat response; raw response: {}",
                body
            ))
        })?;

        Ok(ChatAnswer {
            text,
            usage: TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                response_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            },
        })
    }
}

#[async_trait]
impl ChatService for GeminiChatClient {
    /// One question, one answer. Non-2xx responses surface as [`Error::Api`]
    /// without retrying.
    async fn ask(&self, prompt: &str) -> Result<ChatAnswer> {
        let request = ChatRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let body = self.http.generate_content(&request).await?;
        Self::answer_from_body(&body)
    }
}
