//! AI service integration for chat and image generation
//!
//! Provides interfaces to Gemini's generateContent API for text chat and the
//! Imagen predict API for image generation.

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiChatClient, ImagenClient};
pub use mock::{MockChatClient, MockImageGenerationClient};

use crate::Result;
use async_trait::async_trait;

/// One generated image returned by the image service.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    /// Service-rewritten version of the submitted prompt, when provided.
    pub enhanced_prompt: Option<String>,
}

/// Token accounting reported alongside a chat answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub response_tokens: u32,
    pub total_tokens: u32,
}

/// A single-turn chat answer.
#[derive(Debug, Clone)]
pub struct ChatAnswer {
    pub text: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait ChatService: Send + Sync {
    async fn ask(&self, prompt: &str) -> Result<ChatAnswer>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_images(&self, prompt: &str, count: u32) -> Result<Vec<GeneratedImage>>;
}
