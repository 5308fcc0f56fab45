use super::{ChatAnswer, ChatService, GeneratedImage, ImageGenerationService, TokenUsage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// 1x1 PNG used as the default image payload.
const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49,
    0x44, 0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2,
    0x25, 0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Scripted outcome for one image-generation call.
enum ImageOutcome {
    Images(Vec<GeneratedImage>),
    ApiError { status: u16, message: String },
    /// Never resolves; lets tests cancel a run mid-request.
    Hang,
}

#[derive(Clone)]
pub struct MockImageGenerationClient {
    outcomes: Arc<Mutex<VecDeque<ImageOutcome>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a successful response carrying the given images.
    pub fn with_generated(self, images: Vec<GeneratedImage>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(ImageOutcome::Images(images));
        self
    }

    /// Queue a failure with the given HTTP status.
    pub fn with_api_error(self, status: u16, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(ImageOutcome::ApiError {
                status,
                message: message.to_string(),
            });
        self
    }

    /// Queue a call that never completes.
    pub fn with_hang(self) -> Self {
        self.outcomes.lock().unwrap().push_back(ImageOutcome::Hang);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_images(&self, _prompt: &str, count: u32) -> Result<Vec<GeneratedImage>> {
        *self.call_count.lock().unwrap() += 1;

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            // Default: honor the requested count with placeholder PNGs.
            None => Ok((0..count)
                .map(|_| GeneratedImage {
                    bytes: TINY_PNG.to_vec(),
                    enhanced_prompt: None,
                })
                .collect()),
            Some(ImageOutcome::Images(images)) => Ok(images),
            Some(ImageOutcome::ApiError { status, message }) => {
                Err(Error::Api { status, message })
            }
            Some(ImageOutcome::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

/// Scripted outcome for one chat call.
enum ChatOutcome {
    Answer(ChatAnswer),
    ApiError { status: u16, message: String },
}

#[derive(Clone)]
pub struct MockChatClient {
    outcomes: Arc<Mutex<VecDeque<ChatOutcome>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue an answer with fixed token counts.
    pub fn with_answer(self, text: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(ChatOutcome::Answer(ChatAnswer {
                text: text.to_string(),
                usage: TokenUsage {
                    prompt_tokens: 7,
                    response_tokens: 11,
                    total_tokens: 18,
                },
            }));
        self
    }

    pub fn with_api_error(self, status: u16, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(ChatOutcome::ApiError {
                status,
                message: message.to_string(),
            });
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn ask(&self, prompt: &str) -> Result<ChatAnswer> {
        *self.call_count.lock().unwrap() += 1;

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            None => Ok(ChatAnswer {
                text: format!("Mock answer to: {}", prompt),
                usage: TokenUsage {
                    prompt_tokens: 7,
                    response_tokens: 11,
                    total_tokens: 18,
                },
            }),
            Some(ChatOutcome::Answer(answer)) => Ok(answer),
            Some(ChatOutcome::ApiError { status, message }) => Err(Error::Api { status, message }),
        }
    }
}
