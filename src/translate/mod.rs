//! Pivot-language translation
//!
//! Prompts are translated into the language the image model is tuned for
//! before submission. Failures here are always recoverable: callers fall
//! back to the untranslated text.

pub mod google;
pub mod mock;

pub use google::GoogleTranslateClient;
pub use mock::MockTranslator;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}
