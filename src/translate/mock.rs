use super::TranslationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Test translator: scripted responses, passthrough by default, or always
/// failing.
#[derive(Clone)]
pub struct MockTranslator {
    responses: Arc<Mutex<Vec<String>>>,
    fail: bool,
    call_count: Arc<Mutex<usize>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            fail: false,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Every call fails, exercising the untranslated-text fallback.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationService for MockTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        if self.fail {
            return Err(Error::Translation("mock translator failure".to_string()));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(text.to_string())
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}
