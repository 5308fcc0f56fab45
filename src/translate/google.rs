use super::TranslationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

/// Client for the unauthenticated `translate_a/single` endpoint.
pub struct GoogleTranslateClient {
    client: reqwest::Client,
    base_url: String,
    source_lang: String,
    target_lang: String,
    timeout: Duration,
}

impl GoogleTranslateClient {
    pub fn new(source_lang: String, target_lang: String) -> Self {
        Self::new_with_client(source_lang, target_lang, reqwest::Client::new())
    }

    pub fn new_with_client(
        source_lang: String,
        target_lang: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            source_lang,
            target_lang,
            timeout: Duration::from_secs(10),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl TranslationService for GoogleTranslateClient {
    async fn translate(&self, text: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| Error::Translation(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Translation(format!(
                "translation service returned status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Translation(format!("unreadable translation response: {}", e)))?;

        // Response shape: [[["<translated>", "<source>", ...], ...], ...]
        let segments = body
            .get(0)
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::Translation("unexpected translation response shape".to_string()))?;

        let translated: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(|v| v.as_str()))
            .collect();

        if translated.is_empty() {
            return Err(Error::Translation("empty translation result".to_string()));
        }

        Ok(translated)
    }
}
