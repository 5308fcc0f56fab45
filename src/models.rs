//! Data models and structures
//!
//! Core records for batch generation runs plus application configuration.
//! Per-prompt results are created once, never mutated, and serialized into
//! the run summary written at the end of a session.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Success,
    Error,
}

/// Outcome of one input prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub prompt: String,
    /// Pivot-language text actually submitted to the image model. Falls back
    /// to the original prompt when translation fails.
    pub english_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_prompt: Option<String>,
    /// Session-relative paths of the images written for this prompt.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub status: GenerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Retries performed after the initial generation attempt.
    pub retry_count: u32,
}

impl GenerationResult {
    pub fn success(
        prompt: &str,
        english_prompt: &str,
        enhanced_prompt: Option<String>,
        images: Vec<String>,
        retry_count: u32,
    ) -> Self {
        Self {
            prompt: prompt.to_string(),
            english_prompt: english_prompt.to_string(),
            enhanced_prompt,
            images,
            status: GenerationStatus::Success,
            error: None,
            retry_count,
        }
    }

    pub fn failure(prompt: &str, english_prompt: &str, error: String, retry_count: u32) -> Self {
        Self {
            prompt: prompt.to_string(),
            english_prompt: english_prompt.to_string(),
            enhanced_prompt: None,
            images: Vec::new(),
            status: GenerationStatus::Error,
            error: Some(error),
            retry_count,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == GenerationStatus::Success
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub total_prompts: usize,
    pub successful_prompts: usize,
    pub failed_prompts: usize,
    pub total_images: usize,
}

/// One run's persisted record, written once as `metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub session_id: String,
    pub timestamp: String,
    pub summary: SummaryCounts,
    pub results: Vec<GenerationResult>,
}

impl RunSummary {
    /// Aggregate per-prompt results, stamped with the local wall-clock time.
    pub fn new(session_id: String, results: Vec<GenerationResult>) -> Self {
        let successful_prompts = results.iter().filter(|r| r.is_success()).count();
        let total_images = results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.images.len())
            .sum();

        Self {
            session_id,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            summary: SummaryCounts {
                total_prompts: results.len(),
                successful_prompts,
                failed_prompts: results.len() - successful_prompts,
                total_images,
            },
            results,
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub chat_model: String,
    pub image_model: String,
    pub source_lang: String,
    pub target_lang: String,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| crate::Error::Config("GEMINI_API_KEY not set".to_string()))?,
            chat_model: std::env::var("GEMINI_CHAT_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            image_model: std::env::var("IMAGEN_MODEL")
                .unwrap_or_else(|_| "imagen-3.0-generate-002".to_string()),
            source_lang: std::env::var("TRANSLATE_SOURCE_LANG")
                .unwrap_or_else(|_| "ja".to_string()),
            target_lang: std::env::var("TRANSLATE_TARGET_LANG")
                .unwrap_or_else(|_| "en".to_string()),
            output_dir: std::env::var("IMAGE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("images")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result_omits_error_field() {
        let result = GenerationResult::success(
            "猫",
            "a cat",
            Some("a fluffy cat".to_string()),
            vec!["prompt_1/image_1.png".to_string()],
            0,
        );

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"success\""));
        assert!(json.contains("\"enhanced_prompt\":\"a fluffy cat\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_failure_result_omits_image_list() {
        let result =
            GenerationResult::failure("犬", "a dog", "API error (status 503)".to_string(), 2);

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("\"retry_count\":2"));
        assert!(!json.contains("\"images\""));
        assert!(!json.contains("\"enhanced_prompt\""));

        let roundtrip: GenerationResult = serde_json::from_str(&json).unwrap();
        assert!(roundtrip.images.is_empty());
    }

    #[test]
    fn test_summary_counts_only_successful_images() {
        let results = vec![
            GenerationResult::success(
                "a",
                "a",
                None,
                vec!["prompt_1/image_1.png".to_string(), "prompt_1/image_2.png".to_string()],
                0,
            ),
            GenerationResult::failure("b", "b", "boom".to_string(), 2),
            GenerationResult::success("c", "c", None, vec!["prompt_3/image_1.png".to_string()], 1),
        ];

        let summary = RunSummary::new("12345".to_string(), results);
        assert_eq!(summary.summary.total_prompts, 3);
        assert_eq!(summary.summary.successful_prompts, 2);
        assert_eq!(summary.summary.failed_prompts, 1);
        assert_eq!(summary.summary.total_images, 3);
        assert!(!summary.timestamp.is_empty());
    }
}
