//! Batch image generation
//!
//! Sequential per-prompt pipeline: pivot translation, the Imagen call behind
//! a bounded backoff, filesystem persistence, and a final run summary. One
//! prompt's failure never stops the batch; only cancellation does.

use crate::ai::{GeneratedImage, ImageGenerationService};
use crate::models::{GenerationResult, RunSummary};
use crate::session::SessionStore;
use crate::translate::TranslationService;
use crate::Result;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{info, warn};

/// Attempts per prompt, including the first call.
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_CAP: Duration = Duration::from_secs(10);

/// Waits scheduled before the second and later attempts: 4s, 8s, then capped.
fn backoff_schedule() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(2000)
        .max_delay(BACKOFF_CAP)
}

pub struct BatchGenerator {
    translator: Box<dyn TranslationService>,
    image_gen: Box<dyn ImageGenerationService>,
    store: SessionStore,
}

impl BatchGenerator {
    pub fn new(
        translator: Box<dyn TranslationService>,
        image_gen: Box<dyn ImageGenerationService>,
        store: SessionStore,
    ) -> Self {
        Self {
            translator,
            image_gen,
            store,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Process every prompt in input order and write the run summary.
    ///
    /// Per-prompt failures are captured in the results. Dropping this future
    /// (cancellation) ends the run early: images already written stay on
    /// disk and no summary is written.
    pub async fn run(&self, prompts: &[String], images_per_prompt: u32) -> Result<RunSummary> {
        let mut results = Vec::with_capacity(prompts.len());

        for (index, prompt) in prompts.iter().enumerate() {
            let position = index + 1;

            if position > 1 {
                let pause = Duration::from_secs(2 * position as u64);
                info!(
                    "Waiting {}s before prompt {} to stay under rate limits",
                    pause.as_secs(),
                    position
                );
                tokio::time::sleep(pause).await;
            }

            results.push(
                self.process_prompt(prompt, position, images_per_prompt)
                    .await,
            );
        }

        let summary = RunSummary::new(self.store.session_id().to_string(), results);
        log_summary(&summary);
        self.store.write_summary(&summary)?;

        Ok(summary)
    }

    async fn process_prompt(
        &self,
        prompt: &str,
        position: usize,
        images_per_prompt: u32,
    ) -> GenerationResult {
        info!("=== Processing prompt {} ===", position);

        let english_prompt = match self.translator.translate(prompt).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(
                    "Translation failed for prompt {}: {}; submitting the original text",
                    position, e
                );
                prompt.to_string()
            }
        };
        info!("Original prompt: {}", prompt);
        info!("Pivot translation: {}", english_prompt);

        let (outcome, retries) = self
            .generate_with_retry(&english_prompt, images_per_prompt)
            .await;

        let images = match outcome {
            Ok(images) => images,
            Err(e) => {
                warn!("Prompt {} failed: {}", position, e);
                return GenerationResult::failure(prompt, &english_prompt, e.to_string(), retries);
            }
        };

        let enhanced_prompt = images.first().and_then(|image| image.enhanced_prompt.clone());
        if let Some(enhanced) = &enhanced_prompt {
            info!("Enhanced prompt: {}", enhanced);
        }

        // A prompt is a success only once every image is on disk.
        match self.store.save_images(position, &images) {
            Ok(paths) => {
                info!(
                    "Prompt {} complete: {} image(s) saved",
                    position,
                    paths.len()
                );
                GenerationResult::success(prompt, &english_prompt, enhanced_prompt, paths, retries)
            }
            Err(e) => {
                warn!("Failed to persist images for prompt {}: {}", position, e);
                GenerationResult::failure(prompt, &english_prompt, e.to_string(), retries)
            }
        }
    }

    /// Returns the generation outcome plus the number of retries performed.
    ///
    /// Only transient failures are retried; terminal errors end the attempt
    /// loop immediately.
    async fn generate_with_retry(
        &self,
        prompt: &str,
        count: u32,
    ) -> (Result<Vec<GeneratedImage>>, u32) {
        let mut delays = backoff_schedule();
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.image_gen.generate_images(prompt, count).await {
                Ok(images) => return (Ok(images), attempt - 1),
                Err(e) if attempt < MAX_ATTEMPTS && e.is_transient() => {
                    let delay = delays.next().unwrap_or(BACKOFF_CAP);
                    warn!(
                        "Transient generation failure (attempt {}/{}): {}; retrying in {}s",
                        attempt,
                        MAX_ATTEMPTS,
                        e,
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return (Err(e), attempt - 1),
            }
        }
    }
}

fn log_summary(summary: &RunSummary) {
    info!("=== Run summary ===");
    info!("Total prompts: {}", summary.summary.total_prompts);
    info!("Successful prompts: {}", summary.summary.successful_prompts);
    info!("Total images generated: {}", summary.summary.total_images);

    for result in summary.results.iter().filter(|r| !r.is_success()) {
        warn!(
            "Failed prompt: {} ({} retries): {}",
            result.prompt,
            result.retry_count,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}
