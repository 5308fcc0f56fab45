//! Session output layout and persistence
//!
//! One run writes `<output>/<session-id>/prompt_<n>/image_<m>.png` per image
//! plus a `metadata.json` run summary, all under a session directory keyed by
//! a timestamp or a caller-supplied identifier.

use crate::ai::GeneratedImage;
use crate::models::RunSummary;
use crate::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const METADATA_FILE: &str = "metadata.json";

pub struct SessionStore {
    session_id: String,
    session_dir: PathBuf,
}

impl SessionStore {
    /// Create the session directory under `base_dir`.
    ///
    /// The session id defaults to the current unix timestamp when the caller
    /// does not supply one.
    pub fn create(base_dir: &Path, session_id: Option<String>) -> Result<Self> {
        let session_id = session_id.unwrap_or_else(|| Local::now().timestamp().to_string());
        let session_dir = base_dir.join(&session_id);
        fs::create_dir_all(&session_dir)?;
        info!("Created session directory: {}", session_dir.display());

        Ok(Self {
            session_id,
            session_dir,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Write one prompt's images, returning their session-relative paths.
    pub fn save_images(&self, prompt_index: usize, images: &[GeneratedImage]) -> Result<Vec<String>> {
        let prompt_dir_name = format!("prompt_{}", prompt_index);
        let prompt_dir = self.session_dir.join(&prompt_dir_name);
        fs::create_dir_all(&prompt_dir)?;

        let mut paths = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let file_name = format!("image_{}.png", i + 1);
            fs::write(prompt_dir.join(&file_name), &image.bytes)?;
            info!("Saved image: {}", prompt_dir.join(&file_name).display());
            paths.push(format!("{}/{}", prompt_dir_name, file_name));
        }

        Ok(paths)
    }

    /// Persist the run summary as pretty-printed UTF-8 JSON.
    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.session_dir.join(METADATA_FILE);
        fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        info!("Saved run metadata at: {}", path.display());
        Ok(path)
    }
}
