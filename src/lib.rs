//! Gemini chat and batch Imagen generation from the terminal
//!
//! Two interactive flows over the Gemini REST APIs: a single-turn chat that
//! reports token usage, and a batch image generator that translates prompts
//! into a pivot language, retries transient failures with bounded backoff,
//! and persists every run as images plus a JSON summary.

pub mod ai;
pub mod batch;
pub mod console;
pub mod error;
pub mod models;
pub mod session;
pub mod translate;

pub use error::{Error, Result};
