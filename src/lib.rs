// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod clean;
pub mod config;
pub mod dates;
pub mod error;
pub mod infer;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod platform;
pub mod sentiment;
pub mod summary;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::clean::clean_text;
pub use crate::config::AppConfig;
pub use crate::error::PipelineError;
pub use crate::ingest::{load_bytes, load_path, Table};
pub use crate::pipeline::{process, Dataset, DatasetPipeline, Post};
pub use crate::platform::normalize_platform;
pub use crate::sentiment::{analyze_text, classify, score, SentimentCategory, SentimentScorer};
pub use crate::summary::{DatasetView, Summary};
