// src/config/mod.rs
//! Service configuration (TOML), with env overrides.
//!
//! Lookup order:
//! 1) $SENTIMENT_CONFIG_PATH
//! 2) config/sentiment.toml
//! 3) built-in defaults
//!
//! A missing or broken file never stops the service; defaults are used and
//! a warning is logged.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/sentiment.toml";
pub const ENV_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";
pub const ENV_PARALLEL_MIN_ROWS: &str = "SENTIMENT_PARALLEL_MIN_ROWS";

fn default_parallel_min_rows() -> usize {
    2000
}
fn default_sample_data_dir() -> PathBuf {
    PathBuf::from("sample_data")
}
fn default_top_words() -> usize {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Datasets with at least this many rows are scored with a parallel map.
    #[serde(default = "default_parallel_min_rows")]
    pub parallel_min_rows: usize,
    /// Where the bundled example datasets live.
    #[serde(default = "default_sample_data_dir")]
    pub sample_data_dir: PathBuf,
    /// Cap for the word-frequency summary.
    #[serde(default = "default_top_words")]
    pub top_words: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parallel_min_rows: default_parallel_min_rows(),
            sample_data_dir: default_sample_data_dir(),
            top_words: default_top_words(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Resolve the config path from env, load it (or fall back to defaults),
    /// then apply env overrides.
    pub fn from_env() -> Self {
        let path = env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = if path.exists() {
            Self::load_from_file(&path).unwrap_or_else(|e| {
                warn!(error = ?e, path = %path.display(), "config load failed; using defaults");
                Self::default()
            })
        } else {
            Self::default()
        };

        if let Some(n) = parse_usize_env(env::var(ENV_PARALLEL_MIN_ROWS).ok()) {
            cfg.parallel_min_rows = n;
        }
        cfg
    }

    fn sanitized(mut self) -> Self {
        if self.top_words == 0 {
            self.top_words = default_top_words();
        }
        self
    }
}

fn parse_usize_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: AppConfig = toml::from_str("parallel_min_rows = 10").unwrap();
        assert_eq!(cfg.parallel_min_rows, 10);
        assert_eq!(cfg.top_words, 100);
        assert_eq!(cfg.sample_data_dir, PathBuf::from("sample_data"));
    }

    #[test]
    fn zero_top_words_is_sanitized() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("c.toml");
        fs::write(&p, "top_words = 0\n").unwrap();
        let cfg = AppConfig::load_from_file(&p).unwrap();
        assert_eq!(cfg.top_words, 100);
    }

    #[test]
    fn broken_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("c.toml");
        fs::write(&p, "parallel_min_rows = \"lots\"\n").unwrap();
        assert!(AppConfig::load_from_file(&p).is_err());
    }

    #[test]
    fn env_number_parsing() {
        assert_eq!(parse_usize_env(Some(" 42 ".into())), Some(42));
        assert_eq!(parse_usize_env(Some("-1".into())), None);
        assert_eq!(parse_usize_env(None), None);
    }
}
