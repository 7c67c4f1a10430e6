// src/ingest/samples.rs
//! Bundled example datasets, one per canonical platform.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::ingest::{load_path, Table};
use crate::platform::normalize_platform;

/// Canonical platforms that ship with an example dataset.
pub const SAMPLE_PLATFORMS: [&str; 3] = ["Facebook", "Twitter", "Instagram"];

/// File name of the example dataset for a (possibly non-canonical) platform name.
pub fn sample_file_name(platform: &str) -> Option<&'static str> {
    match normalize_platform(platform).as_str() {
        "Facebook" => Some("facebook_sample.csv"),
        "Twitter" => Some("twitter_sample.csv"),
        "Instagram" => Some("instagram_sample.csv"),
        _ => None,
    }
}

pub fn sample_path(dir: &Path, platform: &str) -> Option<PathBuf> {
    sample_file_name(platform).map(|f| dir.join(f))
}

/// Load the example dataset. `Ok(None)` for platforms without one.
pub fn load_sample(dir: &Path, platform: &str) -> Result<Option<Table>, PipelineError> {
    match sample_path(dir, platform) {
        Some(p) => load_path(&p).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_sample_files() {
        assert_eq!(sample_file_name("fb"), Some("facebook_sample.csv"));
        assert_eq!(sample_file_name("X"), Some("twitter_sample.csv"));
        assert_eq!(sample_file_name("insta"), Some("instagram_sample.csv"));
        assert_eq!(sample_file_name("linkedin"), None);
    }

    #[test]
    fn bundled_samples_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("sample_data");
        for p in SAMPLE_PLATFORMS {
            let t = load_sample(&dir, p).unwrap().expect("sample exists");
            assert!(!t.is_empty(), "{p} sample is empty");
        }
    }
}
