//! Pipeline error taxonomy.
//!
//! Loader- and schema-level failures abort the whole run. Date problems are
//! never surfaced here; they degrade to the processing timestamp instead.

/// Errors returned by the loader and the dataset pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input is neither CSV nor JSON (decided by file extension).
    #[error("Unsupported file format '{0}'. Please upload a CSV or JSON file.")]
    UnsupportedFormat(String),

    /// Zero rows after load.
    #[error("No data found or empty data provided.")]
    EmptyDataset,

    /// No column could be identified as text content, even via the length heuristic.
    #[error("Could not identify a text content column in the data.")]
    MissingTextColumn,

    /// Reading the input file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Recognized format, but the body could not be parsed.
    #[error("Failed to parse {format} input: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

impl PipelineError {
    /// Stable machine-readable kind, used in HTTP error bodies and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::UnsupportedFormat(_) => "unsupported_format",
            PipelineError::EmptyDataset => "empty_dataset",
            PipelineError::MissingTextColumn => "missing_text_column",
            PipelineError::Io { .. } => "io",
            PipelineError::Parse { .. } => "parse",
        }
    }

    pub(crate) fn csv(e: csv::Error) -> Self {
        PipelineError::Parse {
            format: "CSV",
            message: e.to_string(),
        }
    }

    pub(crate) fn json(e: serde_json::Error) -> Self {
        PipelineError::Parse {
            format: "JSON",
            message: e.to_string(),
        }
    }
}
