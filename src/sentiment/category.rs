// src/sentiment/category.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compound scores at or above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores at or below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Positive,
    Neutral,
    Negative,
}

impl SentimentCategory {
    /// Display order used by every summary.
    pub const ALL: [SentimentCategory; 3] = [
        SentimentCategory::Positive,
        SentimentCategory::Neutral,
        SentimentCategory::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentCategory::Positive => "positive",
            SentimentCategory::Neutral => "neutral",
            SentimentCategory::Negative => "negative",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SentimentCategory::Positive => "😊",
            SentimentCategory::Neutral => "😐",
            SentimentCategory::Negative => "😞",
        }
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentCategory::Positive),
            "neutral" => Ok(SentimentCategory::Neutral),
            "negative" => Ok(SentimentCategory::Negative),
            other => Err(format!("unknown sentiment category: {other}")),
        }
    }
}

/// Three-way mapping with a ±0.05 neutral deadband (bounds inclusive on the outside).
pub fn classify(compound: f64) -> SentimentCategory {
    if compound >= POSITIVE_THRESHOLD {
        SentimentCategory::Positive
    } else if compound <= NEGATIVE_THRESHOLD {
        SentimentCategory::Negative
    } else {
        SentimentCategory::Neutral
    }
}
