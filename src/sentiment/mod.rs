// src/sentiment/mod.rs
//! Per-post sentiment scoring.
//!
//! Two independent polarity sources run on the cleaned text:
//! - [`LexiconAnalyzer`]: valence lexicon + heuristics (negation, boosters,
//!   caps, punctuation), yields a compound score and pos/neu/neg shares
//! - [`PatternAnalyzer`]: averaged word polarity, yields a single value
//!
//! compound = 0.7 * lexicon + 0.3 * pattern. Components come from the
//! lexicon analyzer only and are not renormalized.

pub mod category;
pub mod lexicon;
pub mod pattern;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clean::clean_text;

pub use category::{classify, SentimentCategory};
pub use lexicon::LexiconAnalyzer;
pub use pattern::PatternAnalyzer;

/// Blend weight of the lexicon analyzer's compound score.
pub const LEXICON_WEIGHT: f64 = 0.7;
/// Blend weight of the pattern analyzer's polarity.
pub const PATTERN_WEIGHT: f64 = 0.3;

/// Positive / neutral / negative shares, each in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl Components {
    pub const ZERO: Components = Components {
        positive: 0.0,
        neutral: 0.0,
        negative: 0.0,
    };
}

/// What a polarity source reports for one text.
/// Scalar-only sources leave `components` empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityReading {
    pub compound: f64,
    pub components: Option<Components>,
}

impl PolarityReading {
    pub fn scalar(value: f64) -> Self {
        Self {
            compound: value,
            components: None,
        }
    }
}

/// A swappable polarity capability (lexicon engine, statistical model, test mock).
pub trait PolaritySource: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;
    fn polarity(&self, text: &str) -> PolarityReading;
}

/// Scored post: category, blended compound, lexicon components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentResult {
    pub category: SentimentCategory,
    pub compound: f64,
    pub components: Components,
}

impl SentimentResult {
    pub fn emoji(&self) -> &'static str {
        self.category.emoji()
    }
}

/// Blends a primary (component-bearing) source with a secondary scalar source.
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    primary: Arc<dyn PolaritySource>,
    secondary: Arc<dyn PolaritySource>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer {
    /// Lexicon analyzer as primary, pattern analyzer as secondary.
    pub fn new() -> Self {
        Self::with_sources(Arc::new(LexiconAnalyzer), Arc::new(PatternAnalyzer))
    }

    pub fn with_sources(
        primary: Arc<dyn PolaritySource>,
        secondary: Arc<dyn PolaritySource>,
    ) -> Self {
        Self { primary, secondary }
    }

    /// `(primary, secondary)` source names, for logs.
    pub fn source_names(&self) -> (&'static str, &'static str) {
        (self.primary.name(), self.secondary.name())
    }

    /// Returns `(compound, components)` for raw (uncleaned) text.
    ///
    /// Empty or whitespace-only input short-circuits to all zeros.
    pub fn score(&self, text: &str) -> (f64, Components) {
        if text.trim().is_empty() {
            return (0.0, Components::ZERO);
        }

        let cleaned = clean_text(text);
        let primary = self.primary.polarity(&cleaned);
        let secondary = self.secondary.polarity(&cleaned);

        let compound = (LEXICON_WEIGHT * primary.compound + PATTERN_WEIGHT * secondary.compound)
            .clamp(-1.0, 1.0);

        (compound, primary.components.unwrap_or_default())
    }

    /// Score + classify in one step (the "analyze one post" use case).
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let (compound, components) = self.score(text);
        SentimentResult {
            category: classify(compound),
            compound,
            components,
        }
    }
}

static DEFAULT_SCORER: Lazy<SentimentScorer> = Lazy::new(SentimentScorer::new);

/// Score with the process-wide default scorer.
pub fn score(text: &str) -> (f64, Components) {
    DEFAULT_SCORER.score(text)
}

/// Score + classify with the process-wide default scorer.
pub fn analyze_text(text: &str) -> SentimentResult {
    DEFAULT_SCORER.analyze(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(PolarityReading);

    impl PolaritySource for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn polarity(&self, _text: &str) -> PolarityReading {
            self.0
        }
    }

    fn fixed_scorer(primary: PolarityReading, secondary: f64) -> SentimentScorer {
        SentimentScorer::with_sources(
            Arc::new(Fixed(primary)),
            Arc::new(Fixed(PolarityReading::scalar(secondary))),
        )
    }

    #[test]
    fn default_sources_are_lexicon_then_pattern() {
        assert_eq!(SentimentScorer::new().source_names(), ("lexicon", "pattern"));
        let s = fixed_scorer(PolarityReading::scalar(0.0), 0.0);
        assert_eq!(s.source_names(), ("fixed", "fixed"));
    }

    #[test]
    fn empty_and_blank_short_circuit() {
        assert_eq!(score(""), (0.0, Components::ZERO));
        assert_eq!(score("   "), (0.0, Components::ZERO));
        assert_eq!(score("\n\t"), (0.0, Components::ZERO));
    }

    #[test]
    fn blend_is_seventy_thirty() {
        let comps = Components {
            positive: 0.4,
            neutral: 0.6,
            negative: 0.0,
        };
        let s = fixed_scorer(
            PolarityReading {
                compound: 0.5,
                components: Some(comps),
            },
            -0.5,
        );
        let (c, got) = s.score("anything");
        assert!((c - (0.35 - 0.15)).abs() < 1e-12);
        assert_eq!(got, comps);
    }

    #[test]
    fn components_come_from_primary_only() {
        let s = fixed_scorer(PolarityReading::scalar(0.0), 1.0);
        let (c, comps) = s.score("text");
        assert!((c - 0.3).abs() < 1e-12);
        assert_eq!(comps, Components::ZERO);
    }

    #[test]
    fn blended_compound_is_clamped() {
        let s = fixed_scorer(PolarityReading::scalar(2.0), 2.0);
        assert_eq!(s.score("x").0, 1.0);
    }

    #[test]
    fn obvious_texts_classify_as_expected() {
        assert_eq!(
            analyze_text("I love this, it is absolutely wonderful!").category,
            SentimentCategory::Positive
        );
        assert_eq!(
            analyze_text("This is terrible. I hate it, worst service ever.").category,
            SentimentCategory::Negative
        );
        assert_eq!(
            analyze_text("The meeting is on Tuesday at the office.").category,
            SentimentCategory::Neutral
        );
    }

    #[test]
    fn cleaning_happens_inside_score() {
        // mention and url carry no sentiment of their own
        assert_eq!(
            score("great day @terrible_user http://awful.example"),
            score("great day")
        );
    }
}
