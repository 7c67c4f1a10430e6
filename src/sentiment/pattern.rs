// src/sentiment/pattern.rs
//! Polarity-only analyzer: mean polarity of the opinion words in a text.
//!
//! Word polarities in [-1,1] come from `polarity_lexicon.json`. An
//! intensifier scales the next opinion word; a negator within the three
//! preceding tokens multiplies it by -0.5. Sentence punctuation resets both.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{PolarityReading, PolaritySource};

static POLARITY: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../../polarity_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid polarity lexicon")
});

const NEGATION_FACTOR: f64 = -0.5;
const NEGATION_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternAnalyzer;

impl PolaritySource for PatternAnalyzer {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn polarity(&self, text: &str) -> PolarityReading {
        PolarityReading::scalar(self.polarity_value(text))
    }
}

impl PatternAnalyzer {
    /// Mean polarity in [-1,1]; 0.0 when no opinion word is found.
    pub fn polarity_value(&self, text: &str) -> f64 {
        let mut assessments: Vec<f64> = Vec::new();
        let mut mult = 1.0;
        let mut negation_left = 0usize;

        for raw in text.split_whitespace() {
            let lower = raw.to_lowercase();
            let ends_sentence = lower.ends_with(['.', '!', '?']);
            let tok = if POLARITY.contains_key(&lower) {
                lower.as_str()
            } else {
                lower.trim_matches(|c: char| c.is_ascii_punctuation())
            };

            if tok.is_empty() {
                // bare punctuation
            } else if is_negator(tok) {
                negation_left = NEGATION_WINDOW;
            } else if let Some(m) = intensity(tok) {
                mult *= m;
            } else if let Some(&p) = POLARITY.get(tok) {
                let mut v = (p * mult).clamp(-1.0, 1.0);
                if negation_left > 0 {
                    v *= NEGATION_FACTOR;
                }
                assessments.push(v);
                mult = 1.0;
                negation_left = 0;
            } else {
                mult = 1.0;
                negation_left = negation_left.saturating_sub(1);
            }

            if ends_sentence {
                mult = 1.0;
                negation_left = 0;
            }
        }

        if assessments.is_empty() {
            return 0.0;
        }
        let mean = assessments.iter().sum::<f64>() / assessments.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

fn intensity(w: &str) -> Option<f64> {
    let m = match w {
        "very" => 1.3,
        "really" | "so" => 1.2,
        "extremely" => 1.5,
        "incredibly" | "absolutely" => 1.4,
        "totally" => 1.3,
        "quite" => 1.1,
        "somewhat" => 0.8,
        "slightly" => 0.6,
        "barely" => 0.5,
        _ => return None,
    };
    Some(m)
}

fn is_negator(w: &str) -> bool {
    matches!(w, "not" | "never" | "no" | "cannot" | "without") || w.ends_with("n't")
}
