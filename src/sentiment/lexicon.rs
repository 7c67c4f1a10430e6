// src/sentiment/lexicon.rs
//! Rule-based valence analyzer.
//!
//! Each token gets a valence from `sentiment_lexicon.json` (roughly -4..=4),
//! adjusted by the three preceding tokens (boosters, dampeners, negators),
//! ALL-CAPS emphasis, a "but" pivot and trailing `!`/`?` emphasis.
//! The summed valence is squashed into [-1,1]; pos/neu/neg are the shares
//! of positive, zero and negative token valences.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{Components, PolarityReading, PolaritySource};

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
const C_INCR: f64 = 0.733;
const N_SCALAR: f64 = -0.74;
/// Normalization constant: approximates the max expected raw sum.
const ALPHA: f64 = 15.0;

/// Raw output of the lexicon analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LexiconScores {
    pub compound: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconAnalyzer;

impl PolaritySource for LexiconAnalyzer {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn polarity(&self, text: &str) -> PolarityReading {
        let s = self.polarity_scores(text);
        PolarityReading {
            compound: s.compound,
            components: Some(Components {
                positive: s.positive,
                neutral: s.neutral,
                negative: s.negative,
            }),
        }
    }
}

impl LexiconAnalyzer {
    pub fn polarity_scores(&self, text: &str) -> LexiconScores {
        let words = words_and_emoticons(text);
        if words.is_empty() {
            return LexiconScores::default();
        }
        let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let cap_diff = allcap_differential(&words);

        let mut sentiments = Vec::with_capacity(words.len());
        for i in 0..words.len() {
            let w = lower[i].as_str();
            if booster(w).is_some() {
                sentiments.push(0.0);
                continue;
            }
            if w == "kind" && lower.get(i + 1).map(String::as_str) == Some("of") {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(valence_at(&words, &lower, i, cap_diff));
        }

        but_check(&lower, &mut sentiments);
        score_valence(&sentiments, text)
    }
}

/// Whitespace split; surrounding punctuation is stripped unless that would
/// leave two chars or fewer (keeps emoticons like `:)` intact).
/// Single-character tokens (`I`, `a`) are dropped.
fn words_and_emoticons(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|tok| {
            let stripped = tok.trim_matches(|c: char| c.is_ascii_punctuation());
            if stripped.chars().count() <= 2 {
                tok
            } else {
                stripped
            }
        })
        .filter(|w| w.chars().count() > 1)
        .collect()
}

fn is_upper(w: &str) -> bool {
    w.chars().any(char::is_alphabetic) && !w.chars().any(char::is_lowercase)
}

/// True when some, but not all, tokens are ALL CAPS.
fn allcap_differential(words: &[&str]) -> bool {
    let caps = words.iter().filter(|w| is_upper(w)).count();
    caps > 0 && caps < words.len()
}

fn valence_at(words: &[&str], lower: &[String], i: usize, cap_diff: bool) -> f64 {
    let w = lower[i].as_str();
    let Some(&base) = LEXICON.get(w) else {
        return 0.0;
    };

    // "no" used as a determiner ("no problems") carries no valence itself.
    if w == "no" && lower.get(i + 1).is_some_and(|n| LEXICON.contains_key(n)) {
        return 0.0;
    }

    let mut v = base;
    if (i > 0 && lower[i - 1] == "no") || (i > 1 && lower[i - 2] == "no") {
        v = base * N_SCALAR;
    }

    if cap_diff && is_upper(words[i]) {
        v += if v > 0.0 { C_INCR } else { -C_INCR };
    }

    for start in 0..3 {
        if i <= start {
            break;
        }
        let j = i - (start + 1);
        if LEXICON.contains_key(&lower[j]) {
            continue;
        }
        let mut s = scalar_inc_dec(words[j], &lower[j], v, cap_diff);
        if start == 1 {
            s *= 0.95;
        } else if start == 2 {
            s *= 0.9;
        }
        v += s;
        v = negation_check(v, lower, start, i);
    }
    v
}

fn scalar_inc_dec(word: &str, lower: &str, valence: f64, cap_diff: bool) -> f64 {
    let Some(mut s) = booster(lower) else {
        return 0.0;
    };
    if valence < 0.0 {
        s = -s;
    }
    if cap_diff && is_upper(word) {
        s += if valence > 0.0 { C_INCR } else { -C_INCR };
    }
    s
}

fn negation_check(v: f64, lower: &[String], start: usize, i: usize) -> f64 {
    let at = |k: usize| lower[i - k].as_str();
    match start {
        0 if is_negated(at(1)) => v * N_SCALAR,
        1 if at(2) == "never" && matches!(at(1), "so" | "this") => v * 1.25,
        1 if is_negated(at(2)) => v * N_SCALAR,
        2 if at(3) == "never" && (matches!(at(2), "so" | "this") || matches!(at(1), "so" | "this")) => {
            v * 1.25
        }
        2 if is_negated(at(3)) => v * N_SCALAR,
        _ => v,
    }
}

/// Valence before "but" is halved, after it amplified by half.
fn but_check(lower: &[String], sentiments: &mut [f64]) {
    let Some(bi) = lower.iter().position(|w| w == "but") else {
        return;
    };
    for (idx, s) in sentiments.iter_mut().enumerate() {
        if idx < bi {
            *s *= 0.5;
        } else if idx > bi {
            *s *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let ep = text.matches('!').count().min(4) as f64 * 0.292;
    let qm = text.matches('?').count();
    let qm_amp = match qm {
        0 | 1 => 0.0,
        2 | 3 => qm as f64 * 0.18,
        _ => 0.96,
    };
    ep + qm_amp
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

fn score_valence(sentiments: &[f64], text: &str) -> LexiconScores {
    if sentiments.is_empty() {
        return LexiconScores::default();
    }
    let punct = punctuation_emphasis(text);

    let mut sum: f64 = sentiments.iter().sum();
    if sum > 0.0 {
        sum += punct;
    } else if sum < 0.0 {
        sum -= punct;
    }
    let compound = normalize(sum);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0usize;
    for &s in sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += punct;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= punct;
    }

    let total = pos_sum + neg_sum.abs() + neu_count as f64;
    LexiconScores {
        compound: round_to(compound, 4),
        positive: round_to((pos_sum / total).abs(), 3),
        neutral: round_to((neu_count as f64 / total).abs(), 3),
        negative: round_to((neg_sum / total).abs(), 3),
    }
}

fn booster(w: &str) -> Option<f64> {
    match w {
        "absolutely" | "amazingly" | "awfully" | "completely" | "considerably" | "decidedly"
        | "deeply" | "enormously" | "entirely" | "especially" | "exceptionally" | "extremely"
        | "fabulously" | "greatly" | "hella" | "highly" | "hugely" | "incredibly"
        | "intensely" | "majorly" | "more" | "most" | "particularly" | "purely" | "quite"
        | "really" | "remarkably" | "so" | "substantially" | "thoroughly" | "totally"
        | "tremendously" | "uber" | "unbelievably" | "unusually" | "utterly" | "very" => {
            Some(B_INCR)
        }
        "almost" | "barely" | "hardly" | "kinda" | "less" | "little" | "marginally"
        | "occasionally" | "partly" | "scarcely" | "slightly" | "somewhat" | "sorta" => {
            Some(B_DECR)
        }
        _ => None,
    }
}

fn is_negated(w: &str) -> bool {
    matches!(
        w,
        "aint"
            | "arent"
            | "cannot"
            | "cant"
            | "couldnt"
            | "didnt"
            | "doesnt"
            | "dont"
            | "hadnt"
            | "hasnt"
            | "havent"
            | "isnt"
            | "mightnt"
            | "mustnt"
            | "neither"
            | "never"
            | "none"
            | "nope"
            | "nor"
            | "not"
            | "nothing"
            | "nowhere"
            | "shouldnt"
            | "wasnt"
            | "werent"
            | "without"
            | "wont"
            | "wouldnt"
            | "rarely"
            | "seldom"
            | "despite"
    ) || w.contains("n't")
}
