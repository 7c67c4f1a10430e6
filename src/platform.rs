// src/platform.rs
//! Platform label canonicalization.
//!
//! Free-form platform strings are folded onto `Facebook`, `Twitter` and
//! `Instagram`; anything else passes through lowercased with its first
//! letter capitalized.

/// Value used when a dataset carries no platform information for a row.
pub const UNKNOWN_PLATFORM: &str = "unknown";

/// Canonical label for a raw platform string. Total over all inputs.
///
/// Checked in order on the lowercased input:
/// 1. contains `fb` or `face` → `Facebook`
/// 2. contains `tw`, or has a standalone `x` token → `Twitter`
/// 3. contains `insta` or `ig` → `Instagram`
/// 4. otherwise capitalize the first letter
pub fn normalize_platform(raw: &str) -> String {
    let p = raw.to_lowercase();

    if p.contains("fb") || p.contains("face") {
        return "Facebook".to_string();
    }
    if p.contains("tw") || has_x_token(&p) {
        return "Twitter".to_string();
    }
    if p.contains("insta") || p.contains("ig") {
        return "Instagram".to_string();
    }
    capitalize(&p)
}

/// `x` as its own token, with anything non-alphanumeric as a separator
/// (`x`, `X_handle`, `x.com`).
fn has_x_token(p: &str) -> bool {
    p.split(|c: char| !c.is_alphanumeric()).any(|t| t == "x")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
