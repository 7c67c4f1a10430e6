// src/clean.rs
//! Social-media text cleaning: drop URLs and @mentions, unwrap #hashtags,
//! fold whitespace.

use once_cell::sync::OnceCell;
use regex::Regex;

fn re_url() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:https?://|www\.)\S*").expect("url regex"))
}

fn re_mention() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"@\w+").expect("mention regex"))
}

fn re_hashtag() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"#(\w+)").expect("hashtag regex"))
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

/// Clean a post for scoring.
///
/// 1) remove URL tokens (`http://`, `https://`, `www.`)
/// 2) remove `@handle` mentions
/// 3) strip `#` markers, keeping the tag word
/// 4) collapse whitespace runs to one space and trim
///
/// Total over any input; the empty string cleans to the empty string.
pub fn clean_text(text: &str) -> String {
    let mut out = text.to_string();

    // A removal can expose a fresh match (`http@a://x`, `##tag`), so repeat
    // until stable. Every effective pass shortens the string.
    loop {
        let next = strip_once(&out);
        if next == out {
            break;
        }
        out = next;
    }

    re_ws().replace_all(&out, " ").trim().to_string()
}

fn strip_once(s: &str) -> String {
    let s = re_url().replace_all(s, "");
    let s = re_mention().replace_all(&s, "");
    re_hashtag().replace_all(&s, "$1").into_owned()
}
