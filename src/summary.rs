// src/summary.rs
//! Read-only views and aggregates over a processed [`Dataset`].
//!
//! Nothing here renders anything; presentation layers consume the
//! serializable structs (distribution, per-platform, per-day, top words).

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::clean::clean_text;
use crate::pipeline::{Dataset, Post};
use crate::sentiment::SentimentCategory;

/// English stopwords plus social-media boilerplate, excluded from word counts.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've",
    "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn",
    "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't",
    "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't",
    "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren",
    "weren't", "won", "won't", "wouldn", "wouldn't",
    // social
    "rt", "like", "follow", "retweet", "post", "facebook", "twitter", "instagram", "comment",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w[\w']+").expect("word regex"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub sentiment: SentimentCategory,
    pub count: usize,
    /// 0..=100
    pub percentage: f64,
}

/// Per-category counts for one bucket (a platform or a day).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl CategoryCounts {
    fn bump(&mut self, c: SentimentCategory) {
        match c {
            SentimentCategory::Positive => self.positive += 1,
            SentimentCategory::Neutral => self.neutral += 1,
            SentimentCategory::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformCounts {
    pub platform: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCounts {
    pub day: NaiveDate,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Everything a dashboard needs for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub distribution: Vec<CategoryShare>,
    pub by_platform: Vec<PlatformCounts>,
    pub over_time: Vec<DailyCounts>,
    pub top_words: Vec<WordCount>,
}

/// A filtered, borrowed selection of posts. Never mutates the dataset.
#[derive(Debug, Clone)]
pub struct DatasetView<'a> {
    posts: Vec<&'a Post>,
}

impl<'a> DatasetView<'a> {
    pub fn all(ds: &'a Dataset) -> Self {
        Self {
            posts: ds.posts.iter().collect(),
        }
    }

    /// Keep posts whose platform is in `platforms` (case-insensitive) and
    /// whose category is in `sentiments`. An empty list matches everything.
    pub fn filter(&self, platforms: &[String], sentiments: &[SentimentCategory]) -> DatasetView<'a> {
        let posts = self
            .posts
            .iter()
            .copied()
            .filter(|p| {
                platforms.is_empty() || platforms.iter().any(|w| w.eq_ignore_ascii_case(&p.platform))
            })
            .filter(|p| sentiments.is_empty() || sentiments.contains(&p.sentiment))
            .collect();
        DatasetView { posts }
    }

    pub fn posts(&self) -> &[&'a Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn distribution(&self) -> Vec<CategoryShare> {
        let mut counts = CategoryCounts::default();
        for p in &self.posts {
            counts.bump(p.sentiment);
        }
        let total = self.posts.len();
        SentimentCategory::ALL
            .iter()
            .map(|&c| {
                let count = match c {
                    SentimentCategory::Positive => counts.positive,
                    SentimentCategory::Neutral => counts.neutral,
                    SentimentCategory::Negative => counts.negative,
                };
                let percentage = if total == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / total as f64
                };
                CategoryShare {
                    sentiment: c,
                    count,
                    percentage,
                }
            })
            .collect()
    }

    /// Platforms in ascending order.
    pub fn by_platform(&self) -> Vec<PlatformCounts> {
        let mut acc: BTreeMap<&str, CategoryCounts> = BTreeMap::new();
        for p in &self.posts {
            acc.entry(p.platform.as_str()).or_default().bump(p.sentiment);
        }
        acc.into_iter()
            .map(|(platform, counts)| PlatformCounts {
                platform: platform.to_string(),
                counts,
            })
            .collect()
    }

    /// Calendar days (UTC) in ascending order.
    pub fn over_time(&self) -> Vec<DailyCounts> {
        let mut acc: BTreeMap<NaiveDate, CategoryCounts> = BTreeMap::new();
        for p in &self.posts {
            acc.entry(p.date.date_naive()).or_default().bump(p.sentiment);
        }
        acc.into_iter()
            .map(|(day, counts)| DailyCounts { day, counts })
            .collect()
    }

    /// Most frequent words of the cleaned post text, at most `max` entries.
    pub fn top_words(&self, max: usize) -> Vec<WordCount> {
        let mut freq: HashMap<String, usize> = HashMap::new();
        for p in &self.posts {
            let cleaned = clean_text(&p.text).to_lowercase();
            for m in WORD_RE.find_iter(&cleaned) {
                let w = m.as_str();
                let w = w.strip_suffix("'s").unwrap_or(w);
                if w.chars().count() < 2
                    || w.chars().all(|c| c.is_ascii_digit())
                    || STOPWORD_SET.contains(w)
                {
                    continue;
                }
                *freq.entry(w.to_string()).or_insert(0) += 1;
            }
        }

        let mut words: Vec<WordCount> = freq
            .into_iter()
            .map(|(word, count)| WordCount { word, count })
            .collect();
        words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        words.truncate(max);
        words
    }

    pub fn summarize(&self, top_words: usize) -> Summary {
        Summary {
            total: self.len(),
            distribution: self.distribution(),
            by_platform: self.by_platform(),
            over_time: self.over_time(),
            top_words: self.top_words(top_words),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Table;
    use crate::pipeline::DatasetPipeline;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn dataset() -> Dataset {
        let mut t = Table::new(["text", "platform", "date"]);
        for (text, platform, date) in [
            ("I love this, great day", "fb", "2024-03-01"),
            ("terrible service, awful", "twitter", "2024-03-01"),
            ("the meeting is at noon", "insta", "2024-03-02"),
            ("great great product", "Facebook", "2024-03-02"),
        ] {
            t.push_row(vec![json!(text), json!(platform), json!(date)]);
        }
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        DatasetPipeline::default().process_at(&t, now).unwrap()
    }

    #[test]
    fn distribution_is_in_fixed_order_and_sums_to_100() {
        let ds = dataset();
        let d = ds.view().distribution();
        let order: Vec<_> = d.iter().map(|s| s.sentiment).collect();
        assert_eq!(order, SentimentCategory::ALL.to_vec());
        assert_eq!(d.iter().map(|s| s.count).sum::<usize>(), 4);
        let pct: f64 = d.iter().map(|s| s.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_view_has_zero_percentages() {
        let ds = dataset();
        let v = ds.view().filter(&["LinkedIn".to_string()], &[]);
        assert!(v.is_empty());
        assert!(v.distribution().iter().all(|s| s.percentage == 0.0));
        assert!(v.top_words(10).is_empty());
    }

    #[test]
    fn filter_by_platform_and_sentiment() {
        let ds = dataset();
        let fb = ds.view().filter(&["facebook".to_string()], &[]);
        assert_eq!(fb.len(), 2);
        let neg = ds.view().filter(&[], &[SentimentCategory::Negative]);
        assert!(neg.posts().iter().all(|p| p.sentiment == SentimentCategory::Negative));
        assert_eq!(ds.view().filter(&[], &[]).len(), ds.len());
    }

    #[test]
    fn platforms_sorted_and_days_ascending() {
        let ds = dataset();
        let names: Vec<_> = ds
            .view()
            .by_platform()
            .into_iter()
            .map(|p| p.platform)
            .collect();
        assert_eq!(names, ["Facebook", "Instagram", "Twitter"]);

        let days = ds.view().over_time();
        assert_eq!(days.len(), 2);
        assert!(days[0].day < days[1].day);
        assert_eq!(days[0].counts.total(), 2);
    }

    #[test]
    fn top_words_skip_stopwords_and_sort() {
        let ds = dataset();
        let w = ds.view().top_words(3);
        assert_eq!(w[0], WordCount { word: "great".into(), count: 3 });
        assert!(w.iter().all(|x| !STOPWORD_SET.contains(x.word.as_str())));
        assert!(w.len() <= 3);
        // ties break alphabetically
        assert!(w[1].count > w[2].count || w[1].word < w[2].word);
    }

    #[test]
    fn top_words_drop_numbers_and_possessives() {
        let mut t = Table::new(["text"]);
        t.push_row(vec![json!("Anna's cake 2024 and Anna's tea")]);
        let ds = DatasetPipeline::default().process(&t).unwrap();
        let w = ds.view().top_words(10);
        assert_eq!(w[0], WordCount { word: "anna".into(), count: 2 });
        assert!(w.iter().all(|x| x.word != "2024"));
    }
}
