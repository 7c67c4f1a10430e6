// src/pipeline.rs
//! Dataset pipeline: raw table in, scored snapshot out.
//!
//! Order:
//! 1) reject empty input
//! 2) lowercase + trim headers
//! 3) infer text / platform / date columns
//! 4) canonicalize platform labels
//! 5) resolve dates (whole-column fallback to the processing instant)
//! 6) score + classify every row (parallel map for large batches)

use chrono::{DateTime, SecondsFormat, Utc};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::{Lazy, OnceCell};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::AppConfig;
use crate::dates;
use crate::error::PipelineError;
use crate::infer::{infer_schema, DateSource, PlatformSource};
use crate::ingest::{cell_to_string, Table};
use crate::platform::{normalize_platform, UNKNOWN_PLATFORM};
use crate::sentiment::{Components, SentimentCategory, SentimentScorer};
use crate::summary::DatasetView;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_runs_total", "Dataset pipeline invocations.");
        describe_counter!("pipeline_rows_total", "Rows scored by the dataset pipeline.");
        describe_counter!(
            "pipeline_failures_total",
            "Dataset loads and pipeline runs aborted by a loader or schema error."
        );
        describe_counter!(
            "pipeline_date_fallback_total",
            "Runs where a date-like column failed to parse and processing time was used."
        );
        describe_histogram!("pipeline_process_ms", "Pipeline run time in milliseconds.");
    });
}

/// A scored post. `fields` are the original cells under normalized headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub fields: Map<String, Value>,
    pub text: String,
    pub platform: String,
    pub date: DateTime<Utc>,
    pub sentiment: SentimentCategory,
    pub sentiment_score: f64,
    pub sentiment_components: Components,
}

impl Post {
    /// Flat record: original fields plus `platform`, `date`, `sentiment`,
    /// `sentiment_score`, `sentiment_components` (these win on name clashes).
    pub fn to_record(&self) -> Map<String, Value> {
        let mut rec = self.fields.clone();
        rec.insert("platform".into(), Value::String(self.platform.clone()));
        rec.insert(
            "date".into(),
            Value::String(self.date.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        rec.insert(
            "sentiment".into(),
            Value::String(self.sentiment.as_str().to_string()),
        );
        rec.insert("sentiment_score".into(), Value::from(self.sentiment_score));
        rec.insert(
            "sentiment_components".into(),
            serde_json::json!({
                "positive": self.sentiment_components.positive,
                "neutral": self.sentiment_components.neutral,
                "negative": self.sentiment_components.negative,
            }),
        );
        rec
    }
}

impl Serialize for Post {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

/// Immutable analysis snapshot produced by one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    /// Normalized original headers.
    pub columns: Vec<String>,
    pub text_column: String,
    pub platform_source: PlatformSource,
    pub date_source: DateSource,
    pub processed_at: DateTime<Utc>,
    pub posts: Vec<Post>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Unfiltered view over every post.
    pub fn view(&self) -> DatasetView<'_> {
        DatasetView::all(self)
    }

    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.posts.iter().map(Post::to_record).collect()
    }
}

#[derive(Debug, Clone)]
pub struct DatasetPipeline {
    scorer: SentimentScorer,
    parallel_min_rows: usize,
}

impl Default for DatasetPipeline {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl DatasetPipeline {
    pub fn new(scorer: SentimentScorer) -> Self {
        Self {
            scorer,
            parallel_min_rows: AppConfig::default().parallel_min_rows,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(SentimentScorer::new()).with_parallel_min_rows(cfg.parallel_min_rows)
    }

    pub fn with_parallel_min_rows(mut self, n: usize) -> Self {
        self.parallel_min_rows = n;
        self
    }

    pub fn scorer(&self) -> &SentimentScorer {
        &self.scorer
    }

    /// Run the pipeline; rows without a usable date get the current time.
    pub fn process(&self, raw: &Table) -> Result<Dataset, PipelineError> {
        self.process_at(raw, Utc::now())
    }

    /// Run the pipeline with an explicit processing instant.
    pub fn process_at(
        &self,
        raw: &Table,
        now: DateTime<Utc>,
    ) -> Result<Dataset, PipelineError> {
        ensure_metrics_described();
        counter!("pipeline_runs_total").increment(1);
        let started = Instant::now();

        let out = self.run(raw, now);

        histogram!("pipeline_process_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        match &out {
            Ok(ds) => counter!("pipeline_rows_total").increment(ds.len() as u64),
            Err(e) => record_failure(e),
        }
        out
    }

    fn run(&self, raw: &Table, now: DateTime<Utc>) -> Result<Dataset, PipelineError> {
        if raw.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        let table = raw.with_normalized_columns();
        let schema = infer_schema(&table);

        let text_column = schema
            .text_column
            .clone()
            .ok_or(PipelineError::MissingTextColumn)?;
        let text_idx = table
            .column_index(&text_column)
            .ok_or(PipelineError::MissingTextColumn)?;

        let n = table.len();
        let platforms: Vec<String> = match schema.platform.column() {
            Some(c) => match table.column_index(c) {
                Some(idx) => table.column_values(idx).map(platform_label).collect(),
                None => vec![UNKNOWN_PLATFORM.to_string(); n],
            },
            None => vec![UNKNOWN_PLATFORM.to_string(); n],
        };

        let (dates, date_source) = resolve_dates(&table, schema.date_column.as_deref(), now);

        let parallel = n >= self.parallel_min_rows;
        let build = |i: usize| self.build_post(&table, i, text_idx, &platforms[i], dates[i]);
        let posts: Vec<Post> = if parallel {
            (0..n).into_par_iter().map(&build).collect()
        } else {
            (0..n).map(&build).collect()
        };

        info!(
            target: "pipeline",
            rows = n,
            text_column = %text_column,
            platform_source = ?schema.platform,
            date_source = ?date_source,
            parallel,
            scorer = ?self.scorer.source_names(),
            "dataset processed"
        );

        Ok(Dataset {
            columns: table.columns().to_vec(),
            text_column,
            platform_source: schema.platform,
            date_source,
            processed_at: now,
            posts,
        })
    }

    fn build_post(
        &self,
        table: &Table,
        i: usize,
        text_idx: usize,
        platform: &str,
        date: DateTime<Utc>,
    ) -> Post {
        let row = &table.rows()[i];
        let text = cell_to_string(&row[text_idx]);
        let result = self.scorer.analyze(&text);

        trace!(
            target: "pipeline",
            id = %anon_hash(&text),
            compound = result.compound,
            sentiment = %result.category,
            "row scored"
        );

        let fields = table
            .columns()
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect();

        Post {
            fields,
            text,
            platform: platform.to_string(),
            date,
            sentiment: result.category,
            sentiment_score: result.compound,
            sentiment_components: result.components,
        }
    }
}

/// Count and log a load or pipeline failure.
pub fn record_failure(e: &PipelineError) {
    ensure_metrics_described();
    counter!("pipeline_failures_total").increment(1);
    warn!(target: "pipeline", error = %e, kind = e.kind(), "dataset rejected");
}

/// Canonical label for a platform cell; null/blank cells are unknown.
fn platform_label(v: &Value) -> String {
    let raw = cell_to_string(v);
    if raw.trim().is_empty() {
        UNKNOWN_PLATFORM.to_string()
    } else {
        normalize_platform(&raw)
    }
}

fn resolve_dates(
    table: &Table,
    date_column: Option<&str>,
    now: DateTime<Utc>,
) -> (Vec<DateTime<Utc>>, DateSource) {
    let n = table.len();
    let Some(col) = date_column else {
        debug!(target: "pipeline", "no date-like column; using processing time");
        return (vec![now; n], DateSource::Missing);
    };
    let Some(idx) = table.column_index(col) else {
        return (vec![now; n], DateSource::Missing);
    };

    match dates::resolve_column(table.column_values(idx), now) {
        Some(parsed) => (parsed, DateSource::Column(col.to_string())),
        None => {
            counter!("pipeline_date_fallback_total").increment(1);
            warn!(target: "pipeline", column = col, "date column did not parse; using processing time");
            (vec![now; n], DateSource::Unparseable(col.to_string()))
        }
    }
}

/// Short anonymized id for log lines; raw post text is never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

static DEFAULT_PIPELINE: Lazy<DatasetPipeline> = Lazy::new(DatasetPipeline::default);

/// Process a table with the default pipeline.
pub fn process(raw: &Table) -> Result<Dataset, PipelineError> {
    DEFAULT_PIPELINE.process(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()
    }

    fn table(cols: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let mut t = Table::new(cols.iter().copied());
        for r in rows {
            t.push_row(r);
        }
        t
    }

    #[test]
    fn empty_table_is_rejected() {
        let t = Table::new(["text"]);
        assert!(matches!(
            DatasetPipeline::default().process_at(&t, now()),
            Err(PipelineError::EmptyDataset)
        ));
    }

    #[test]
    fn headers_are_normalized_before_inference() {
        let t = table(&["  TEXT ", "Platform"], vec![vec![json!("good"), json!("FB")]]);
        let ds = DatasetPipeline::default().process_at(&t, now()).unwrap();
        assert_eq!(ds.text_column, "text");
        assert_eq!(ds.posts[0].platform, "Facebook");
        assert_eq!(ds.columns, ["text", "platform"]);
    }

    #[test]
    fn source_column_is_aliased_and_kept() {
        let t = table(
            &["message", "source"],
            vec![vec![json!("hi"), json!("Twitter for iPhone")]],
        );
        let ds = DatasetPipeline::default().process_at(&t, now()).unwrap();
        assert_eq!(ds.platform_source, PlatformSource::Alias("source".into()));
        let rec = ds.posts[0].to_record();
        assert_eq!(rec["platform"], json!("Twitter"));
        assert_eq!(rec["source"], json!("Twitter for iPhone"));
    }

    #[test]
    fn null_platform_cells_are_unknown() {
        let t = table(
            &["text", "platform"],
            vec![vec![json!("a"), Value::Null], vec![json!("b"), json!("insta")]],
        );
        let ds = DatasetPipeline::default().process_at(&t, now()).unwrap();
        assert_eq!(ds.posts[0].platform, UNKNOWN_PLATFORM);
        assert_eq!(ds.posts[1].platform, "Instagram");
    }

    #[test]
    fn unparseable_date_column_falls_back_for_every_row() {
        let t = table(
            &["text", "date"],
            vec![
                vec![json!("a"), json!("2024-03-01")],
                vec![json!("b"), json!("whenever")],
            ],
        );
        let ds = DatasetPipeline::default().process_at(&t, now()).unwrap();
        assert_eq!(ds.date_source, DateSource::Unparseable("date".into()));
        assert!(ds.posts.iter().all(|p| p.date == now()));
    }

    #[test]
    fn null_text_scores_neutral() {
        let t = table(&["text", "id"], vec![vec![Value::Null, json!(1)]]);
        let ds = DatasetPipeline::default().process_at(&t, now()).unwrap();
        let p = &ds.posts[0];
        assert_eq!(p.sentiment, SentimentCategory::Neutral);
        assert_eq!(p.sentiment_score, 0.0);
        assert_eq!(p.sentiment_components, Components::ZERO);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let rows: Vec<Vec<Value>> = (0..50)
            .map(|i| {
                let text = match i % 3 {
                    0 => "I love this so much",
                    1 => "this is awful and broken",
                    _ => "meeting moved to noon",
                };
                vec![json!(i), json!(text)]
            })
            .collect();
        let t = table(&["id", "text"], rows);
        let seq = DatasetPipeline::default()
            .with_parallel_min_rows(usize::MAX)
            .process_at(&t, now())
            .unwrap();
        let par = DatasetPipeline::default()
            .with_parallel_min_rows(0)
            .process_at(&t, now())
            .unwrap();
        assert_eq!(seq.posts, par.posts);
    }

    #[test]
    fn record_has_the_added_fields() {
        let t = table(&["id", "caption"], vec![vec![json!(7), json!("nice")]]);
        let rec = DatasetPipeline::default()
            .process_at(&t, now())
            .unwrap()
            .posts[0]
            .to_record();
        for k in [
            "id",
            "caption",
            "platform",
            "date",
            "sentiment",
            "sentiment_score",
            "sentiment_components",
        ] {
            assert!(rec.contains_key(k), "missing {k}");
        }
        assert_eq!(rec["date"], json!("2030-01-02T03:04:05Z"));
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        assert_eq!(anon_hash("abc").len(), 12);
        assert_eq!(anon_hash("abc"), anon_hash("abc"));
        assert_ne!(anon_hash("abc"), anon_hash("abd"));
    }
}
