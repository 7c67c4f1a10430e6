// tests/pipeline_properties.rs
//
// End-to-end properties of the dataset pipeline over in-memory tables.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use social_sentiment_analyzer::{
    classify, normalize_platform, process, score, DatasetPipeline, PipelineError,
    SentimentCategory, Table,
};
use social_sentiment_analyzer::infer::{DateSource, PlatformSource};

fn table(cols: &[&str], rows: Vec<Vec<Value>>) -> Table {
    let mut t = Table::new(cols.iter().copied());
    for r in rows {
        t.push_row(r);
    }
    t
}

#[test]
fn blank_text_scores_exactly_zero() {
    for t in ["", "   "] {
        let (c, comps) = score(t);
        assert_eq!(c, 0.0);
        assert_eq!((comps.positive, comps.neutral, comps.negative), (0.0, 0.0, 0.0));
    }
}

#[test]
fn classification_boundaries() {
    assert_eq!(classify(0.05), SentimentCategory::Positive);
    assert_eq!(classify(-0.05), SentimentCategory::Negative);
    assert_eq!(classify(0.0), SentimentCategory::Neutral);
    assert_eq!(classify(0.0499), SentimentCategory::Neutral);
}

#[test]
fn platform_normalization_examples() {
    assert_eq!(normalize_platform("FB_user"), "Facebook");
    assert_eq!(normalize_platform("facebook2023"), "Facebook");
    assert_eq!(normalize_platform("my_insta"), "Instagram");
    assert_eq!(normalize_platform("X_handle"), "Twitter");
    assert_eq!(normalize_platform("linkedin"), "Linkedin");
}

#[test]
fn caption_table_without_platform_or_date() {
    let t = table(
        &["id", "caption", "likes"],
        vec![
            vec![json!(1), json!("Loving the sunshine today!"), json!(10)],
            vec![json!(2), json!("Worst commute ever."), json!(3)],
            vec![json!(3), json!("Lunch at noon."), json!(0)],
        ],
    );
    let before = Utc::now();
    let ds = process(&t).expect("process");
    let after = Utc::now();

    assert_eq!(ds.text_column, "caption");
    assert_eq!(ds.platform_source, PlatformSource::Synthesized);
    assert_eq!(ds.date_source, DateSource::Missing);
    assert!(ds.posts.iter().all(|p| p.platform == "unknown"));

    let first = ds.posts[0].date;
    assert!(ds.posts.iter().all(|p| p.date == first));
    assert!(first >= before && first <= after);
}

#[test]
fn tweet_table_with_posted_at_gets_real_dates() {
    let t = table(
        &["tweet", "posted_at"],
        vec![
            vec![json!("great launch"), json!("2024-03-01T10:00:00Z")],
            vec![json!("meh"), json!("2024-03-02T11:30:00Z")],
        ],
    );
    let now: DateTime<Utc> = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let ds = DatasetPipeline::default().process_at(&t, now).unwrap();

    assert_eq!(ds.text_column, "tweet");
    assert_eq!(ds.date_source, DateSource::Column("posted_at".into()));
    assert_eq!(
        ds.posts[0].date,
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    );
    assert_eq!(
        ds.posts[1].date,
        Utc.with_ymd_and_hms(2024, 3, 2, 11, 30, 0).unwrap()
    );
    assert!(ds.posts.iter().all(|p| p.date != now));
}

#[test]
fn empty_input_is_an_error() {
    assert!(matches!(
        process(&Table::default()),
        Err(PipelineError::EmptyDataset)
    ));
    assert!(matches!(
        process(&Table::new(["text", "platform"])),
        Err(PipelineError::EmptyDataset)
    ));
}

#[test]
fn numeric_only_table_has_no_text_column() {
    let t = table(
        &["id", "likes", "shares"],
        vec![
            vec![json!(1), json!(10), json!(2.5)],
            vec![json!(2), json!(4), Value::Null],
        ],
    );
    assert!(matches!(process(&t), Err(PipelineError::MissingTextColumn)));
}

#[test]
fn scores_stay_in_range_and_match_category() {
    let texts = [
        "I absolutely LOVE this!!! :)",
        "This is the worst, most horrible thing ever :(",
        "not bad at all",
        "The store opens at 9.",
        "#blessed @friend https://t.co/xyz so so happy",
    ];
    let t = table(
        &["text"],
        texts.iter().map(|s| vec![json!(s)]).collect(),
    );
    let ds = process(&t).unwrap();
    for p in &ds.posts {
        assert!((-1.0..=1.0).contains(&p.sentiment_score), "{}", p.sentiment_score);
        assert_eq!(p.sentiment, classify(p.sentiment_score));
        let c = p.sentiment_components;
        for v in [c.positive, c.neutral, c.negative] {
            assert!((0.0..=1.0).contains(&v));
        }
    }
    assert_eq!(ds.posts[0].sentiment, SentimentCategory::Positive);
    assert_eq!(ds.posts[1].sentiment, SentimentCategory::Negative);
    assert_eq!(ds.posts[3].sentiment, SentimentCategory::Neutral);
}

#[test]
fn original_fields_are_preserved_in_records() {
    let t = table(
        &["Post_ID", "Content", "Source"],
        vec![vec![json!(42), json!("nice"), json!("Twitter Web App")]],
    );
    let ds = process(&t).unwrap();
    let rec = &ds.to_records()[0];
    assert_eq!(rec["post_id"], json!(42));
    assert_eq!(rec["content"], json!("nice"));
    assert_eq!(rec["source"], json!("Twitter Web App"));
    assert_eq!(rec["platform"], json!("Twitter"));
}

#[test]
fn graph_api_created_time_resolves_real_dates() {
    let t = table(
        &["message", "created_time"],
        vec![
            vec![json!("love it"), json!("2019-05-01T12:34:56+0000")],
            vec![json!("hate it"), json!("2019-05-02T08:00:00+0200")],
        ],
    );
    let now: DateTime<Utc> = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let ds = DatasetPipeline::default().process_at(&t, now).unwrap();

    assert_eq!(ds.date_source, DateSource::Column("created_time".into()));
    assert_eq!(
        ds.posts[0].date,
        Utc.with_ymd_and_hms(2019, 5, 1, 12, 34, 56).unwrap()
    );
    assert_eq!(
        ds.posts[1].date,
        Utc.with_ymd_and_hms(2019, 5, 2, 6, 0, 0).unwrap()
    );
}
