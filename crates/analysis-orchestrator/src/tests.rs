use analysis_core::{
    HistoryBar, HistorySource, InfoSource, LabelSet, NewsSource, PipelineError, RawNewsItem,
    SentimentClassifier, SentimentLabel, SentimentVerdict, TickerInfo, DEFAULT_NEWS_LINK,
};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{CachedSource, PipelineController, SentimentPipeline};

/// Classifies by keyword and counts calls.
#[derive(Default)]
struct StubClassifier {
    calls: AtomicUsize,
}

impl StubClassifier {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for StubClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentVerdict, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        if lower.contains("explode") {
            return Err(PipelineError::ClassifierFailure("model crashed".into()));
        }
        if lower.contains("surge") {
            SentimentVerdict::new(SentimentLabel::Positive, 0.87)
        } else if lower.contains("plunge") {
            SentimentVerdict::new(SentimentLabel::Negative, 0.91)
        } else {
            SentimentVerdict::new(SentimentLabel::Neutral, 0.6)
        }
    }

    fn backend_name(&self) -> &'static str {
        "stub"
    }
}

#[derive(Clone, Default)]
struct StubMarket {
    closes: Vec<f64>,
    news: Vec<RawNewsItem>,
    info: TickerInfo,
    news_error: bool,
    history_error: bool,
    info_error: bool,
    delay: Option<Duration>,
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl HistorySource for StubMarket {
    async fn history(&self, _ticker: &str, _range: &str) -> Result<Vec<HistoryBar>, PipelineError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.history_error {
            return Err(PipelineError::UpstreamFetch("chart endpoint returned 502".into()));
        }
        let start = Utc::now() - ChronoDuration::days(self.closes.len() as i64);
        Ok(self
            .closes
            .iter()
            .enumerate()
            .map(|(i, &close)| HistoryBar {
                timestamp: start + ChronoDuration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000.0,
            })
            .collect())
    }
}

#[async_trait]
impl NewsSource for StubMarket {
    async fn news(&self, _ticker: &str) -> Result<Vec<RawNewsItem>, PipelineError> {
        if self.news_error {
            return Err(PipelineError::UpstreamFetch("news endpoint returned 503".into()));
        }
        Ok(self.news.clone())
    }
}

#[async_trait]
impl InfoSource for StubMarket {
    async fn info(&self, _ticker: &str) -> Result<TickerInfo, PipelineError> {
        if self.info_error {
            return Err(PipelineError::UpstreamFetch("quote lookup timed out".into()));
        }
        Ok(self.info.clone())
    }
}

fn item(title: &str, url: &str) -> RawNewsItem {
    json!({"content": {"title": title, "clickThroughUrl": {"url": url}}})
}

fn pipeline(market: StubMarket, classifier: Arc<StubClassifier>) -> SentimentPipeline {
    let market = Arc::new(market);
    let controller = PipelineController::new(classifier, LabelSet::default());
    SentimentPipeline::new(market.clone(), market.clone(), market, controller)
}

#[tokio::test]
async fn test_empty_history_is_no_data_without_classifying() {
    let classifier = Arc::new(StubClassifier::default());
    let market = StubMarket {
        news: vec![item("Stock surges", "https://x.test/a")],
        ..Default::default()
    };

    let err = pipeline(market, classifier.clone()).analyze_ticker("zzzz").await.unwrap_err();
    assert_eq!(err, PipelineError::NoData("ZZZZ".into()));
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_empty_history_wins_over_news_failure() {
    let market = StubMarket { news_error: true, ..Default::default() };
    let err = pipeline(market, Arc::new(StubClassifier::default()))
        .analyze_ticker("ZZZZ")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoData(_)));
}

#[tokio::test]
async fn test_single_history_point_is_insufficient() {
    let classifier = Arc::new(StubClassifier::default());
    let market = StubMarket { closes: vec![190.0], ..Default::default() };
    let err = pipeline(market, classifier.clone()).analyze_ticker("AAPL").await.unwrap_err();
    assert!(matches!(err, PipelineError::InsufficientHistory { points: 1, .. }));
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_empty_news_gives_zero_counts() {
    let market = StubMarket { closes: vec![100.0, 101.0], ..Default::default() };
    let outcome = pipeline(market, Arc::new(StubClassifier::default()))
        .analyze_ticker("AAPL")
        .await
        .unwrap();

    assert!(outcome.report.results().is_empty());
    let counts: Vec<(String, usize)> = outcome
        .report
        .counts()
        .iter()
        .map(|(label, n)| (label.to_string(), n))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("positive".to_string(), 0),
            ("negative".to_string(), 0),
            ("neutral".to_string(), 0)
        ]
    );
    assert!((outcome.price.price_change - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_headline_scenario_end_to_end() {
    let market = StubMarket {
        closes: vec![100.0, 98.0],
        news: vec![
            item("Stock surges on earnings beat", "https://x.test/a"),
            json!({"id": "no-content"}),
            json!({"content": {"title": "Board meeting scheduled", "clickThroughUrl": null}}),
        ],
        info: TickerInfo { currency: Some("EUR".into()), ..Default::default() },
        ..Default::default()
    };

    let outcome = pipeline(market, Arc::new(StubClassifier::default()))
        .analyze_ticker("SAP.DE")
        .await
        .unwrap();

    let results = outcome.report.results();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].headline().text(), "Stock surges on earnings beat");
    assert_eq!(results[0].headline().link(), "https://x.test/a");
    assert_eq!(results[0].verdict().label(), &SentimentLabel::Positive);
    assert!((results[0].verdict().confidence() - 0.87).abs() < 1e-9);

    assert_eq!(results[1].headline().link(), DEFAULT_NEWS_LINK);
    assert_eq!(outcome.report.counts().total(), 2);
    assert_eq!(outcome.price.currency_code, "EUR");
    assert_eq!(outcome.report.ticker(), "SAP.DE");
}

#[tokio::test]
async fn test_fifteen_headlines_show_first_ten() {
    let news = (0..15)
        .map(|i| item(&format!("Update {} surge", i), &format!("https://x.test/{}", i)))
        .collect();
    let market = StubMarket { closes: vec![1.0, 2.0], news, ..Default::default() };

    let outcome = pipeline(market, Arc::new(StubClassifier::default()))
        .analyze_ticker("AAPL")
        .await
        .unwrap();

    let top = outcome.report.top_headlines();
    assert_eq!(top.len(), 10);
    for (i, result) in top.iter().enumerate() {
        assert_eq!(result.headline().text(), format!("Update {} surge", i));
    }
    assert_eq!(outcome.report.counts().get(&SentimentLabel::Positive), 15);
    assert_eq!(outcome.report.counts().total(), 15);
}

#[tokio::test]
async fn test_classifier_failure_propagates() {
    let market = StubMarket {
        closes: vec![1.0, 2.0],
        news: vec![item("Shares surge", "https://x.test/a"), item("Servers explode", "https://x.test/b")],
        ..Default::default()
    };
    let err = pipeline(market, Arc::new(StubClassifier::default()))
        .analyze_ticker("AAPL")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ClassifierFailure(_)));
}

#[tokio::test]
async fn test_news_failure_surfaces_as_upstream_error() {
    let market = StubMarket { closes: vec![1.0, 2.0], news_error: true, ..Default::default() };
    let err = pipeline(market, Arc::new(StubClassifier::default()))
        .analyze_ticker("AAPL")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UpstreamFetch(_)));
    assert!(err.is_retriable());
}

#[tokio::test]
async fn test_history_failure_surfaces_as_upstream_error() {
    let classifier = Arc::new(StubClassifier::default());
    let market = StubMarket {
        history_error: true,
        news: vec![item("Stock surges", "https://x.test/a")],
        ..Default::default()
    };
    let err = pipeline(market, classifier.clone()).analyze_ticker("AAPL").await.unwrap_err();
    assert_eq!(err, PipelineError::UpstreamFetch("chart endpoint returned 502".into()));
    assert!(err.is_retriable());
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_info_failure_surfaces_as_upstream_error() {
    let classifier = Arc::new(StubClassifier::default());
    let market = StubMarket {
        closes: vec![1.0, 2.0],
        news: vec![item("Stock surges", "https://x.test/a")],
        info_error: true,
        ..Default::default()
    };
    let err = pipeline(market, classifier.clone()).analyze_ticker("AAPL").await.unwrap_err();
    assert_eq!(err, PipelineError::UpstreamFetch("quote lookup timed out".into()));
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_empty_history_wins_over_info_failure() {
    let market = StubMarket { info_error: true, ..Default::default() };
    let err = pipeline(market, Arc::new(StubClassifier::default()))
        .analyze_ticker("ZZZZ")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoData(_)));
}

#[tokio::test]
async fn test_blank_ticker_rejected_before_fetch() {
    let market = StubMarket::default();
    let fetches = market.fetches.clone();
    let err = pipeline(market, Arc::new(StubClassifier::default()))
        .analyze_ticker("  ")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidTicker(_)));
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_deadline_exceeded() {
    let market = StubMarket {
        closes: vec![1.0, 2.0],
        delay: Some(Duration::from_millis(200)),
        ..Default::default()
    };
    let err = pipeline(market, Arc::new(StubClassifier::default()))
        .with_deadline(Duration::from_millis(20))
        .analyze_ticker("AAPL")
        .await
        .unwrap_err();
    assert_eq!(err, PipelineError::DeadlineExceeded(Duration::from_millis(20)));
}

#[tokio::test]
async fn test_relevance_filter_drops_unrelated_headlines() {
    let market = Arc::new(StubMarket {
        closes: vec![1.0, 2.0],
        news: vec![
            item("Apple shares surge after launch", "https://x.test/a"),
            item("Oil prices plunge", "https://x.test/b"),
            item("AAPL options activity heats up", "https://x.test/c"),
        ],
        info: TickerInfo { long_name: Some("Apple Inc.".into()), ..Default::default() },
        ..Default::default()
    });
    let controller = PipelineController::new(Arc::new(StubClassifier::default()), LabelSet::default())
        .with_relevance_filter(true);
    let outcome = SentimentPipeline::new(market.clone(), market.clone(), market, controller)
        .analyze_ticker("aapl")
        .await
        .unwrap();

    let texts: Vec<&str> = outcome.report.results().iter().map(|r| r.headline().text()).collect();
    assert_eq!(texts, vec!["Apple shares surge after launch", "AAPL options activity heats up"]);
}

#[tokio::test]
async fn test_relevance_filter_single_letter_ticker() {
    let market = Arc::new(StubMarket {
        closes: vec![1.0, 2.0],
        news: vec![
            item("Oil prices plunge after central bank meeting", "https://x.test/a"),
            item("Ford recalls trucks", "https://x.test/b"),
            item("F shares surge on EV outlook", "https://x.test/c"),
        ],
        info: TickerInfo { long_name: Some("Ford Motor Company".into()), ..Default::default() },
        ..Default::default()
    });
    let controller = PipelineController::new(Arc::new(StubClassifier::default()), LabelSet::default())
        .with_relevance_filter(true);
    let outcome = SentimentPipeline::new(market.clone(), market.clone(), market, controller)
        .analyze_ticker("f")
        .await
        .unwrap();

    let texts: Vec<&str> = outcome.report.results().iter().map(|r| r.headline().text()).collect();
    assert_eq!(texts, vec!["Ford recalls trucks", "F shares surge on EV outlook"]);
}

#[tokio::test]
async fn test_cached_source_reused_across_runs() {
    let market = StubMarket { closes: vec![1.0, 2.0], ..Default::default() };
    let fetches = market.fetches.clone();
    let source = Arc::new(CachedSource::new(market, Duration::from_secs(600)));
    let controller = PipelineController::new(Arc::new(StubClassifier::default()), LabelSet::default());
    let pipeline = SentimentPipeline::new(source.clone(), source.clone(), source, controller);

    pipeline.analyze_ticker("AAPL").await.unwrap();
    pipeline.analyze_ticker("aapl").await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}
