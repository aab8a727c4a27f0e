use analysis_core::{
    AnalysisOutcome, HistoryBar, LabelSet, PipelineError, RawNewsItem, SentimentClassifier,
    TickerInfo,
};
use sentiment_analysis::{HeadlineAnalyzer, NewsNormalizer, SentimentAggregator};
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::price;

/// Trims and upper-cases a ticker. Blank input and characters outside
/// `A-Z 0-9 . ^ = -` (e.g. `^GSPC`, `BRK-B`, `EURUSD=X`) are rejected.
pub fn normalize_ticker(ticker: &str) -> Result<String, PipelineError> {
    let ticker = ticker.trim().to_uppercase();
    let valid = !ticker.is_empty()
        && ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-'));
    if !valid {
        return Err(PipelineError::InvalidTicker(ticker));
    }
    Ok(ticker)
}

/// Runs normalize → classify → aggregate over already-fetched inputs.
pub struct PipelineController {
    classifier: Arc<dyn SentimentClassifier>,
    normalizer: NewsNormalizer,
    analyzer: HeadlineAnalyzer,
    aggregator: SentimentAggregator,
    relevance_filter: bool,
}

impl PipelineController {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, labels: LabelSet) -> Self {
        Self {
            classifier,
            normalizer: NewsNormalizer::new(),
            analyzer: HeadlineAnalyzer::new(labels.clone()),
            aggregator: SentimentAggregator::new(labels),
            relevance_filter: false,
        }
    }

    pub fn from_config(config: &PipelineConfig, classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self::new(classifier, config.labels.clone())
            .with_concurrency(config.classifier_concurrency)
            .with_display_limit(config.display_limit)
            .with_relevance_filter(config.relevance_filter)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.analyzer = self.analyzer.with_concurrency(concurrency);
        self
    }

    pub fn with_display_limit(mut self, limit: usize) -> Self {
        self.aggregator = self.aggregator.with_display_limit(limit);
        self
    }

    /// Drop headlines that mention neither the ticker nor the company name.
    pub fn with_relevance_filter(mut self, enabled: bool) -> Self {
        self.relevance_filter = enabled;
        self
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.backend_name()
    }

    pub fn aggregator(&self) -> &SentimentAggregator {
        &self.aggregator
    }

    /// History is validated before any classifier call: no history means an
    /// unknown ticker, one point cannot produce a price change. Empty news
    /// is a valid, empty report.
    pub async fn run(
        &self,
        ticker: &str,
        history: &[HistoryBar],
        news: &[RawNewsItem],
        info: &TickerInfo,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let ticker = normalize_ticker(ticker)?;
        let price = price::price_summary(&ticker, history, info)?;

        let headlines = if self.relevance_filter {
            self.normalizer
                .clone()
                .with_relevance_terms(relevance_terms(&ticker, info))
                .normalize(news)
        } else {
            self.normalizer.normalize(news)
        };

        tracing::info!(
            "Classifying {} headline(s) for {} with {}",
            headlines.len(),
            ticker,
            self.classifier.backend_name()
        );

        let results = self.analyzer.analyze(&headlines, self.classifier.as_ref()).await?;
        let report = self.aggregator.aggregate(&ticker, results)?;

        tracing::info!("{}: {}", ticker, self.aggregator.describe(&report));

        Ok(AnalysisOutcome { report, price })
    }
}

/// Ticker, its root symbol (`ZOMATO` for `ZOMATO.NS`), the company name and
/// the company name's first word.
fn relevance_terms(ticker: &str, info: &TickerInfo) -> Vec<String> {
    let mut terms = vec![ticker.to_string()];
    if let Some((root, _)) = ticker.split_once('.') {
        terms.push(root.to_string());
    }
    if let Some(name) = info.long_name.as_deref() {
        terms.push(name.to_string());
        if let Some(first) = name.split_whitespace().next() {
            let first = first.trim_end_matches(|c: char| !c.is_alphanumeric());
            if first.len() >= 3 {
                terms.push(first.to_string());
            }
        }
    }
    terms
}
