use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::PipelineError;

/// Link used when a news record carries no click-through URL.
pub const DEFAULT_NEWS_LINK: &str = "https://finance.yahoo.com";

/// Currency assumed when the info source does not report one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Default number of headlines shown in the presentation view.
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// Untyped news record as delivered by the news source.
pub type RawNewsItem = serde_json::Value;

/// Daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Ticker metadata from the info source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub currency: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
}

impl TickerInfo {
    /// ISO currency code, falling back to USD.
    pub fn currency_code(&self) -> &str {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }
}

/// Sentiment polarity reported by a classifier.
///
/// The three FinBERT labels are first-class; anything else a model emits is
/// carried as `Other` and is only accepted when the configured [`LabelSet`]
/// lists it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Other(String),
}

impl SentimentLabel {
    /// Case-insensitive parse. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let label = raw.trim().to_lowercase();
        match label.as_str() {
            "" => None,
            "positive" => Some(SentimentLabel::Positive),
            "negative" => Some(SentimentLabel::Negative),
            "neutral" => Some(SentimentLabel::Neutral),
            _ => Some(SentimentLabel::Other(label)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Other(label) => label,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SentimentLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SentimentLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SentimentLabel::parse(&raw).ok_or_else(|| serde::de::Error::custom("empty sentiment label"))
    }
}

/// Ordered, duplicate-free set of labels a report tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSet(Vec<SentimentLabel>);

impl LabelSet {
    pub fn new(labels: Vec<SentimentLabel>) -> Result<Self, PipelineError> {
        if labels.is_empty() {
            return Err(PipelineError::Config("label set must not be empty".to_string()));
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(PipelineError::Config(format!("duplicate label '{}'", label)));
            }
        }
        Ok(Self(labels))
    }

    /// Parse a comma separated list such as `positive,negative,neutral`.
    pub fn from_csv(raw: &str) -> Result<Self, PipelineError> {
        let labels = raw.split(',').filter_map(SentimentLabel::parse).collect();
        Self::new(labels)
    }

    pub fn contains(&self, label: &SentimentLabel) -> bool {
        self.0.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SentimentLabel> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self(vec![
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
        ])
    }
}

/// Normalized news headline, ready for classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    text: String,
    link: String,
}

impl Headline {
    /// Returns `None` when the text is blank. A blank link becomes [`DEFAULT_NEWS_LINK`].
    pub fn new(text: impl Into<String>, link: impl Into<String>) -> Option<Self> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return None;
        }
        let link = link.into().trim().to_string();
        let link = if link.is_empty() { DEFAULT_NEWS_LINK.to_string() } else { link };
        Some(Self { text, link })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn link(&self) -> &str {
        &self.link
    }
}

/// Classifier output for one headline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentVerdict {
    label: SentimentLabel,
    confidence: f64,
}

impl SentimentVerdict {
    /// Rejects confidences that are not finite or fall outside [0, 1].
    pub fn new(label: SentimentLabel, confidence: f64) -> Result<Self, PipelineError> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(PipelineError::ClassifierFailure(format!(
                "confidence {} for label '{}' is outside [0, 1]",
                confidence, label
            )));
        }
        Ok(Self { label, confidence })
    }

    pub fn label(&self) -> &SentimentLabel {
        &self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineResult {
    headline: Headline,
    verdict: SentimentVerdict,
}

impl HeadlineResult {
    pub fn new(headline: Headline, verdict: SentimentVerdict) -> Self {
        Self { headline, verdict }
    }

    pub fn headline(&self) -> &Headline {
        &self.headline
    }

    pub fn verdict(&self) -> &SentimentVerdict {
        &self.verdict
    }
}

/// Per-label tally, ordered like the [`LabelSet`] it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCounts(Vec<(SentimentLabel, usize)>);

impl LabelCounts {
    /// Every label of the set present with a zero count.
    pub fn zeroed(labels: &LabelSet) -> Self {
        Self(labels.iter().map(|l| (l.clone(), 0)).collect())
    }

    /// Adds one to `label`. Returns false if the label is not tracked.
    pub fn increment(&mut self, label: &SentimentLabel) -> bool {
        match self.0.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, label: &SentimentLabel) -> usize {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SentimentLabel, usize)> {
        self.0.iter().map(|(l, c)| (l, *c))
    }
}

impl Serialize for LabelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label.as_str(), count)?;
        }
        map.end()
    }
}

/// Aggregated output of one analysis run.
///
/// `counts` is always the exact tally of `results`; [`Report::new`] refuses
/// anything else, and nothing mutates a report after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    ticker: String,
    generated_at: DateTime<Utc>,
    results: Vec<HeadlineResult>,
    counts: LabelCounts,
    display_limit: usize,
}

impl Report {
    pub fn new(
        ticker: impl Into<String>,
        results: Vec<HeadlineResult>,
        counts: LabelCounts,
        display_limit: usize,
    ) -> Result<Self, PipelineError> {
        if counts.total() != results.len() {
            return Err(PipelineError::ClassifierFailure(format!(
                "label counts sum to {} but there are {} results",
                counts.total(),
                results.len()
            )));
        }
        for (label, count) in counts.iter() {
            let actual = results.iter().filter(|r| r.verdict().label() == label).count();
            if actual != count {
                return Err(PipelineError::ClassifierFailure(format!(
                    "count for '{}' is {} but {} results carry it",
                    label, count, actual
                )));
            }
        }

        Ok(Self {
            ticker: ticker.into(),
            generated_at: Utc::now(),
            results,
            counts,
            display_limit,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn results(&self) -> &[HeadlineResult] {
        &self.results
    }

    pub fn counts(&self) -> &LabelCounts {
        &self.counts
    }

    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    /// The first `min(display_limit, len)` results, in source order.
    pub fn top_headlines(&self) -> &[HeadlineResult] {
        &self.results[..self.display_limit.min(self.results.len())]
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// True when there was nothing to analyze. Not an error.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Most frequent label; ties go to the earlier label in the set.
    pub fn dominant_label(&self) -> Option<&SentimentLabel> {
        let mut best: Option<(&SentimentLabel, usize)> = None;
        for (label, count) in self.counts.iter() {
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(l, _)| l)
    }

    /// Share of results carrying `label` (0.0 for an empty report).
    pub fn ratio(&self, label: &SentimentLabel) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.counts.get(label) as f64 / self.results.len() as f64
    }

    pub fn mean_confidence(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let sum: f64 = self.results.iter().map(|r| r.verdict().confidence()).sum();
        Some(sum / self.results.len() as f64)
    }
}

/// Latest price and its change versus the previous close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub current_price: f64,
    pub price_change: f64,
    pub currency_code: String,
}

impl PriceSummary {
    /// Change relative to the previous close, in percent.
    pub fn percent_change(&self) -> Option<f64> {
        let previous = self.current_price - self.price_change;
        if previous == 0.0 {
            None
        } else {
            Some(self.price_change / previous * 100.0)
        }
    }
}

/// Everything handed to the presentation layer for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub report: Report,
    pub price: PriceSummary,
}
