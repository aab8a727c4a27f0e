use analysis_core::{Headline, RawNewsItem, DEFAULT_NEWS_LINK};
use serde_json::Value;

/// Converts raw news records into typed headlines.
///
/// Malformed records are expected noise from the news source and are dropped
/// without error. Order is preserved and duplicates are kept.
#[derive(Debug, Clone, Default)]
pub struct NewsNormalizer {
    /// Tokenized terms; when non-empty a headline must contain one of them
    /// as a whole-word sequence.
    relevance_terms: Vec<Vec<String>>,
}

impl NewsNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only headlines that mention one of `terms` as whole words
    /// (case-insensitive), e.g. the ticker and the company name. A one-letter
    /// ticker such as `F` only matches the standalone word.
    pub fn with_relevance_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.relevance_terms = terms
            .into_iter()
            .map(|t| tokenize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    pub fn normalize(&self, raw_items: &[RawNewsItem]) -> Vec<Headline> {
        let headlines: Vec<Headline> = raw_items
            .iter()
            .filter_map(normalize_item)
            .filter(|h| self.is_relevant(h))
            .collect();

        let dropped = raw_items.len() - headlines.len();
        if dropped > 0 {
            tracing::debug!(
                "Normalized {} of {} news items ({} dropped)",
                headlines.len(),
                raw_items.len(),
                dropped
            );
        }

        headlines
    }

    fn is_relevant(&self, headline: &Headline) -> bool {
        if self.relevance_terms.is_empty() {
            return true;
        }
        let words = tokenize(headline.text());
        self.relevance_terms
            .iter()
            .any(|term| words.windows(term.len()).any(|window| window == term.as_slice()))
    }
}

/// Lowercased words. Ticker punctuation (`.`, `^`, `=`, `-`, `&`) stays inside
/// a word; trailing periods are dropped so `Inc.` matches `Inc`.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '.' | '^' | '=' | '-' | '&')))
        .map(|w| w.trim_matches(|c: char| matches!(c, '.' | '-')))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_item(item: &RawNewsItem) -> Option<Headline> {
    let content = item.get("content")?;
    let title = content.get("title")?.as_str()?;
    Headline::new(title, resolve_link(content.get("clickThroughUrl")))
}

/// `clickThroughUrl.url` when the block is a non-empty object carrying a
/// non-blank string; the default link otherwise.
fn resolve_link(click_through: Option<&Value>) -> String {
    match click_through {
        Some(Value::Object(block)) if !block.is_empty() => block
            .get("url")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_NEWS_LINK)
            .to_string(),
        _ => DEFAULT_NEWS_LINK.to_string(),
    }
}
