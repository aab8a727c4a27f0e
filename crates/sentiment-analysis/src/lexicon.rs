use analysis_core::{PipelineError, SentimentClassifier, SentimentLabel, SentimentVerdict};
use async_trait::async_trait;
use std::collections::HashSet;

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "rally", "rallies", "surge", "surges", "gain", "gains", "profit", "growth",
    "beat", "beats", "upgrade", "upgraded", "outperform", "strong", "positive", "rise",
    "rises", "increase", "breakthrough", "record", "exceed", "exceeds", "momentum",
    "optimistic", "advance", "jump", "jumps", "soar", "soars", "dividend", "buyback",
    "repurchase", "upside", "recovery", "rebound", "expansion", "robust", "accelerating",
    "overweight", "raised", "tailwind",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "decline", "declines", "loss", "losses", "fall", "falls", "plunge",
    "plunges", "crash", "miss", "misses", "downgrade", "downgraded", "underperform", "weak",
    "negative", "drop", "drops", "decrease", "concern", "concerns", "fail", "fails",
    "disappoint", "disappoints", "slump", "warning", "pessimistic", "retreat", "fear",
    "trouble", "dilution", "headwind", "lawsuit", "litigation", "recall", "investigation",
    "subpoena", "default", "bankruptcy", "layoff", "layoffs", "downside", "overvalued",
    "underweight", "lowered", "suspended", "fraud", "recession",
];

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't", "wasn't",
    "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly", "barely", "without",
];

/// A negation flips polarity for this many following words.
const NEGATION_WINDOW: usize = 3;

/// Deterministic word-list classifier, used when no model service is
/// configured.
///
/// Confidence grows with how one-sided the hits are: a headline with no
/// polar words is `neutral` at 0.5, a unanimous one approaches 1.0.
pub struct LexiconClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negation: HashSet<&'static str>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negation: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    /// (positive hits, negative hits) after negation handling.
    fn score(&self, text: &str) -> (usize, usize) {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"'))
            .filter(|w| !w.is_empty())
            .collect();

        let mut positive = 0;
        let mut negative = 0;
        let mut last_negation: Option<usize> = None;

        for (i, word) in words.iter().enumerate() {
            if self.negation.contains(*word) {
                last_negation = Some(i);
                continue;
            }
            let is_positive = self.positive.contains(*word);
            let is_negative = self.negative.contains(*word);
            if !is_positive && !is_negative {
                continue;
            }
            let negated = last_negation.map_or(false, |n| i - n <= NEGATION_WINDOW);
            if is_positive != negated {
                positive += 1;
            } else {
                negative += 1;
            }
        }

        (positive, negative)
    }

    pub fn verdict(&self, text: &str) -> Result<SentimentVerdict, PipelineError> {
        let (positive, negative) = self.score(text);
        let hits = positive + negative;
        if hits == 0 || positive == negative {
            return SentimentVerdict::new(SentimentLabel::Neutral, 0.5);
        }

        let margin = positive.abs_diff(negative) as f64 / hits as f64;
        let label = if positive > negative {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };
        SentimentVerdict::new(label, 0.5 + 0.5 * margin)
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentVerdict, PipelineError> {
        self.verdict(text)
    }

    fn backend_name(&self) -> &'static str {
        "lexicon"
    }
}
