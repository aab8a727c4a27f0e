//! Headline sentiment pipeline stages: normalize raw news, classify each
//! headline, tally the verdicts.

pub mod aggregator;
pub mod analyzer;
pub mod lexicon;
pub mod normalizer;

pub use aggregator::SentimentAggregator;
pub use analyzer::HeadlineAnalyzer;
pub use lexicon::LexiconClassifier;
pub use normalizer::NewsNormalizer;
