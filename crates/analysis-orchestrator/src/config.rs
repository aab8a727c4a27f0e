use analysis_core::{LabelSet, SentimentClassifier, DEFAULT_DISPLAY_LIMIT};
use anyhow::{anyhow, Context, Result};
use ml_client::MLConfig;
use sentiment_analysis::LexiconClassifier;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    /// FinBERT behind the ML sentiment service
    FinBert,
    /// Built-in word lists, no network
    Lexicon,
}

impl FromStr for ClassifierBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "finbert" | "ml" => Ok(ClassifierBackend::FinBert),
            "lexicon" | "wordlist" => Ok(ClassifierBackend::Lexicon),
            other => Err(anyhow!("unknown SENTIMENT_BACKEND '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub classifier_backend: ClassifierBackend,
    pub ml: MLConfig,
    pub labels: LabelSet,
    pub display_limit: usize,
    pub classifier_concurrency: usize,
    /// Zero disables the fetch cache.
    pub cache_ttl: Duration,
    /// Yahoo chart range, e.g. `1mo`
    pub history_range: String,
    pub news_count: usize,
    pub fetch_timeout: Duration,
    pub deadline: Option<Duration>,
    pub relevance_filter: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classifier_backend: ClassifierBackend::FinBert,
            ml: MLConfig {
                sentiment_url: "http://localhost:8001".to_string(),
                timeout: Duration::from_secs(10),
            },
            labels: LabelSet::default(),
            display_limit: DEFAULT_DISPLAY_LIMIT,
            classifier_concurrency: 1,
            cache_ttl: Duration::from_secs(600),
            history_range: "1mo".to_string(),
            news_count: 20,
            fetch_timeout: Duration::from_secs(15),
            deadline: None,
            relevance_filter: false,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{}={:?}: {}", name, raw, e)),
        _ => Ok(default),
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let labels = match env::var("SENTIMENT_LABELS") {
            Ok(raw) => LabelSet::from_csv(&raw).context("SENTIMENT_LABELS")?,
            Err(_) => defaults.labels,
        };

        let deadline_secs: u64 = parse_var("ANALYSIS_DEADLINE_SECS", 0)?;

        let config = Self {
            classifier_backend: parse_var("SENTIMENT_BACKEND", defaults.classifier_backend)?,
            ml: MLConfig {
                sentiment_url: env::var("ML_SENTIMENT_URL").unwrap_or(defaults.ml.sentiment_url),
                timeout: Duration::from_secs(parse_var("ML_TIMEOUT_SECS", defaults.ml.timeout.as_secs())?),
            },
            labels,
            display_limit: parse_var("HEADLINE_DISPLAY_LIMIT", defaults.display_limit)?,
            classifier_concurrency: parse_var("CLASSIFIER_CONCURRENCY", defaults.classifier_concurrency)?,
            cache_ttl: Duration::from_secs(parse_var("FETCH_CACHE_TTL_SECS", defaults.cache_ttl.as_secs())?),
            history_range: env::var("HISTORY_RANGE").unwrap_or(defaults.history_range),
            news_count: parse_var("NEWS_COUNT", defaults.news_count)?,
            fetch_timeout: Duration::from_secs(parse_var("FETCH_TIMEOUT_SECS", defaults.fetch_timeout.as_secs())?),
            deadline: (deadline_secs > 0).then(|| Duration::from_secs(deadline_secs)),
            relevance_filter: parse_var("NEWS_RELEVANCE_FILTER", defaults.relevance_filter)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.display_limit == 0 {
            return Err(anyhow!("HEADLINE_DISPLAY_LIMIT must be at least 1"));
        }
        if self.classifier_concurrency == 0 {
            return Err(anyhow!("CLASSIFIER_CONCURRENCY must be at least 1"));
        }
        if self.history_range.trim().is_empty() {
            return Err(anyhow!("HISTORY_RANGE must not be empty"));
        }
        Ok(())
    }

    /// Builds the process-wide classifier. Call once at startup and share
    /// the returned handle.
    pub fn build_classifier(&self) -> Result<Arc<dyn SentimentClassifier>> {
        match self.classifier_backend {
            ClassifierBackend::FinBert => {
                let client = self
                    .ml
                    .connect()
                    .context("failed to build FinBERT sentiment client")?;
                tracing::info!("Using FinBERT sentiment service at {}", client.base_url());
                Ok(Arc::new(client))
            }
            ClassifierBackend::Lexicon => {
                tracing::info!("Using built-in lexicon sentiment classifier");
                Ok(Arc::new(LexiconClassifier::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!("FinBERT".parse::<ClassifierBackend>().unwrap(), ClassifierBackend::FinBert);
        assert_eq!("lexicon".parse::<ClassifierBackend>().unwrap(), ClassifierBackend::Lexicon);
        assert!("gpt".parse::<ClassifierBackend>().is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.display_limit, 10);
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.labels.len(), 3);
    }

    #[test]
    fn test_zero_display_limit_rejected() {
        let config = PipelineConfig { display_limit: 0, ..PipelineConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lexicon_backend_builds_offline() {
        let config = PipelineConfig {
            classifier_backend: ClassifierBackend::Lexicon,
            ..PipelineConfig::default()
        };
        assert_eq!(config.build_classifier().unwrap().backend_name(), "lexicon");
    }
}
