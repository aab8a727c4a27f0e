use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The history source returned nothing for the ticker.
    #[error("No data found for {0}")]
    NoData(String),

    /// Fewer than two history points, so no price delta can be derived.
    #[error("Insufficient history for {ticker}: {points} data point(s), need at least 2")]
    InsufficientHistory { ticker: String, points: usize },

    #[error("Classifier failure: {0}")]
    ClassifierFailure(String),

    #[error("Upstream fetch error: {0}")]
    UpstreamFetch(String),

    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    #[error("Analysis exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Whether the same request could succeed if simply tried again later.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            PipelineError::UpstreamFetch(_)
                | PipelineError::ClassifierFailure(_)
                | PipelineError::DeadlineExceeded(_)
        )
    }

    /// Short message suitable for an end user.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::NoData(ticker) => format!(
                "Could not find data for {}. Please check the ticker symbol.",
                ticker
            ),
            PipelineError::InsufficientHistory { ticker, .. } => {
                format!("Insufficient price history for {} to compute a change.", ticker)
            }
            PipelineError::ClassifierFailure(_) => {
                "Sentiment model failed to classify a headline.".to_string()
            }
            PipelineError::UpstreamFetch(_) => "Market data provider is unavailable.".to_string(),
            PipelineError::InvalidTicker(_) => "Please enter a ticker symbol.".to_string(),
            PipelineError::DeadlineExceeded(_) => "Analysis timed out.".to_string(),
            PipelineError::Config(_) => "Service is misconfigured.".to_string(),
        }
    }
}
