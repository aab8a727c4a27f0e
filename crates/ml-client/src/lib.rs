pub mod error;
pub mod sentiment;

pub use error::{MLError, MLResult};
pub use sentiment::{SentimentClient, SentimentPrediction, SentimentResponse};

use std::time::Duration;

/// Connection settings for the FinBERT sentiment service
#[derive(Debug, Clone)]
pub struct MLConfig {
    pub sentiment_url: String,
    pub timeout: Duration,
}

impl MLConfig {
    pub fn connect(&self) -> MLResult<SentimentClient> {
        SentimentClient::new(self.sentiment_url.clone(), self.timeout)
    }
}
