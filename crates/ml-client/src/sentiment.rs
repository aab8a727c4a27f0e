use analysis_core::{PipelineError, SentimentClassifier, SentimentLabel, SentimentVerdict};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MLError, MLResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentPrediction {
    pub label: String,
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub negative: f64,
    #[serde(default)]
    pub neutral: f64,
    pub confidence: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub predictions: Vec<SentimentPrediction>,
    #[serde(default)]
    pub processing_time_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
struct SentimentRequest {
    texts: Vec<String>,
    symbol: Option<String>,
    use_cache: bool,
}

/// HTTP client for the FinBERT sentiment service.
#[derive(Clone)]
pub struct SentimentClient {
    client: reqwest::Client,
    base_url: String,
}

impl SentimentClient {
    pub fn new(base_url: String, timeout: Duration) -> MLResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Predict sentiment for text(s)
    pub async fn predict(
        &self,
        texts: Vec<String>,
        symbol: Option<String>,
    ) -> MLResult<SentimentResponse> {
        let request = SentimentRequest {
            texts,
            symbol,
            use_cache: true,
        };

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MLError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        let result = response.json::<SentimentResponse>().await?;
        Ok(result)
    }
}

/// Turns the single-text response into a verdict.
fn verdict_from_response(response: SentimentResponse) -> MLResult<SentimentVerdict> {
    if response.predictions.len() != 1 {
        return Err(MLError::InvalidResponse(format!(
            "expected 1 prediction, got {}",
            response.predictions.len()
        )));
    }
    let prediction = &response.predictions[0];
    let label = SentimentLabel::parse(&prediction.label)
        .ok_or_else(|| MLError::InvalidResponse("prediction has an empty label".to_string()))?;

    SentimentVerdict::new(label, prediction.confidence)
        .map_err(|e| MLError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl SentimentClassifier for SentimentClient {
    async fn classify(&self, text: &str) -> Result<SentimentVerdict, PipelineError> {
        let response = self.predict(vec![text.to_string()], None).await?;
        tracing::debug!(
            "FinBERT classified headline in {:.1}ms",
            response.processing_time_ms
        );
        Ok(verdict_from_response(response)?)
    }

    fn backend_name(&self) -> &'static str {
        "finbert"
    }
}
