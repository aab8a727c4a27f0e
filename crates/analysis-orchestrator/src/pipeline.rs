use analysis_core::{
    AnalysisOutcome, HistorySource, InfoSource, NewsSource, PipelineError, SentimentClassifier,
};
use std::sync::Arc;
use std::time::Duration;
use yahoo_client::YahooFinanceClient;

use crate::cache::CachedSource;
use crate::config::PipelineConfig;
use crate::controller::{normalize_ticker, PipelineController};

/// Fetches history, news and info for a ticker and hands them to the
/// [`PipelineController`].
pub struct SentimentPipeline {
    history: Arc<dyn HistorySource>,
    news: Arc<dyn NewsSource>,
    info: Arc<dyn InfoSource>,
    controller: PipelineController,
    history_range: String,
    deadline: Option<Duration>,
}

impl SentimentPipeline {
    pub fn new(
        history: Arc<dyn HistorySource>,
        news: Arc<dyn NewsSource>,
        info: Arc<dyn InfoSource>,
        controller: PipelineController,
    ) -> Self {
        Self {
            history,
            news,
            info,
            controller,
            history_range: "1mo".to_string(),
            deadline: None,
        }
    }

    /// Yahoo-backed pipeline. All three collaborators share one cached client.
    pub fn from_config(
        config: &PipelineConfig,
        classifier: Arc<dyn SentimentClassifier>,
    ) -> Result<Self, PipelineError> {
        let yahoo = YahooFinanceClient::new(config.news_count, config.fetch_timeout)?;
        let source = Arc::new(CachedSource::new(yahoo, config.cache_ttl));
        let controller = PipelineController::from_config(config, classifier);

        let mut pipeline = Self::new(source.clone(), source.clone(), source, controller)
            .with_history_range(config.history_range.clone());
        pipeline.deadline = config.deadline;
        Ok(pipeline)
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_history_range(mut self, range: impl Into<String>) -> Self {
        self.history_range = range.into();
        self
    }

    pub fn controller(&self) -> &PipelineController {
        &self.controller
    }

    pub async fn analyze_ticker(&self, ticker: &str) -> Result<AnalysisOutcome, PipelineError> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.analyze_inner(ticker))
                .await
                .map_err(|_| PipelineError::DeadlineExceeded(deadline))?,
            None => self.analyze_inner(ticker).await,
        }
    }

    async fn analyze_inner(&self, ticker: &str) -> Result<AnalysisOutcome, PipelineError> {
        let ticker = normalize_ticker(ticker)?;
        tracing::info!("Fetching market data for {}", ticker);

        let (history, news) = tokio::join!(
            self.history.history(&ticker, &self.history_range),
            self.news.news(&ticker),
        );

        let history = history.map_err(|e| {
            tracing::warn!("History fetch failed for {}: {}", ticker, e);
            e
        })?;
        // An unknown ticker is reported as such even if the news fetch failed too.
        crate::price::validate_history(&ticker, &history)?;

        let news = news.map_err(|e| {
            tracing::warn!("News fetch failed for {}: {}", ticker, e);
            e
        })?;
        // Fetched after history so chart-backed sources can answer from the
        // chart they just loaded.
        let info = self.info.info(&ticker).await.map_err(|e| {
            tracing::warn!("Info fetch failed for {}: {}", ticker, e);
            e
        })?;

        self.controller.run(&ticker, &history, &news, &info).await
    }
}
