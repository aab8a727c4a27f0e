use async_trait::async_trait;
use std::sync::Arc;

use crate::{HistoryBar, PipelineError, RawNewsItem, SentimentVerdict, TickerInfo};

/// Text classifier producing a label and confidence for one headline.
///
/// Implementations are built once per process and shared across requests,
/// so they must be safe to call concurrently.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentVerdict, PipelineError>;

    fn backend_name(&self) -> &'static str;
}

/// Price history provider. Unknown tickers yield an empty vector.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn history(&self, ticker: &str, range: &str) -> Result<Vec<HistoryBar>, PipelineError>;
}

/// Raw news provider. Items are untyped and may be malformed.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn news(&self, ticker: &str) -> Result<Vec<RawNewsItem>, PipelineError>;
}

/// Ticker metadata provider
#[async_trait]
pub trait InfoSource: Send + Sync {
    async fn info(&self, ticker: &str) -> Result<TickerInfo, PipelineError>;
}

#[async_trait]
impl<T: SentimentClassifier + ?Sized> SentimentClassifier for Arc<T> {
    async fn classify(&self, text: &str) -> Result<SentimentVerdict, PipelineError> {
        (**self).classify(text).await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

#[async_trait]
impl<T: HistorySource + ?Sized> HistorySource for Arc<T> {
    async fn history(&self, ticker: &str, range: &str) -> Result<Vec<HistoryBar>, PipelineError> {
        (**self).history(ticker, range).await
    }
}

#[async_trait]
impl<T: NewsSource + ?Sized> NewsSource for Arc<T> {
    async fn news(&self, ticker: &str) -> Result<Vec<RawNewsItem>, PipelineError> {
        (**self).news(ticker).await
    }
}

#[async_trait]
impl<T: InfoSource + ?Sized> InfoSource for Arc<T> {
    async fn info(&self, ticker: &str) -> Result<TickerInfo, PipelineError> {
        (**self).info(ticker).await
    }
}
