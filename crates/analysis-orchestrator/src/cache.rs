use analysis_core::{
    HistoryBar, HistorySource, InfoSource, NewsSource, PipelineError, RawNewsItem, TickerInfo,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// TTL cache in front of a data source.
///
/// Only successful fetches are stored. A zero TTL turns the wrapper into a
/// pass-through.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    history_cache: DashMap<String, CacheEntry<Vec<HistoryBar>>>,
    news_cache: DashMap<String, CacheEntry<Vec<RawNewsItem>>>,
    info_cache: DashMap<String, CacheEntry<TickerInfo>>,
}

fn lookup<T: Clone>(
    cache: &DashMap<String, CacheEntry<T>>,
    key: &str,
    ttl: Duration,
) -> Option<T> {
    let entry = cache.get(key)?;
    if is_fresh(entry.value(), ttl) {
        Some(entry.data.clone())
    } else {
        None
    }
}

fn is_fresh<T>(entry: &CacheEntry<T>, ttl: Duration) -> bool {
    // A clock step backwards gives a negative age; keep the entry.
    (Utc::now() - entry.cached_at).to_std().unwrap_or_default() < ttl
}

/// Inserts `data` and sweeps expired entries so the map only holds live
/// tickers.
fn store<T>(cache: &DashMap<String, CacheEntry<T>>, key: String, data: T, ttl: Duration) {
    cache.retain(|_, entry| is_fresh(entry, ttl));
    cache.insert(
        key,
        CacheEntry {
            data,
            cached_at: Utc::now(),
        },
    );
}

impl<S> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            history_cache: DashMap::new(),
            news_cache: DashMap::new(),
            info_cache: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Drop every cached entry for one ticker.
    pub fn invalidate(&self, ticker: &str) {
        let prefix = format!("{}:", ticker);
        self.history_cache.retain(|key, _| !key.starts_with(&prefix));
        self.news_cache.remove(ticker);
        self.info_cache.remove(ticker);
    }
}

#[async_trait]
impl<S: HistorySource> HistorySource for CachedSource<S> {
    async fn history(&self, ticker: &str, range: &str) -> Result<Vec<HistoryBar>, PipelineError> {
        if !self.enabled() {
            return self.inner.history(ticker, range).await;
        }

        let key = format!("{}:{}", ticker, range);
        if let Some(bars) = lookup(&self.history_cache, &key, self.ttl) {
            tracing::debug!("history cache hit for {}", key);
            return Ok(bars);
        }

        let bars = self.inner.history(ticker, range).await?;
        store(&self.history_cache, key, bars.clone(), self.ttl);
        Ok(bars)
    }
}

#[async_trait]
impl<S: NewsSource> NewsSource for CachedSource<S> {
    async fn news(&self, ticker: &str) -> Result<Vec<RawNewsItem>, PipelineError> {
        if !self.enabled() {
            return self.inner.news(ticker).await;
        }

        if let Some(items) = lookup(&self.news_cache, ticker, self.ttl) {
            tracing::debug!("news cache hit for {}", ticker);
            return Ok(items);
        }

        let items = self.inner.news(ticker).await?;
        store(&self.news_cache, ticker.to_string(), items.clone(), self.ttl);
        Ok(items)
    }
}

#[async_trait]
impl<S: InfoSource> InfoSource for CachedSource<S> {
    async fn info(&self, ticker: &str) -> Result<TickerInfo, PipelineError> {
        if !self.enabled() {
            return self.inner.info(ticker).await;
        }

        if let Some(info) = lookup(&self.info_cache, ticker, self.ttl) {
            return Ok(info);
        }

        let info = self.inner.info(ticker).await?;
        store(&self.info_cache, ticker.to_string(), info.clone(), self.ttl);
        Ok(info)
    }
}
