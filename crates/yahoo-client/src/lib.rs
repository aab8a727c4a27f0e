//! Yahoo Finance adapter for the history, news and info collaborators.
//!
//! Unknown tickers are not errors here: the chart endpoint answers them with
//! an empty result, which callers see as an empty history.

use analysis_core::{
    HistoryBar, HistorySource, InfoSource, NewsSource, PipelineError, RawNewsItem, TickerInfo,
};
use async_trait::async_trait;
use chrono::DateTime;
use dashmap::DashMap;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const NEWS_URL: &str = "https://finance.yahoo.com/xhr/ncp?queryRef=latestNews&serviceKey=ncp_fin";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    news_count: usize,
    /// Chart `meta` from the latest history fetch, taken by the next `info`
    /// call for the same ticker.
    chart_meta: Arc<DashMap<String, TickerInfo>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewsServiceConfig<'a> {
    snippet_count: usize,
    s: [&'a str; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewsRequest<'a> {
    service_config: NewsServiceConfig<'a>,
}

/// Chart URL with the ticker as a single percent-encoded path segment.
fn chart_url(symbol: &str) -> Result<Url, PipelineError> {
    let mut url = Url::parse(CHART_URL).map_err(|e| PipelineError::Config(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| PipelineError::Config(format!("{} cannot take path segments", CHART_URL)))?
        .push(symbol);
    Ok(url)
}

impl YahooFinanceClient {
    pub fn new(news_count: usize, timeout: Duration) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to build Yahoo HTTP client: {}", e)))?;

        Ok(Self {
            client,
            news_count,
            chart_meta: Arc::new(DashMap::new()),
        })
    }

    async fn get_chart(&self, symbol: &str, range: &str) -> Result<Option<Value>, PipelineError> {
        let response = self
            .client
            .get(chart_url(symbol)?)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| PipelineError::UpstreamFetch(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Yahoo chart returned 404 for {}", symbol);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PipelineError::UpstreamFetch(format!(
                "Yahoo chart HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::UpstreamFetch(e.to_string()))?;
        Ok(first_chart_result(&json).cloned())
    }

    fn remember_meta(&self, ticker: &str, chart: &Value) {
        self.chart_meta.insert(ticker.to_string(), parse_chart_info(chart));
    }

    fn take_meta(&self, ticker: &str) -> Option<TickerInfo> {
        self.chart_meta.remove(ticker).map(|(_, info)| info)
    }
}

#[async_trait]
impl HistorySource for YahooFinanceClient {
    async fn history(&self, ticker: &str, range: &str) -> Result<Vec<HistoryBar>, PipelineError> {
        match self.get_chart(ticker, range).await? {
            Some(chart) => {
                let bars = parse_chart_history(&chart)?;
                if !bars.is_empty() {
                    self.remember_meta(ticker, &chart);
                }
                Ok(bars)
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Served from the preceding history fetch when there was one, otherwise
/// from a one-day chart request.
#[async_trait]
impl InfoSource for YahooFinanceClient {
    async fn info(&self, ticker: &str) -> Result<TickerInfo, PipelineError> {
        if let Some(info) = self.take_meta(ticker) {
            return Ok(info);
        }
        Ok(self
            .get_chart(ticker, "1d")
            .await?
            .map(|chart| parse_chart_info(&chart))
            .unwrap_or_default())
    }
}

#[async_trait]
impl NewsSource for YahooFinanceClient {
    async fn news(&self, ticker: &str) -> Result<Vec<RawNewsItem>, PipelineError> {
        let body = NewsRequest {
            service_config: NewsServiceConfig {
                snippet_count: self.news_count,
                s: [ticker],
            },
        };

        let response = self
            .client
            .post(NEWS_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::UpstreamFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::UpstreamFetch(format!(
                "Yahoo news HTTP {} for {}",
                response.status(),
                ticker
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::UpstreamFetch(e.to_string()))?;
        Ok(parse_news_stream(&json))
    }
}

fn first_chart_result(json: &Value) -> Option<&Value> {
    json.get("chart")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
}

/// Rows with a missing timestamp or any null price are skipped.
fn parse_chart_history(chart: &Value) -> Result<Vec<HistoryBar>, PipelineError> {
    let timestamps = match chart.get("timestamp").and_then(|v| v.as_array()) {
        Some(ts) => ts,
        None => return Ok(Vec::new()),
    };

    let quotes = chart
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| PipelineError::UpstreamFetch("chart has no quote block".to_string()))?;

    let series = |name: &str| -> Vec<Option<f64>> {
        quotes
            .get(name)
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(|v| v.as_f64()).collect())
            .unwrap_or_default()
    };
    let opens = series("open");
    let highs = series("high");
    let lows = series("low");
    let closes = series("close");
    let volumes = series("volume");

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        if let (Some(ts), Some(open), Some(high), Some(low), Some(close)) = (
            ts.as_i64(),
            at(&opens, i),
            at(&highs, i),
            at(&lows, i),
            at(&closes, i),
        ) {
            let timestamp = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
                PipelineError::UpstreamFetch(format!("invalid timestamp {}", ts))
            })?;
            bars.push(HistoryBar {
                timestamp,
                open,
                high,
                low,
                close,
                volume: at(&volumes, i).unwrap_or(0.0),
            });
        }
    }

    Ok(bars)
}

fn parse_chart_info(chart: &Value) -> TickerInfo {
    let meta = chart.get("meta");
    let field = |name: &str| {
        meta.and_then(|m| m.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    TickerInfo {
        currency: field("currency"),
        long_name: field("longName").or_else(|| field("shortName")),
        exchange: field("exchangeName"),
    }
}

fn parse_news_stream(json: &Value) -> Vec<RawNewsItem> {
    json.get("data")
        .and_then(|v| v.get("tickerStream"))
        .and_then(|v| v.get("stream"))
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}
