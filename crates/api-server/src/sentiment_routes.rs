//! Sentiment Routes
//!
//! `GET /api/sentiment/:symbol` runs the full pipeline for one ticker.

use analysis_core::{AnalysisOutcome, HeadlineResult, LabelCounts, PriceSummary};
use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ApiResponse, AppError, AppState, RequestId};

/// One headline as shown to the user
#[derive(Debug, Serialize)]
pub struct HeadlineEntry {
    pub title: String,
    pub url: String,
    pub label: String,
    /// Model confidence, 0.0 to 1.0
    pub confidence: f64,
}

impl From<&HeadlineResult> for HeadlineEntry {
    fn from(result: &HeadlineResult) -> Self {
        Self {
            title: result.headline().text().to_string(),
            url: result.headline().link().to_string(),
            label: result.verdict().label().to_string(),
            confidence: result.verdict().confidence(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SentimentResponse {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub classifier: String,
    pub summary: String,
    pub total_headlines: usize,
    /// Every configured label in label-set order, zero counts included.
    pub counts: LabelCounts,
    pub dominant_label: Option<String>,
    pub mean_confidence: Option<f64>,
    pub top_headlines: Vec<HeadlineEntry>,
    pub price: PriceSummary,
    pub percent_change: Option<f64>,
}

impl SentimentResponse {
    fn new(outcome: AnalysisOutcome, summary: String, classifier: &str) -> Self {
        let report = &outcome.report;
        Self {
            symbol: report.ticker().to_string(),
            generated_at: report.generated_at(),
            classifier: classifier.to_string(),
            summary,
            total_headlines: report.total(),
            counts: report.counts().clone(),
            dominant_label: report.dominant_label().map(|l| l.to_string()),
            mean_confidence: report.mean_confidence(),
            top_headlines: report.top_headlines().iter().map(HeadlineEntry::from).collect(),
            percent_change: outcome.price.percent_change(),
            price: outcome.price,
        }
    }
}

pub fn sentiment_routes() -> Router<AppState> {
    Router::new().route("/api/sentiment/:symbol", get(get_sentiment))
}

async fn get_sentiment(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<SentimentResponse>>, AppError> {
    tracing::info!(request_id = %request_id.0, "Sentiment requested for {}", symbol);

    let outcome = state.pipeline.analyze_ticker(&symbol).await?;
    let controller = state.pipeline.controller();
    let summary = controller.aggregator().describe(&outcome.report);

    Ok(Json(ApiResponse::success(SentimentResponse::new(
        outcome,
        summary,
        controller.classifier_name(),
    ))))
}
