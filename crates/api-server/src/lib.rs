//! HTTP front end for the headline sentiment pipeline.

mod error;
mod request_id;
mod sentiment_routes;

pub use error::AppError;
pub use request_id::{request_id_middleware, RequestId};
pub use sentiment_routes::{HeadlineEntry, SentimentResponse};

use analysis_orchestrator::{PipelineConfig, SentimentPipeline};
use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SentimentPipeline>,
}

impl AppState {
    pub fn new(pipeline: SentimentPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Envelope shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// Set on failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retriable: Option<bool>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            retriable: None,
        }
    }

    pub fn failure(message: impl Into<String>, retriable: bool) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            retriable: Some(retriable),
        }
    }
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "classifier": state.pipeline.controller().classifier_name(),
    }))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .merge(sentiment_routes::sentiment_routes())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"))
    };
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = PipelineConfig::from_env().context("invalid pipeline configuration")?;
    let classifier = config.build_classifier()?;
    let pipeline = SentimentPipeline::from_config(&config, classifier)?;
    let app = router(AppState::new(pipeline));

    let addr = std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Sentiment API listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
