use analysis_core::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::ApiResponse;

/// Pipeline errors rendered as the JSON error envelope.
#[derive(Debug)]
pub struct AppError(pub PipelineError);

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PipelineError::NoData(_) => StatusCode::NOT_FOUND,
            PipelineError::InsufficientHistory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::InvalidTicker(_) => StatusCode::BAD_REQUEST,
            PipelineError::UpstreamFetch(_) | PipelineError::ClassifierFailure(_) => {
                StatusCode::BAD_GATEWAY
            }
            PipelineError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        } else {
            tracing::debug!("{}", self.0);
        }

        let body: ApiResponse<()> = ApiResponse::failure(self.0.user_message(), self.0.is_retriable());
        (status, Json(body)).into_response()
    }
}
