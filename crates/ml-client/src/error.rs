use analysis_core::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MLError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type MLResult<T> = Result<T, MLError>;

impl From<MLError> for PipelineError {
    fn from(err: MLError) -> Self {
        PipelineError::ClassifierFailure(err.to_string())
    }
}
