use thiserror::Error;

/// Errors raised while analysing contract text
#[derive(Debug, Error)]
pub enum EngineError {
    /// Nothing left to analyse after extraction
    #[error("document contains no analysable text")]
    EmptyInput,

    /// The inference endpoint could not be reached or returned an error status
    #[error("inference request failed: {0}")]
    Inference(String),

    /// The inference endpoint answered with an unexpected payload
    #[error("unexpected inference response: {0}")]
    InvalidResponse(String),
}
