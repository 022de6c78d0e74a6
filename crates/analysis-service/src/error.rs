//! Analysis error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Engine not available: {0}")]
    EngineUnavailable(String),

    #[error("Commentary error: {0}")]
    Commentary(String),

    #[error("Commentary model not available")]
    CommentaryUnavailable,
}
