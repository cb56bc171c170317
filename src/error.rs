use crate::models::operation::MoveOperation;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Gemini API key is not configured")]
    Configuration,

    #[error("Service call failed: {0}")]
    ServiceCall(String),

    #[error("No text found in model response")]
    ResponseFormat,

    #[error("Model response produced no groups")]
    EmptyResult,

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// Apply aborted mid-way. `completed` holds the operations recorded
    /// before the failure so the caller can still undo them.
    #[error("move failed: {reason}")]
    Move {
        reason: String,
        completed: Vec<MoveOperation>,
    },
}
