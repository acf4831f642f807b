use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;

/// Error type shared by the lifecycle, storage, and controller layers.
#[derive(Debug, Error)]
pub enum ConscienceError {
    #[error("Analysis failed: {0}")]
    AnalysisFailure(String),
    #[error("Audio generation failed: {0}")]
    AudioGenerationFailure(String),
    #[error("Receipt could not be parsed: {0}")]
    ReceiptParseFailure(String),
    #[error("Persistence error: {0}")]
    PersistenceFailure(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ConscienceError>;

impl From<std::io::Error> for ConscienceError {
    fn from(err: std::io::Error) -> Self {
        ConscienceError::PersistenceFailure(err.to_string())
    }
}

impl From<serde_json::Error> for ConscienceError {
    fn from(err: serde_json::Error) -> Self {
        ConscienceError::PersistenceFailure(err.to_string())
    }
}

impl From<GatewayError> for ConscienceError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::AnalysisFailure(message) => ConscienceError::AnalysisFailure(message),
            GatewayError::AudioGenerationFailure(message) => {
                ConscienceError::AudioGenerationFailure(message)
            }
            GatewayError::ReceiptParseFailure(message) => {
                ConscienceError::ReceiptParseFailure(message)
            }
        }
    }
}
