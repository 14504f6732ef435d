use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the ledger, receipt and storage layers.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Receipt export failed: {0}")]
    ExportFailure(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, BudgetError>;

impl BudgetError {
    pub fn invalid(message: impl Into<String>) -> Self {
        BudgetError::InvalidInput(message.into())
    }
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}
