//! Error types for ChatPulse

use thiserror::Error;

use crate::formula::FormulaError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
