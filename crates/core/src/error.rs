use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parsing error: {0}")]
    Parse(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Worker pool error: {0}")]
    Pool(#[from] pathctx_pool::PoolError),
    #[error("Malformed record: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
