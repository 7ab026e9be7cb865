//! FILENAME: core/rollup-engine/src/error.rs

use table_source::LoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine has already started loading its dataset")]
    AlreadyLoaded,

    #[error("Load failed: {0}")]
    Load(#[from] LoadError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing configuration: {0}")]
    Missing(String),
}
