use kernelwalk_backend::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("GPU Error: {0}")]
    Backend(#[from] BackendError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Config(String),
    #[error("Unknown demo: {0}")]
    UnknownDemo(String),
}

pub type DemoResult<T> = Result<T, DemoError>;
