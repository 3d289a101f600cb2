use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend initialization failed: {0}")]
    BackendInit(String),
    #[error("model load failed: {0}")]
    ModelLoad(String),
    #[error("tokenization failed: {0}")]
    Tokenize(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("no logits available for the last decoded position")]
    NoLogits,
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
