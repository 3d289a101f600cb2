use lb_engine::EngineError;
use thiserror::Error;

/// Failure taxonomy of the session layer. Every variant's `Display` string
/// is what a boundary adapter reports after its `"Error: "` prefix, so the
/// wording here is caller-facing.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid handle")]
    InvalidHandle,
    #[error("Model path is empty")]
    InvalidPath,
    #[error("Empty prompt")]
    EmptyPrompt,
    #[error("Prompt too long: {got} tokens exceeds the limit of {limit}")]
    PromptTooLong { got: usize, limit: usize },
    #[error("Backend initialization failed: {0}")]
    BackendInit(#[source] EngineError),
    #[error("Failed to load model: {0}")]
    ModelLoad(#[source] EngineError),
    #[error("Tokenization failed: {0}")]
    Tokenization(#[source] EngineError),
    #[error("Failed to decode prompt: {0}")]
    PromptDecode(#[source] EngineError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
