pub mod backend;
pub mod error;
pub mod options;
pub mod runtime;
pub mod stub;

pub use backend::BackendInit;
pub use error::{EngineError, Result};
pub use options::LoadOptions;
pub use runtime::{DecodeBatch, ModelMetadata, ModelRuntime, RuntimeLoader, TokenId};
