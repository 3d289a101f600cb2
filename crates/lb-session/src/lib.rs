//! Session lifecycle and the per-call generation pipeline.
//!
//! A [`ModelService`] owns the session registry, the backend-init guard,
//! and the engine loader; boundary adapters wrap its Result-based API
//! into whatever failure signaling their caller needs.

pub mod error;
pub mod params;
pub mod registry;
pub mod service;
pub mod session;

pub use error::{Result, SessionError};
pub use params::GenerateParams;
pub use registry::{Handle, SessionRegistry, INVALID_HANDLE};
pub use service::{ModelService, SessionInfo};
pub use session::Session;
