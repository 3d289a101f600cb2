use std::fmt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lb_engine::{BackendInit, LoadOptions, ModelMetadata, RuntimeLoader};

use crate::error::{Result, SessionError};
use crate::params::GenerateParams;
use crate::registry::{Handle, SessionRegistry};
use crate::session::Session;

/// Human-readable description of a loaded session, in the format the
/// boundary's info operation reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub handle: Handle,
    pub metadata: ModelMetadata,
}

impl fmt::Display for SessionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Information:")?;
        writeln!(f, "Handle: {}", self.handle)?;
        writeln!(f, "Vocabulary size: {}", self.metadata.vocab_size)?;
        writeln!(f, "Context size: {}", self.metadata.context_size)?;
        writeln!(f, "Embedding size: {}", self.metadata.embedding_dim)?;
        writeln!(f, "Model type: {}", self.metadata.architecture)?;
        write!(f, "Status: Loaded and ready")
    }
}

/// The session lifecycle manager: loader + backend-init guard + registry,
/// with an explicit lifetime (process-wide in production, fixture-scoped
/// in tests). All operations are synchronous and caller-blocking.
pub struct ModelService {
    loader: Box<dyn RuntimeLoader>,
    backend: BackendInit,
    registry: SessionRegistry,
}

impl ModelService {
    pub fn new(loader: Box<dyn RuntimeLoader>) -> Self {
        ModelService {
            loader,
            backend: BackendInit::new(),
            registry: SessionRegistry::new(),
        }
    }

    /// Load a model and create a session for it.
    ///
    /// Backend initialization runs on the first load; if it fails, that
    /// failure is sticky and every later load reports it too.
    pub fn load(&self, path: &Path, opts: LoadOptions) -> Result<Handle> {
        if path.as_os_str().is_empty() {
            return Err(SessionError::InvalidPath);
        }

        self.backend
            .ensure(self.loader.as_ref())
            .map_err(SessionError::BackendInit)?;

        let runtime = self
            .loader
            .load(path, &opts)
            .map_err(SessionError::ModelLoad)?;
        let handle = self.registry.insert(Session::new(runtime, opts.seed));
        tracing::info!(handle, path = %path.display(), context_size = opts.context_size, "model loaded");
        Ok(handle)
    }

    /// Run one generation call against a session.
    pub fn generate(&self, handle: Handle, prompt: &str, params: &GenerateParams) -> Result<String> {
        let session = self.registry.get(handle).ok_or(SessionError::InvalidHandle)?;
        let mut session = lock_session(&session);
        session.generate(prompt, params)
    }

    /// Metadata for a live session.
    pub fn info(&self, handle: Handle) -> Result<SessionInfo> {
        let session = self.registry.get(handle).ok_or(SessionError::InvalidHandle)?;
        let metadata = lock_session(&session).metadata();
        Ok(SessionInfo { handle, metadata })
    }

    /// Destroy a session, releasing its model and context. Unknown or
    /// already-destroyed handles are a silent no-op; this never fails.
    pub fn destroy(&self, handle: Handle) {
        if self.registry.remove(handle) {
            tracing::info!(handle, "session destroyed");
        }
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }
}

fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
