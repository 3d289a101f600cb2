use std::sync::OnceLock;

use crate::error::{EngineError, Result};
use crate::runtime::RuntimeLoader;

/// One-time backend initialization guard.
///
/// The first caller runs the loader's `init_backend`; every later caller
/// (from any thread) observes the recorded outcome without re-running it.
/// A failed initialization is sticky: all subsequent loads fail with the
/// same message. The guard carries its own synchronization, so contention
/// here never blocks session-registry operations.
pub struct BackendInit {
    state: OnceLock<std::result::Result<(), String>>,
}

impl BackendInit {
    pub const fn new() -> Self {
        BackendInit {
            state: OnceLock::new(),
        }
    }

    /// Ensure the backend is initialized, running `init_backend` at most
    /// once per guard.
    pub fn ensure(&self, loader: &dyn RuntimeLoader) -> Result<()> {
        let outcome = self.state.get_or_init(|| {
            tracing::info!("initializing inference backend");
            loader.init_backend().map_err(|e| e.to_string())
        });
        outcome
            .clone()
            .map_err(EngineError::BackendInit)
    }

    /// Whether initialization has been attempted (successfully or not).
    pub fn attempted(&self) -> bool {
        self.state.get().is_some()
    }
}

impl Default for BackendInit {
    fn default() -> Self {
        BackendInit::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubLoader;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingLoader {
        calls: Arc<AtomicUsize>,
        fail: bool,
        inner: StubLoader,
    }

    impl RuntimeLoader for CountingLoader {
        fn init_backend(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(EngineError::Other("boom".into()))
            } else {
                Ok(())
            }
        }

        fn load(
            &self,
            path: &std::path::Path,
            opts: &crate::LoadOptions,
        ) -> Result<Box<dyn crate::ModelRuntime>> {
            self.inner.load(path, opts)
        }
    }

    #[test]
    fn test_init_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = CountingLoader {
            calls: calls.clone(),
            fail: false,
            inner: StubLoader::new(),
        };
        let guard = BackendInit::new();
        assert!(guard.ensure(&loader).is_ok());
        assert!(guard.ensure(&loader).is_ok());
        assert!(guard.ensure(&loader).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_sticky() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = CountingLoader {
            calls: calls.clone(),
            fail: true,
            inner: StubLoader::new(),
        };
        let guard = BackendInit::new();
        assert!(guard.ensure(&loader).is_err());
        assert!(guard.ensure(&loader).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_ensure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = Arc::new(CountingLoader {
            calls: calls.clone(),
            fail: false,
            inner: StubLoader::new(),
        });
        let guard = Arc::new(BackendInit::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                let loader = loader.clone();
                std::thread::spawn(move || guard.ensure(loader.as_ref()).is_ok())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
