use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::session::Session;

/// Opaque session identifier handed across the boundary.
pub type Handle = i64;

/// Reserved "no session" sentinel. Never issued.
pub const INVALID_HANDLE: Handle = 0;

struct Inner {
    sessions: HashMap<Handle, Arc<Mutex<Session>>>,
    next_handle: Handle,
}

/// Thread-safe mapping from handles to live sessions.
///
/// Handles are issued monotonically starting at 1 and never reused, so a
/// stale handle can only ever miss; it can never alias a newer session.
/// The registry lock is held only for map operations. Callers receive a
/// cloned `Arc` whose own mutex serializes calls against one session,
/// while calls against different handles proceed independently.
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry {
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                next_handle: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a session and return its newly issued handle.
    pub fn insert(&self, session: Session) -> Handle {
        let mut inner = self.lock();
        let handle = inner.next_handle;
        inner.next_handle += 1;
        inner.sessions.insert(handle, Arc::new(Mutex::new(session)));
        handle
    }

    /// Look up a live session. The returned `Arc` stays valid for the
    /// duration of the caller's use even if the handle is destroyed
    /// concurrently.
    pub fn get(&self, handle: Handle) -> Option<Arc<Mutex<Session>>> {
        self.lock().sessions.get(&handle).cloned()
    }

    /// Remove a session. Returns whether the handle was present; removing
    /// an unknown or already-destroyed handle is a silent no-op. The
    /// session itself is dropped after the registry lock is released, so
    /// engine teardown never blocks unrelated lookups.
    pub fn remove(&self, handle: Handle) -> bool {
        let removed = {
            let mut inner = self.lock();
            inner.sessions.remove(&handle)
        };
        removed.is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        SessionRegistry::new()
    }
}
