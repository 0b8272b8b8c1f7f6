use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, atomic::AtomicBool},
};

use crate::{lifecycle::SessionLifecycle, segment::Segment, state::SessionState};

/// A cheaply cloneable handle pairing one [`SessionLifecycle`] collaborator
/// with one [`SessionState`].
///
/// The session hands out [`Segment`]s by name and is the only path to the
/// underlying state: segments resolve their partitions through this handle
/// on every access, so writes through one segment are immediately visible
/// through any other handle to the same state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    lifecycle: Mutex<Box<dyn SessionLifecycle>>,
    state: Mutex<SessionState>,
    load_flags: Mutex<HashMap<String, Arc<AtomicBool>>>,
}

impl Session {
    #[must_use]
    pub fn new(lifecycle: impl SessionLifecycle) -> Self {
        Self::with_state(lifecycle, SessionState::new())
    }

    /// Build a session over previously persisted state, e.g. decoded with
    /// [`format::decode_state`](crate::format::decode_state).
    #[must_use]
    pub fn with_state(lifecycle: impl SessionLifecycle, state: SessionState) -> Self {
        Self {
            inner: Arc::new(Inner {
                lifecycle: Mutex::new(Box::new(lifecycle)),
                state: Mutex::new(state),
                load_flags: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Get the segment named `name`.
    ///
    /// Cheap and side-effect-free: the underlying store is not touched until
    /// the segment is first used. Repeated lookups of the same name share
    /// one loaded flag, so they behave as a single segment instance.
    #[must_use]
    pub fn segment(&self, name: &str) -> Segment {
        let loaded = lock(&self.inner.load_flags)
            .entry(name.to_owned())
            .or_default()
            .clone();

        Segment::new(self.clone(), Arc::from(name), loaded)
    }

    /// True if a session is already active for the current request.
    #[must_use]
    pub fn is_started(&self) -> bool {
        lock(&self.inner.lifecycle).is_started()
    }

    /// Promote flash values staged by the previous request: `flash_next`
    /// becomes `flash_now`, and `flash_next` starts empty.
    ///
    /// Segments never rotate on their own. The surrounding per-request
    /// initialization is expected to call this exactly once, after resuming
    /// the session and before handlers run.
    pub fn rotate_flash(&self) {
        lock(&self.inner.state).rotate_flash();
    }

    /// Snapshot the current state, e.g. for persistence at end of request.
    #[must_use]
    pub fn state(&self) -> SessionState {
        lock(&self.inner.state).clone()
    }

    /// Replace the current state wholesale, e.g. after the lifecycle
    /// collaborator has fetched persisted state during `resume`.
    pub fn set_state(&self, state: SessionState) {
        *lock(&self.inner.state) = state;
    }

    pub(crate) fn resume(&self) -> bool {
        lock(&self.inner.lifecycle).resume()
    }

    pub(crate) fn start(&self) {
        lock(&self.inner.lifecycle).start();
    }

    pub(crate) fn with_state_mut<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut lock(&self.inner.state))
    }
}

// Segment operations have no error channel, so a poisoned lock is recovered
// rather than surfaced: the state is plain data and stays structurally valid.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
