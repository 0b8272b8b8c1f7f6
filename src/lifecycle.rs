use std::fmt::Debug;

/// The session lifecycle collaborator a [`Session`](crate::Session) drives.
///
/// Implementations own cookie/ID handling, expiry, and storage backends.
/// Segments only ever need these three operations to decide whether and when
/// backing storage becomes available.
pub trait SessionLifecycle: Debug + Send + 'static {
    /// True if a session is already active for the current request.
    fn is_started(&self) -> bool;

    /// Attempt to reattach to a previously created session (for example via
    /// a client-supplied identifier). Must be idempotent and safe to call
    /// when a session is already started; returns whether a session is
    /// active afterwards.
    fn resume(&mut self) -> bool;

    /// Unconditionally start a new session, creating storage if necessary.
    /// Callers assume this cannot fail observably.
    fn start(&mut self);
}

/// A process-local lifecycle with no backend, useful for tests and for
/// applications that only need request-scoped segmented state.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryLifecycle {
    started: bool,
    resumable: bool,
}

impl InMemoryLifecycle {
    /// A fresh lifecycle: nothing to resume until `start` is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A lifecycle that behaves as if the client presented a valid session
    /// identifier, so the first `resume` succeeds.
    #[must_use]
    pub fn resumable() -> Self {
        Self {
            started: false,
            resumable: true,
        }
    }
}

impl SessionLifecycle for InMemoryLifecycle {
    fn is_started(&self) -> bool {
        self.started
    }

    fn resume(&mut self) -> bool {
        if self.resumable {
            self.started = true;
        }
        self.started
    }

    fn start(&mut self) {
        self.started = true;
    }
}
