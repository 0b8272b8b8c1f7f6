use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{session::Session, state::Partition};

/// A named partition of session data with its own persistent values and two
/// flash buffers (current request and next request).
///
/// A segment is lazy: constructing one touches neither the store nor the
/// lifecycle collaborator. The first read attempts to resume an existing
/// session and falls back to defaults if none is available; the first write
/// resumes or, failing that, starts a new session. Consumers never need to
/// branch on session availability.
///
/// ```
/// use session_segment::{InMemoryLifecycle, Session};
///
/// let session = Session::new(InMemoryLifecycle::new());
/// let cart = session.segment("cart");
///
/// // No session yet: reads fall back without starting one.
/// assert_eq!(cart.get_or("qty", 0), 0);
/// assert!(!session.is_started());
///
/// // First write starts a session on demand.
/// cart.set("qty", 3);
/// assert!(session.is_started());
/// assert_eq!(cart.get_or("qty", 0), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Segment {
    session: Session,
    name: Arc<str>,
    loaded: Arc<AtomicBool>,
}

impl Segment {
    pub(crate) fn new(session: Session, name: Arc<str>, loaded: Arc<AtomicBool>) -> Self {
        Self {
            session,
            name,
            loaded,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read a persistent value.
    ///
    /// Returns `None` if no session is active or resumable, if the key is
    /// absent, or if the stored value does not deserialize as `T` (the
    /// mismatch is logged and the stored value is left untouched).
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read(Partition::Data, key)
    }

    /// Read a persistent value, falling back to `default`.
    #[must_use]
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Read a flash value visible for the current request.
    #[must_use]
    pub fn get_flash<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read(Partition::FlashNow, key)
    }

    /// Read a current-request flash value, falling back to `default`.
    #[must_use]
    pub fn get_flash_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_flash(key).unwrap_or(default)
    }

    /// Read a flash value staged for the next request.
    #[must_use]
    pub fn get_flash_next<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read(Partition::FlashNext, key)
    }

    /// Read a staged flash value, falling back to `default`.
    #[must_use]
    pub fn get_flash_next_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_flash_next(key).unwrap_or(default)
    }

    /// Write a persistent value, starting a session if none exists.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.resume_or_start_session();
        self.session.with_state_mut(|state| {
            state
                .values_mut(Partition::Data, &self.name)
                .insert(key.to_owned(), value.into());
        });
    }

    /// Stage a flash value for the next request, starting a session if none
    /// exists. The value is not visible to [`get_flash`](Self::get_flash)
    /// within this request.
    pub fn set_flash(&self, key: &str, value: impl Into<Value>) {
        self.resume_or_start_session();
        self.session.with_state_mut(|state| {
            state
                .values_mut(Partition::FlashNext, &self.name)
                .insert(key.to_owned(), value.into());
        });
    }

    /// Write a flash value visible immediately *and* staged for the next
    /// request, starting a session if none exists.
    pub fn set_flash_now(&self, key: &str, value: impl Into<Value>) {
        self.resume_or_start_session();
        let value = value.into();
        self.session.with_state_mut(|state| {
            state
                .values_mut(Partition::FlashNow, &self.name)
                .insert(key.to_owned(), value.clone());
            state
                .values_mut(Partition::FlashNext, &self.name)
                .insert(key.to_owned(), value);
        });
    }

    /// Empty this segment's persistent values. Flash buffers are untouched.
    /// No-op if no session is active or resumable.
    pub fn clear(&self) {
        self.clear_partitions(&[Partition::Data]);
    }

    /// Empty the flash values staged for the next request. No-op if no
    /// session is active or resumable.
    pub fn clear_flash(&self) {
        self.clear_partitions(&[Partition::FlashNext]);
    }

    /// Empty both flash buffers. Persistent values are untouched. No-op if
    /// no session is active or resumable.
    pub fn clear_flash_now(&self) {
        self.clear_partitions(&[Partition::FlashNow, Partition::FlashNext]);
    }

    /// Keep the current request's flash values flashing for the next request
    /// as well.
    ///
    /// Merges `flash_now` into `flash_next`; values already staged for the
    /// next request win on key collision. No-op if no session is active or
    /// resumable.
    pub fn keep_flash(&self) {
        if !self.resume_session() {
            return;
        }

        self.session.with_state_mut(|state| {
            let now = state
                .values(Partition::FlashNow, &self.name)
                .cloned()
                .unwrap_or_default();
            let next = state.values_mut(Partition::FlashNext, &self.name);
            for (key, value) in now {
                next.entry(key).or_insert(value);
            }
        });
    }

    fn read<T: DeserializeOwned>(&self, partition: Partition, key: &str) -> Option<T> {
        if !self.resume_session() {
            return None;
        }

        let value = self.session.with_state_mut(|state| {
            state
                .values(partition, &self.name)
                .and_then(|values| values.get(key).cloned())
        })?;

        match serde_json::from_value(value) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(segment = %self.name, key, err = %err, "session value failed to deserialize");
                None
            }
        }
    }

    fn clear_partitions(&self, partitions: &[Partition]) {
        if !self.resume_session() {
            return;
        }

        self.session.with_state_mut(|state| {
            for &partition in partitions {
                state.values_mut(partition, &self.name).clear();
            }
        });
    }

    // Read-only gate: bind to the store only if a session is already active
    // or can be resumed. Loaded is one-way, so a loaded segment never calls
    // back into the lifecycle.
    fn resume_session(&self) -> bool {
        if self.loaded.load(Ordering::Acquire) {
            return true;
        }

        if self.session.is_started() || self.session.resume() {
            self.load();
            return true;
        }

        false
    }

    // Read-write gate: resume if possible, otherwise start a new session.
    fn resume_or_start_session(&self) {
        if !self.resume_session() {
            self.session.start();
            self.load();
        }
    }

    fn load(&self) {
        self.session
            .with_state_mut(|state| state.materialize(&self.name));
        self.loaded.store(true, Ordering::Release);
    }
}
