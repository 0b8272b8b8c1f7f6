#![allow(dead_code)]

// Shared helpers for integration tests.
//
// `CountingLifecycle` wraps any lifecycle and counts calls through the
// three-operation seam, so tests can assert that the lazy-load gate runs at
// most once per segment and that reads never start sessions.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use session_segment::SessionLifecycle;

#[derive(Debug, Default)]
pub struct LifecycleCalls {
    is_started: AtomicUsize,
    resume: AtomicUsize,
    start: AtomicUsize,
}

impl LifecycleCalls {
    pub fn is_started_calls(&self) -> usize {
        self.is_started.load(Ordering::Relaxed)
    }

    pub fn resume_calls(&self) -> usize {
        self.resume.load(Ordering::Relaxed)
    }

    pub fn start_calls(&self) -> usize {
        self.start.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct CountingLifecycle<L> {
    inner: L,
    calls: Arc<LifecycleCalls>,
}

impl<L: SessionLifecycle> CountingLifecycle<L> {
    pub fn new(inner: L) -> (Self, Arc<LifecycleCalls>) {
        let calls = Arc::new(LifecycleCalls::default());
        let lifecycle = Self {
            inner,
            calls: calls.clone(),
        };
        (lifecycle, calls)
    }
}

impl<L: SessionLifecycle> SessionLifecycle for CountingLifecycle<L> {
    fn is_started(&self) -> bool {
        self.calls.is_started.fetch_add(1, Ordering::Relaxed);
        self.inner.is_started()
    }

    fn resume(&mut self) -> bool {
        self.calls.resume.fetch_add(1, Ordering::Relaxed);
        self.inner.resume()
    }

    fn start(&mut self) {
        self.calls.start.fetch_add(1, Ordering::Relaxed);
        self.inner.start();
    }
}
