//! Recording output sink for unit and integration tests.
//!
//! # Why a recording sink?
//!
//! The real [`UinputSink`](super::uinput::UinputSink) needs write access to
//! `/dev/uinput` and injects real key presses into the running desktop.  The
//! `RecordingSink` replaces that with in-memory recording: every call is
//! pushed into a `Mutex<Vec<SinkCall>>` so tests can assert exactly what was
//! emitted and in what order.
//!
//! # Teardown semantics
//!
//! Teardown mirrors the real device: the first call releases it, later calls
//! are no-ops, and emits after release fail with
//! [`OutputError::TornDown`].  [`RecordingSink::releases`] counts actual
//! releases, so it stays at 1 however often teardown is called.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tourbox_core::{KeyCode, RelativeAxis};

use crate::application::dispatch_event::{OutputError, OutputSink};

/// One recorded sink call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCall {
    KeyTap(KeyCode),
    Relative(RelativeAxis, i32),
}

/// An output sink that records all calls without touching the OS.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    teardown_calls: AtomicUsize,
    released: AtomicBool,
    releases: AtomicUsize,
    /// When `true`, every emit returns `OutputError::Platform`.
    pub should_fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose emits always fail.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of all successful emits, in order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().clone()
    }

    /// Number of times `teardown` was invoked.
    pub fn teardown_calls(&self) -> usize {
        self.teardown_calls.load(Ordering::SeqCst)
    }

    /// Number of times the device was actually released (0 or 1).
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn is_torn_down(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SinkCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), OutputError> {
        if self.is_torn_down() {
            return Err(OutputError::TornDown);
        }
        if self.should_fail {
            return Err(OutputError::Platform("mock failure".into()));
        }
        Ok(())
    }
}

impl OutputSink for RecordingSink {
    fn emit_key_tap(&self, key: KeyCode) -> Result<(), OutputError> {
        self.check()?;
        self.lock().push(SinkCall::KeyTap(key));
        Ok(())
    }

    fn emit_relative(&self, axis: RelativeAxis, delta: i32) -> Result<(), OutputError> {
        self.check()?;
        self.lock().push(SinkCall::Relative(axis, delta));
        Ok(())
    }

    fn teardown(&self) -> Result<(), OutputError> {
        self.teardown_calls.fetch_add(1, Ordering::SeqCst);
        if !self.released.swap(true, Ordering::SeqCst) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
