//! Dispatcher: resolves decoded protocol events to output actions.
//!
//! This use case sits at the application layer and delegates to an
//! [`OutputSink`] trait object for the actual event emission.  The uinput
//! implementation lives in the infrastructure layer.

use thiserror::Error;
use tourbox_core::{Binding, BindingKey, BindingTable, KeyCode, ProtocolEvent, RelativeAxis};
use tracing::{debug, trace, warn};

/// Error type for output operations.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("output device already torn down")]
    TornDown,
}

/// The virtual input device the driver writes to.
///
/// Implementations must make [`OutputSink::teardown`] idempotent: calling it a
/// second time has no further effect.
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink: Send + Sync {
    /// Emits a key-down immediately followed by the matching key-up.
    fn emit_key_tap(&self, key: KeyCode) -> Result<(), OutputError>;

    /// Emits one relative motion event on `axis`.
    fn emit_relative(&self, axis: RelativeAxis, delta: i32) -> Result<(), OutputError>;

    /// Releases the device.
    fn teardown(&self) -> Result<(), OutputError>;
}

/// What a single [`Dispatcher::dispatch`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    KeyTap(KeyCode),
    Relative { axis: RelativeAxis, delta: i32 },
    /// The binding was disabled or the event is not dispatchable.
    Skipped,
}

/// Resolves events against an immutable [`BindingTable`].
pub struct Dispatcher {
    table: BindingTable,
}

impl Dispatcher {
    /// Takes ownership of the table for the lifetime of the session.
    pub fn new(table: BindingTable) -> Self {
        Self { table }
    }

    /// The table this dispatcher resolves against.
    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Issues the action bound to `event`.
    ///
    /// Each call completes before returning; a key tap's down and up are
    /// emitted by one sink call, so no other event can land between them.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the sink fails to emit.
    pub fn dispatch(
        &self,
        event: ProtocolEvent,
        output: &dyn OutputSink,
    ) -> Result<DispatchOutcome, OutputError> {
        let (key, binding) = match event {
            ProtocolEvent::Activate(button) => {
                let key = BindingKey::single(button);
                (key, self.table.get(key))
            }
            ProtocolEvent::DoubleActivate(button) => {
                let key = BindingKey::double(button);
                (key, self.table.get(key))
            }
            ProtocolEvent::ScrollTick(direction) => {
                let key = BindingKey::single(direction.button());
                match self.table.get(key) {
                    Binding::RelativeAxis { axis, step } => {
                        let delta = direction.signed(step);
                        trace!(%key, %axis, delta, "scroll");
                        output.emit_relative(axis, delta)?;
                        return Ok(DispatchOutcome::Relative { axis, delta });
                    }
                    other => (key, other),
                }
            }
            ProtocolEvent::Unrecognized(code) => {
                debug!("unrecognized protocol byte 0x{code:02x}");
                return Ok(DispatchOutcome::Skipped);
            }
        };

        match binding {
            Binding::Disabled => {
                trace!(%key, "binding disabled");
                Ok(DispatchOutcome::Skipped)
            }
            Binding::KeyTap(code) if key.button.scroll_direction().is_none() => {
                trace!(%key, %code, "key tap");
                output.emit_key_tap(code)?;
                Ok(DispatchOutcome::KeyTap(code))
            }
            // Table validation rejects kind mismatches, so these are only
            // reachable through a hand-built table.
            mismatched => {
                warn!(%key, binding = %mismatched, "binding kind does not match event; skipped");
                Ok(DispatchOutcome::Skipped)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
