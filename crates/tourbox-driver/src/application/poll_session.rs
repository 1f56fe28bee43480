//! DriverSession: the single-threaded polling loop.
//!
//! # One tick (for beginners)
//!
//! ```text
//! transport.read_byte()  ──▶ Option<u8>
//!        │
//! decoder.feed_all(byte, now) ──▶ 0, 1 or 2 ProtocolEvents
//!        │
//! dispatcher.dispatch(event) ──▶ OutputSink (key tap / wheel)
//!        │
//! wait for the next interval tick, repeat
//! ```
//!
//! Nothing in a tick blocks: the transport read returns immediately, and the
//! decoder compares its disambiguation deadline against `now` instead of
//! sleeping.  The loop keeps polling during the window so that a confirming
//! second byte is seen as soon as it arrives.
//!
//! # Teardown
//!
//! The session owns the output sink's lifetime.  [`DriverSession::run`] tears
//! the sink down on every exit path (shutdown signal, transport error), and
//! `Drop` does it again as a backstop for early returns and panics.  Sinks
//! make teardown idempotent, so the second call is harmless.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tourbox_core::{Decoder, RawCode};
use tracing::{debug, error, info, trace, warn};

use super::dispatch_event::{Dispatcher, OutputSink};

/// Error type for transport reads.
///
/// "No byte available" is not an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("device error: {0}")]
    Device(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport closed")]
    Closed,
}

/// Non-blocking source of raw protocol bytes.
pub trait ByteTransport: Send {
    /// Returns the next byte if one is ready, `Ok(None)` if not.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the device fails; the session stops.
    fn read_byte(&mut self) -> Result<Option<RawCode>, TransportError>;
}

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
}

/// Owns every collaborator of one decode/dispatch session.
pub struct DriverSession {
    decoder: Decoder,
    dispatcher: Dispatcher,
    transport: Box<dyn ByteTransport>,
    sink: Arc<dyn OutputSink>,
}

impl DriverSession {
    pub fn new(
        decoder: Decoder,
        dispatcher: Dispatcher,
        transport: Box<dyn ByteTransport>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            decoder,
            dispatcher,
            transport,
            sink,
        }
    }

    /// Runs one polling iteration at time `now`.
    ///
    /// Returns the number of events resolved during this tick.  Output errors
    /// are logged and do not stop the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] if the read fails.
    pub fn tick(&mut self, now: Instant) -> Result<usize, SessionError> {
        let byte = self.transport.read_byte()?;
        if let Some(code) = byte {
            trace!("read 0x{code:02x}");
        }

        let mut resolved = 0;
        for event in self.decoder.feed_all(byte, now) {
            resolved += 1;
            match self.dispatcher.dispatch(event, self.sink.as_ref()) {
                Ok(outcome) => debug!(?event, ?outcome, "dispatched"),
                Err(e) => error!(?event, "output error: {e}"),
            }
        }
        Ok(resolved)
    }

    /// Polls every `poll_interval` until `shutdown` completes or the transport
    /// fails, then tears the output sink down.
    ///
    /// # Errors
    ///
    /// Returns the transport error that ended the loop, after teardown.
    pub async fn run<F>(&mut self, poll_interval: Duration, shutdown: F) -> Result<(), SessionError>
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            window_ms = self.decoder.window().as_millis() as u64,
            poll_ms = poll_interval.as_millis() as u64,
            "polling started"
        );

        let result = loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break Ok(());
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick(Instant::now()) {
                        error!("{e}");
                        break Err(e);
                    }
                }
            }
        };

        self.teardown();
        result
    }

    /// Releases the output sink.  Safe to call more than once.
    pub fn teardown(&self) {
        match self.sink.teardown() {
            Ok(()) => debug!("output sink released"),
            Err(e) => warn!("output teardown failed: {e}"),
        }
    }
}

impl Drop for DriverSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
