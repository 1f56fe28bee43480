//! Byte-stream decoder for the console's serial protocol.
//!
//! # Single vs. double activation (for beginners)
//!
//! The console reports a double press of Ring, Side, Top or Pinkie as *two*
//! bytes: the button's normal code followed, a few milliseconds later, by a
//! second "double" code.  When the normal code arrives we therefore cannot
//! know yet whether it is a single press or the first half of a double press.
//!
//! The decoder solves this with a two-state machine:
//!
//! ```text
//!            disambiguable code
//!   Idle ───────────────────────────▶ AwaitingSecondByte { candidate, deadline }
//!    ▲                                   │
//!    │   matching double code            │ → DoubleActivate(candidate)
//!    │   deadline passed, no byte        │ → Activate(candidate)
//!    └── any other byte ─────────────────┘ → Activate(candidate), then the
//!                                            byte is decoded from Idle
//! ```
//!
//! The decoder never sleeps.  It is called once per polling tick with the
//! byte read during that tick (if any) and the current time; the deadline is
//! compared against that time.  Tests drive it with synthetic `Instant`s.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::trace;

use super::codes::{LogicalButton, RawCode};
use super::events::ProtocolEvent;

/// How long to wait for a double-activation code after a disambiguable
/// button's single code.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(25);

/// Observable state of the [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No provisional event outstanding.
    Idle,
    /// A disambiguable button's single code was seen; waiting to learn whether
    /// its double code follows before `deadline`.
    AwaitingSecondByte {
        candidate: LogicalButton,
        deadline: Instant,
    },
}

/// The protocol state machine.
///
/// [`Decoder::feed`] returns at most one event per call.  When a single call
/// resolves more than one event (a pending candidate plus the unrelated byte
/// that resolved it), the extra events are queued in arrival order and
/// returned by [`Decoder::next_pending`] or by subsequent `feed` calls.
#[derive(Debug)]
pub struct Decoder {
    state: DecoderState,
    window: Duration,
    queue: VecDeque<ProtocolEvent>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder using [`DEFAULT_WINDOW`].
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Creates a decoder with a custom disambiguation window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            state: DecoderState::Idle,
            window,
            queue: VecDeque::with_capacity(2),
        }
    }

    /// The configured disambiguation window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// The current state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Advances the state machine by one polling tick.
    ///
    /// `byte` is the byte read during this tick, or `None` if the transport had
    /// nothing.  Returns the oldest resolved event, if any.
    pub fn feed(&mut self, byte: Option<RawCode>, now: Instant) -> Option<ProtocolEvent> {
        self.step(byte, now);
        self.queue.pop_front()
    }

    /// Returns the next queued event without consuming input.
    pub fn next_pending(&mut self) -> Option<ProtocolEvent> {
        self.queue.pop_front()
    }

    /// Feeds one tick and yields every event it resolved, in order.
    pub fn feed_all(
        &mut self,
        byte: Option<RawCode>,
        now: Instant,
    ) -> impl Iterator<Item = ProtocolEvent> + '_ {
        self.step(byte, now);
        self.queue.drain(..)
    }

    fn step(&mut self, byte: Option<RawCode>, now: Instant) {
        match self.state {
            DecoderState::Idle => {
                if let Some(code) = byte {
                    self.accept_from_idle(code, now);
                }
            }
            DecoderState::AwaitingSecondByte {
                candidate,
                deadline,
            } => match byte {
                None if now < deadline => {}
                None => {
                    trace!(?candidate, "window expired, resolving as single");
                    self.resolve_single(candidate);
                }
                Some(code) if now < deadline && candidate.double_code() == Some(code) => {
                    trace!(?candidate, "double activation confirmed");
                    self.state = DecoderState::Idle;
                    self.queue.push_back(ProtocolEvent::DoubleActivate(candidate));
                }
                Some(code) => {
                    // The byte belongs to an independent event: settle the
                    // candidate first, then decode the byte in its own right.
                    trace!(?candidate, code, "unrelated byte during window");
                    self.resolve_single(candidate);
                    self.accept_from_idle(code, now);
                }
            },
        }
    }

    fn resolve_single(&mut self, candidate: LogicalButton) {
        self.state = DecoderState::Idle;
        self.queue.push_back(ProtocolEvent::Activate(candidate));
    }

    fn accept_from_idle(&mut self, code: RawCode, now: Instant) {
        let event = match LogicalButton::try_from(code) {
            Ok(button) if button.is_disambiguable() => {
                self.state = DecoderState::AwaitingSecondByte {
                    candidate: button,
                    deadline: now + self.window,
                };
                return;
            }
            Ok(button) => match button.scroll_direction() {
                Some(direction) => ProtocolEvent::ScrollTick(direction),
                None => ProtocolEvent::Activate(button),
            },
            Err(()) => match LogicalButton::from_double_code(code) {
                // A double code with no pending candidate still names the
                // button's double activation.
                Some(button) => ProtocolEvent::DoubleActivate(button),
                None => ProtocolEvent::Unrecognized(code),
            },
        };
        self.queue.push_back(event);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
