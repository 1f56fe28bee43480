//! Fully resolved events produced by the [`Decoder`](super::decoder::Decoder).

use serde::{Deserialize, Serialize};

use super::codes::{LogicalButton, RawCode, ScrollDirection};

/// Whether a button was pressed once or double-pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Activation {
    Single,
    Double,
}

/// One decoded unit of console input, ready for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolEvent {
    /// Single activation of a button.
    Activate(LogicalButton),
    /// Double activation; only produced for disambiguable buttons.
    DoubleActivate(LogicalButton),
    /// One detent of the scroll wheel.
    ScrollTick(ScrollDirection),
    /// A byte that names no known control.  Never dispatched to output.
    Unrecognized(RawCode),
}

impl ProtocolEvent {
    /// Returns the button and activation kind for tap-style events.
    pub fn activation(&self) -> Option<(LogicalButton, Activation)> {
        match *self {
            ProtocolEvent::Activate(b) => Some((b, Activation::Single)),
            ProtocolEvent::DoubleActivate(b) => Some((b, Activation::Double)),
            ProtocolEvent::ScrollTick(_) | ProtocolEvent::Unrecognized(_) => None,
        }
    }
}
