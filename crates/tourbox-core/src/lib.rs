//! # tourbox-core
//!
//! Shared library for the TourBox console driver containing the serial
//! protocol decoder, the binding configuration model, and the Linux input
//! event code tables.
//!
//! It has zero dependencies on OS APIs, serial ports, or the uinput
//! subsystem, so everything here can be unit-tested without hardware.
//!
//! # Architecture overview (for beginners)
//!
//! The TourBox is a control console (buttons, a scroll wheel, a dial and a
//! knob) that talks to the host over a USB serial line.  Every physical
//! action is reported as **one byte**.  The driver turns those bytes into
//! keyboard and mouse events on a virtual input device.
//!
//! - **`protocol`** – What the bytes mean.  [`Decoder`] is a small state
//!   machine that turns raw bytes into [`ProtocolEvent`]s, including the
//!   timing-sensitive "was that a single or a double press?" decision.
//!
//! - **`domain`** – The [`BindingTable`]: an immutable map from each button
//!   (and each double-press variant) to the output action it triggers.
//!
//! - **`keymap`** – Named Linux key and relative-axis codes (`KEY_CALC`,
//!   `REL_WHEEL`, …) so that bindings can be written by name.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `tourbox_core::Decoder` instead of `tourbox_core::protocol::decoder::Decoder`.
pub use domain::binding::{Binding, BindingError, BindingKey, BindingTable, InputKind};
pub use keymap::{KeyCode, KeyNameError, RelativeAxis};
pub use protocol::codes::{LogicalButton, RawCode, ScrollDirection};
pub use protocol::decoder::{Decoder, DecoderState, DEFAULT_WINDOW};
pub use protocol::events::{Activation, ProtocolEvent};
