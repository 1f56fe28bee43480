//! tourbox-driver library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the driver do? (for beginners)
//!
//! The TourBox console shows up on Linux as a USB serial device
//! (`/dev/ttyACM0`).  It has no kernel input driver, so its buttons do nothing
//! by default.  This program:
//!
//! 1. Opens the serial line and polls it for one byte at a time.
//! 2. Decodes each byte with [`tourbox_core::Decoder`], resolving single vs.
//!    double presses against a short time window.
//! 3. Looks the decoded event up in the [`tourbox_core::BindingTable`].
//! 4. Emits the bound key tap or wheel motion on a virtual uinput device,
//!    which the desktop sees as an ordinary keyboard and mouse.
//!
//! When the process stops (Ctrl-C, SIGTERM, or a serial error) the virtual
//! device is always destroyed before exit.

/// Application layer: dispatching events and running the polling session.
pub mod application;

/// Infrastructure layer: serial transport, uinput output, configuration storage.
pub mod infrastructure;
