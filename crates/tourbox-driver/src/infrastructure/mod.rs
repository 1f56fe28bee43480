//! Infrastructure layer for the driver.
//!
//! Contains OS-facing adapters: the serial transport, the uinput output
//! device, and configuration file storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `tourbox_core`, but MUST NOT be imported by the `application` layer
//! outside of tests.
//!
//! # Sub-modules
//!
//! - **`transport`** – Implementations of `ByteTransport`.  `SerialTransport`
//!   reads the console's USB serial line; `ScriptedTransport` replays bytes
//!   for tests.
//!
//! - **`output`** – Implementations of `OutputSink`.  `UinputSink` creates a
//!   virtual keyboard/mouse through `/dev/uinput` (Linux only);
//!   `RecordingSink` records calls for tests.
//!
//! - **`storage`** – TOML configuration file: device path, timing, log level
//!   and binding overrides.

pub mod output;
pub mod storage;
pub mod transport;
