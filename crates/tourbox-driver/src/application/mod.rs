//! Application layer use cases for the driver.
//!
//! - **`dispatch_event`** – Maps a decoded `ProtocolEvent` through the
//!   `BindingTable` and issues the bound action to an [`OutputSink`]
//!   implementation injected at construction time.
//!
//! - **`poll_session`** – The cooperative polling loop: read at most one byte
//!   from a [`ByteTransport`], advance the decoder, dispatch every resolved
//!   event, sleep, repeat.  Owns the output sink's teardown.
//!
//! [`OutputSink`]: dispatch_event::OutputSink
//! [`ByteTransport`]: poll_session::ByteTransport

pub mod dispatch_event;
pub mod poll_session;
