//! Protocol module containing the raw code tables, decoded event types and
//! the byte-stream decoder.

pub mod codes;
pub mod decoder;
pub mod events;

pub use codes::{LogicalButton, RawCode, ScrollDirection};
pub use decoder::{Decoder, DecoderState, DEFAULT_WINDOW};
pub use events::{Activation, ProtocolEvent};
