//! Byte transport implementations.

pub mod mock;
pub mod serial;
