//! Output sink implementations.
//!
//! The uinput implementation is only compiled on Linux.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod uinput;
