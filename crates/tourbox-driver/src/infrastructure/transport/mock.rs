//! Scripted transport for tests.
//!
//! Replays a fixed sequence of ticks: each call to `read_byte` consumes one
//! step of the script.  When the script runs out the transport either idles
//! forever (`Ok(None)`) or fails, depending on how it was built.

use std::collections::VecDeque;

use tourbox_core::RawCode;

use crate::application::poll_session::{ByteTransport, TransportError};

/// One scripted tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Byte(RawCode),
    Idle,
}

/// A transport that replays a script.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<Step>,
    fail_when_done: bool,
    reads: usize,
}

impl ScriptedTransport {
    /// A transport that never has data.
    pub fn idle() -> Self {
        Self::default()
    }

    /// One byte per tick, then idle.
    pub fn from_bytes<I: IntoIterator<Item = RawCode>>(bytes: I) -> Self {
        Self::from_steps(bytes.into_iter().map(Step::Byte))
    }

    /// An arbitrary mix of byte and idle ticks.
    pub fn from_steps<I: IntoIterator<Item = Step>>(steps: I) -> Self {
        Self {
            script: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Fail with [`TransportError::Closed`] once the script is exhausted.
    pub fn then_fail(mut self) -> Self {
        self.fail_when_done = true;
        self
    }

    /// Number of `read_byte` calls so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl ByteTransport for ScriptedTransport {
    fn read_byte(&mut self) -> Result<Option<RawCode>, TransportError> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(Step::Byte(code)) => Ok(Some(code)),
            Some(Step::Idle) => Ok(None),
            None if self.fail_when_done => Err(TransportError::Closed),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_script_then_idles() {
        let mut transport = ScriptedTransport::from_steps([Step::Byte(0x81), Step::Idle]);

        assert_eq!(transport.read_byte().unwrap(), Some(0x81));
        assert_eq!(transport.read_byte().unwrap(), None);
        assert_eq!(transport.read_byte().unwrap(), None);
        assert_eq!(transport.reads(), 3);
    }

    #[test]
    fn test_then_fail_errors_after_script() {
        let mut transport = ScriptedTransport::from_bytes([0x90]).then_fail();

        assert_eq!(transport.read_byte().unwrap(), Some(0x90));
        assert!(matches!(transport.read_byte(), Err(TransportError::Closed)));
    }
}
