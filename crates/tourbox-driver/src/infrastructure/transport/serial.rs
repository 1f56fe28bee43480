//! USB serial transport via the `serialport` crate.
//!
//! The console enumerates as a CDC-ACM device (`/dev/ttyACM0`, sometimes
//! `/dev/ttyUSB0`) and streams one byte per physical action at 115200 baud,
//! 8 data bits, no parity, one stop bit, no flow control.
//!
//! Reads are non-blocking: [`SerialTransport::read_byte`] asks the driver how
//! many bytes are queued and only reads when at least one is available.

use std::io::{ErrorKind, Read};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tourbox_core::RawCode;
use tracing::info;

use crate::application::poll_session::{ByteTransport, TransportError};

/// Default device path when none is configured.
pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";

/// Line speed the console uses.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Upper bound for a read once `bytes_to_read` reported data.
const READ_TIMEOUT: Duration = Duration::from_millis(1);

/// A console attached over a serial line.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialTransport {
    /// Opens and configures the serial device, discarding anything already
    /// buffered.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Open`] if the device cannot be opened or
    /// flushed.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, TransportError> {
        let open_err = |e: serialport::Error| TransportError::Open {
            path: path.to_string(),
            reason: e.to_string(),
        };

        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(open_err)?;
        port.clear(ClearBuffer::All).map_err(open_err)?;

        info!("serial transport open: {path} @ {baud_rate} baud");
        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl ByteTransport for SerialTransport {
    fn read_byte(&mut self) -> Result<Option<RawCode>, TransportError> {
        let available = self
            .port
            .bytes_to_read()
            .map_err(|e| TransportError::Device(e.to_string()))?;
        if available == 0 {
            return Ok(None);
        }

        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            // Data was reported but the read returned nothing: the line hung up.
            Ok(_) => Err(TransportError::Closed),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}
