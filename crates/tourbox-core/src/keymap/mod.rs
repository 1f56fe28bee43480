//! Linux input event code tables.
//!
//! The virtual device speaks the kernel's `input-event-codes.h` vocabulary:
//! `EV_KEY` events carry a `KEY_*`/`BTN_*` code and `EV_REL` events carry a
//! `REL_*` axis.  Bindings name these codes as strings (`"KEY_CALC"`,
//! `"REL_WHEEL"`); this module translates between names and numbers.

pub mod linux_input;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a key or axis name is not in the table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyNameError {
    #[error("unknown key name: {0}")]
    UnknownKey(String),
    #[error("unknown relative axis: {0}")]
    UnknownAxis(String),
}

/// A Linux `EV_KEY` code (`KEY_*` or `BTN_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCode(pub u16);

impl KeyCode {
    /// Resolves a kernel key name such as `"KEY_VOLUMEUP"`.
    pub fn from_name(name: &str) -> Option<Self> {
        linux_input::key_code(name).map(KeyCode)
    }

    /// The canonical kernel name, if this code is in the table.
    pub fn name(self) -> Option<&'static str> {
        linux_input::key_name(self.0)
    }

    /// The raw numeric code.
    pub const fn code(self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "KEY_0x{:03X}", self.0),
        }
    }
}

impl FromStr for KeyCode {
    type Err = KeyNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| KeyNameError::UnknownKey(s.to_string()))
    }
}

impl TryFrom<String> for KeyCode {
    type Error = KeyNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyCode> for String {
    fn from(key: KeyCode) -> Self {
        key.to_string()
    }
}

/// A Linux `EV_REL` axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum RelativeAxis {
    X = 0x00,
    Y = 0x01,
    HWheel = 0x06,
    Wheel = 0x08,
}

impl RelativeAxis {
    pub const ALL: [RelativeAxis; 4] = [
        RelativeAxis::X,
        RelativeAxis::Y,
        RelativeAxis::HWheel,
        RelativeAxis::Wheel,
    ];

    /// The raw `REL_*` code.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// The kernel name of the axis.
    pub const fn name(self) -> &'static str {
        match self {
            RelativeAxis::X => "REL_X",
            RelativeAxis::Y => "REL_Y",
            RelativeAxis::HWheel => "REL_HWHEEL",
            RelativeAxis::Wheel => "REL_WHEEL",
        }
    }
}

impl fmt::Display for RelativeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RelativeAxis {
    type Err = KeyNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|axis| axis.name() == s)
            .ok_or_else(|| KeyNameError::UnknownAxis(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_code_parses_kernel_name() {
        assert_eq!("KEY_CALC".parse::<KeyCode>(), Ok(KeyCode(140)));
        assert_eq!(" BTN_LEFT ".parse::<KeyCode>(), Ok(KeyCode(0x110)));
    }

    #[test]
    fn test_key_code_rejects_unknown_name() {
        assert_eq!(
            "KEY_DOES_NOT_EXIST".parse::<KeyCode>(),
            Err(KeyNameError::UnknownKey("KEY_DOES_NOT_EXIST".to_string()))
        );
    }

    #[test]
    fn test_key_code_display_uses_name_or_hex() {
        assert_eq!(KeyCode(115).to_string(), "KEY_VOLUMEUP");
        assert_eq!(KeyCode(0x2FF).to_string(), "KEY_0x2FF");
    }

    #[test]
    fn test_relative_axis_names_round_trip() {
        for axis in RelativeAxis::ALL {
            assert_eq!(axis.name().parse::<RelativeAxis>(), Ok(axis));
        }
        assert_eq!(RelativeAxis::Wheel.code(), 8);
        assert!("REL_DIAL".parse::<RelativeAxis>().is_err());
    }
}
