//! Raw byte codes emitted by the console and the logical buttons they name.
//!
//! The console reports every physical action as a single byte on the serial
//! line.  These values are a fixed contract with the hardware and must not be
//! changed.
//!
//! Four buttons (Ring, Side, Top, Pinkie) have a second code that the console
//! sends shortly after the first one when the button is double-pressed:
//!
//! | Button | single | double |
//! |--------|--------|--------|
//! | Ring   | `0x80` | `0x18` |
//! | Side   | `0x81` | `0x21` |
//! | Top    | `0x82` | `0x13` |
//! | Pinkie | `0x83` | `0x1c` |

use serde::{Deserialize, Serialize};

/// One byte exactly as received from the serial transport.
pub type RawCode = u8;

// ── Logical buttons ───────────────────────────────────────────────────────────

/// The closed set of physical controls on the console.
///
/// The discriminant of each variant is its single-activation raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogicalButton {
    // Small buttons
    Side = 0x81,
    Top = 0x82,
    Pinkie = 0x83,
    Ring = 0x80,
    // Two small circles near the logo
    NintendoA = 0x23,
    NintendoB = 0x22,
    // Next to the tall knob
    Moon = 0x2a,
    // Large mouse wheel
    ScrollUp = 0x49,
    ScrollDown = 0x09,
    ScrollPress = 0x0a,
    // Four arrows
    DpadUp = 0x90,
    DpadDown = 0x91,
    DpadLeft = 0x92,
    DpadRight = 0x93,
    // Large flat disc
    DialPress = 0x38,
    DialClockwise = 0x8f,
    DialCounterclockwise = 0x4f,
    // Central knob
    KnobPress = 0x37,
    KnobClockwise = 0x44,
    KnobCounterclockwise = 0x84,
}

impl LogicalButton {
    /// Every button, in a stable order.
    pub const ALL: [LogicalButton; 20] = [
        LogicalButton::Side,
        LogicalButton::Top,
        LogicalButton::Pinkie,
        LogicalButton::Ring,
        LogicalButton::NintendoA,
        LogicalButton::NintendoB,
        LogicalButton::Moon,
        LogicalButton::ScrollUp,
        LogicalButton::ScrollDown,
        LogicalButton::ScrollPress,
        LogicalButton::DpadUp,
        LogicalButton::DpadDown,
        LogicalButton::DpadLeft,
        LogicalButton::DpadRight,
        LogicalButton::DialPress,
        LogicalButton::DialClockwise,
        LogicalButton::DialCounterclockwise,
        LogicalButton::KnobPress,
        LogicalButton::KnobClockwise,
        LogicalButton::KnobCounterclockwise,
    ];

    /// The buttons that may report a double activation.
    pub const DISAMBIGUABLE: [LogicalButton; 4] = [
        LogicalButton::Side,
        LogicalButton::Top,
        LogicalButton::Pinkie,
        LogicalButton::Ring,
    ];

    /// Returns the raw code the console sends for a single activation.
    pub const fn raw_code(self) -> RawCode {
        self as u8
    }

    /// Returns the raw code that confirms a double activation, or `None`
    /// for buttons that cannot be double-activated.
    pub const fn double_code(self) -> Option<RawCode> {
        match self {
            LogicalButton::Ring => Some(0x18),
            LogicalButton::Side => Some(0x21),
            LogicalButton::Top => Some(0x13),
            LogicalButton::Pinkie => Some(0x1c),
            _ => None,
        }
    }

    /// `true` for the four buttons whose double activation is signalled by a
    /// second byte.
    pub const fn is_disambiguable(self) -> bool {
        self.double_code().is_some()
    }

    /// Returns the wheel direction for `ScrollUp` / `ScrollDown`, `None` for
    /// every other button.
    pub const fn scroll_direction(self) -> Option<ScrollDirection> {
        match self {
            LogicalButton::ScrollUp => Some(ScrollDirection::Up),
            LogicalButton::ScrollDown => Some(ScrollDirection::Down),
            _ => None,
        }
    }

    /// Looks up the button whose double-activation code is `code`.
    pub fn from_double_code(code: RawCode) -> Option<Self> {
        Self::DISAMBIGUABLE
            .into_iter()
            .find(|b| b.double_code() == Some(code))
    }

    /// The name used for this button in configuration files.
    pub const fn config_name(self) -> &'static str {
        match self {
            LogicalButton::Side => "SIDE",
            LogicalButton::Top => "TOP",
            LogicalButton::Pinkie => "PINKIE",
            LogicalButton::Ring => "RING",
            LogicalButton::NintendoA => "NINTENDO_A",
            LogicalButton::NintendoB => "NINTENDO_B",
            LogicalButton::Moon => "MOON",
            LogicalButton::ScrollUp => "WHEEL_UP",
            LogicalButton::ScrollDown => "WHEEL_DOWN",
            LogicalButton::ScrollPress => "WHEEL_PRESS",
            LogicalButton::DpadUp => "DPAD_UP",
            LogicalButton::DpadDown => "DPAD_DOWN",
            LogicalButton::DpadLeft => "DPAD_LEFT",
            LogicalButton::DpadRight => "DPAD_RIGHT",
            LogicalButton::DialPress => "DIAL_PRESS",
            LogicalButton::DialClockwise => "DIAL_CLOCK",
            LogicalButton::DialCounterclockwise => "DIAL_COUNTER",
            LogicalButton::KnobPress => "KNOB_PRESS",
            LogicalButton::KnobClockwise => "KNOB_CLOCK",
            LogicalButton::KnobCounterclockwise => "KNOB_COUNTER",
        }
    }

    /// Inverse of [`LogicalButton::config_name`].
    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.config_name() == name)
    }
}

impl TryFrom<RawCode> for LogicalButton {
    type Error = ();

    /// Maps a single-activation raw code to its button.
    ///
    /// Double-activation codes are *not* accepted here; use
    /// [`LogicalButton::from_double_code`].
    fn try_from(value: RawCode) -> Result<Self, ()> {
        match value {
            0x81 => Ok(LogicalButton::Side),
            0x82 => Ok(LogicalButton::Top),
            0x83 => Ok(LogicalButton::Pinkie),
            0x80 => Ok(LogicalButton::Ring),
            0x23 => Ok(LogicalButton::NintendoA),
            0x22 => Ok(LogicalButton::NintendoB),
            0x2a => Ok(LogicalButton::Moon),
            0x49 => Ok(LogicalButton::ScrollUp),
            0x09 => Ok(LogicalButton::ScrollDown),
            0x0a => Ok(LogicalButton::ScrollPress),
            0x90 => Ok(LogicalButton::DpadUp),
            0x91 => Ok(LogicalButton::DpadDown),
            0x92 => Ok(LogicalButton::DpadLeft),
            0x93 => Ok(LogicalButton::DpadRight),
            0x38 => Ok(LogicalButton::DialPress),
            0x8f => Ok(LogicalButton::DialClockwise),
            0x4f => Ok(LogicalButton::DialCounterclockwise),
            0x37 => Ok(LogicalButton::KnobPress),
            0x44 => Ok(LogicalButton::KnobClockwise),
            0x84 => Ok(LogicalButton::KnobCounterclockwise),
            _ => Err(()),
        }
    }
}

// ── Scroll direction ──────────────────────────────────────────────────────────

/// Direction of one scroll wheel tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// The logical button whose binding drives this direction.
    pub const fn button(self) -> LogicalButton {
        match self {
            ScrollDirection::Up => LogicalButton::ScrollUp,
            ScrollDirection::Down => LogicalButton::ScrollDown,
        }
    }

    /// Applies the direction's sign to a configured step magnitude.
    ///
    /// Saturates at `i32::MAX` for a step of `i32::MIN`; validated tables
    /// never contain one.
    pub const fn signed(self, step: i32) -> i32 {
        match self {
            ScrollDirection::Up => step,
            ScrollDirection::Down => step.saturating_neg(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
