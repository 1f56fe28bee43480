//! Binding table: which output action each button triggers.
//!
//! A [`BindingKey`] is a button plus an [`Activation`] kind, so a double press
//! of Side is bound independently of a single press.  A [`Binding`] is one of:
//!
//! - `Disabled` – the event is consumed without output.
//! - `KeyTap(code)` – a key-down followed by a key-up.
//! - `RelativeAxis { axis, step }` – relative motion, used by the scroll wheel.
//!
//! Every valid key always has a binding: the table starts from the factory
//! defaults and configuration can only *replace* entries.  Mismatched kinds
//! (a button bound to a relative axis, or the wheel bound to a key) are
//! rejected when the table is built, never discovered while dispatching.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keymap::{linux_input, KeyCode, KeyNameError, RelativeAxis};
use crate::protocol::codes::LogicalButton;
use crate::protocol::events::Activation;

/// Prefix marking a double-activation key in configuration files.
const DOUBLE_PREFIX: &str = "DBL_";

// ── Binding ───────────────────────────────────────────────────────────────────

/// Output action bound to a [`BindingKey`].
///
/// Parses from and prints to the configuration syntax: `DISABLED`, a kernel key
/// name (`KEY_CALC`), or a relative axis with optional step (`REL_WHEEL`,
/// `REL_WHEEL:3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Binding {
    Disabled,
    KeyTap(KeyCode),
    RelativeAxis { axis: RelativeAxis, step: i32 },
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Disabled => f.write_str("DISABLED"),
            Binding::KeyTap(key) => write!(f, "{key}"),
            Binding::RelativeAxis { axis, step: 1 } => write!(f, "{axis}"),
            Binding::RelativeAxis { axis, step } => write!(f, "{axis}:{step}"),
        }
    }
}

/// Error returned when a binding string cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingParseError {
    #[error(transparent)]
    Name(#[from] KeyNameError),
    #[error("invalid step in {0:?}: expected REL_<AXIS>:<integer>")]
    Step(String),
}

impl FromStr for Binding {
    type Err = BindingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("DISABLED") {
            return Ok(Binding::Disabled);
        }
        if s.starts_with("REL_") {
            let (axis, step) = match s.split_once(':') {
                Some((axis, step)) => {
                    let step = step
                        .trim()
                        .parse::<i32>()
                        .map_err(|_| BindingParseError::Step(s.to_string()))?;
                    (axis, step)
                }
                None => (s, 1),
            };
            return Ok(Binding::RelativeAxis {
                axis: axis.parse()?,
                step,
            });
        }
        Ok(Binding::KeyTap(s.parse()?))
    }
}

impl TryFrom<String> for Binding {
    type Error = BindingParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Binding> for String {
    fn from(binding: Binding) -> Self {
        binding.to_string()
    }
}

// ── Binding key ───────────────────────────────────────────────────────────────

/// A button together with how it was activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey {
    pub button: LogicalButton,
    pub activation: Activation,
}

impl BindingKey {
    pub const fn single(button: LogicalButton) -> Self {
        Self {
            button,
            activation: Activation::Single,
        }
    }

    pub const fn double(button: LogicalButton) -> Self {
        Self {
            button,
            activation: Activation::Double,
        }
    }

    /// Every key that can carry a binding: each button's single activation plus
    /// the double activation of each disambiguable button.
    pub fn all() -> impl Iterator<Item = BindingKey> {
        LogicalButton::ALL
            .into_iter()
            .map(BindingKey::single)
            .chain(LogicalButton::DISAMBIGUABLE.into_iter().map(BindingKey::double))
    }

    /// Name used in configuration files, e.g. `SIDE` or `DBL_SIDE`.
    pub fn config_name(&self) -> String {
        match self.activation {
            Activation::Single => self.button.config_name().to_string(),
            Activation::Double => format!("{DOUBLE_PREFIX}{}", self.button.config_name()),
        }
    }

    /// Inverse of [`BindingKey::config_name`].
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name.strip_prefix(DOUBLE_PREFIX) {
            Some(rest) => LogicalButton::from_config_name(rest).map(BindingKey::double),
            None => LogicalButton::from_config_name(name).map(BindingKey::single),
        }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.config_name())
    }
}

// ── Input kind ────────────────────────────────────────────────────────────────

/// Whether a button produces discrete taps or relative motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Tap,
    Motion,
}

impl InputKind {
    pub const fn of(button: LogicalButton) -> Self {
        match button.scroll_direction() {
            Some(_) => InputKind::Motion,
            None => InputKind::Tap,
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Configuration errors detected while building a [`BindingTable`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    /// A tap-style button was bound to relative motion.
    #[error("{key} is a button and cannot be bound to relative axis {binding}")]
    RelativeOnTap { key: BindingKey, binding: Binding },

    /// The scroll wheel was bound to a key tap.
    #[error("{key} is a scroll direction and must be bound to a relative axis, not {binding}")]
    KeyTapOnMotion { key: BindingKey, binding: Binding },

    /// A double activation was configured for a button that has none.
    #[error("{button:?} has no double activation")]
    NoDoubleActivation { button: LogicalButton },

    /// A relative binding with a step of zero would emit nothing.
    #[error("{key} has a relative step of zero")]
    ZeroStep { key: BindingKey },

    /// A relative step whose magnitude cannot be negated for the opposite
    /// scroll direction.
    #[error("{key} has relative step {step}, which cannot be negated")]
    StepOutOfRange { key: BindingKey, step: i32 },
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// Immutable mapping from [`BindingKey`] to [`Binding`].
///
/// Construct with [`BindingTable::factory_default`] or
/// [`BindingTable::with_overrides`]; there are no mutating methods, so a new
/// configuration means a new table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    entries: BTreeMap<BindingKey, Binding>,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::factory_default()
    }
}

impl BindingTable {
    /// The bindings the driver ships with.
    pub fn factory_default() -> Self {
        let entries = BindingKey::all()
            .map(|key| (key, factory_binding(key)))
            .collect();
        Self { entries }
    }

    /// Builds a table from the factory defaults with `overrides` applied.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindingError`] found among the overrides.
    pub fn with_overrides<I>(overrides: I) -> Result<Self, BindingError>
    where
        I: IntoIterator<Item = (BindingKey, Binding)>,
    {
        let mut entries = Self::factory_default().entries;
        for (key, binding) in overrides {
            validate(key, binding)?;
            entries.insert(key, binding);
        }
        Ok(Self { entries })
    }

    /// Returns the binding for `key`.
    ///
    /// Keys outside [`BindingKey::all`] (a double activation of a button that
    /// has none) are `Disabled`.
    pub fn get(&self, key: BindingKey) -> Binding {
        self.entries.get(&key).copied().unwrap_or(Binding::Disabled)
    }

    /// Shorthand for `get(BindingKey { button, activation })`.
    pub fn lookup(&self, button: LogicalButton, activation: Activation) -> Binding {
        self.get(BindingKey { button, activation })
    }

    /// All entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (BindingKey, Binding)> + '_ {
        self.entries.iter().map(|(k, b)| (*k, *b))
    }

    /// Every key code the table can emit, plus the two mouse buttons the
    /// virtual device always exposes.
    pub fn key_codes(&self) -> BTreeSet<KeyCode> {
        let mut keys: BTreeSet<KeyCode> = self
            .entries
            .values()
            .filter_map(|b| match b {
                Binding::KeyTap(key) => Some(*key),
                _ => None,
            })
            .collect();
        keys.insert(KeyCode(linux_input::BTN_LEFT));
        keys.insert(KeyCode(linux_input::BTN_RIGHT));
        keys
    }

    /// Every relative axis the table can emit, plus both wheels.
    pub fn relative_axes(&self) -> BTreeSet<RelativeAxis> {
        let mut axes: BTreeSet<RelativeAxis> = self
            .entries
            .values()
            .filter_map(|b| match b {
                Binding::RelativeAxis { axis, .. } => Some(*axis),
                _ => None,
            })
            .collect();
        axes.insert(RelativeAxis::Wheel);
        axes.insert(RelativeAxis::HWheel);
        axes
    }
}

fn validate(key: BindingKey, binding: Binding) -> Result<(), BindingError> {
    if key.activation == Activation::Double && !key.button.is_disambiguable() {
        return Err(BindingError::NoDoubleActivation { button: key.button });
    }
    match (InputKind::of(key.button), binding) {
        (_, Binding::Disabled) => Ok(()),
        (InputKind::Tap, Binding::KeyTap(_)) => Ok(()),
        (InputKind::Tap, Binding::RelativeAxis { .. }) => {
            Err(BindingError::RelativeOnTap { key, binding })
        }
        (InputKind::Motion, Binding::KeyTap(_)) => {
            Err(BindingError::KeyTapOnMotion { key, binding })
        }
        (InputKind::Motion, Binding::RelativeAxis { step: 0, .. }) => {
            Err(BindingError::ZeroStep { key })
        }
        (InputKind::Motion, Binding::RelativeAxis { step: i32::MIN, .. }) => {
            Err(BindingError::StepOutOfRange { key, step: i32::MIN })
        }
        (InputKind::Motion, Binding::RelativeAxis { .. }) => Ok(()),
    }
}

fn factory_binding(key: BindingKey) -> Binding {
    use LogicalButton::*;

    let name = match (key.button, key.activation) {
        (ScrollUp | ScrollDown, _) => {
            return Binding::RelativeAxis {
                axis: RelativeAxis::Wheel,
                step: 1,
            }
        }
        (Ring, Activation::Double) => "KEY_CAMERA",
        (Pinkie, Activation::Double) => "KEY_ALL_APPLICATIONS",
        (Side, Activation::Double) => "KEY_SLEEP",
        (Top, Activation::Double) => "KEY_SCREENLOCK",
        (_, Activation::Double) => return Binding::Disabled,
        (NintendoB, _) => "KEY_CAMERA_ACCESS_DISABLE",
        (NintendoA, _) => "KEY_CAMERA_ACCESS_ENABLE",
        (Side, _) => "KEY_CALC",
        (Top, _) => "KEY_REFRESH",
        (Pinkie, _) => "KEY_FORWARD",
        (Ring, _) => "KEY_BACK",
        (Moon, _) => "KEY_MUTE",
        (ScrollPress, _) => "KEY_HOME",
        (DpadUp, _) => "KEY_UP",
        (DpadDown, _) => "KEY_DOWN",
        (DpadLeft, _) => "KEY_LEFT",
        (DpadRight, _) => "KEY_RIGHT",
        (DialClockwise, _) => "KEY_BRIGHTNESSUP",
        (DialCounterclockwise, _) => "KEY_BRIGHTNESSDOWN",
        (DialPress, _) => "KEY_MICMUTE",
        (KnobClockwise, _) => "KEY_VOLUMEUP",
        (KnobCounterclockwise, _) => "KEY_VOLUMEDOWN",
        (KnobPress, _) => "KEY_PLAYPAUSE",
    };
    KeyCode::from_name(name).map_or(Binding::Disabled, Binding::KeyTap)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> KeyCode {
        KeyCode::from_name(name).unwrap()
    }

    // ── Factory defaults ──────────────────────────────────────────────────────

    #[test]
    fn test_factory_default_binds_every_key() {
        let table = BindingTable::factory_default();
        assert_eq!(table.iter().count(), 24);
        for (k, binding) in table.iter() {
            assert_ne!(binding, Binding::Disabled, "{k} must have a working default");
        }
    }

    #[test]
    fn test_factory_default_passes_its_own_validation() {
        for (k, binding) in BindingTable::factory_default().iter() {
            assert_eq!(validate(k, binding), Ok(()), "{k}");
        }
    }

    #[test]
    fn test_factory_default_values_for_side() {
        let table = BindingTable::factory_default();
        assert_eq!(
            table.lookup(LogicalButton::Side, Activation::Single),
            Binding::KeyTap(key("KEY_CALC"))
        );
        assert_eq!(
            table.lookup(LogicalButton::Side, Activation::Double),
            Binding::KeyTap(key("KEY_SLEEP"))
        );
    }

    #[test]
    fn test_wheel_defaults_to_rel_wheel_step_one() {
        let table = BindingTable::factory_default();
        let expected = Binding::RelativeAxis {
            axis: RelativeAxis::Wheel,
            step: 1,
        };
        assert_eq!(table.get(BindingKey::single(LogicalButton::ScrollUp)), expected);
        assert_eq!(table.get(BindingKey::single(LogicalButton::ScrollDown)), expected);
    }

    #[test]
    fn test_double_of_non_disambiguable_is_disabled() {
        let table = BindingTable::factory_default();
        assert_eq!(
            table.lookup(LogicalButton::Moon, Activation::Double),
            Binding::Disabled
        );
    }

    // ── Overrides ─────────────────────────────────────────────────────────────

    #[test]
    fn test_override_replaces_only_named_key() {
        // Arrange
        let overrides = [(BindingKey::single(LogicalButton::Moon), Binding::Disabled)];

        // Act
        let table = BindingTable::with_overrides(overrides).unwrap();

        // Assert
        assert_eq!(table.get(BindingKey::single(LogicalButton::Moon)), Binding::Disabled);
        assert_eq!(
            table.get(BindingKey::single(LogicalButton::Top)),
            Binding::KeyTap(key("KEY_REFRESH"))
        );
    }

    #[test]
    fn test_relative_axis_on_button_is_rejected() {
        let k = BindingKey::single(LogicalButton::DpadUp);
        let binding = Binding::RelativeAxis {
            axis: RelativeAxis::Y,
            step: -1,
        };
        assert_eq!(
            BindingTable::with_overrides([(k, binding)]),
            Err(BindingError::RelativeOnTap { key: k, binding })
        );
    }

    #[test]
    fn test_key_tap_on_wheel_is_rejected() {
        let k = BindingKey::single(LogicalButton::ScrollUp);
        let binding = Binding::KeyTap(key("KEY_SCROLLUP"));
        assert_eq!(
            BindingTable::with_overrides([(k, binding)]),
            Err(BindingError::KeyTapOnMotion { key: k, binding })
        );
    }

    #[test]
    fn test_double_for_non_disambiguable_is_rejected() {
        let k = BindingKey::double(LogicalButton::KnobPress);
        assert_eq!(
            BindingTable::with_overrides([(k, Binding::KeyTap(key("KEY_ESC")))]),
            Err(BindingError::NoDoubleActivation {
                button: LogicalButton::KnobPress
            })
        );
    }

    #[test]
    fn test_zero_step_is_rejected() {
        let k = BindingKey::single(LogicalButton::ScrollDown);
        let binding = Binding::RelativeAxis {
            axis: RelativeAxis::Wheel,
            step: 0,
        };
        assert_eq!(
            BindingTable::with_overrides([(k, binding)]),
            Err(BindingError::ZeroStep { key: k })
        );
    }

    #[test]
    fn test_unnegatable_step_is_rejected() {
        // Arrange
        let k = BindingKey::single(LogicalButton::ScrollDown);
        let binding: Binding = "REL_WHEEL:-2147483648".parse().unwrap();

        // Act
        let result = BindingTable::with_overrides([(k, binding)]);

        // Assert
        assert_eq!(
            result,
            Err(BindingError::StepOutOfRange {
                key: k,
                step: i32::MIN
            })
        );
    }

    #[test]
    fn test_extreme_valid_steps_are_accepted() {
        let k = BindingKey::single(LogicalButton::ScrollDown);
        for step in [i32::MIN + 1, i32::MAX] {
            let binding = Binding::RelativeAxis {
                axis: RelativeAxis::Wheel,
                step,
            };
            assert!(BindingTable::with_overrides([(k, binding)]).is_ok());
        }
    }

    #[test]
    fn test_wheel_may_be_disabled() {
        let k = BindingKey::single(LogicalButton::ScrollUp);
        let table = BindingTable::with_overrides([(k, Binding::Disabled)]).unwrap();
        assert_eq!(table.get(k), Binding::Disabled);
    }

    // ── Capabilities ──────────────────────────────────────────────────────────

    #[test]
    fn test_key_codes_include_bindings_and_mouse_buttons() {
        let keys = BindingTable::factory_default().key_codes();
        assert!(keys.contains(&key("KEY_CALC")));
        assert!(keys.contains(&key("KEY_SCREENLOCK")));
        assert!(keys.contains(&key("BTN_LEFT")));
        assert!(keys.contains(&key("BTN_RIGHT")));
    }

    #[test]
    fn test_relative_axes_include_configured_axis() {
        let k = BindingKey::single(LogicalButton::ScrollUp);
        let table = BindingTable::with_overrides([(
            k,
            Binding::RelativeAxis {
                axis: RelativeAxis::Y,
                step: 4,
            },
        )])
        .unwrap();
        let axes = table.relative_axes();
        assert!(axes.contains(&RelativeAxis::Y));
        assert!(axes.contains(&RelativeAxis::Wheel));
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_binding_parses_config_syntax() {
        assert_eq!("DISABLED".parse::<Binding>(), Ok(Binding::Disabled));
        assert_eq!("KEY_HOME".parse::<Binding>(), Ok(Binding::KeyTap(key("KEY_HOME"))));
        assert_eq!(
            "REL_WHEEL".parse::<Binding>(),
            Ok(Binding::RelativeAxis {
                axis: RelativeAxis::Wheel,
                step: 1
            })
        );
        assert_eq!(
            "REL_HWHEEL:-2".parse::<Binding>(),
            Ok(Binding::RelativeAxis {
                axis: RelativeAxis::HWheel,
                step: -2
            })
        );
    }

    #[test]
    fn test_binding_parse_errors() {
        assert!(matches!(
            "REL_WHEEL:lots".parse::<Binding>(),
            Err(BindingParseError::Step(_))
        ));
        assert!(matches!(
            "REL_TILT".parse::<Binding>(),
            Err(BindingParseError::Name(KeyNameError::UnknownAxis(_)))
        ));
        assert!(matches!(
            "KEY_NOPE".parse::<Binding>(),
            Err(BindingParseError::Name(KeyNameError::UnknownKey(_)))
        ));
    }

    #[test]
    fn test_binding_display_matches_config_syntax() {
        for text in ["DISABLED", "KEY_CALC", "REL_WHEEL", "REL_HWHEEL:3"] {
            assert_eq!(text.parse::<Binding>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_binding_key_config_names() {
        assert_eq!(BindingKey::double(LogicalButton::Side).config_name(), "DBL_SIDE");
        assert_eq!(
            BindingKey::from_config_name("DBL_PINKIE"),
            Some(BindingKey::double(LogicalButton::Pinkie))
        );
        assert_eq!(
            BindingKey::from_config_name("WHEEL_UP"),
            Some(BindingKey::single(LogicalButton::ScrollUp))
        );
        assert_eq!(BindingKey::from_config_name("DBL_NOPE"), None);
    }
}
