//! Linux uinput output via the `evdev` crate.
//!
//! # What is uinput? (for beginners)
//!
//! `/dev/uinput` lets a userspace process create a *virtual* input device.
//! Once created, the device appears under `/dev/input/event*` exactly like a
//! physical keyboard or mouse, and everything the process writes to it is
//! delivered to the desktop as real input.
//!
//! Creating the device requires declaring up front every key code and every
//! relative axis it may emit.  [`UinputSink::create`] derives that list from
//! the binding table, so the device exposes exactly what the configuration
//! can produce.
//!
//! # Event framing
//!
//! The kernel groups events into frames terminated by `SYN_REPORT`.
//! `VirtualDevice::emit` appends that terminator itself, so a key tap is two
//! emits (down, then up) and a wheel tick is one.
//!
//! # Permissions
//!
//! Opening `/dev/uinput` normally requires root or membership in a group with
//! write access (often `input` plus a udev rule).  A permission failure is
//! reported as `OutputError::Platform` when the sink is created.

use std::sync::{Mutex, MutexGuard};

use evdev::uinput::VirtualDevice;
use evdev::{AttributeSet, BusType, EventType, InputEvent, InputId, RelativeAxisCode};
use tourbox_core::{BindingTable, KeyCode, RelativeAxis};
use tracing::{debug, info, warn};

use crate::application::dispatch_event::{OutputError, OutputSink};

/// Name the virtual device registers under.
pub const DEVICE_NAME: &str = "Tourbox Neo Virtual Device Userland Driver (Keyboard/Mouse)";

/// USB vendor id reported by the physical console.
pub const VENDOR_ID: u16 = 0x2e3c;

/// USB product id reported by the physical console.
pub const PRODUCT_ID: u16 = 0x5740;

const KEY_DOWN: i32 = 1;
const KEY_UP: i32 = 0;

/// Virtual keyboard/mouse backed by `/dev/uinput`.
///
/// The device handle lives in a `Mutex<Option<_>>`: `None` after teardown.
/// Dropping the handle closes the file descriptor, which makes the kernel
/// destroy the virtual device.
pub struct UinputSink {
    device: Mutex<Option<VirtualDevice>>,
}

impl UinputSink {
    /// Creates the virtual device with every key and axis `table` can emit.
    ///
    /// # Errors
    ///
    /// Returns `OutputError::Platform` if `/dev/uinput` cannot be opened or
    /// the device cannot be created.
    pub fn create(table: &BindingTable) -> Result<Self, OutputError> {
        let mut keys = AttributeSet::<evdev::KeyCode>::new();
        for key in table.key_codes() {
            keys.insert(evdev::KeyCode::new(key.code()));
        }

        let mut axes = AttributeSet::<RelativeAxisCode>::new();
        for axis in table.relative_axes() {
            axes.insert(RelativeAxisCode(axis.code()));
        }

        let device = VirtualDevice::builder()
            .map_err(platform)?
            .name(DEVICE_NAME)
            .input_id(InputId::new(BusType::BUS_USB, VENDOR_ID, PRODUCT_ID, 1))
            .with_keys(&keys)
            .map_err(platform)?
            .with_relative_axes(&axes)
            .map_err(platform)?
            .build()
            .map_err(platform)?;

        info!(
            keys = keys.iter().count(),
            axes = axes.iter().count(),
            "virtual device created: {DEVICE_NAME}"
        );
        Ok(Self {
            device: Mutex::new(Some(device)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<VirtualDevice>>, OutputError> {
        self.device
            .lock()
            .map_err(|_| OutputError::Platform("uinput device lock poisoned".into()))
    }

    fn emit(&self, events: &[InputEvent]) -> Result<(), OutputError> {
        let mut guard = self.lock()?;
        let device = guard.as_mut().ok_or(OutputError::TornDown)?;
        device.emit(events).map_err(platform)
    }
}

impl OutputSink for UinputSink {
    fn emit_key_tap(&self, key: KeyCode) -> Result<(), OutputError> {
        let mut guard = self.lock()?;
        let device = guard.as_mut().ok_or(OutputError::TornDown)?;
        // Both halves under one lock so nothing can interleave.
        key_tap(key, |events| device.emit(events))
    }

    fn emit_relative(&self, axis: RelativeAxis, delta: i32) -> Result<(), OutputError> {
        self.emit(&[InputEvent::new(EventType::RELATIVE.0, axis.code(), delta)])
    }

    fn teardown(&self) -> Result<(), OutputError> {
        let mut guard = self.lock()?;
        if guard.take().is_some() {
            info!("virtual device destroyed");
        } else {
            debug!("virtual device already destroyed");
        }
        Ok(())
    }
}

impl Drop for UinputSink {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            warn!("virtual device teardown on drop failed: {e}");
        }
    }
}

/// Writes key-down then key-up through `emit`.
///
/// The key-up is attempted even when the key-down fails, since a partial
/// write may still have registered the press.  A failed key-up leaves the key
/// held on the virtual device and is logged as such.
fn key_tap<E>(key: KeyCode, mut emit: E) -> Result<(), OutputError>
where
    E: FnMut(&[InputEvent]) -> std::io::Result<()>,
{
    let down = emit(&[InputEvent::new(EventType::KEY.0, key.code(), KEY_DOWN)]);
    let up = emit(&[InputEvent::new(EventType::KEY.0, key.code(), KEY_UP)]);
    if let Err(e) = &up {
        warn!(%key, "key-up failed, key may be stuck: {e}");
    }
    down.and(up).map_err(platform)
}

fn platform(e: std::io::Error) -> OutputError {
    OutputError::Platform(e.to_string())
}
