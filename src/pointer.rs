//! Absolute pointer output through a uinput device.

use evdevil::event::{Abs, AbsEvent, Key, Syn, SynEvent};
use evdevil::uinput::{AbsSetup, UinputDevice};
use evdevil::{AbsInfo, Bus, InputId, InputProp};

use crate::mapper::{AbsolutePoint, ABS_MAX};

/// Something that can move the system pointer to an absolute position.
pub trait PointerSink {
    fn move_to(&mut self, point: AbsolutePoint) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A virtual absolute pointer, laid out like a USB tablet so desktops treat
/// it as a mouse that jumps instead of one that moves by deltas.
pub struct UinputPointer {
    device: UinputDevice,
}

impl UinputPointer {
    pub const NAME: &'static str = "Touchpad Tablet";

    pub fn create() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let axes = [
            AbsSetup::new(Abs::X, AbsInfo::new(0, ABS_MAX)),
            AbsSetup::new(Abs::Y, AbsInfo::new(0, ABS_MAX)),
        ];
        // Buttons are never pressed; they are declared so the device is classified as a pointer.
        let device = UinputDevice::builder()?
            .with_input_id(InputId::new(Bus::VIRTUAL, 0x0000, 0x0001, 0))? // BUS_VIRTUAL
            .with_props([InputProp::POINTER])?
            .with_abs_axes(axes)?
            .with_keys([Key::BTN_LEFT, Key::BTN_RIGHT, Key::BTN_MIDDLE])?
            .build(Self::NAME)?;
        if let Ok(name) = device.sysname() {
            log::info!(
                "[pointer] uinput device created: /sys/devices/virtual/input/{}",
                name.to_string_lossy()
            );
        }
        Ok(Self { device })
    }
}

impl PointerSink for UinputPointer {
    fn move_to(&mut self, point: AbsolutePoint) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.device.write(&[
            AbsEvent::new(Abs::X, point.x).into(),
            AbsEvent::new(Abs::Y, point.y).into(),
            SynEvent::new(Syn::REPORT).into(),
        ])?;
        Ok(())
    }
}
