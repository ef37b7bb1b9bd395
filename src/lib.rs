//! Turn a precision touchpad into an absolute graphics tablet.
//!
//! Raw touchpad reports are parsed against the device's HID report
//! descriptor, the primary finger's position is mapped through a
//! self-growing calibration rectangle onto the screen, and the result is
//! injected as an absolute pointer position.

pub mod calibration;
pub mod config;
pub mod device;
pub mod error;
pub mod hid;
pub mod input;
pub mod mapper;
pub mod pointer;
pub mod tablet;
pub mod touch;

#[cfg(test)]
mod testutil;

pub use calibration::{CalibrationRect, CalibrationStore, CalibrationTracker, FileStore};
pub use config::{ActiveArea, Config};
pub use device::{ContactLink, DeviceId, DeviceProfile, ProfileCache};
pub use error::{HandleError, LayoutQueryError, MapError, ProfileError, StorageError};
pub use mapper::{AbsolutePoint, ScreenSize};
pub use pointer::{PointerSink, UinputPointer};
pub use tablet::{DescriptorSource, Tablet};
pub use touch::{Contact, Point, PrimarySelector};
