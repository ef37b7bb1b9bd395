mod hidraw;
mod touch;

pub use hidraw::{declares_touchpad, enumerate_touchpads, HidrawDevice, SysfsDescriptors, MAX_REPORT_SIZE};
pub use touch::run;
