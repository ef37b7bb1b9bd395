//! Raw HID access through Linux hidraw nodes.

use std::fs::{self, File};
use std::io::{self, Read};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::device::DeviceId;
use crate::error::LayoutQueryError;
use crate::hid::{ReportLayout, Usage};
use crate::tablet::DescriptorSource;

const HIDRAW_CLASS: &str = "/sys/class/hidraw";

/// Largest report a hidraw node hands out in one read.
pub const MAX_REPORT_SIZE: usize = 4096;

/// An open `/dev/hidrawN` node.
pub struct HidrawDevice {
    path: PathBuf,
    file: File,
    id: DeviceId,
}

impl HidrawDevice {
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        let id = DeviceId(file.metadata()?.rdev());
        Ok(Self {
            path: path.to_path_buf(),
            file,
            id,
        })
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the next input report. Returns its length in `buf`.
    pub fn read_report(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// Reads descriptors from sysfs, finding the node by its device number.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysfsDescriptors;

impl DescriptorSource for SysfsDescriptors {
    fn report_descriptor(&self, id: DeviceId) -> Result<Vec<u8>, LayoutQueryError> {
        let path = descriptor_path(id);
        log::debug!("[hid] reading {}", path.display());
        fs::read(&path).map_err(|e| LayoutQueryError::Unavailable(format!("{}: {}", path.display(), e)))
    }
}

fn descriptor_path(id: DeviceId) -> PathBuf {
    let dev = id.0 as libc::dev_t;
    PathBuf::from(format!(
        "/sys/dev/char/{}:{}/device/report_descriptor",
        libc::major(dev),
        libc::minor(dev)
    ))
}

/// Whether a descriptor declares a Digitizer / Touch Pad application collection.
pub fn declares_touchpad(descriptor: &[u8]) -> bool {
    match ReportLayout::parse(descriptor) {
        Ok(layout) => layout.application_usages().any(|u| u == Usage::TOUCH_PAD),
        Err(e) => {
            log::debug!("[hid] skipping unparsable descriptor: {}", e);
            false
        }
    }
}

/// `/dev/hidrawN` paths of every node whose descriptor declares a touchpad.
pub fn enumerate_touchpads() -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(HIDRAW_CLASS)? {
        let entry = entry?;
        let descriptor = match fs::read(entry.path().join("device/report_descriptor")) {
            Ok(d) => d,
            Err(e) => {
                log::debug!("[hid] {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if declares_touchpad(&descriptor) {
            found.push(Path::new("/dev").join(entry.file_name()));
        }
    }
    found.sort();
    log::debug!("[hid] touchpad candidates: {:?}", found);
    Ok(found)
}
