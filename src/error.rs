//! Error types shared across the touch pipeline.

use std::io;
use std::path::PathBuf;

use crate::hid::{DescriptorError, ReportError};

/// A query against a device's report layout failed. Fatal for that device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutQueryError {
    #[error("invalid report descriptor: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("report query failed: {0}")]
    Report(#[from] ReportError),
    #[error("report descriptor unavailable: {0}")]
    Unavailable(String),
}

/// Why a device cannot be used as a touchpad.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Layout(#[from] LayoutQueryError),
    #[error("no contact count usage found")]
    MissingContactCountField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("calibration incomplete")]
    CalibrationIncomplete,
}

/// Calibration or configuration storage could not be used.
///
/// Never fatal: callers fall back to defaults or stay uncalibrated.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: malformed line {line}", path.display())]
    Malformed { path: PathBuf, line: usize },
}

/// Outcome of handling one input report that did not produce a pointer move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    #[error("device unusable: {0}")]
    Device(#[from] ProfileError),
    #[error(transparent)]
    Map(#[from] MapError),
}

impl HandleError {
    /// Fatal errors disqualify the device; the rest only drop the current event.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HandleError::Device(_))
    }
}
