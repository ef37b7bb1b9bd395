//! Self-calibrating bounds of the touch surface.
//!
//! Every contact grows the observed rectangle; nothing ever shrinks it. The
//! rectangle is written back after every change so a restart keeps it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::touch::Point;

/// Written in place of a bound that has not been observed yet.
const UNSET: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalibrationRect {
    pub left: Option<i32>,
    pub right: Option<i32>,
    pub top: Option<i32>,
    pub bottom: Option<i32>,
}

impl CalibrationRect {
    pub fn is_complete(&self) -> bool {
        self.left.is_some() && self.right.is_some() && self.top.is_some() && self.bottom.is_some()
    }

    fn bounds(&self) -> [Option<i32>; 4] {
        [self.left, self.right, self.top, self.bottom]
    }
}

/// Where the calibration rectangle lives between runs.
pub trait CalibrationStore {
    /// `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> Result<Option<CalibrationRect>, StorageError>;
    fn save(&self, rect: &CalibrationRect) -> Result<(), StorageError>;
}

/// Four newline-separated integers: left, right, top, bottom.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, source: io::Error) -> StorageError {
        StorageError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }
}

impl CalibrationStore for FileStore {
    fn load(&self) -> Result<Option<CalibrationRect>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.unavailable(e)),
        };

        let mut bounds = [None; 4];
        let mut lines = text.lines();
        for (i, bound) in bounds.iter_mut().enumerate() {
            let malformed = || StorageError::Malformed {
                path: self.path.clone(),
                line: i + 1,
            };
            let value: i32 = lines
                .next()
                .ok_or_else(malformed)?
                .trim()
                .parse()
                .map_err(|_| malformed())?;
            *bound = (value != UNSET).then_some(value);
        }
        let [left, right, top, bottom] = bounds;
        Ok(Some(CalibrationRect {
            left,
            right,
            top,
            bottom,
        }))
    }

    /// Replace the file atomically: write a sibling temp file, then rename it over the target.
    fn save(&self, rect: &CalibrationRect) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.unavailable(e))?;
        for bound in rect.bounds() {
            writeln!(tmp, "{}", bound.unwrap_or(UNSET)).map_err(|e| self.unavailable(e))?;
        }
        tmp.as_file().sync_all().map_err(|e| self.unavailable(e))?;
        tmp.persist(&self.path).map_err(|e| self.unavailable(e.error))?;
        Ok(())
    }
}

/// Grows the calibration rectangle from observed contacts and persists it.
pub struct CalibrationTracker {
    rect: CalibrationRect,
    store: Box<dyn CalibrationStore>,
}

impl CalibrationTracker {
    pub fn load(store: Box<dyn CalibrationStore>) -> Self {
        let rect = match store.load() {
            Ok(Some(rect)) => {
                log::info!(
                    "[calib] loaded bounds left={:?} right={:?} top={:?} bottom={:?}",
                    rect.left,
                    rect.right,
                    rect.top,
                    rect.bottom
                );
                if !rect.is_complete() {
                    log::info!("[calib] calibration incomplete: keep sliding over the edges");
                }
                rect
            }
            Ok(None) => {
                log::info!("[calib] not calibrated: slide a finger over all four edges of the touchpad");
                CalibrationRect::default()
            }
            Err(e) => {
                log::warn!("[calib] cannot load calibration, starting over: {}", e);
                CalibrationRect::default()
            }
        };
        Self { rect, store }
    }

    /// Widen the rectangle to include `point`. Returns whether any bound moved.
    pub fn observe(&mut self, point: Point) -> bool {
        let mut changed = false;
        if grow(&mut self.rect.left, point.x, |new, old| new < old) {
            self.persist("left");
            changed = true;
        }
        if grow(&mut self.rect.right, point.x, |new, old| new > old) {
            self.persist("right");
            changed = true;
        }
        if grow(&mut self.rect.top, point.y, |new, old| new < old) {
            self.persist("top");
            changed = true;
        }
        if grow(&mut self.rect.bottom, point.y, |new, old| new > old) {
            self.persist("bottom");
            changed = true;
        }
        changed
    }

    pub fn current(&self) -> CalibrationRect {
        self.rect
    }

    fn persist(&self, bound: &str) {
        log::debug!("[calib] {} bound moved: {:?}", bound, self.rect);
        if let Err(e) = self.store.save(&self.rect) {
            log::warn!("[calib] cannot save calibration: {}", e);
        }
    }
}

fn grow(bound: &mut Option<i32>, value: i32, wider: impl Fn(i32, i32) -> bool) -> bool {
    match *bound {
        Some(old) if !wider(value, old) => false,
        _ => {
            *bound = Some(value);
            true
        }
    }
}
