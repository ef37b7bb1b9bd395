//! Map a touch position to the normalized absolute pointer range.
//!
//! The configured active area is a fraction of the physical sensor. That
//! fraction is applied to the observed calibration rectangle and centered in
//! it; the resulting sub-rectangle spans the whole screen.

use crate::calibration::CalibrationRect;
use crate::config::ActiveArea;
use crate::error::MapError;
use crate::touch::Point;

/// Largest coordinate of the absolute pointer axes.
pub const ABS_MAX: i32 = 65535;

const ABS_SPAN: f64 = 65536.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Pointer position in `0..=ABS_MAX` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsolutePoint {
    pub x: i32,
    pub y: i32,
}

pub fn map(
    point: Point,
    rect: &CalibrationRect,
    area: &ActiveArea,
    screen: ScreenSize,
) -> Result<AbsolutePoint, MapError> {
    let (Some(left), Some(right), Some(top), Some(bottom)) = (rect.left, rect.right, rect.top, rect.bottom)
    else {
        return Err(MapError::CalibrationIncomplete);
    };
    let x = map_axis(point.x, left, right, area.area_width / area.width, screen.width)?;
    let y = map_axis(point.y, top, bottom, area.area_height / area.height, screen.height)?;
    Ok(AbsolutePoint { x, y })
}

fn map_axis(value: i32, low: i32, high: i32, fraction: f64, screen: u32) -> Result<i32, MapError> {
    let bounds = f64::from(high) - f64::from(low);
    let active = bounds * fraction;
    if bounds <= 0.0 || !active.is_finite() || active <= 0.0 || screen == 0 {
        return Err(MapError::CalibrationIncomplete);
    }
    let offset = (bounds - active) / 2.0;
    let screen = f64::from(screen);

    let pixel = (f64::from(value) - f64::from(low) - offset) * screen / active;
    let normalized = (pixel * ABS_SPAN / screen).trunc();
    Ok(normalized.clamp(0.0, f64::from(ABS_MAX)) as i32)
}
