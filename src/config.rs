//! `config.txt`: `Key=Value` lines, `#` starts a comment line.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::StorageError;
use crate::mapper::ScreenSize;

/// Physical sensor size and the part of it that spans the screen, in the
/// same unit (usually millimetres).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveArea {
    pub width: f64,
    pub height: f64,
    pub area_width: f64,
    pub area_height: f64,
}

/// 110x51 mm: the touchpad of the laptop this tool was first written on.
/// Other machines should set their own sizes in `config.txt`.
impl Default for ActiveArea {
    fn default() -> Self {
        Self {
            width: 110.0,
            height: 51.0,
            area_width: 110.0,
            area_height: 51.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    pub area: ActiveArea,
    pub screen: ScreenSize,
}

impl Config {
    /// Read `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("[touch] {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(StorageError::Unavailable {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Bad values are skipped with a warning and the default stays.
    pub fn parse(content: &str) -> Self {
        let defaults = Self::default();
        let mut width = defaults.area.width;
        let mut height = defaults.area.height;
        let mut area_width = None;
        let mut area_height = None;
        let mut screen = defaults.screen;

        for (line_num, line) in content.lines().enumerate() {
            let line_number = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                log::warn!("[touch] config line {}: expected Key=Value: {}", line_number, trimmed);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "Width" => set_length(&mut width, key, value, line_number),
                "Height" => set_length(&mut height, key, value, line_number),
                "AreaWidth" => set_optional_length(&mut area_width, key, value, line_number),
                "AreaHeight" => set_optional_length(&mut area_height, key, value, line_number),
                "ScreenWidth" => set_pixels(&mut screen.width, key, value, line_number),
                "ScreenHeight" => set_pixels(&mut screen.height, key, value, line_number),
                _ => log::debug!("[touch] config line {}: ignoring unknown key {}", line_number, key),
            }
        }

        Self {
            area: ActiveArea {
                width,
                height,
                area_width: area_width.unwrap_or(width),
                area_height: area_height.unwrap_or(height),
            },
            screen,
        }
    }
}

fn parse_length(key: &str, value: &str, line: usize) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            log::warn!("[touch] config line {}: bad {} value {:?}, keeping default", line, key, value);
            None
        }
    }
}

fn set_length(target: &mut f64, key: &str, value: &str, line: usize) {
    if let Some(v) = parse_length(key, value, line) {
        *target = v;
    }
}

fn set_optional_length(target: &mut Option<f64>, key: &str, value: &str, line: usize) {
    if let Some(v) = parse_length(key, value, line) {
        *target = Some(v);
    }
}

fn set_pixels(target: &mut u32, key: &str, value: &str, line: usize) {
    match value.parse::<u32>() {
        Ok(v) if v > 0 => *target = v,
        _ => log::warn!("[touch] config line {}: bad {} value {:?}, keeping default", line, key, value),
    }
}
