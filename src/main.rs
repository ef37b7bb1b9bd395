use std::path::{Path, PathBuf};

use clap::Parser;

use touchpad_tablet::input::{self, HidrawDevice, SysfsDescriptors};
use touchpad_tablet::{CalibrationTracker, Config, FileStore, Tablet, UinputPointer};

#[derive(Parser, Debug)]
#[command(name = "touchpad-tablet")]
#[command(about = "Use a precision touchpad as an absolute graphics tablet")]
struct Args {
    /// Sensor and active area sizes (Key=Value lines)
    #[arg(long, default_value = "config.txt")]
    config: PathBuf,

    /// Calibration file, rewritten whenever the observed bounds grow
    #[arg(long, default_value = "tpcalib.dat")]
    calibration: PathBuf,

    /// hidraw node to use instead of the first touchpad found
    #[arg(long)]
    device: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = Config::load(&args.config).unwrap_or_else(|e| {
        log::warn!("[touch] cannot read config, using defaults: {}", e);
        Config::default()
    });
    log::info!(
        "[touch] sensor {}x{}, active area {}x{}, screen {}x{}",
        config.area.width,
        config.area.height,
        config.area.area_width,
        config.area.area_height,
        config.screen.width,
        config.screen.height
    );

    let tracker = CalibrationTracker::load(Box::new(FileStore::new(&args.calibration)));
    let mut tablet = Tablet::new(SysfsDescriptors, tracker, config);

    let mut device = match &args.device {
        Some(path) => open_usable(path, &mut tablet)?
            .ok_or_else(|| format!("{} is not a usable touchpad", path.display()))?,
        None => find_touchpad(&mut tablet)?,
    };
    log::info!("[touch] using {} ({})", device.path().display(), device.id());

    log::info!("[pointer] creating uinput device…");
    let mut pointer = UinputPointer::create()?;

    input::run(&mut device, &mut tablet, &mut pointer)
}

/// First enumerated touchpad that parses into a usable profile.
fn find_touchpad(
    tablet: &mut Tablet<SysfsDescriptors>,
) -> Result<HidrawDevice, Box<dyn std::error::Error + Send + Sync>> {
    for path in input::enumerate_touchpads()? {
        match open_usable(&path, tablet) {
            Ok(Some(device)) => return Ok(device),
            Ok(None) => log::info!("[touch] {}: no usable contacts, skipping", path.display()),
            Err(e) => log::warn!("[touch] {}: {}", path.display(), e),
        }
    }
    Err("no usable precision touchpad found (check permissions on /dev/hidraw*)".into())
}

fn open_usable(
    path: &Path,
    tablet: &mut Tablet<SysfsDescriptors>,
) -> Result<Option<HidrawDevice>, Box<dyn std::error::Error + Send + Sync>> {
    let device = HidrawDevice::open(path)?;
    if tablet.is_usable_touch_digitizer(device.id()) {
        Ok(Some(device))
    } else {
        Ok(None)
    }
}
