//! Forward touchpad reports to the pointer sink as absolute moves.
//! One finger drives the pointer; it stays primary until it lifts.

use super::hidraw::{HidrawDevice, MAX_REPORT_SIZE};
use crate::pointer::PointerSink;
use crate::tablet::{DescriptorSource, Tablet};
use crate::touch::PrimarySelector;

/// Read reports from `device` until it fails or becomes unusable.
pub fn run<S: DescriptorSource>(
    device: &mut HidrawDevice,
    tablet: &mut Tablet<S>,
    sink: &mut dyn PointerSink,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let id = device.id();
    let mut selector = PrimarySelector::new();
    let mut buf = [0u8; MAX_REPORT_SIZE];
    let mut count: u64 = 0;
    let mut moves: u64 = 0;

    log::info!("[touch] waiting for reports from {} (touch the pad)…", device.path().display());

    loop {
        let len = device.read_report(&mut buf)?;
        count += 1;
        if count == 1 {
            log::info!("[touch] first report received (reports are flowing)");
        }

        match tablet.handle(&mut selector, id, &buf[..len]) {
            Ok(Some(point)) => {
                sink.move_to(point)?;
                moves += 1;
                log::debug!("[touch] report #{} -> ({}, {})", count, point.x, point.y);
            }
            Ok(None) => {}
            Err(e) if e.is_fatal() => {
                return Err(format!("{}: {}", device.path().display(), e).into());
            }
            Err(e) => log::debug!("[touch] report #{} dropped: {}", count, e),
        }

        if count % 500 == 0 {
            log::debug!("[touch] reports: {}, pointer moves: {}", count, moves);
        }
    }
}
