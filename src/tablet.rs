//! The touch pipeline: raw report in, absolute pointer position out.

use crate::calibration::CalibrationTracker;
use crate::config::{ActiveArea, Config};
use crate::device::{DeviceId, ProfileCache};
use crate::error::{HandleError, LayoutQueryError, ProfileError};
use crate::mapper::{self, AbsolutePoint, ScreenSize};
use crate::touch::{self, PrimarySelector};

/// Supplies the raw report descriptor of a device.
pub trait DescriptorSource {
    fn report_descriptor(&self, id: DeviceId) -> Result<Vec<u8>, LayoutQueryError>;
}

impl<F> DescriptorSource for F
where
    F: Fn(DeviceId) -> Result<Vec<u8>, LayoutQueryError>,
{
    fn report_descriptor(&self, id: DeviceId) -> Result<Vec<u8>, LayoutQueryError> {
        self(id)
    }
}

pub struct Tablet<S> {
    source: S,
    cache: ProfileCache,
    tracker: CalibrationTracker,
    area: ActiveArea,
    screen: ScreenSize,
}

impl<S: DescriptorSource> Tablet<S> {
    pub fn new(source: S, tracker: CalibrationTracker, config: Config) -> Self {
        Self {
            source,
            cache: ProfileCache::new(),
            tracker,
            area: config.area,
            screen: config.screen,
        }
    }

    /// Process one input report from `id`.
    ///
    /// Every contact widens the calibration first; the primary contact is then
    /// mapped against the updated bounds. `Ok(None)` means no finger is down
    /// or the report was not a touch report.
    pub fn handle(
        &mut self,
        selector: &mut PrimarySelector,
        id: DeviceId,
        payload: &[u8],
    ) -> Result<Option<AbsolutePoint>, HandleError> {
        let source = &self.source;
        let profile = self.cache.get_or_build(id, || source.report_descriptor(id))?;

        let contacts = match touch::extract(profile, payload) {
            Ok(contacts) => contacts,
            Err(e) => {
                let err = ProfileError::from(e);
                self.cache.disqualify(id, err.clone());
                return Err(err.into());
            }
        };

        for contact in &contacts {
            if self.tracker.observe(contact.point) {
                log::trace!("[calib] widened by contact {} at {:?}", contact.id, contact.point);
            }
        }

        let Some(primary) = selector.select(&contacts) else {
            return Ok(None);
        };
        let point = mapper::map(primary.point, &self.tracker.current(), &self.area, self.screen)?;
        log::trace!("[touch] contact {} {:?} -> {:?}", primary.id, primary.point, point);
        Ok(Some(point))
    }

    pub fn is_usable_touch_digitizer(&mut self, id: DeviceId) -> bool {
        let source = &self.source;
        self.cache.is_usable_touch_digitizer(id, || source.report_descriptor(id))
    }

    pub fn tracker(&self) -> &CalibrationTracker {
        &self.tracker
    }
}
