use std::collections::HashMap;

use super::{DeviceId, DeviceProfile};
use crate::error::{LayoutQueryError, ProfileError};

/// Device profiles keyed by device, built at most once per device.
///
/// Failures are remembered as well: a device whose descriptor could not be
/// used stays unusable, it is never parsed again.
#[derive(Debug, Default)]
pub struct ProfileCache {
    profiles: HashMap<DeviceId, Result<DeviceProfile, ProfileError>>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached profile for `id`, parsing the descriptor from `fetch`
    /// the first time the device is seen.
    pub fn get_or_build<F>(&mut self, id: DeviceId, fetch: F) -> Result<&DeviceProfile, ProfileError>
    where
        F: FnOnce() -> Result<Vec<u8>, LayoutQueryError>,
    {
        let entry = self.profiles.entry(id).or_insert_with(|| {
            let profile = fetch()
                .map_err(ProfileError::from)
                .and_then(|descriptor| DeviceProfile::from_descriptor(&descriptor));
            match &profile {
                Ok(p) => log::info!(
                    "[hid] device {}: {} contact link(s), contact count in link {}",
                    id,
                    p.contacts().len(),
                    p.contact_count_link()
                ),
                Err(e) => log::warn!("[hid] device {} unusable: {}", id, e),
            }
            profile
        });
        entry.as_ref().map_err(Clone::clone)
    }

    /// Mark a device unusable after a fatal failure found while handling its reports.
    pub fn disqualify(&mut self, id: DeviceId, err: ProfileError) {
        log::warn!("[hid] device {} disqualified: {}", id, err);
        self.profiles.insert(id, Err(err));
    }

    /// True only if the device parses into a profile with at least one contact link.
    pub fn is_usable_touch_digitizer<F>(&mut self, id: DeviceId, fetch: F) -> bool
    where
        F: FnOnce() -> Result<Vec<u8>, LayoutQueryError>,
    {
        self.get_or_build(id, fetch)
            .map(DeviceProfile::is_touch_digitizer)
            .unwrap_or(false)
    }
}
