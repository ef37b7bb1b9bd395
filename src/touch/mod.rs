//! Pull the active finger contacts out of one touchpad input report.

mod primary;

pub use primary::PrimarySelector;

use crate::device::DeviceProfile;
use crate::error::LayoutQueryError;
use crate::hid::{LinkRef, ReportError, Usage, PAGE_DIGITIZER};

/// A position in the device's physical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One finger currently on the pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub id: u32,
    pub link: LinkRef,
    pub point: Point,
}

/// Contacts whose tip switch is set, in the profile's link order.
///
/// The device's contact count is trusted as-is and clamped to the number of
/// contact links. Slots past the count are stale and never read. A slot whose
/// X or Y holds no value is skipped. Reports that do not carry the contact
/// count (other top-level collections sharing the node) yield nothing.
pub fn extract(profile: &DeviceProfile, report: &[u8]) -> Result<Vec<Contact>, LayoutQueryError> {
    if report.is_empty() {
        return Ok(Vec::new());
    }
    let layout = profile.layout();

    let reported = match layout.usage_value(report, Usage::CONTACT_COUNT, profile.contact_count_link()) {
        Ok(count) => count,
        Err(ReportError::IncompatibleReportId { report_id, .. }) => {
            log::trace!("[touch] ignoring report {}", report_id);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    let count = (reported as usize).min(profile.contacts().len());

    let mut contacts = Vec::with_capacity(count);
    for slot in &profile.contacts()[..count] {
        let link = slot.link;
        let pressed = layout.usages(report, PAGE_DIGITIZER, link)?;
        if !pressed.contains(&Usage::TIP_SWITCH) {
            continue;
        }

        let id = layout.usage_value(report, Usage::CONTACT_ID, link)?;
        let x = scaled_or_none(layout.scaled_usage_value(report, Usage::X, link))?;
        let y = scaled_or_none(layout.scaled_usage_value(report, Usage::Y, link))?;
        let (Some(x), Some(y)) = (x, y) else {
            log::trace!("[touch] contact {} in link {} has no position", id, link);
            continue;
        };

        contacts.push(Contact {
            id,
            link,
            point: Point::new(x, y),
        });
    }
    Ok(contacts)
}

fn scaled_or_none(value: Result<i32, ReportError>) -> Result<Option<i32>, ReportError> {
    match value {
        Ok(v) => Ok(Some(v)),
        Err(ReportError::NullValue { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{physical_x, physical_y, ptp_descriptor, ptp_report, Finger, MOUSE_REPORT_ID};
    use proptest::prelude::*;

    fn profile(fingers: usize) -> DeviceProfile {
        DeviceProfile::from_descriptor(&ptp_descriptor(fingers)).unwrap()
    }

    #[test]
    fn two_fingers_down() {
        let profile = profile(3);
        let report = ptp_report(
            &[
                Finger { tip: true, id: 3, x: 100, y: 200 },
                Finger { tip: true, id: 7, x: 4000, y: 50 },
                Finger::default(),
            ],
            2,
        );
        let contacts = extract(&profile, &report).unwrap();
        assert_eq!(
            contacts,
            vec![
                Contact {
                    id: 3,
                    link: LinkRef(1),
                    point: Point::new(physical_x(100), physical_y(200)),
                },
                Contact {
                    id: 7,
                    link: LinkRef(2),
                    point: Point::new(physical_x(4000), physical_y(50)),
                },
            ]
        );
    }

    #[test]
    fn lifted_finger_is_dropped() {
        let profile = profile(2);
        let report = ptp_report(
            &[
                Finger { tip: false, id: 3, x: 100, y: 200 },
                Finger { tip: true, id: 7, x: 300, y: 400 },
            ],
            2,
        );
        let ids: Vec<u32> = extract(&profile, &report).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![7]);
    }

    #[test]
    fn slots_past_the_count_are_not_read() {
        let profile = profile(2);
        let report = ptp_report(
            &[
                Finger { tip: true, id: 1, x: 10, y: 10 },
                Finger { tip: true, id: 2, x: 20, y: 20 },
            ],
            1,
        );
        assert_eq!(extract(&profile, &report).unwrap().len(), 1);
    }

    #[test]
    fn count_is_clamped_to_declared_links() {
        let profile = profile(1);
        let report = ptp_report(&[Finger { tip: true, id: 1, x: 10, y: 10 }], 5);
        assert_eq!(extract(&profile, &report).unwrap().len(), 1);
    }

    #[test]
    fn null_position_skips_the_contact() {
        let profile = profile(1);
        let report = ptp_report(&[Finger { tip: true, id: 1, x: 0xffff, y: 10 }], 1);
        assert!(extract(&profile, &report).unwrap().is_empty());
    }

    #[test]
    fn empty_and_foreign_reports_give_nothing() {
        let profile = profile(2);
        assert!(extract(&profile, &[]).unwrap().is_empty());
        let mouse = [MOUSE_REPORT_ID, 0x01, 0x05, 0xfb];
        assert!(extract(&profile, &mouse).unwrap().is_empty());
    }

    #[test]
    fn truncated_report_is_an_error() {
        let profile = profile(2);
        let report = ptp_report(&[Finger::default(), Finger::default()], 2);
        let err = extract(&profile, &report[..4]).unwrap_err();
        assert!(matches!(err, LayoutQueryError::Report(ReportError::ReportTooShort { .. })));
    }

    fn finger() -> impl Strategy<Value = Finger> {
        (any::<bool>(), 0u8..16, any::<u16>(), any::<u16>())
            .prop_map(|(tip, id, x, y)| Finger { tip, id, x, y })
    }

    proptest! {
        #[test]
        fn never_more_than_count_or_links(
            fingers in prop::collection::vec(finger(), 1..6),
            count in 0u8..10,
        ) {
            let profile = profile(fingers.len());
            let report = ptp_report(&fingers, count);
            let contacts = extract(&profile, &report).unwrap();
            prop_assert!(contacts.len() <= (count as usize).min(fingers.len()));
        }

        #[test]
        fn never_returns_a_lifted_contact(
            fingers in prop::collection::vec(finger(), 1..6),
            count in 0u8..10,
        ) {
            let profile = profile(fingers.len());
            let report = ptp_report(&fingers, count);
            for contact in extract(&profile, &report).unwrap() {
                // finger n sits in link n + 1
                let slot = &fingers[contact.link.0 as usize - 1];
                prop_assert!(slot.tip);
                prop_assert_eq!(contact.id, u32::from(slot.id));
            }
        }
    }
}
