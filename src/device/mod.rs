mod cache;

use std::collections::BTreeMap;
use std::fmt;

pub use cache::ProfileCache;

use crate::error::{LayoutQueryError, ProfileError};
use crate::hid::{LinkRef, ReportLayout, Usage};

/// Opaque device handle, only ever compared. On Linux this is the hidraw
/// node's device number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u64);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A link collection that carries contact id, tip switch, X and Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactLink {
    pub link: LinkRef,
}

#[derive(Debug, Default, Clone, Copy)]
struct Capabilities {
    identity: bool,
    tip: bool,
    x: bool,
    y: bool,
}

impl Capabilities {
    fn complete(&self) -> bool {
        self.identity && self.tip && self.x && self.y
    }
}

/// Touch-relevant parts of a device's report layout, parsed once per device.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    layout: ReportLayout,
    contact_count_link: LinkRef,
    contacts: Vec<ContactLink>,
}

impl DeviceProfile {
    /// Parse a raw report descriptor and locate the contact fields.
    ///
    /// A link only counts as a contact if it has all four of contact id, tip
    /// switch, X and Y, per the precision touchpad collection requirements.
    /// Partial links are dropped. Contacts come out in link order.
    pub fn from_descriptor(descriptor: &[u8]) -> Result<Self, ProfileError> {
        let layout = ReportLayout::parse(descriptor).map_err(LayoutQueryError::from)?;
        Self::from_layout(layout)
    }

    pub fn from_layout(layout: ReportLayout) -> Result<Self, ProfileError> {
        let mut links: BTreeMap<LinkRef, Capabilities> = BTreeMap::new();
        let mut contact_count_link: Option<LinkRef> = None;

        for field in layout.value_fields() {
            if field.is_range || !field.is_absolute {
                continue;
            }
            match field.usage {
                Usage::X => links.entry(field.link).or_default().x = true,
                Usage::Y => links.entry(field.link).or_default().y = true,
                Usage::CONTACT_ID => links.entry(field.link).or_default().identity = true,
                Usage::CONTACT_COUNT => match contact_count_link {
                    None => contact_count_link = Some(field.link),
                    Some(first) if first != field.link => {
                        log::warn!(
                            "[hid] second contact count in link {}, keeping link {}",
                            field.link,
                            first
                        );
                    }
                    Some(_) => {}
                },
                _ => {}
            }
        }

        for field in layout.button_fields() {
            if field.covers(Usage::TIP_SWITCH) {
                links.entry(field.link).or_default().tip = true;
            }
        }

        let contact_count_link = contact_count_link.ok_or(ProfileError::MissingContactCountField)?;

        let contacts = links
            .into_iter()
            .filter(|(_, caps)| caps.complete())
            .map(|(link, _)| ContactLink { link })
            .collect::<Vec<_>>();
        for contact in &contacts {
            log::debug!("[hid] contact link {}", contact.link);
        }

        Ok(Self {
            layout,
            contact_count_link,
            contacts,
        })
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    pub fn contact_count_link(&self) -> LinkRef {
        self.contact_count_link
    }

    pub fn contacts(&self) -> &[ContactLink] {
        &self.contacts
    }

    /// A profile with no contact links is not a multitouch digitizer.
    pub fn is_touch_digitizer(&self) -> bool {
        !self.contacts.is_empty()
    }
}
