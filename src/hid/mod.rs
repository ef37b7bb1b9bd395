//! HID report descriptor parsing and report field access.
//!
//! [`ReportLayout`] is what the parser builds from a descriptor: the link
//! collections of the device and every input field with its report id, bit
//! position and logical/physical range. Field readers in [`report`] take a
//! raw input report and pull values out by (usage, link collection).

mod item;
mod layout;
mod report;

use std::fmt;

pub(crate) use item::{Item, ItemTokenizer, ItemType};
pub(crate) use layout::{CollectionKind, LinkCollection};
pub use layout::{ReportField, ReportLayout};

pub const PAGE_GENERIC_DESKTOP: u16 = 0x01;
pub const PAGE_BUTTON: u16 = 0x09;
pub const PAGE_DIGITIZER: u16 = 0x0D;

/// A usage page and usage id pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Usage {
    pub page: u16,
    pub id: u16,
}

impl Usage {
    pub const X: Usage = Usage::new(PAGE_GENERIC_DESKTOP, 0x30);
    pub const Y: Usage = Usage::new(PAGE_GENERIC_DESKTOP, 0x31);
    pub const TOUCH_PAD: Usage = Usage::new(PAGE_DIGITIZER, 0x05);
    pub const FINGER: Usage = Usage::new(PAGE_DIGITIZER, 0x22);
    pub const TIP_SWITCH: Usage = Usage::new(PAGE_DIGITIZER, 0x42);
    pub const CONFIDENCE: Usage = Usage::new(PAGE_DIGITIZER, 0x47);
    pub const CONTACT_ID: Usage = Usage::new(PAGE_DIGITIZER, 0x51);
    pub const CONTACT_COUNT: Usage = Usage::new(PAGE_DIGITIZER, 0x54);

    pub const fn new(page: u16, id: u16) -> Self {
        Self { page, id }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}:{:#04x}", self.page, self.id)
    }
}

/// Index of a collection inside one device's report layout.
///
/// Collections are numbered from 0 in declaration order. A `LinkRef` means
/// nothing outside the layout that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkRef(pub u16);

impl fmt::Display for LinkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A report descriptor that cannot be turned into a [`ReportLayout`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("descriptor truncated in item at byte {0}")]
    Truncated(usize),
    #[error("end collection without open collection at byte {0}")]
    UnbalancedCollection(usize),
    #[error("{0} collection(s) left open at end of descriptor")]
    UnclosedCollection(usize),
    #[error("pop without matching push at byte {0}")]
    GlobalStackUnderflow(usize),
    #[error("input item outside any collection at byte {0}")]
    FieldOutsideCollection(usize),
    #[error("report size {size} at byte {offset} is not supported")]
    UnsupportedReportSize { offset: usize, size: u32 },
    #[error("input report grows past the addressable bit range at byte {0}")]
    ReportTooLarge(usize),
    #[error("too many collections")]
    TooManyCollections,
}

/// A query against a raw input report that the layout cannot answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("usage {usage} not present in link {link}")]
    UsageNotFound { usage: Usage, link: LinkRef },
    #[error("usage {usage} in link {link} is not part of report {report_id}")]
    IncompatibleReportId {
        usage: Usage,
        link: LinkRef,
        report_id: u8,
    },
    #[error("report of {len} bytes is too short for its declared fields")]
    ReportTooShort { len: usize },
    #[error("usage {usage} reports no value")]
    NullValue { usage: Usage },
}
