use std::collections::HashMap;

use super::{DescriptorError, Item, ItemTokenizer, ItemType, LinkRef, Usage};

const TAG_INPUT: u8 = 0x8;
const TAG_COLLECTION: u8 = 0xA;
const TAG_END_COLLECTION: u8 = 0xC;

const TAG_USAGE_PAGE: u8 = 0x0;
const TAG_LOGICAL_MINIMUM: u8 = 0x1;
const TAG_LOGICAL_MAXIMUM: u8 = 0x2;
const TAG_PHYSICAL_MINIMUM: u8 = 0x3;
const TAG_PHYSICAL_MAXIMUM: u8 = 0x4;
const TAG_REPORT_SIZE: u8 = 0x7;
const TAG_REPORT_ID: u8 = 0x8;
const TAG_REPORT_COUNT: u8 = 0x9;
const TAG_PUSH: u8 = 0xA;
const TAG_POP: u8 = 0xB;

const TAG_USAGE: u8 = 0x0;
const TAG_USAGE_MINIMUM: u8 = 0x1;
const TAG_USAGE_MAXIMUM: u8 = 0x2;

const FLAG_CONSTANT: u32 = 1 << 0;
const FLAG_VARIABLE: u32 = 1 << 1;
const FLAG_RELATIVE: u32 = 1 << 2;

const MAX_FIELD_BITS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Physical,
    Application,
    Logical,
    Report,
    NamedArray,
    UsageSwitch,
    UsageModifier,
    Other(u8),
}

impl From<u8> for CollectionKind {
    fn from(raw: u8) -> Self {
        match raw {
            0x00 => CollectionKind::Physical,
            0x01 => CollectionKind::Application,
            0x02 => CollectionKind::Logical,
            0x03 => CollectionKind::Report,
            0x04 => CollectionKind::NamedArray,
            0x05 => CollectionKind::UsageSwitch,
            0x06 => CollectionKind::UsageModifier,
            other => CollectionKind::Other(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCollection {
    pub usage: Option<Usage>,
    pub kind: CollectionKind,
    pub parent: Option<LinkRef>,
}

/// One input field of a report.
///
/// Variable items produce one field per report slot (`count == 1`). Array
/// items produce a single field whose `count` slots each hold an index into
/// `array_usages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportField {
    pub report_id: u8,
    pub link: LinkRef,
    pub usage: Usage,
    pub array_usages: Vec<Usage>,
    pub is_range: bool,
    pub is_absolute: bool,
    pub is_array: bool,
    pub bit_offset: u32,
    pub bit_size: u32,
    pub count: u32,
    pub logical_min: i32,
    pub logical_max: i32,
    pub physical_min: i32,
    pub physical_max: i32,
}

impl ReportField {
    /// Array fields and single-bit fields are buttons, everything else is a value.
    pub fn is_button(&self) -> bool {
        self.is_array || self.bit_size == 1
    }

    pub fn covers(&self, usage: Usage) -> bool {
        if self.is_array {
            self.array_usages.contains(&usage)
        } else {
            self.usage == usage
        }
    }
}

/// Everything the rest of the crate needs to know about a device's reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    collections: Vec<LinkCollection>,
    fields: Vec<ReportField>,
    uses_report_ids: bool,
}

impl ReportLayout {
    pub fn parse(descriptor: &[u8]) -> Result<Self, DescriptorError> {
        Parser::default().run(descriptor)
    }

    pub(crate) fn collections(&self) -> &[LinkCollection] {
        &self.collections
    }

    pub fn fields(&self) -> &[ReportField] {
        &self.fields
    }

    pub fn value_fields(&self) -> impl Iterator<Item = &ReportField> {
        self.fields.iter().filter(|f| !f.is_button())
    }

    pub fn button_fields(&self) -> impl Iterator<Item = &ReportField> {
        self.fields.iter().filter(|f| f.is_button())
    }

    /// Whether every report on the wire starts with a report id byte.
    pub fn uses_report_ids(&self) -> bool {
        self.uses_report_ids
    }

    /// Usages of the top-level application collections.
    pub fn application_usages(&self) -> impl Iterator<Item = Usage> + '_ {
        self.collections
            .iter()
            .filter(|c| c.parent.is_none() && c.kind == CollectionKind::Application)
            .filter_map(|c| c.usage)
    }
}

/// Signed and unsigned readings of one range bound; which one applies is
/// only known once both ends of the range are in.
#[derive(Debug, Clone, Copy, Default)]
struct Bound {
    signed: i32,
    unsigned: u32,
}

impl Bound {
    fn from_item(item: &Item<'_>) -> Self {
        Self {
            signed: item.signed(),
            unsigned: item.unsigned(),
        }
    }
}

fn resolve_range(min: Bound, max: Bound) -> (i32, i32) {
    let lo = min.signed;
    let hi = if lo < 0 {
        max.signed
    } else {
        i32::try_from(max.unsigned).unwrap_or(i32::MAX)
    };
    (lo, hi)
}

#[derive(Debug, Clone, Default)]
struct GlobalState {
    usage_page: u16,
    logical_min: Bound,
    logical_max: Bound,
    physical_min: Bound,
    physical_max: Bound,
    report_size: u32,
    report_id: u8,
    report_count: u32,
}

/// A usage as written in a local item; 4-byte usages carry their own page.
#[derive(Debug, Clone, Copy)]
struct LocalUsage {
    page: Option<u16>,
    id: u16,
}

impl LocalUsage {
    fn from_item(item: &Item<'_>) -> Self {
        let raw = item.unsigned();
        let page = (item.data.len() == 4).then_some((raw >> 16) as u16);
        Self {
            page,
            id: raw as u16,
        }
    }

    fn resolve(self, page: u16) -> Usage {
        Usage::new(self.page.unwrap_or(page), self.id)
    }
}

#[derive(Debug, Clone, Default)]
struct LocalState {
    usages: Vec<LocalUsage>,
    usage_min: Option<LocalUsage>,
    usage_max: Option<LocalUsage>,
}

impl LocalState {
    /// Usage for slot `index` of a variable item, and whether it came from a range.
    fn slot_usage(&self, index: u32, page: u16) -> Option<(Usage, bool)> {
        if let Some(last) = self.usages.len().checked_sub(1) {
            let usage = self.usages[(index as usize).min(last)];
            return Some((usage.resolve(page), false));
        }
        let (min, max) = (self.usage_min?, self.usage_max?);
        let id = min.id.saturating_add(index.min(u16::MAX as u32) as u16).min(max.id);
        Some((Usage::new(min.page.unwrap_or(page), id), true))
    }

    fn array_usages(&self, page: u16) -> (Vec<Usage>, bool) {
        if let (Some(min), Some(max)) = (self.usage_min, self.usage_max) {
            let page = min.page.unwrap_or(page);
            let usages = (min.id..=max.id).map(|id| Usage::new(page, id)).collect();
            return (usages, true);
        }
        let usages = self.usages.iter().map(|u| u.resolve(page)).collect();
        (usages, false)
    }
}

#[derive(Default)]
struct Parser {
    global: GlobalState,
    stack: Vec<GlobalState>,
    local: LocalState,
    collections: Vec<LinkCollection>,
    open: Vec<LinkRef>,
    fields: Vec<ReportField>,
    input_offsets: HashMap<u8, u32>,
    uses_report_ids: bool,
}

impl Parser {
    fn run(mut self, descriptor: &[u8]) -> Result<ReportLayout, DescriptorError> {
        for item in ItemTokenizer::new(descriptor) {
            let item = item?;
            match item.item_type {
                ItemType::Main => self.main_item(&item)?,
                ItemType::Global => self.global_item(&item)?,
                ItemType::Local => self.local_item(&item),
                ItemType::Reserved => {}
            }
        }

        if !self.open.is_empty() {
            return Err(DescriptorError::UnclosedCollection(self.open.len()));
        }

        Ok(ReportLayout {
            collections: self.collections,
            fields: self.fields,
            uses_report_ids: self.uses_report_ids,
        })
    }

    fn main_item(&mut self, item: &Item<'_>) -> Result<(), DescriptorError> {
        match item.tag {
            TAG_INPUT => self.input_item(item)?,
            TAG_COLLECTION => {
                let index = u16::try_from(self.collections.len())
                    .map_err(|_| DescriptorError::TooManyCollections)?;
                let page = self.global.usage_page;
                let usage = self
                    .local
                    .usages
                    .first()
                    .or(self.local.usage_min.as_ref())
                    .map(|u| u.resolve(page));
                self.collections.push(LinkCollection {
                    usage,
                    kind: CollectionKind::from(item.unsigned() as u8),
                    parent: self.open.last().copied(),
                });
                self.open.push(LinkRef(index));
            }
            TAG_END_COLLECTION => {
                self.open
                    .pop()
                    .ok_or(DescriptorError::UnbalancedCollection(item.offset))?;
            }
            // Output and Feature reports never carry touch data.
            _ => {}
        }
        self.local = LocalState::default();
        Ok(())
    }

    fn input_item(&mut self, item: &Item<'_>) -> Result<(), DescriptorError> {
        let link = *self
            .open
            .last()
            .ok_or(DescriptorError::FieldOutsideCollection(item.offset))?;
        let flags = item.unsigned();
        let g = &self.global;

        let offset = self.input_offsets.entry(g.report_id).or_insert(0);
        let start = *offset;
        *offset = g
            .report_size
            .checked_mul(g.report_count)
            .and_then(|bits| start.checked_add(bits))
            .ok_or(DescriptorError::ReportTooLarge(item.offset))?;

        if flags & FLAG_CONSTANT != 0 || g.report_count == 0 {
            return Ok(());
        }
        if g.report_size == 0 || g.report_size > MAX_FIELD_BITS {
            return Err(DescriptorError::UnsupportedReportSize {
                offset: item.offset,
                size: g.report_size,
            });
        }

        let (logical_min, logical_max) = resolve_range(g.logical_min, g.logical_max);
        let (mut physical_min, mut physical_max) = resolve_range(g.physical_min, g.physical_max);
        if physical_min == 0 && physical_max == 0 {
            physical_min = logical_min;
            physical_max = logical_max;
        }

        let template = ReportField {
            report_id: g.report_id,
            link,
            usage: Usage::new(g.usage_page, 0),
            array_usages: Vec::new(),
            is_range: false,
            is_absolute: flags & FLAG_RELATIVE == 0,
            is_array: false,
            bit_offset: start,
            bit_size: g.report_size,
            count: 1,
            logical_min,
            logical_max,
            physical_min,
            physical_max,
        };

        if flags & FLAG_VARIABLE == 0 {
            let (usages, is_range) = self.local.array_usages(g.usage_page);
            let Some(&first) = usages.first() else {
                return Ok(());
            };
            self.fields.push(ReportField {
                usage: first,
                array_usages: usages,
                is_range,
                is_array: true,
                count: g.report_count,
                ..template
            });
            return Ok(());
        }

        for index in 0..g.report_count {
            let Some((usage, is_range)) = self.local.slot_usage(index, g.usage_page) else {
                break;
            };
            self.fields.push(ReportField {
                usage,
                is_range,
                // below the end offset checked above
                bit_offset: start + index * g.report_size,
                ..template.clone()
            });
        }
        Ok(())
    }

    fn global_item(&mut self, item: &Item<'_>) -> Result<(), DescriptorError> {
        let g = &mut self.global;
        match item.tag {
            TAG_USAGE_PAGE => g.usage_page = item.unsigned() as u16,
            TAG_LOGICAL_MINIMUM => g.logical_min = Bound::from_item(item),
            TAG_LOGICAL_MAXIMUM => g.logical_max = Bound::from_item(item),
            TAG_PHYSICAL_MINIMUM => g.physical_min = Bound::from_item(item),
            TAG_PHYSICAL_MAXIMUM => g.physical_max = Bound::from_item(item),
            TAG_REPORT_SIZE => g.report_size = item.unsigned(),
            TAG_REPORT_ID => {
                g.report_id = item.unsigned() as u8;
                self.uses_report_ids = true;
            }
            TAG_REPORT_COUNT => g.report_count = item.unsigned(),
            TAG_PUSH => self.stack.push(self.global.clone()),
            TAG_POP => {
                self.global = self
                    .stack
                    .pop()
                    .ok_or(DescriptorError::GlobalStackUnderflow(item.offset))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn local_item(&mut self, item: &Item<'_>) {
        let usage = LocalUsage::from_item(item);
        match item.tag {
            TAG_USAGE => self.local.usages.push(usage),
            TAG_USAGE_MINIMUM => self.local.usage_min = Some(usage),
            TAG_USAGE_MAXIMUM => self.local.usage_max = Some(usage),
            _ => {}
        }
    }
}
