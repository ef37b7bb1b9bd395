//! Split a HID report descriptor into items (HID 1.11, 6.2.2.1 - 6.2.2.3).

use super::DescriptorError;

const LONG_ITEM_HEADER: u8 = 0xFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Main,
    Global,
    Local,
    Reserved,
}

/// One short item. `offset` is the position of its header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item<'a> {
    pub item_type: ItemType,
    pub tag: u8,
    pub data: &'a [u8],
    pub offset: usize,
}

impl Item<'_> {
    /// Item data as a little-endian unsigned integer.
    pub fn unsigned(&self) -> u32 {
        self.data
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
    }

    /// Item data as a little-endian two's complement integer.
    pub fn signed(&self) -> i32 {
        let raw = self.unsigned();
        match self.data.len() {
            1 => raw as u8 as i8 as i32,
            2 => raw as u16 as i16 as i32,
            _ => raw as i32,
        }
    }
}

/// Iterator over the short items of a descriptor. Long items are skipped,
/// nothing in the HID usage tables defines one.
pub struct ItemTokenizer<'a> {
    descriptor: &'a [u8],
    position: usize,
}

impl<'a> ItemTokenizer<'a> {
    pub fn new(descriptor: &'a [u8]) -> Self {
        Self {
            descriptor,
            position: 0,
        }
    }

    fn take(&mut self, len: usize, item_offset: usize) -> Result<&'a [u8], DescriptorError> {
        let end = self.position + len;
        let bytes = self
            .descriptor
            .get(self.position..end)
            .ok_or(DescriptorError::Truncated(item_offset))?;
        self.position = end;
        Ok(bytes)
    }
}

impl<'a> Iterator for ItemTokenizer<'a> {
    type Item = Result<Item<'a>, DescriptorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let offset = self.position;
            let header = *self.descriptor.get(offset)?;
            self.position += 1;

            if header == LONG_ITEM_HEADER {
                let len = match self.take(2, offset) {
                    Ok(bytes) => bytes[0] as usize,
                    Err(e) => return Some(Err(e)),
                };
                if let Err(e) = self.take(len, offset) {
                    return Some(Err(e));
                }
                continue;
            }

            let size = match header & 0x03 {
                3 => 4,
                n => n as usize,
            };
            let item_type = match (header >> 2) & 0x03 {
                0 => ItemType::Main,
                1 => ItemType::Global,
                2 => ItemType::Local,
                _ => ItemType::Reserved,
            };
            let tag = header >> 4;

            return Some(self.take(size, offset).map(|data| Item {
                item_type,
                tag,
                data,
                offset,
            }));
        }
    }
}
