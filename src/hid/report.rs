//! Read field values out of raw input reports.

use super::{LinkRef, ReportError, ReportField, ReportLayout, Usage};

impl ReportLayout {
    /// Report id of a raw input report; 0 when the device does not number its reports.
    pub fn report_id(&self, report: &[u8]) -> Option<u8> {
        if self.uses_report_ids() {
            report.first().copied()
        } else {
            Some(0)
        }
    }

    fn report_data<'a>(&self, report: &'a [u8]) -> &'a [u8] {
        if self.uses_report_ids() {
            report.get(1..).unwrap_or_default()
        } else {
            report
        }
    }

    /// Find the field carrying `usage` in `link` for the report at hand.
    fn find_field(
        &self,
        report: &[u8],
        usage: Usage,
        link: LinkRef,
        buttons: bool,
    ) -> Result<Vec<&ReportField>, ReportError> {
        let report_id = self
            .report_id(report)
            .ok_or(ReportError::ReportTooShort { len: report.len() })?;
        let candidates: Vec<&ReportField> = self
            .fields()
            .iter()
            .filter(|f| f.link == link && f.is_button() == buttons)
            .filter(|f| {
                if buttons {
                    f.usage.page == usage.page
                } else {
                    f.covers(usage)
                }
            })
            .collect();

        if candidates.is_empty() {
            return Err(ReportError::UsageNotFound { usage, link });
        }
        let matching: Vec<&ReportField> = candidates
            .into_iter()
            .filter(|f| f.report_id == report_id)
            .collect();
        if matching.is_empty() {
            return Err(ReportError::IncompatibleReportId {
                usage,
                link,
                report_id,
            });
        }
        Ok(matching)
    }

    fn raw_bits(&self, report: &[u8], field: &ReportField, slot: u32) -> Result<u32, ReportError> {
        slot.checked_mul(field.bit_size)
            .and_then(|bits| field.bit_offset.checked_add(bits))
            .and_then(|offset| extract_bits(self.report_data(report), offset, field.bit_size))
            .ok_or(ReportError::ReportTooShort { len: report.len() })
    }

    /// Logical value of a value field, as raw unsigned bits.
    pub fn usage_value(&self, report: &[u8], usage: Usage, link: LinkRef) -> Result<u32, ReportError> {
        let fields = self.find_field(report, usage, link, false)?;
        self.raw_bits(report, fields[0], 0)
    }

    /// Value of a value field scaled from its logical into its physical range.
    ///
    /// A logical value outside the declared logical range is the field's null
    /// state and yields [`ReportError::NullValue`].
    pub fn scaled_usage_value(
        &self,
        report: &[u8],
        usage: Usage,
        link: LinkRef,
    ) -> Result<i32, ReportError> {
        let fields = self.find_field(report, usage, link, false)?;
        let field = fields[0];
        let raw = self.raw_bits(report, field, 0)?;
        let logical = if field.logical_min < 0 {
            sign_extend(raw, field.bit_size)
        } else {
            i64::from(raw)
        };

        let (lmin, lmax) = (i64::from(field.logical_min), i64::from(field.logical_max));
        if logical < lmin || logical > lmax || lmin == lmax {
            return Err(ReportError::NullValue { usage });
        }

        let (pmin, pmax) = (i64::from(field.physical_min), i64::from(field.physical_max));
        let physical = pmin + (logical - lmin) * (pmax - pmin) / (lmax - lmin);
        i32::try_from(physical).map_err(|_| ReportError::NullValue { usage })
    }

    /// Button usages on `page` that are set in `link` for this report.
    pub fn usages(&self, report: &[u8], page: u16, link: LinkRef) -> Result<Vec<Usage>, ReportError> {
        let fields = self.find_field(report, Usage::new(page, 0), link, true)?;
        let mut pressed = Vec::new();
        for field in fields {
            if !field.is_array {
                if self.raw_bits(report, field, 0)? != 0 {
                    pressed.push(field.usage);
                }
                continue;
            }
            for slot in 0..field.count {
                let value = i64::from(self.raw_bits(report, field, slot)?);
                let index = value - i64::from(field.logical_min);
                if value > i64::from(field.logical_max) || index < 0 {
                    continue;
                }
                if let Some(&usage) = field.array_usages.get(index as usize) {
                    if usage.id != 0 {
                        pressed.push(usage);
                    }
                }
            }
        }
        Ok(pressed)
    }
}

/// Little-endian, LSB-first bit extraction of up to 32 bits.
fn extract_bits(data: &[u8], offset: u32, size: u32) -> Option<u32> {
    if size == 0 || size > 32 {
        return None;
    }
    let end = offset as usize + size as usize;
    if end > data.len() * 8 {
        return None;
    }
    let mut value = 0u64;
    let first = offset as usize / 8;
    let last = (end - 1) / 8;
    for (i, byte) in data[first..=last].iter().enumerate() {
        value |= u64::from(*byte) << (8 * i);
    }
    value >>= offset % 8;
    Some((value & ((1u64 << size) - 1)) as u32)
}

fn sign_extend(raw: u32, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((u64::from(raw) << shift) as i64) >> shift
}
