//! Synthetic descriptors and reports shared by the unit tests.

pub const PTP_REPORT_ID: u8 = 0x01;
pub const MOUSE_REPORT_ID: u8 = 0x02;

/// Bits per finger collection in the touchpad report: confidence, tip,
/// 4-bit contact id, 2 bits padding, then 16-bit X and Y.
const FINGER_BITS: usize = 40;

pub const X_LOGICAL_MAX: i32 = 4095;
pub const X_PHYSICAL_MAX: i32 = 1205;
pub const Y_LOGICAL_MAX: i32 = 4095;
pub const Y_PHYSICAL_MAX: i32 = 906;

fn finger_collection() -> Vec<u8> {
    vec![
        0x05, 0x0d, //   USAGE_PAGE (Digitizers)
        0x09, 0x22, //   USAGE (Finger)
        0xa1, 0x02, //   COLLECTION (Logical)
        0x15, 0x00, //     LOGICAL_MINIMUM (0)
        0x25, 0x01, //     LOGICAL_MAXIMUM (1)
        0x09, 0x47, //     USAGE (Confidence)
        0x09, 0x42, //     USAGE (Tip Switch)
        0x95, 0x02, //     REPORT_COUNT (2)
        0x75, 0x01, //     REPORT_SIZE (1)
        0x81, 0x02, //     INPUT (Data,Var,Abs)
        0x95, 0x01, //     REPORT_COUNT (1)
        0x75, 0x04, //     REPORT_SIZE (4)
        0x25, 0x0f, //     LOGICAL_MAXIMUM (15)
        0x09, 0x51, //     USAGE (Contact Identifier)
        0x81, 0x02, //     INPUT (Data,Var,Abs)
        0x75, 0x02, //     REPORT_SIZE (2)
        0x81, 0x03, //     INPUT (Cnst,Var,Abs)
        0x05, 0x01, //     USAGE_PAGE (Generic Desktop)
        0x15, 0x00, //     LOGICAL_MINIMUM (0)
        0x26, 0xff, 0x0f, //     LOGICAL_MAXIMUM (4095)
        0x75, 0x10, //     REPORT_SIZE (16)
        0x55, 0x0e, //     UNIT_EXPONENT (-2)
        0x65, 0x11, //     UNIT (cm, SI Linear)
        0x09, 0x30, //     USAGE (X)
        0x35, 0x00, //     PHYSICAL_MINIMUM (0)
        0x46, 0xb5, 0x04, //     PHYSICAL_MAXIMUM (1205)
        0x81, 0x02, //     INPUT (Data,Var,Abs)
        0x46, 0x8a, 0x03, //     PHYSICAL_MAXIMUM (906)
        0x09, 0x31, //     USAGE (Y)
        0x81, 0x02, //     INPUT (Data,Var,Abs)
        0x35, 0x00, //     PHYSICAL_MINIMUM (0)
        0x45, 0x00, //     PHYSICAL_MAXIMUM (0)
        0x55, 0x00, //     UNIT_EXPONENT (0)
        0x65, 0x00, //     UNIT (None)
        0xc0, //   END_COLLECTION
    ]
}

/// A Windows precision touchpad style descriptor with `fingers` contact
/// collections (report 1), followed by a mouse collection (report 2).
pub fn ptp_descriptor(fingers: usize) -> Vec<u8> {
    let mut d = vec![
        0x05, 0x0d, // USAGE_PAGE (Digitizers)
        0x09, 0x05, // USAGE (Touch Pad)
        0xa1, 0x01, // COLLECTION (Application)
        0x85, PTP_REPORT_ID, //   REPORT_ID (1)
    ];
    for _ in 0..fingers {
        d.extend(finger_collection());
    }
    d.extend([
        0x05, 0x0d, //   USAGE_PAGE (Digitizers)
        0x15, 0x00, //   LOGICAL_MINIMUM (0)
        0x27, 0xff, 0xff, 0x00, 0x00, //   LOGICAL_MAXIMUM (65535)
        0x75, 0x10, //   REPORT_SIZE (16)
        0x95, 0x01, //   REPORT_COUNT (1)
        0x09, 0x56, //   USAGE (Scan Time)
        0x81, 0x02, //   INPUT (Data,Var,Abs)
        0x09, 0x54, //   USAGE (Contact Count)
        0x25, 0x7f, //   LOGICAL_MAXIMUM (127)
        0x75, 0x08, //   REPORT_SIZE (8)
        0x81, 0x02, //   INPUT (Data,Var,Abs)
        0x05, 0x09, //   USAGE_PAGE (Button)
        0x09, 0x01, //   USAGE (Button 1)
        0x25, 0x01, //   LOGICAL_MAXIMUM (1)
        0x75, 0x01, //   REPORT_SIZE (1)
        0x81, 0x02, //   INPUT (Data,Var,Abs)
        0x95, 0x07, //   REPORT_COUNT (7)
        0x81, 0x03, //   INPUT (Cnst,Var,Abs)
        0xc0, // END_COLLECTION
        0x05, 0x01, // USAGE_PAGE (Generic Desktop)
        0x09, 0x02, // USAGE (Mouse)
        0xa1, 0x01, // COLLECTION (Application)
        0x85, MOUSE_REPORT_ID, //   REPORT_ID (2)
        0x09, 0x01, //   USAGE (Pointer)
        0xa1, 0x00, //   COLLECTION (Physical)
        0x05, 0x09, //     USAGE_PAGE (Button)
        0x19, 0x01, //     USAGE_MINIMUM (Button 1)
        0x29, 0x02, //     USAGE_MAXIMUM (Button 2)
        0x15, 0x00, //     LOGICAL_MINIMUM (0)
        0x25, 0x01, //     LOGICAL_MAXIMUM (1)
        0x95, 0x02, //     REPORT_COUNT (2)
        0x75, 0x01, //     REPORT_SIZE (1)
        0x81, 0x02, //     INPUT (Data,Var,Abs)
        0x95, 0x01, //     REPORT_COUNT (1)
        0x75, 0x06, //     REPORT_SIZE (6)
        0x81, 0x03, //     INPUT (Cnst,Var,Abs)
        0x05, 0x01, //     USAGE_PAGE (Generic Desktop)
        0x09, 0x30, //     USAGE (X)
        0x09, 0x31, //     USAGE (Y)
        0x15, 0x81, //     LOGICAL_MINIMUM (-127)
        0x25, 0x7f, //     LOGICAL_MAXIMUM (127)
        0x75, 0x08, //     REPORT_SIZE (8)
        0x95, 0x02, //     REPORT_COUNT (2)
        0x81, 0x06, //     INPUT (Data,Var,Rel)
        0xc0, //   END_COLLECTION
        0xc0, // END_COLLECTION
    ]);
    d
}

/// One finger slot in a synthetic touchpad report.
#[derive(Debug, Clone, Copy, Default)]
pub struct Finger {
    pub tip: bool,
    pub id: u8,
    pub x: u16,
    pub y: u16,
}

pub fn put_bits(buf: &mut [u8], offset: usize, size: usize, value: u32) {
    for bit in 0..size {
        let pos = offset + bit;
        if value & (1 << bit) != 0 {
            buf[pos / 8] |= 1 << (pos % 8);
        } else {
            buf[pos / 8] &= !(1 << (pos % 8));
        }
    }
}

/// Report 1 for `ptp_descriptor(slots.len())`. The report id byte comes first.
pub fn ptp_report(slots: &[Finger], contact_count: u8) -> Vec<u8> {
    let data_bits = slots.len() * FINGER_BITS + 32;
    let mut report = vec![0u8; 1 + data_bits / 8];
    report[0] = PTP_REPORT_ID;
    let data = &mut report[1..];
    for (i, finger) in slots.iter().enumerate() {
        let base = i * FINGER_BITS;
        put_bits(data, base, 1, 1);
        put_bits(data, base + 1, 1, finger.tip as u32);
        put_bits(data, base + 2, 4, finger.id as u32);
        put_bits(data, base + 8, 16, finger.x as u32);
        put_bits(data, base + 24, 16, finger.y as u32);
    }
    let tail = slots.len() * FINGER_BITS;
    put_bits(data, tail, 16, 0x1234);
    put_bits(data, tail + 16, 8, contact_count as u32);
    report
}

/// Physical value the layout reports for a logical X.
pub fn physical_x(x: u16) -> i32 {
    (x as i64 * X_PHYSICAL_MAX as i64 / X_LOGICAL_MAX as i64) as i32
}

pub fn physical_y(y: u16) -> i32 {
    (y as i64 * Y_PHYSICAL_MAX as i64 / Y_LOGICAL_MAX as i64) as i32
}

/// Which contact fields a synthetic link collection declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCaps {
    pub identity: bool,
    pub tip: bool,
    pub x: bool,
    pub y: bool,
}

impl LinkCaps {
    pub fn complete(&self) -> bool {
        self.identity && self.tip && self.x && self.y
    }
}

/// A touchpad descriptor whose finger collections declare only the fields
/// named in `links`. The contact count lives in the application collection
/// unless `contact_count` is false.
pub fn capability_descriptor(links: &[LinkCaps], contact_count: bool) -> Vec<u8> {
    let mut d = vec![0x05, 0x0d, 0x09, 0x05, 0xa1, 0x01, 0x85, PTP_REPORT_ID];
    for caps in links {
        d.extend([0x05, 0x0d, 0x09, 0x22, 0xa1, 0x02, 0x15, 0x00, 0x95, 0x01]);
        if caps.tip {
            d.extend([0x25, 0x01, 0x75, 0x01, 0x09, 0x42, 0x81, 0x02]);
            d.extend([0x75, 0x07, 0x81, 0x03]);
        }
        if caps.identity {
            d.extend([0x25, 0x7f, 0x75, 0x08, 0x09, 0x51, 0x81, 0x02]);
        }
        if caps.x || caps.y {
            d.extend([0x05, 0x01, 0x26, 0xff, 0x0f, 0x75, 0x10]);
            if caps.x {
                d.extend([0x09, 0x30, 0x81, 0x02]);
            }
            if caps.y {
                d.extend([0x09, 0x31, 0x81, 0x02]);
            }
        }
        d.push(0xc0);
    }
    if contact_count {
        d.extend([
            0x05, 0x0d, 0x09, 0x54, 0x15, 0x00, 0x25, 0x7f, 0x75, 0x08, 0x95, 0x01, 0x81, 0x02,
        ]);
    }
    d.push(0xc0);
    d
}

/// Bits per complete link in `capability_descriptor`: tip, 7 bits padding,
/// 8-bit contact id, then 16-bit X and Y.
const CAPABILITY_LINK_BITS: usize = 48;

/// Report 1 for `capability_descriptor` with every link complete and the
/// contact count present. X and Y are in logical units, which equal physical.
pub fn capability_report(slots: &[Finger], contact_count: u8) -> Vec<u8> {
    let data_bits = slots.len() * CAPABILITY_LINK_BITS + 8;
    let mut report = vec![0u8; 1 + data_bits / 8];
    report[0] = PTP_REPORT_ID;
    let data = &mut report[1..];
    for (i, finger) in slots.iter().enumerate() {
        let base = i * CAPABILITY_LINK_BITS;
        put_bits(data, base, 1, finger.tip as u32);
        put_bits(data, base + 8, 8, finger.id as u32);
        put_bits(data, base + 16, 16, finger.x as u32);
        put_bits(data, base + 32, 16, finger.y as u32);
    }
    put_bits(data, slots.len() * CAPABILITY_LINK_BITS, 8, contact_count as u32);
    report
}

/// `capability_descriptor` with `links` complete contact links.
pub fn complete_descriptor(links: usize) -> Vec<u8> {
    let full = LinkCaps {
        identity: true,
        tip: true,
        x: true,
        y: true,
    };
    capability_descriptor(&vec![full; links], true)
}
