//! Compiled-in register tables
//!
//! Tables are replayed in order; page select writes (0xfe) inside a table
//! change the page of every entry that follows.

use crate::bus::RegVal;

const fn r(addr: u8, value: u8) -> RegVal {
    RegVal::new(addr, value)
}

/// Settings shared by every mode (currently none)
pub static DEFAULT_REGS: [RegVal; 0] = [];

/// Raw Bayer output needs no extra settings
pub static FMT_RAW_REGS: [RegVal; 0] = [];

/// 1600x1200 at 30 fps, one MIPI lane, 656 Mbit/s
pub static MODE_1600X1200_30_REGS: [RegVal; 85] = [
    // system
    r(0xfe, 0x00),
    r(0xfe, 0x00),
    r(0xfe, 0x00),
    r(0xf2, 0x02),
    r(0xf4, 0x03),
    r(0xf7, 0x01),
    r(0xf8, 0x28),
    r(0xf9, 0x02),
    r(0xfa, 0x08),
    r(0xfc, 0x8e),
    r(0xe7, 0xcc),
    r(0x88, 0x03),
    // analog
    r(0x03, 0x04),
    r(0x04, 0x80),
    r(0x05, 0x02),
    r(0x06, 0x86),
    r(0x07, 0x00),
    r(0x08, 0x24),
    r(0x09, 0x00),
    r(0x0a, 0x04),
    r(0x0b, 0x00),
    r(0x0c, 0x02),
    r(0x17, 0x54),
    r(0x18, 0x02),
    r(0x19, 0x17),
    r(0x1c, 0x18),
    r(0x20, 0x73),
    r(0x21, 0x38),
    r(0x22, 0xa2),
    r(0x29, 0x20),
    r(0x2f, 0x14),
    r(0x3f, 0x40),
    r(0xcd, 0x94),
    r(0xce, 0x45),
    r(0xd1, 0x0c),
    r(0xd7, 0x9b),
    r(0xd8, 0x99),
    r(0xda, 0x3b),
    r(0xd9, 0xb5),
    r(0xdb, 0x75),
    r(0xe3, 0x1b),
    r(0xe4, 0xf8),
    // black level
    r(0x40, 0x22),
    r(0x43, 0x07),
    r(0x4e, 0x3c),
    r(0x4f, 0x00),
    r(0x68, 0x00),
    // gain
    r(0xb0, 0x46),
    r(0xb1, 0x01),
    r(0xb2, 0x00),
    r(0xb6, 0x00),
    // output crop
    r(0x90, 0x01),
    r(0x92, 0x04),
    r(0x94, 0x05),
    r(0x95, 0x04),
    r(0x96, 0xb0),
    r(0x97, 0x06),
    r(0x98, 0x40),
    // mipi
    r(0xfe, 0x00),
    r(0xed, 0x00),
    r(0xfe, 0x03),
    r(0x01, 0x03),
    r(0x02, 0x82),
    r(0x03, 0xd0),
    r(0x04, 0x04),
    r(0x05, 0x00),
    r(0x06, 0x80),
    r(0x11, 0x2b),
    r(0x12, 0xd0),
    r(0x13, 0x07),
    r(0x15, 0x00),
    r(0x1b, 0x10),
    r(0x1c, 0x10),
    r(0x21, 0x08),
    r(0x22, 0x05),
    r(0x23, 0x13),
    r(0x24, 0x02),
    r(0x25, 0x13),
    r(0x26, 0x06),
    r(0x29, 0x06),
    r(0x2a, 0x08),
    r(0x2b, 0x06),
    r(0xfe, 0x00),
    r(0xed, 0x90),
    r(0xfe, 0x00),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs;

    #[test]
    fn test_mode_table_ends_on_page_zero_with_stream_on() {
        let n = MODE_1600X1200_30_REGS.len();
        assert_eq!(MODE_1600X1200_30_REGS[n - 1], r(regs::PAGE_SELECT, regs::PAGE_0));
        assert_eq!(MODE_1600X1200_30_REGS[n - 2], r(regs::STREAM_CTRL, 0x90));
    }

    #[test]
    fn test_mode_table_crop_matches_output_size() {
        let find = |addr: u8| {
            MODE_1600X1200_30_REGS
                .iter()
                .find(|reg| reg.addr == addr)
                .map(|reg| reg.value as u32)
                .unwrap()
        };
        // window height 0x95:0x96, width 0x97:0x98
        assert_eq!(find(0x95) << 8 | find(0x96), 1200);
        assert_eq!(find(0x97) << 8 | find(0x98), 1600);
    }
}
