//! Canonical VCS register addresses, names and data-bus masks.
//!
//! The TIA decodes reads and writes into different register files, so
//! there are two parallel symbol tables. The data-bus masks record which
//! bits of a read the chip actually drives; the remaining bits float and
//! reflect the address byte most recently on the bus.

/// TIA write registers, by local (mapped) address.
pub static TIA_WRITE: &[(u16, &str)] = &[
    (0x00, "VSYNC"),
    (0x01, "VBLANK"),
    (0x02, "WSYNC"),
    (0x03, "RSYNC"),
    (0x04, "NUSIZ0"),
    (0x05, "NUSIZ1"),
    (0x06, "COLUP0"),
    (0x07, "COLUP1"),
    (0x08, "COLUPF"),
    (0x09, "COLUBK"),
    (0x0a, "CTRLPF"),
    (0x0b, "REFP0"),
    (0x0c, "REFP1"),
    (0x0d, "PF0"),
    (0x0e, "PF1"),
    (0x0f, "PF2"),
    (0x10, "RESP0"),
    (0x11, "RESP1"),
    (0x12, "RESM0"),
    (0x13, "RESM1"),
    (0x14, "RESBL"),
    (0x15, "AUDC0"),
    (0x16, "AUDC1"),
    (0x17, "AUDF0"),
    (0x18, "AUDF1"),
    (0x19, "AUDV0"),
    (0x1a, "AUDV1"),
    (0x1b, "GRP0"),
    (0x1c, "GRP1"),
    (0x1d, "ENAM0"),
    (0x1e, "ENAM1"),
    (0x1f, "ENABL"),
    (0x20, "HMP0"),
    (0x21, "HMP1"),
    (0x22, "HMM0"),
    (0x23, "HMM1"),
    (0x24, "HMBL"),
    (0x25, "VDELP0"),
    (0x26, "VDELP1"),
    (0x27, "VDELBL"),
    (0x28, "RESMP0"),
    (0x29, "RESMP1"),
    (0x2a, "HMOVE"),
    (0x2b, "HMCLR"),
    (0x2c, "CXCLR"),
];

/// TIA read registers: collision latches and input ports.
pub static TIA_READ: &[(u16, &str)] = &[
    (0x00, "CXM0P"),
    (0x01, "CXM1P"),
    (0x02, "CXP0FB"),
    (0x03, "CXP1FB"),
    (0x04, "CXM0FB"),
    (0x05, "CXM1FB"),
    (0x06, "CXBLPF"),
    (0x07, "CXPPMM"),
    (0x08, "INPT0"),
    (0x09, "INPT1"),
    (0x0a, "INPT2"),
    (0x0b, "INPT3"),
    (0x0c, "INPT4"),
    (0x0d, "INPT5"),
];

/// RIOT write registers.
pub static RIOT_WRITE: &[(u16, &str)] = &[
    (0x280, "SWCHA"),
    (0x281, "SWACNT"),
    (0x282, "SWCHB"),
    (0x283, "SWBCNT"),
    (0x294, "TIM1T"),
    (0x295, "TIM8T"),
    (0x296, "TIM64T"),
    (0x297, "T1024T"),
];

/// RIOT read registers.
pub static RIOT_READ: &[(u16, &str)] = &[
    (0x280, "SWCHA"),
    (0x281, "SWACNT"),
    (0x282, "SWCHB"),
    (0x283, "SWBCNT"),
    (0x284, "INTIM"),
    (0x285, "TIMINT"),
];

// TIA write register locals, used by the chip servicing code.
pub const VSYNC: u16 = 0x00;
pub const VBLANK: u16 = 0x01;
pub const WSYNC: u16 = 0x02;
pub const RSYNC: u16 = 0x03;
pub const NUSIZ0: u16 = 0x04;
pub const NUSIZ1: u16 = 0x05;
pub const COLUP0: u16 = 0x06;
pub const COLUP1: u16 = 0x07;
pub const COLUPF: u16 = 0x08;
pub const COLUBK: u16 = 0x09;
pub const CTRLPF: u16 = 0x0a;
pub const REFP0: u16 = 0x0b;
pub const REFP1: u16 = 0x0c;
pub const PF0: u16 = 0x0d;
pub const PF1: u16 = 0x0e;
pub const PF2: u16 = 0x0f;
pub const RESP0: u16 = 0x10;
pub const RESP1: u16 = 0x11;
pub const RESM0: u16 = 0x12;
pub const RESM1: u16 = 0x13;
pub const RESBL: u16 = 0x14;
pub const AUDC0: u16 = 0x15;
pub const AUDC1: u16 = 0x16;
pub const AUDF0: u16 = 0x17;
pub const AUDF1: u16 = 0x18;
pub const AUDV0: u16 = 0x19;
pub const AUDV1: u16 = 0x1a;
pub const GRP0: u16 = 0x1b;
pub const GRP1: u16 = 0x1c;
pub const ENAM0: u16 = 0x1d;
pub const ENAM1: u16 = 0x1e;
pub const ENABL: u16 = 0x1f;
pub const HMP0: u16 = 0x20;
pub const HMP1: u16 = 0x21;
pub const HMM0: u16 = 0x22;
pub const HMM1: u16 = 0x23;
pub const HMBL: u16 = 0x24;
pub const VDELP0: u16 = 0x25;
pub const VDELP1: u16 = 0x26;
pub const VDELBL: u16 = 0x27;
pub const RESMP0: u16 = 0x28;
pub const RESMP1: u16 = 0x29;
pub const HMOVE: u16 = 0x2a;
pub const HMCLR: u16 = 0x2b;
pub const CXCLR: u16 = 0x2c;

// TIA read register locals.
pub const CXM0P: u16 = 0x00;
pub const CXM1P: u16 = 0x01;
pub const CXP0FB: u16 = 0x02;
pub const CXP1FB: u16 = 0x03;
pub const CXM0FB: u16 = 0x04;
pub const CXM1FB: u16 = 0x05;
pub const CXBLPF: u16 = 0x06;
pub const CXPPMM: u16 = 0x07;
pub const INPT0: u16 = 0x08;
pub const INPT4: u16 = 0x0c;
pub const INPT5: u16 = 0x0d;

// RIOT register locals.
pub const SWCHA: u16 = 0x280;
pub const SWACNT: u16 = 0x281;
pub const SWCHB: u16 = 0x282;
pub const SWBCNT: u16 = 0x283;
pub const INTIM: u16 = 0x284;
pub const TIMINT: u16 = 0x285;
pub const TIM1T: u16 = 0x294;
pub const TIM8T: u16 = 0x295;
pub const TIM64T: u16 = 0x296;
pub const T1024T: u16 = 0x297;

/// Data-bus masks for the TIA read registers: the collision latches
/// drive bits 7-6, the input ports bit 7 only. The undriven bits float.
/// Addresses past the end of the table read with full chip visibility.
pub static DATA_MASKS: &[u8] = &[
    0b1100_0000, // CXM0P
    0b1100_0000, // CXM1P
    0b1100_0000, // CXP0FB
    0b1100_0000, // CXP1FB
    0b1100_0000, // CXM0FB
    0b1100_0000, // CXM1FB
    0b1000_0000, // CXBLPF
    0b1100_0000, // CXPPMM
    0b1000_0000, // INPT0
    0b1000_0000, // INPT1
    0b1000_0000, // INPT2
    0b1000_0000, // INPT3
    0b1000_0000, // INPT4
    0b1000_0000, // INPT5
];

/// Look up a symbol name in one of the tables.
#[must_use]
pub fn symbol(table: &[(u16, &'static str)], address: u16) -> Option<&'static str> {
    table
        .iter()
        .find(|(a, _)| *a == address)
        .map(|(_, name)| *name)
}
