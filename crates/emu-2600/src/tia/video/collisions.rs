//! Collision latches.
//!
//! Every pair of non-background video elements has a latch, set the
//! moment both drive the same pixel and held until CXCLR. The fifteen
//! pairs pack into bits 7-6 of eight read registers.

use crate::memory::addresses;
use crate::memory::ChipMemory;

/// The elements active at one pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveElements {
    pub player0: bool,
    pub player1: bool,
    pub missile0: bool,
    pub missile1: bool,
    pub ball: bool,
    pub playfield: bool,
}

/// The fifteen collision latches, mirrored into the TIA read registers.
#[derive(Debug, Clone, Default)]
pub struct Collisions {
    cxm0p: u8,
    cxm1p: u8,
    cxp0fb: u8,
    cxp1fb: u8,
    cxm0fb: u8,
    cxm1fb: u8,
    cxblpf: u8,
    cxppmm: u8,
}

impl Collisions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch collisions for the elements active at this pixel and
    /// publish any changes to the chip registers.
    pub fn latch(&mut self, active: ActiveElements, mem: &mut ChipMemory) {
        let ActiveElements {
            player0: p0,
            player1: p1,
            missile0: m0,
            missile1: m1,
            ball: bl,
            playfield: pf,
        } = active;

        self.cxm0p |= bit(m0 && p1, 7) | bit(m0 && p0, 6);
        self.cxm1p |= bit(m1 && p0, 7) | bit(m1 && p1, 6);
        self.cxp0fb |= bit(p0 && pf, 7) | bit(p0 && bl, 6);
        self.cxp1fb |= bit(p1 && pf, 7) | bit(p1 && bl, 6);
        self.cxm0fb |= bit(m0 && pf, 7) | bit(m0 && bl, 6);
        self.cxm1fb |= bit(m1 && pf, 7) | bit(m1 && bl, 6);
        self.cxblpf |= bit(bl && pf, 7);
        self.cxppmm |= bit(p0 && p1, 7) | bit(m0 && m1, 6);

        self.publish(mem);
    }

    /// CXCLR: clear every latch.
    pub fn clear(&mut self, mem: &mut ChipMemory) {
        *self = Self::default();
        self.publish(mem);
    }

    fn publish(&self, mem: &mut ChipMemory) {
        mem.chip_write(addresses::CXM0P, self.cxm0p);
        mem.chip_write(addresses::CXM1P, self.cxm1p);
        mem.chip_write(addresses::CXP0FB, self.cxp0fb);
        mem.chip_write(addresses::CXP1FB, self.cxp1fb);
        mem.chip_write(addresses::CXM0FB, self.cxm0fb);
        mem.chip_write(addresses::CXM1FB, self.cxm1fb);
        mem.chip_write(addresses::CXBLPF, self.cxblpf);
        mem.chip_write(addresses::CXPPMM, self.cxppmm);
    }
}

fn bit(set: bool, position: u8) -> u8 {
    u8::from(set) << position
}
