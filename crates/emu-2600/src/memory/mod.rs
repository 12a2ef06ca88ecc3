//! The VCS memory model.
//!
//! Memory is viewed differently by different parts of the machine, so
//! access goes through conceptual buses: the CPU bus (mapped, masked),
//! the chip bus (TIA/RIOT servicing their register files), the
//! peripheral bus (input devices writing into latches) and the debugger
//! bus (peek/poke with no side effects). `VcsMemory` owns the four
//! areas and routes between them.

pub mod addresses;
mod chip;
pub mod map;
mod pia;

use emu_core::{CpuBus, Error};

use crate::cartridge::Cartridge;
use map::{extent, map_address, Area};

pub use chip::{ChipMemory, ChipSignal};
pub use pia::Pia;

/// The monolithic memory of the VCS.
pub struct VcsMemory {
    /// TIA register files.
    pub tia: ChipMemory,
    /// RIOT registers.
    pub riot: ChipMemory,
    /// Console RAM.
    pub pia: Pia,
    /// The cartridge slot.
    pub cart: Cartridge,

    /// Trace of the most recent CPU access, for the debugger.
    pub last_access_address: u16,
    pub last_access_value: u8,
    pub last_access_write: bool,
    pub last_access_id: u64,

    access_count: u64,
}

impl VcsMemory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tia: ChipMemory::new(
                extent::TIA_ORIGIN,
                extent::TIA_MEMTOP,
                addresses::TIA_READ,
                addresses::TIA_WRITE,
            ),
            riot: ChipMemory::new(
                extent::RIOT_ORIGIN,
                extent::RIOT_MEMTOP,
                addresses::RIOT_READ,
                addresses::RIOT_WRITE,
            ),
            pia: Pia::new(),
            cart: Cartridge::ejected(),
            last_access_address: 0,
            last_access_value: 0,
            last_access_write: false,
            last_access_id: 0,
            access_count: 0,
        }
    }

    /// CPU bus read: map, dispatch, apply the data-bus mask.
    ///
    /// Reads of write-only registers resolve to open-bus data here and
    /// are not an error to the CPU.
    ///
    /// # Errors
    ///
    /// Fatal errors (memory invariant violations) only.
    pub fn read(&mut self, address: u16) -> Result<u8, Error> {
        let (local, area) = map_address(address, true);

        let chip_data = match area {
            Area::Tia => self.tia.read(local),
            Area::Riot => self.riot.read(local),
            Area::Pia => Ok(self.pia.read(local)),
            Area::Cartridge => self.cart.read(local),
        };

        // the floating bus holds the address byte most recently driven;
        // undriven data bits reflect it back
        let float = if address > 0xff {
            (address >> 8) as u8
        } else {
            (address & 0xff) as u8
        };

        let mut data = match chip_data {
            Ok(data) => data,
            Err(err) if !err.is_fatal() => {
                log::debug!("open bus read: {err}");
                float
            }
            Err(err) => return Err(err),
        };

        if area == Area::Tia {
            let index = usize::from(local);
            if index < addresses::DATA_MASKS.len() {
                let mask = addresses::DATA_MASKS[index];
                data = data & mask | float & !mask;
            }
        }

        self.last_access_address = local;
        self.last_access_value = data;
        self.last_access_write = false;
        self.last_access_id = self.access_count;
        self.access_count += 1;

        Ok(data)
    }

    /// CPU bus write.
    ///
    /// Every write is offered to the cartridge `listen` hook first -
    /// tigervision cartridges switch banks on writes that decode to the
    /// TIA. Writes to read-only space log and complete.
    ///
    /// # Errors
    ///
    /// Fatal errors only.
    pub fn write(&mut self, address: u16, value: u8) -> Result<(), Error> {
        let (local, area) = map_address(address, false);

        self.last_access_address = local;
        self.last_access_value = value;
        self.last_access_write = true;
        self.last_access_id = self.access_count;
        self.access_count += 1;

        self.cart.listen(address & map::ADDRESS_MASK, value);

        let result = match area {
            Area::Tia => self.tia.write(local, value),
            Area::Riot => self.riot.write(local, value),
            Area::Pia => {
                self.pia.write(local, value);
                Ok(())
            }
            Area::Cartridge => self.cart.write(local, value),
        };

        match result {
            Ok(()) => Ok(()),
            Err(err) if !err.is_fatal() => {
                log::warn!("dropped write: {err}");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Debugger bus: read with no side effects and no masking.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        let (local, area) = map_address(address, true);
        match area {
            Area::Tia => self.tia.peek(local),
            Area::Riot => self.riot.peek(local),
            Area::Pia => self.pia.read(local),
            Area::Cartridge => self.cart.peek(local),
        }
    }

    /// Debugger bus: store directly, without strobe side effects.
    pub fn poke(&mut self, address: u16, value: u8) {
        let (local, area) = map_address(address, true);
        match area {
            Area::Tia => self.tia.poke(local, value),
            Area::Riot => self.riot.poke(local, value),
            Area::Pia => self.pia.write(local, value),
            Area::Cartridge => self.cart.poke(local, value),
        }
    }
}

impl Default for VcsMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Bare CPU-bus access, without the machine ticking around it. The
/// console wraps this with the clock interleaving; tests and the reset
/// sequence use it directly.
impl CpuBus for VcsMemory {
    fn read(&mut self, address: u16) -> Result<u8, Error> {
        VcsMemory::read(self, address)
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), Error> {
        VcsMemory::write(self, address, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wsync_write_and_read_are_different_registers() {
        let mut mem = VcsMemory::new();

        // writing CPU address 0x02 strobes WSYNC...
        mem.write(0x02, 0x00).unwrap();
        assert_eq!(
            mem.tia.chip_read(),
            Some(ChipSignal {
                register: addresses::WSYNC,
                value: 0x00
            })
        );

        // ...while reading the same CPU address indexes the CXP0FB
        // collision latch, not a stored 0x02 value
        mem.tia.chip_write(addresses::CXP0FB, 0x80);
        let data = mem.read(0x02).unwrap();
        assert_eq!(data & 0xc0, 0x80);
    }

    #[test]
    fn open_bus_reflects_address_byte() {
        let mut mem = VcsMemory::new();

        // collision latches drive bits 7-6 only; the rest of the data
        // bus floats with the address byte. reading CXM0P through the
        // zero-page address 0x00 leaves the float bits clear; through a
        // mirror at 0x30 they reflect 0x30.
        mem.tia.chip_write(addresses::CXM0P, 0xc0);
        assert_eq!(mem.read(0x0000).unwrap(), 0xc0);
        assert_eq!(mem.read(0x0030).unwrap(), 0xc0 | 0x30);
    }

    #[test]
    fn last_access_trace() {
        let mut mem = VcsMemory::new();

        mem.write(0x80, 0x11).unwrap();
        assert!(mem.last_access_write);
        assert_eq!(mem.last_access_address, 0x80);
        assert_eq!(mem.last_access_value, 0x11);
        let first_id = mem.last_access_id;

        let _ = mem.read(0x80).unwrap();
        assert!(!mem.last_access_write);
        assert!(mem.last_access_id > first_id);
    }

    #[test]
    fn ram_roundtrip_through_mirrors() {
        let mut mem = VcsMemory::new();
        mem.write(0x180, 0x42).unwrap();
        assert_eq!(mem.read(0x80).unwrap(), 0x42);
    }

    #[test]
    fn peek_has_no_strobe_side_effects() {
        let mut mem = VcsMemory::new();
        let _ = mem.peek(0x02);
        assert_eq!(mem.tia.chip_read(), None);
    }
}
