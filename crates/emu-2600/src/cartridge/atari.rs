//! Atari-format cartridges: unbanked 2K/4K, the F-series hotspot
//! mappers (F8/F6/F4), the 12K FA variant, and the superchip RAM
//! extension.
//!
//! Hotspots sit at the top of the window, just below the interrupt
//! vectors. Any access - read or write - switches the mapped bank.
//! Superchip RAM occupies the bottom 256 bytes of the window: writes
//! through the low half, reads through the high half.

use emu_core::Error;

use super::{CartMapper, BANK_SIZE};

/// Superchip RAM size.
const RAM_SIZE: usize = 128;

/// FA cartridges carry 256 bytes of RAM instead of 128.
const FA_RAM_SIZE: usize = 256;

/// An Atari-format cartridge.
pub struct Atari {
    id: &'static str,
    banks: Vec<Vec<u8>>,
    bank: usize,

    /// First hotspot address; hotspot n selects bank n.
    hotspot_base: u16,

    /// Superchip/FA RAM, when present.
    ram: Vec<u8>,
}

impl Atari {
    /// An unbanked 2K or 4K cartridge. 2K images mirror through the
    /// window.
    ///
    /// # Errors
    ///
    /// `Error::Cartridge` on a bad image size.
    pub fn standard(data: Vec<u8>) -> Result<Self, Error> {
        if data.len() != 2048 && data.len() != 4096 {
            return Err(Error::Cartridge(format!(
                "wrong size for standard cartridge ({} bytes)",
                data.len()
            )));
        }
        let id = if data.len() == 2048 { "2K" } else { "4K" };
        let ram = if has_superchip(&[data.as_slice()]) {
            vec![0; RAM_SIZE]
        } else {
            Vec::new()
        };
        Ok(Self {
            id,
            banks: vec![data],
            bank: 0,
            hotspot_base: 0,
            ram,
        })
    }

    /// A banked F-series cartridge (`"F8"`, `"FA"`, `"F6"` or `"F4"`).
    ///
    /// # Errors
    ///
    /// `Error::Cartridge` when the image size doesn't match the mapper.
    pub fn banked(data: Vec<u8>, id: &'static str) -> Result<Self, Error> {
        let (num_banks, hotspot_base, ram_size) = match id {
            "F8" => (2, 0x0ff8, 0),
            "FA" => (3, 0x0ff8, FA_RAM_SIZE),
            "F6" => (4, 0x0ff6, 0),
            "F4" => (8, 0x0ff4, 0),
            _ => return Err(Error::Cartridge(format!("unknown atari mapper ({id})"))),
        };

        if data.len() != num_banks * BANK_SIZE {
            return Err(Error::Cartridge(format!(
                "wrong size for {id} cartridge ({} bytes)",
                data.len()
            )));
        }

        let banks: Vec<Vec<u8>> = data.chunks(BANK_SIZE).map(<[u8]>::to_vec).collect();

        let ram_size = if ram_size > 0 {
            ram_size
        } else if has_superchip(&banks.iter().map(Vec::as_slice).collect::<Vec<_>>()) {
            RAM_SIZE
        } else {
            0
        };

        Ok(Self {
            id,
            bank: banks.len() - 1,
            banks,
            hotspot_base,
            ram: vec![0; ram_size],
        })
    }

    fn hotspot(&self, local: u16) -> Option<usize> {
        if self.banks.len() < 2 {
            return None;
        }
        let n = usize::from(local.checked_sub(self.hotspot_base)?);
        (n < self.banks.len()).then_some(n)
    }

    /// Whether `local` addresses the cartridge RAM, and through which
    /// half (write below, read above).
    fn ram_write(&self, local: u16) -> bool {
        !self.ram.is_empty() && usize::from(local) < self.ram.len()
    }

    fn ram_read(&self, local: u16) -> Option<usize> {
        if self.ram.is_empty() {
            return None;
        }
        let local = usize::from(local);
        (local >= self.ram.len() && local < self.ram.len() * 2).then(|| local - self.ram.len())
    }

    fn data(&self, local: u16) -> u8 {
        let bank = &self.banks[self.bank];
        bank[usize::from(local) % bank.len()]
    }
}

impl CartMapper for Atari {
    fn id(&self) -> &'static str {
        self.id
    }

    fn read(&mut self, local: u16) -> Result<u8, Error> {
        if let Some(bank) = self.hotspot(local) {
            if bank != self.bank {
                log::debug!("{}: bank switch {} -> {}", self.id, self.bank, bank);
            }
            self.bank = bank;
        }
        if let Some(offset) = self.ram_read(local) {
            return Ok(self.ram[offset]);
        }
        Ok(self.data(local))
    }

    fn write(&mut self, local: u16, value: u8) -> Result<(), Error> {
        if let Some(bank) = self.hotspot(local) {
            self.bank = bank;
            return Ok(());
        }
        if self.ram_write(local) {
            let index = usize::from(local);
            self.ram[index] = value;
            return Ok(());
        }
        Err(Error::UnwritableAddress(local))
    }

    fn bank(&self, _local: u16) -> usize {
        self.bank
    }

    fn num_banks(&self) -> usize {
        self.banks.len()
    }

    fn peek(&self, local: u16) -> u8 {
        if let Some(offset) = self.ram_read(local) {
            return self.ram[offset];
        }
        self.data(local)
    }

    fn poke(&mut self, local: u16, value: u8) {
        let bank = self.bank;
        let len = self.banks[bank].len();
        self.banks[bank][usize::from(local) % len] = value;
    }

    fn reset(&mut self) {
        self.bank = self.banks.len() - 1;
        self.ram.fill(0);
    }
}

/// Superchip heuristic: cartridges with the RAM extension cannot keep
/// code or data in the bottom 256 bytes of any bank, so those bytes are
/// blank (or a repeated filler byte) in the image.
fn has_superchip(banks: &[&[u8]]) -> bool {
    banks.iter().all(|bank| {
        let head = &bank[..RAM_SIZE * 2];
        head.iter().all(|&b| b == head[0])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A bank image filled with the bank number, with distinguishable
    /// content at the top so vectors differ per bank.
    fn bank_image(n: u8) -> Vec<u8> {
        let mut bank = vec![n; BANK_SIZE];
        bank[0x0ffc] = n;
        bank[0x0ffd] = 0xf0 | n;
        bank
    }

    fn f8() -> Atari {
        let mut data = bank_image(0);
        data.extend(bank_image(1));
        Atari::banked(data, "F8").unwrap()
    }

    #[test]
    fn hotspot_reads_switch_banks() {
        let mut cart = f8();
        assert_eq!(cart.bank(0), 1); // powers on in the last bank

        cart.read(0x0ff8).unwrap();
        assert_eq!(cart.bank(0), 0);
        assert_eq!(cart.read(0x0100).unwrap(), 0);

        cart.read(0x0ff9).unwrap();
        assert_eq!(cart.bank(0), 1);
        assert_eq!(cart.read(0x0100).unwrap(), 1);
    }

    #[test]
    fn hotspot_read_returns_new_bank_byte() {
        let mut cart = f8();
        // the switched read itself comes from the new bank
        assert_eq!(cart.read(0x0ff8).unwrap(), 0);
        assert_eq!(cart.read(0x0ff9).unwrap(), 1);
    }

    #[test]
    fn rom_writes_are_unwritable() {
        let mut cart = f8();
        assert!(matches!(
            cart.write(0x0100, 0xff),
            Err(Error::UnwritableAddress(0x0100))
        ));
        // but hotspot writes switch banks
        cart.write(0x0ff8, 0).unwrap();
        assert_eq!(cart.bank(0), 0);
    }

    #[test]
    fn two_k_mirrors() {
        let mut data = vec![0xab; 2048];
        data[0x7ff] = 0xcd;
        let mut cart = Atari::standard(data).unwrap();
        assert_eq!(cart.read(0x07ff).unwrap(), 0xcd);
        assert_eq!(cart.read(0x0fff).unwrap(), 0xcd);
    }

    #[test]
    fn superchip_ram() {
        // blank low pages in every bank trip the superchip heuristic
        let mut data = vec![0u8; 4096];
        for (i, byte) in data.iter_mut().enumerate().skip(0x200) {
            *byte = (i & 0xff) as u8;
        }
        let mut cart = Atari::standard(data).unwrap();

        cart.write(0x0010, 0x42).unwrap();
        assert_eq!(cart.read(0x0090).unwrap(), 0x42);
    }

    #[test]
    fn fa_has_256_bytes_of_ram() {
        let data = vec![0u8; 3 * BANK_SIZE];
        let mut cart = Atari::banked(data, "FA").unwrap();
        assert_eq!(cart.num_banks(), 3);

        cart.write(0x00ff, 0x99).unwrap();
        assert_eq!(cart.read(0x01ff).unwrap(), 0x99);
    }
}
