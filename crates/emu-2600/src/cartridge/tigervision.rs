//! Tigervision 3F cartridges.
//!
//! The window splits into two 2K segments. The upper segment is fixed
//! to the last bank of the image; the lower segment is switched by
//! writing the bank number to any bus address 0x00-0x3f - addresses
//! that decode to the TIA, which is why the mapper listens to the bus
//! rather than the cartridge window.

use emu_core::Error;

use super::CartMapper;

/// 3F banks are 2K.
const SEGMENT_SIZE: usize = 2048;

/// Highest bus address that triggers a 3F bank switch.
const SWITCH_MEMTOP: u16 = 0x3f;

pub struct Tigervision {
    banks: Vec<Vec<u8>>,
    /// Bank mapped into the lower segment.
    bank: usize,
}

impl Tigervision {
    /// # Errors
    ///
    /// `Error::Cartridge` when the image is not a multiple of 2K or is
    /// too small to fill the window.
    pub fn new(data: Vec<u8>) -> Result<Self, Error> {
        if data.len() < 2 * SEGMENT_SIZE || data.len() % SEGMENT_SIZE != 0 {
            return Err(Error::Cartridge(format!(
                "wrong size for 3F cartridge ({} bytes)",
                data.len()
            )));
        }
        let banks: Vec<Vec<u8>> = data.chunks(SEGMENT_SIZE).map(<[u8]>::to_vec).collect();
        Ok(Self { banks, bank: 0 })
    }

    fn segment(&self, local: u16) -> (usize, usize) {
        let offset = usize::from(local) % SEGMENT_SIZE;
        if usize::from(local) < SEGMENT_SIZE {
            (self.bank, offset)
        } else {
            (self.banks.len() - 1, offset)
        }
    }
}

impl CartMapper for Tigervision {
    fn id(&self) -> &'static str {
        "3F"
    }

    fn read(&mut self, local: u16) -> Result<u8, Error> {
        let (bank, offset) = self.segment(local);
        Ok(self.banks[bank][offset])
    }

    fn write(&mut self, local: u16, _value: u8) -> Result<(), Error> {
        Err(Error::UnwritableAddress(local))
    }

    fn listen(&mut self, bus_address: u16, value: u8) {
        if bus_address <= SWITCH_MEMTOP {
            let bank = usize::from(value) % self.banks.len();
            if bank != self.bank {
                log::debug!("3F: bank switch {} -> {bank}", self.bank);
            }
            self.bank = bank;
        }
    }

    fn bank(&self, local: u16) -> usize {
        self.segment(local).0
    }

    fn num_banks(&self) -> usize {
        self.banks.len()
    }

    fn peek(&self, local: u16) -> u8 {
        let (bank, offset) = self.segment(local);
        self.banks[bank][offset]
    }

    fn poke(&mut self, local: u16, value: u8) {
        let (bank, offset) = self.segment(local);
        self.banks[bank][offset] = value;
    }

    fn reset(&mut self) {
        self.bank = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Tigervision {
        let mut data = Vec::new();
        for n in 0..4u8 {
            data.extend(vec![n; SEGMENT_SIZE]);
        }
        Tigervision::new(data).unwrap()
    }

    #[test]
    fn upper_segment_is_fixed() {
        let mut c = cart();
        assert_eq!(c.read(0x0800).unwrap(), 3);
        c.listen(0x3f, 2);
        assert_eq!(c.read(0x0800).unwrap(), 3);
    }

    #[test]
    fn listen_switches_lower_segment() {
        let mut c = cart();
        assert_eq!(c.read(0x0000).unwrap(), 0);

        c.listen(0x3f, 2);
        assert_eq!(c.read(0x0000).unwrap(), 2);
        assert_eq!(c.bank(0x0000), 2);

        // addresses above the switch range are ignored
        c.listen(0x40, 1);
        assert_eq!(c.bank(0x0000), 2);

        // bank number wraps
        c.listen(0x00, 5);
        assert_eq!(c.bank(0x0000), 1);
    }
}
