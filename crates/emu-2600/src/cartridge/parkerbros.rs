//! Parker Bros E0 cartridges.
//!
//! 8K split into eight 1K slices. The window is four 1K segments: the
//! first three are independently switchable, the fourth is fixed to the
//! last slice. Hotspots at the top of the window select the slice for
//! each segment.

use emu_core::Error;

use super::CartMapper;

/// E0 slices are 1K.
const SLICE_SIZE: usize = 1024;

/// Slices in an 8K image.
const NUM_SLICES: usize = 8;

/// First hotspot: 0x0fe0-0x0fe7 switch segment 0, 0x0fe8-0x0fef
/// segment 1, 0x0ff0-0x0ff7 segment 2.
const HOTSPOT_BASE: u16 = 0x0fe0;
const HOTSPOT_TOP: u16 = 0x0ff7;

pub struct ParkerBros {
    slices: Vec<Vec<u8>>,
    /// Slice mapped into each of the three switchable segments.
    segments: [usize; 3],
}

impl ParkerBros {
    /// # Errors
    ///
    /// `Error::Cartridge` unless the image is exactly 8K.
    pub fn new(data: Vec<u8>) -> Result<Self, Error> {
        if data.len() != SLICE_SIZE * NUM_SLICES {
            return Err(Error::Cartridge(format!(
                "wrong size for E0 cartridge ({} bytes)",
                data.len()
            )));
        }
        let slices: Vec<Vec<u8>> = data.chunks(SLICE_SIZE).map(<[u8]>::to_vec).collect();
        Ok(Self {
            slices,
            segments: [4, 5, 6],
        })
    }

    fn slice_for(&self, local: u16) -> usize {
        match usize::from(local) / SLICE_SIZE {
            s @ 0..=2 => self.segments[s],
            _ => NUM_SLICES - 1,
        }
    }

    fn service_hotspot(&mut self, local: u16) {
        if !(HOTSPOT_BASE..=HOTSPOT_TOP).contains(&local) {
            return;
        }
        let n = usize::from(local - HOTSPOT_BASE);
        let segment = n / NUM_SLICES;
        let slice = n % NUM_SLICES;
        if self.segments[segment] != slice {
            log::debug!("E0: segment {segment} -> slice {slice}");
        }
        self.segments[segment] = slice;
    }
}

impl CartMapper for ParkerBros {
    fn id(&self) -> &'static str {
        "E0"
    }

    fn read(&mut self, local: u16) -> Result<u8, Error> {
        self.service_hotspot(local);
        Ok(self.peek(local))
    }

    fn write(&mut self, local: u16, _value: u8) -> Result<(), Error> {
        if (HOTSPOT_BASE..=HOTSPOT_TOP).contains(&local) {
            self.service_hotspot(local);
            return Ok(());
        }
        Err(Error::UnwritableAddress(local))
    }

    fn bank(&self, local: u16) -> usize {
        self.slice_for(local)
    }

    fn num_banks(&self) -> usize {
        self.slices.len()
    }

    fn peek(&self, local: u16) -> u8 {
        let slice = self.slice_for(local);
        self.slices[slice][usize::from(local) % SLICE_SIZE]
    }

    fn poke(&mut self, local: u16, value: u8) {
        let slice = self.slice_for(local);
        self.slices[slice][usize::from(local) % SLICE_SIZE] = value;
    }

    fn reset(&mut self) {
        self.segments = [4, 5, 6];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> ParkerBros {
        let mut data = Vec::new();
        for n in 0..8u8 {
            data.extend(vec![n; SLICE_SIZE]);
        }
        ParkerBros::new(data).unwrap()
    }

    #[test]
    fn fixed_fourth_segment() {
        let mut c = cart();
        assert_eq!(c.read(0x0c00).unwrap(), 7);
        assert_eq!(c.bank(0x0c00), 7);
    }

    #[test]
    fn segments_switch_independently() {
        let mut c = cart();
        assert_eq!(c.read(0x0000).unwrap(), 4);
        assert_eq!(c.read(0x0400).unwrap(), 5);
        assert_eq!(c.read(0x0800).unwrap(), 6);

        // segment 0 to slice 2
        c.read(0x0fe2).unwrap();
        assert_eq!(c.read(0x0000).unwrap(), 2);
        assert_eq!(c.read(0x0400).unwrap(), 5);

        // segment 1 to slice 0
        c.read(0x0fe8).unwrap();
        assert_eq!(c.read(0x0400).unwrap(), 0);

        // segment 2 to slice 3
        c.read(0x0ff3).unwrap();
        assert_eq!(c.read(0x0800).unwrap(), 3);
    }
}
