//! Cartridge loading and bank-switch dispatch.
//!
//! The VCS sees 4K of cartridge space. Anything larger bank-switches
//! through hotspot addresses inside the window (the Atari F-series),
//! through writes to low bus addresses outside the window (tigervision),
//! or through per-segment hotspots (parker bros). Mapper selection is by
//! file size first; ambiguous 8K images are fingerprinted.

mod atari;
mod parkerbros;
mod tigervision;

use emu_core::Error;

pub use atari::Atari;
pub use parkerbros::ParkerBros;
pub use tigervision::Tigervision;

/// Bytes in one bank of an Atari-format cartridge.
pub const BANK_SIZE: usize = 4096;

/// The mapper interface.
///
/// `local` addresses are offsets into the 4K cartridge window.
pub trait CartMapper {
    /// Mapper identity, eg. `"F8"`.
    fn id(&self) -> &'static str;

    /// Bus read from the cartridge window. May switch banks as a side
    /// effect (hotspots).
    fn read(&mut self, local: u16) -> Result<u8, Error>;

    /// Bus write into the cartridge window.
    ///
    /// # Errors
    ///
    /// `Error::UnwritableAddress` unless the cartridge has RAM or the
    /// address is a hotspot.
    fn write(&mut self, local: u16, value: u8) -> Result<(), Error>;

    /// Observe a write anywhere on the bus. Tigervision cartridges
    /// switch banks on writes to addresses shadowing system RAM.
    fn listen(&mut self, _bus_address: u16, _value: u8) {}

    /// The bank currently mapped at a window offset.
    fn bank(&self, local: u16) -> usize;

    fn num_banks(&self) -> usize;

    /// Side-effect-free read for the debugger.
    fn peek(&self, local: u16) -> u8;

    /// Patch the currently mapped bank (debugger).
    fn poke(&mut self, local: u16, value: u8);

    /// Return banking to its power-on state.
    fn reset(&mut self);
}

/// A cartridge slot with no cartridge in it.
struct Ejected;

impl CartMapper for Ejected {
    fn id(&self) -> &'static str {
        "-"
    }

    fn read(&mut self, _local: u16) -> Result<u8, Error> {
        Ok(0)
    }

    fn write(&mut self, local: u16, _value: u8) -> Result<(), Error> {
        Err(Error::UnwritableAddress(local))
    }

    fn bank(&self, _local: u16) -> usize {
        0
    }

    fn num_banks(&self) -> usize {
        0
    }

    fn peek(&self, _local: u16) -> u8 {
        0
    }

    fn poke(&mut self, _local: u16, _value: u8) {}

    fn reset(&mut self) {}
}

/// The cartridge slot.
pub struct Cartridge {
    mapper: Box<dyn CartMapper>,
}

impl Cartridge {
    /// An empty slot.
    #[must_use]
    pub fn ejected() -> Self {
        Self {
            mapper: Box::new(Ejected),
        }
    }

    /// Attach a cartridge image, selecting the mapper from the file
    /// size and, for ambiguous sizes, a fingerprint of the image.
    ///
    /// # Errors
    ///
    /// `Error::Cartridge` when no mapper accepts the image.
    pub fn attach(data: Vec<u8>) -> Result<Self, Error> {
        let mapper: Box<dyn CartMapper> = match data.len() {
            2048 | 4096 => Box::new(Atari::standard(data)?),
            8192 => match fingerprint_8k(&data) {
                Fingerprint8k::ParkerBros => Box::new(ParkerBros::new(data)?),
                Fingerprint8k::Tigervision => Box::new(Tigervision::new(data)?),
                Fingerprint8k::F8 => Box::new(Atari::banked(data, "F8")?),
            },
            12288 => Box::new(Atari::banked(data, "FA")?),
            16384 => Box::new(Atari::banked(data, "F6")?),
            32768 => Box::new(Atari::banked(data, "F4")?),
            len if len > 8192 && len % 2048 == 0 && looks_like_3f(&data) => {
                Box::new(Tigervision::new(data)?)
            }
            len => {
                return Err(Error::Cartridge(format!(
                    "unrecognised cartridge size ({len} bytes)"
                )))
            }
        };

        log::debug!("attached cartridge, mapper {}", mapper.id());
        Ok(Self { mapper })
    }

    /// Attach with an explicit mapper, bypassing detection.
    #[must_use]
    pub fn with_mapper(mapper: Box<dyn CartMapper>) -> Self {
        Self { mapper }
    }

    pub fn read(&mut self, local: u16) -> Result<u8, Error> {
        self.mapper.read(local)
    }

    pub fn write(&mut self, local: u16, value: u8) -> Result<(), Error> {
        self.mapper.write(local, value)
    }

    pub fn listen(&mut self, bus_address: u16, value: u8) {
        self.mapper.listen(bus_address, value);
    }

    #[must_use]
    pub fn bank(&self, local: u16) -> usize {
        self.mapper.bank(local)
    }

    #[must_use]
    pub fn num_banks(&self) -> usize {
        self.mapper.num_banks()
    }

    #[must_use]
    pub fn id(&self) -> &'static str {
        self.mapper.id()
    }

    #[must_use]
    pub fn peek(&self, local: u16) -> u8 {
        self.mapper.peek(local)
    }

    pub fn poke(&mut self, local: u16, value: u8) {
        self.mapper.poke(local, value);
    }

    pub fn reset(&mut self) {
        self.mapper.reset();
    }
}

/// Possible interpretations of an 8K image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fingerprint8k {
    F8,
    ParkerBros,
    Tigervision,
}

/// Score the bank-switch access patterns each 8K mapper would leave in
/// the image and pick the most plausible.
fn fingerprint_8k(data: &[u8]) -> Fingerprint8k {
    let e0 = count_patterns(data, &parkerbros_signature);
    let tv = count_patterns(data, &tigervision_signature);

    // the F-series is by far the most common; prefer it unless the
    // image carries clear evidence of another scheme
    if e0 > tv && e0 >= 2 {
        Fingerprint8k::ParkerBros
    } else if tv > e0 && tv >= 2 {
        Fingerprint8k::Tigervision
    } else {
        Fingerprint8k::F8
    }
}

fn looks_like_3f(data: &[u8]) -> bool {
    count_patterns(data, &tigervision_signature) >= 2
}

fn count_patterns(data: &[u8], signature: &dyn Fn(&[u8]) -> bool) -> usize {
    data.windows(3).filter(|w| signature(w)).count()
}

/// LDA/STA absolute targeting the parker bros hotspots at 0x1fe0-0x1ff7
/// (or a mirror with the high byte 0xff).
fn parkerbros_signature(w: &[u8]) -> bool {
    (w[0] == 0xad || w[0] == 0x8d)
        && (0xe0..=0xf7).contains(&w[1])
        && (w[2] == 0x1f || w[2] == 0xff)
}

/// STA into the tigervision switch addresses 0x00-0x3f: zero-page or
/// absolute form.
fn tigervision_signature(w: &[u8]) -> bool {
    (w[0] == 0x85 && w[1] == 0x3f) || (w[0] == 0x8d && w[1] == 0x3f && w[2] == 0x00)
}
