//! Chip register files.
//!
//! A `ChipMemory` is the bus-facing register file of the TIA or the
//! RIOT. CPU writes do not change stored state directly - they queue a
//! write signal that the owning chip services on its next tick (the
//! chip bus). The chip publishes its CPU-visible state (collision
//! latches, input ports, timer values) back through `chip_write`.
//!
//! Strobe registers work out of this split naturally: the write signal
//! triggers the chip action and nothing is ever stored.

use emu_core::Error;

/// A pending CPU write waiting to be serviced by the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSignal {
    /// Local (mapped) register address.
    pub register: u16,
    pub value: u8,
}

/// The register file of a bus-attached chip.
#[derive(Debug, Clone)]
pub struct ChipMemory {
    origin: u16,
    memory: Vec<u8>,

    /// Local addresses the CPU may read.
    readable: &'static [(u16, &'static str)],
    /// Local addresses the CPU may write.
    writable: &'static [(u16, &'static str)],

    /// Writes waiting for the chip. The queue preserves bus order; in
    /// practice it never holds more than the writes of one instruction.
    signals: Vec<ChipSignal>,

    /// Most recent serviced write, for machine-state reporting.
    pub last_write_address: u16,
}

impl ChipMemory {
    #[must_use]
    pub fn new(
        origin: u16,
        memtop: u16,
        readable: &'static [(u16, &'static str)],
        writable: &'static [(u16, &'static str)],
    ) -> Self {
        Self {
            origin,
            memory: vec![0; usize::from(memtop - origin) + 1],
            readable,
            writable,
            signals: Vec::with_capacity(4),
            last_write_address: 0,
        }
    }

    fn index(&self, local: u16) -> usize {
        usize::from(local - self.origin)
    }

    /// CPU bus read.
    ///
    /// # Errors
    ///
    /// `Error::UnreadableAddress` for addresses with no read register;
    /// the caller resolves those to open-bus data.
    pub fn read(&self, local: u16) -> Result<u8, Error> {
        if self.readable.iter().any(|(a, _)| *a == local) {
            Ok(self.memory[self.index(local)])
        } else {
            Err(Error::UnreadableAddress(local))
        }
    }

    /// CPU bus write: queue a signal for the chip.
    ///
    /// # Errors
    ///
    /// `Error::UnwritableAddress` for addresses with no write register.
    pub fn write(&mut self, local: u16, value: u8) -> Result<(), Error> {
        if self.writable.iter().any(|(a, _)| *a == local) {
            self.signals.push(ChipSignal {
                register: local,
                value,
            });
            Ok(())
        } else {
            Err(Error::UnwritableAddress(local))
        }
    }

    /// Chip bus: take the next pending CPU write, if any.
    pub fn chip_read(&mut self) -> Option<ChipSignal> {
        if self.signals.is_empty() {
            None
        } else {
            let signal = self.signals.remove(0);
            self.last_write_address = signal.register;
            Some(signal)
        }
    }

    /// Chip bus: publish a CPU-visible register value.
    pub fn chip_write(&mut self, local: u16, value: u8) {
        let index = self.index(local);
        self.memory[index] = value;
    }

    /// Debugger bus: read stored state with no side effects and no
    /// masking.
    #[must_use]
    pub fn peek(&self, local: u16) -> u8 {
        self.memory[self.index(local)]
    }

    /// Debugger bus: store directly, bypassing the chip.
    pub fn poke(&mut self, local: u16, value: u8) {
        let index = self.index(local);
        self.memory[index] = value;
    }

    /// Symbol name for a local read address.
    #[must_use]
    pub fn read_symbol(&self, local: u16) -> Option<&'static str> {
        super::addresses::symbol(self.readable, local)
    }

    /// Symbol name for a local write address.
    #[must_use]
    pub fn write_symbol(&self, local: u16) -> Option<&'static str> {
        super::addresses::symbol(self.writable, local)
    }
}
