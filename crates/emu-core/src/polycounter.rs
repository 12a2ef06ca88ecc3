//! LFSR polycounters.
//!
//! The TIA counts with linear-feedback shift registers rather than binary
//! adders. A polycounter steps through the vendor sequence of 2ᵏ−1 states
//! (the all-zeros state is part of the natural sequence; the lock-up state
//! is all-ones and never entered). Each state lasts four phases, so the
//! 6-bit counter with reset point 56 spans the 228 color-clocks of a
//! scanline, and the same counter with reset point 39 spans the 160
//! visible pixels that sprite position counters cycle over.

use std::fmt;

/// Color-clocks of horizontal blank at the start of every scanline.
const HBLANK_CLOCKS: usize = 68;

/// Phases per polycounter state.
const PHASES: u8 = 4;

/// A k-bit LFSR phase counter.
///
/// `count` is the index into the LFSR sequence (0 at the seed state),
/// not the register bit pattern; `phase` is the four-phase sub-counter.
#[derive(Debug, Clone)]
pub struct Polycounter {
    table: Vec<u16>,
    width: u8,
    reset_point: usize,

    /// Position in the LFSR sequence.
    pub count: usize,
    /// Four-phase sub-counter, 0..=3.
    pub phase: u8,
}

impl Polycounter {
    /// Create a polycounter of `width` bits (5, 6 or 9) with the given
    /// reset point.
    ///
    /// # Panics
    ///
    /// Panics if the width is not one used by the TIA.
    #[must_use]
    pub fn new(width: u8, reset_point: usize) -> Self {
        let table = sequence(width);
        assert!(reset_point < table.len(), "reset point outside sequence");
        Self {
            table,
            width,
            reset_point,
            count: 0,
            phase: 0,
        }
    }

    /// The number of states in the sequence (2ᵏ − 1).
    #[must_use]
    pub fn sequence_len(&self) -> usize {
        self.table.len()
    }

    /// The reset point supplied at construction.
    #[must_use]
    pub fn reset_point(&self) -> usize {
        self.reset_point
    }

    /// Advance one tick. Returns true when a full cycle completes - the
    /// counter has passed its reset point at the end of phase 3 and
    /// wrapped to (0, 0).
    pub fn tick(&mut self) -> bool {
        self.phase += 1;
        if self.phase == PHASES {
            self.phase = 0;
            if self.count == self.reset_point {
                self.count = 0;
                return true;
            }
            self.count += 1;
            if self.count >= self.table.len() {
                // counter ran past its reset point (RSYNC can do this)
                self.count = 0;
            }
        }
        false
    }

    /// Jump back to state 0, phase 0.
    pub fn reset(&mut self) {
        self.count = 0;
        self.phase = 0;
    }

    /// Map (count, phase) to a visible-pixel index 0..159.
    ///
    /// For the horizontal clock this subtracts the blanked portion of the
    /// scanline; ticks inside HBLANK map to pixel 0.
    #[must_use]
    pub fn pixel(&self) -> usize {
        let tick = self.count * usize::from(PHASES) + usize::from(self.phase);
        tick.saturating_sub(HBLANK_CLOCKS)
    }

    /// Raw tick index since the start of the cycle.
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.count * usize::from(PHASES) + usize::from(self.phase)
    }
}

/// Generate the LFSR sequence for the given width.
///
/// Shift right, XNOR feedback into the top bit. Tap positions per width
/// match the TIA parts so every sequence is maximal: the 63 (6-bit), 31
/// (5-bit) and 511 (9-bit) states before the pattern repeats.
fn sequence(width: u8) -> Vec<u16> {
    let tap = match width {
        5 => 2,
        6 => 1,
        9 => 4,
        _ => panic!("unsupported polycounter width"),
    };

    let len = (1usize << width) - 1;
    let mut table = Vec::with_capacity(len);
    let mut p: u16 = 0;
    for _ in 0..len {
        table.push(p);
        let feedback = ((p & 0x01) ^ ((p >> tap) & 0x01)) ^ 0x01;
        p = (p >> 1) | (feedback << (width - 1));
    }
    table
}

impl fmt::Display for Polycounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:0w$b} ({}/{})",
            self.table[self.count],
            self.count,
            self.phase,
            w = usize::from(self.width)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_bit_sequence_is_maximal() {
        let seq = sequence(6);
        assert_eq!(seq.len(), 63);
        let mut sorted = seq.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 63, "states repeat before the cycle ends");
        assert!(!seq.contains(&0b111111), "lock-up state must not appear");
    }

    #[test]
    fn sprite_reset_point_pattern() {
        // the sprite position counters reset at "101101"
        let seq = sequence(6);
        assert_eq!(seq[39], 0b101101);
    }

    #[test]
    fn five_and_nine_bit_sequences() {
        assert_eq!(sequence(5).len(), 31);
        assert_eq!(sequence(9).len(), 511);

        let mut five = sequence(5);
        five.sort_unstable();
        five.dedup();
        assert_eq!(five.len(), 31);

        let mut nine = sequence(9);
        nine.sort_unstable();
        nine.dedup();
        assert_eq!(nine.len(), 511);
    }

    #[test]
    fn horizontal_clock_cycle() {
        // reset point 56: 57 states x 4 phases = 228 ticks per scanline
        let mut pk = Polycounter::new(6, 56);
        let mut ticks = 0;
        loop {
            ticks += 1;
            if pk.tick() {
                break;
            }
        }
        assert_eq!(ticks, 228);
        assert_eq!(pk.count, 0);
        assert_eq!(pk.phase, 0);
    }

    #[test]
    fn position_counter_cycle() {
        // reset point 39: 40 states x 4 phases = 160 ticks, one per
        // visible pixel
        let mut pk = Polycounter::new(6, 39);
        let mut ticks = 0;
        loop {
            ticks += 1;
            if pk.tick() {
                break;
            }
        }
        assert_eq!(ticks, 160);
    }

    #[test]
    fn pixel_mapping() {
        let mut pk = Polycounter::new(6, 56);
        // inside hblank
        for _ in 0..10 {
            pk.tick();
        }
        assert_eq!(pk.pixel(), 0);

        // first tick past hblank
        while pk.tick_count() < HBLANK_CLOCKS {
            pk.tick();
        }
        assert_eq!(pk.pixel(), 0);
        pk.tick();
        assert_eq!(pk.pixel(), 1);
    }

    #[test]
    fn reset_jumps_to_zero() {
        let mut pk = Polycounter::new(6, 39);
        for _ in 0..37 {
            pk.tick();
        }
        assert_ne!(pk.count, 0);
        pk.reset();
        assert_eq!(pk.count, 0);
        assert_eq!(pk.phase, 0);
    }
}
