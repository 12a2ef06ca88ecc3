//! The Television Interface Adaptor.
//!
//! One `step` is one color-clock: service pending register writes from
//! the bus, advance the horizontal clock, run delayed effects, move the
//! sprites, and drive one signal into the television. The CPU runs at a
//! third of this rate and WSYNC stretches that further by holding RDY
//! until the next horizontal blank.

pub mod audio;
pub mod video;

use emu_core::{Error, Polycounter, Scheduler};

use crate::memory::addresses;
use crate::memory::ChipMemory;
use crate::television::{SignalAttributes, Television};

use audio::Audio;
use video::Video;

/// Color-clocks of horizontal blank on an undisturbed scanline.
const HBLANK_CLOCKS: i32 = 68;

/// HMOVE stretches the blank by eight color-clocks (the comb).
const HBLANK_CLOCKS_HMOVE: i32 = 76;

/// Color-clocks between the HMOVE strobe arriving on the chip bus and
/// the movement being applied.
const HMOVE_DELAY: u32 = 1;

/// Delayed TIA-level effects.
#[derive(Debug, Clone, Copy)]
enum TiaEvent {
    Hmove,
}

pub struct Tia {
    /// The horizontal clock: 57 counts of 4 phases = 228 color-clocks.
    color_clock: Polycounter,

    /// Where HBLANK ends on the current scanline.
    hblank_top: i32,

    /// WSYNC latch; holds the CPU RDY line low until the frontporch.
    wsync: bool,

    vsync: bool,
    vblank: bool,

    futures: Scheduler<TiaEvent>,

    pub video: Video,
    pub audio: Audio,
}

impl Tia {
    #[must_use]
    pub fn new() -> Self {
        Self {
            color_clock: Polycounter::new(6, 56),
            hblank_top: HBLANK_CLOCKS,
            wsync: false,
            vsync: false,
            vblank: false,
            futures: Scheduler::new(),
            video: Video::new(),
            audio: Audio::new(),
        }
    }

    /// Whether WSYNC is holding the CPU.
    #[must_use]
    pub fn cpu_ready(&self) -> bool {
        !self.wsync
    }

    /// Color-clock index within the scanline, 0..227.
    #[must_use]
    pub fn clock(&self) -> i32 {
        self.color_clock.tick_count() as i32
    }

    /// Advance one color-clock and signal the television.
    ///
    /// # Errors
    ///
    /// Renderer errors propagate through the television.
    pub fn step(&mut self, mem: &mut ChipMemory, tv: &mut dyn Television) -> Result<(), Error> {
        // service bus writes that arrived during the last CPU cycle
        while let Some(signal) = mem.chip_read() {
            self.service_write(signal.register, signal.value, mem);
        }

        // advance the horizontal clock; a completed cycle is the
        // frontporch of the next scanline
        let frontporch = self.color_clock.tick();
        if frontporch {
            self.wsync = false;
            self.hblank_top = HBLANK_CLOCKS;
        }

        let clock = self.clock();
        let pixel = clock - HBLANK_CLOCKS;

        // delayed TIA effects, then delayed video effects
        let mut fired = Vec::new();
        self.futures.tick(|event| fired.push(event));
        for event in fired {
            match event {
                TiaEvent::Hmove => self.apply_hmove(pixel.max(0)),
            }
        }
        self.video.tick_futures(pixel.max(0));

        let hblank = clock < self.hblank_top;

        let colors = if hblank {
            None
        } else {
            self.video.tick_sprites();
            Some(self.video.pixel(pixel, mem))
        };

        let sig = SignalAttributes {
            vsync: self.vsync,
            vblank: self.vblank,
            frontporch,
            hsync: (16..32).contains(&clock),
            cburst: (40..49).contains(&clock),
            pixel: colors.and_then(|c| c.pixel),
            alt_pixel: colors.and_then(|c| c.alt_pixel),
            audio: self.audio.step(),
        };

        tv.signal(sig)
    }

    /// Service one register write from the CPU.
    fn service_write(&mut self, register: u16, value: u8, mem: &mut ChipMemory) {
        match register {
            addresses::VSYNC => self.vsync = value & 0x02 != 0,
            addresses::VBLANK => self.vblank = value & 0x02 != 0,
            addresses::WSYNC => self.wsync = true,
            addresses::RSYNC => self.color_clock.reset(),
            addresses::HMOVE => {
                // the comb widens hblank at once; movement lands a
                // moment later
                self.hblank_top = HBLANK_CLOCKS_HMOVE;
                self.futures.schedule(HMOVE_DELAY, TiaEvent::Hmove, "HMOVE");
            }
            addresses::AUDC0 => self.audio.set_control(0, value),
            addresses::AUDC1 => self.audio.set_control(1, value),
            addresses::AUDF0 => self.audio.set_frequency(0, value),
            addresses::AUDF1 => self.audio.set_frequency(1, value),
            addresses::AUDV0 => self.audio.set_volume(0, value),
            addresses::AUDV1 => self.audio.set_volume(1, value),
            _ => {
                if !self.video.service_write(register, value, mem) {
                    log::debug!("unserviced TIA write ({register:#04x})");
                }
            }
        }
    }

    /// Apply the HMOVE comb: every sprite moves 8 pixels right, then
    /// the 4-bit counter ticks each sprite back left while its movement
    /// nibble matches.
    fn apply_hmove(&mut self, pixel: i32) {
        self.video.prepare_hmove();
        for count in (1..=15u8).rev() {
            self.video.resolve_hmove(count, pixel);
        }
    }
}

impl Default for Tia {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::map::extent;
    use crate::television::{Basic, StateReq, Television, TvType};

    fn fixture() -> (Tia, ChipMemory, Basic) {
        let tia = Tia::new();
        let mem = ChipMemory::new(
            extent::TIA_ORIGIN,
            extent::TIA_MEMTOP,
            addresses::TIA_READ,
            addresses::TIA_WRITE,
        );
        let tv = Basic::new(TvType::Ntsc);
        (tia, mem, tv)
    }

    #[test]
    fn scanline_is_228_clocks() {
        let (mut tia, mut mem, mut tv) = fixture();
        for _ in 0..228 {
            tia.step(&mut mem, &mut tv).unwrap();
        }
        assert_eq!(tv.get_state(StateReq::Scanline).unwrap(), 1);
        assert_eq!(tv.get_state(StateReq::HorizPos).unwrap(), -68);
    }

    #[test]
    fn wsync_holds_cpu_until_frontporch() {
        let (mut tia, mut mem, mut tv) = fixture();
        for _ in 0..10 {
            tia.step(&mut mem, &mut tv).unwrap();
        }

        mem.write(addresses::WSYNC, 0).unwrap();
        tia.step(&mut mem, &mut tv).unwrap();
        assert!(!tia.cpu_ready());

        // released exactly at the start of the next scanline
        while !tia.cpu_ready() {
            tia.step(&mut mem, &mut tv).unwrap();
        }
        assert_eq!(tia.clock(), 0);
    }

    #[test]
    fn hmove_extends_hblank() {
        let (mut tia, mut mem, mut tv) = fixture();
        tia.step(&mut mem, &mut tv).unwrap();

        mem.write(addresses::HMOVE, 0).unwrap();
        tia.step(&mut mem, &mut tv).unwrap();
        assert_eq!(tia.hblank_top, HBLANK_CLOCKS_HMOVE);

        // the extension lasts for the current scanline only
        let mut steps = 0;
        while tia.clock() != 0 {
            tia.step(&mut mem, &mut tv).unwrap();
            steps += 1;
            assert!(steps < 229);
        }
        assert_eq!(tia.hblank_top, HBLANK_CLOCKS);
    }

    #[test]
    fn hmove_moves_a_player_left() {
        let (mut tia, mut mem, mut tv) = fixture();

        // pin the player somewhere mid-scanline
        tia.video.player0.sprite.reset_position(80);

        mem.write(addresses::HMP0, 0x70).unwrap(); // +7
        mem.write(addresses::HMOVE, 0).unwrap();
        for _ in 0..3 {
            tia.step(&mut mem, &mut tv).unwrap();
        }

        assert_eq!(tia.video.player0.sprite.current_pixel, 73);
    }
}
