//! The console orchestrator.
//!
//! One CPU clock cycle is exactly three TIA color-clocks, executed
//! after the CPU's bus access for that cycle, followed by one RIOT
//! tick. `step` runs one whole instruction and hands the debugger a
//! hook at every color-clock (the video quantum). WSYNC stretches the
//! instruction boundary by burning CPU cycles until the TIA releases
//! the RDY line.

use cpu_6502::Mos6507;
use emu_core::{CpuBus, Error};

use crate::cartridge::Cartridge;
use crate::memory::VcsMemory;
use crate::peripherals::{self, InputEvent};
use crate::riot::Riot;
use crate::television::{StateReq, Television};
use crate::tia::Tia;

/// TIA color-clocks per CPU clock cycle.
pub const COLOR_CLOCKS_PER_CPU_CYCLE: u32 = 3;

/// What the video-quantum hook wants the orchestrator to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoCycleCommand {
    /// Keep running.
    #[default]
    Continue,
    /// Finish the current instruction, then stop.
    Halt,
}

/// The machine behind the CPU: everything a bus cycle touches.
struct StepBus<'a> {
    mem: &'a mut VcsMemory,
    tia: &'a mut Tia,
    riot: &'a mut Riot,
    tv: &'a mut dyn Television,
    on_video: &'a mut dyn FnMut(&Tia) -> VideoCycleCommand,
    halt_requested: bool,
}

impl CpuBus for StepBus<'_> {
    fn read(&mut self, address: u16) -> Result<u8, Error> {
        self.mem.read(address)
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), Error> {
        self.mem.write(address, value)
    }

    fn cycle(&mut self) -> Result<(), Error> {
        for _ in 0..COLOR_CLOCKS_PER_CPU_CYCLE {
            self.tia.step(&mut self.mem.tia, self.tv)?;
            if (self.on_video)(self.tia) == VideoCycleCommand::Halt {
                self.halt_requested = true;
            }
        }
        self.riot.step(&mut self.mem.riot);
        Ok(())
    }
}

/// The Atari 2600.
pub struct Vcs {
    pub cpu: Mos6507,
    pub mem: VcsMemory,
    pub tia: Tia,
    pub riot: Riot,
    pub tv: Box<dyn Television>,
}

impl Vcs {
    #[must_use]
    pub fn new(tv: Box<dyn Television>) -> Self {
        let mut vcs = Self {
            cpu: Mos6507::new(),
            mem: VcsMemory::new(),
            tia: Tia::new(),
            riot: Riot::new(),
            tv,
        };
        vcs.riot.reset(&mut vcs.mem.riot);
        vcs
    }

    /// Attach a cartridge and reset the machine.
    ///
    /// # Errors
    ///
    /// Fatal memory errors from the vector read.
    pub fn attach(&mut self, cartridge: Cartridge) -> Result<(), Error> {
        self.mem.cart = cartridge;
        self.reset()
    }

    /// Power-on reset: banking, chips and television return to their
    /// initial state and the CPU vectors through 0xFFFC.
    ///
    /// # Errors
    ///
    /// Fatal memory errors from the vector read.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.mem.cart.reset();
        self.tia = Tia::new();
        self.riot = Riot::new();
        self.riot.reset(&mut self.mem.riot);
        self.tv.reset();
        self.cpu.reset(&mut self.mem)
    }

    /// Execute one whole CPU instruction, ticking the TIA three times
    /// per CPU cycle and the RIOT once. The hook fires at every
    /// color-clock. Returns true when the hook requested a halt.
    ///
    /// # Errors
    ///
    /// CPU `InvalidResult` post-condition failures, fatal memory
    /// errors, and renderer errors.
    pub fn step(
        &mut self,
        on_video: &mut dyn FnMut(&Tia) -> VideoCycleCommand,
    ) -> Result<bool, Error> {
        let mut bus = StepBus {
            mem: &mut self.mem,
            tia: &mut self.tia,
            riot: &mut self.riot,
            tv: self.tv.as_mut(),
            on_video,
            halt_requested: false,
        };

        self.cpu.execute_instruction(&mut bus)?;

        // WSYNC: the RDY line holds the CPU at the instruction
        // boundary until the next horizontal blank
        while !bus.tia.cpu_ready() {
            bus.cycle()?;
        }

        let halt = bus.halt_requested;
        self.cpu.last_result.is_valid()?;
        Ok(halt)
    }

    /// Run instructions until `running` says stop or the video hook
    /// requests a halt. Cancellation is cooperative: the current
    /// instruction always completes.
    ///
    /// # Errors
    ///
    /// As `step`.
    pub fn run(&mut self, running: &mut dyn FnMut() -> bool) -> Result<(), Error> {
        let mut hook = |_: &Tia| VideoCycleCommand::Continue;
        while running() {
            if self.step(&mut hook)? {
                break;
            }
        }
        Ok(())
    }

    /// Run until the television has seen `frames` more frames.
    ///
    /// # Errors
    ///
    /// As `step`; also `Error::OutOfSpec` when the cartridge never
    /// produces a VSYNC within a generous instruction budget.
    pub fn run_frames(&mut self, frames: i32) -> Result<(), Error> {
        let target = self.tv.get_state(StateReq::Framenum)? + frames;
        let mut hook = |_: &Tia| VideoCycleCommand::Continue;

        // ~6,500 instructions fill a healthy frame; budget generously
        let mut budget: i64 = i64::from(frames.max(1)) * 100_000;

        while self.tv.get_state(StateReq::Framenum)? < target {
            self.step(&mut hook)?;
            budget -= 1;
            if budget <= 0 {
                return Err(Error::OutOfSpec(
                    "no VSYNC within the instruction budget".into(),
                ));
            }
        }
        Ok(())
    }

    /// Drop a peripheral event into the input latches.
    pub fn input(&mut self, event: InputEvent) {
        peripherals::apply(event, &mut self.mem);
    }

    // -----------------------------------------------------------------
    // debugger bus
    // -----------------------------------------------------------------

    /// Read without side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.mem.peek(address)
    }

    /// Write without strobe side effects.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.mem.poke(address, value);
    }

    /// The cartridge bank mapped at an address.
    #[must_use]
    pub fn get_bank(&self, address: u16) -> usize {
        self.mem.cart.bank(address & 0x0fff)
    }

    /// Television state requests.
    ///
    /// # Errors
    ///
    /// `Error::UnknownTvRequest` for unanswerable requests.
    pub fn tv_state(&self, request: StateReq) -> Result<i32, Error> {
        self.tv.get_state(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::television::{Basic, TvType};

    /// A 4K image: SEI, CLD, then a busy loop, with vectors pointing
    /// at 0xF000.
    fn busy_rom() -> Cartridge {
        let mut rom = vec![0xea; 4096]; // NOP sled
        rom[0x0000] = 0x78; // SEI
        rom[0x0001] = 0xd8; // CLD
        // loop back before the sled runs into the vectors
        rom[0x0ff0] = 0x4c; // JMP $F000
        rom[0x0ff1] = 0x00;
        rom[0x0ff2] = 0xf0;
        // reset vector
        rom[0x0ffc] = 0x00;
        rom[0x0ffd] = 0xf0;
        Cartridge::attach(rom).unwrap()
    }

    #[test]
    fn reset_vectors_through_the_cartridge() {
        let mut vcs = Vcs::new(Box::new(Basic::new(TvType::Ntsc)));
        vcs.attach(busy_rom()).unwrap();
        assert_eq!(vcs.cpu.pc, 0xf000);
    }

    #[test]
    fn three_color_clocks_per_cpu_cycle() {
        let mut vcs = Vcs::new(Box::new(Basic::new(TvType::Ntsc)));
        vcs.attach(busy_rom()).unwrap();

        let mut video_cycles = 0;

        vcs.step(&mut |_: &Tia| {
            video_cycles += 1;
            VideoCycleCommand::Continue
        })
        .unwrap(); // SEI: 2 cycles
        assert_eq!(vcs.cpu.last_result.actual_cycles, 2);
        assert_eq!(video_cycles, 6);

        vcs.step(&mut |_: &Tia| {
            video_cycles += 1;
            VideoCycleCommand::Continue
        })
        .unwrap(); // CLD: 2 cycles
        assert_eq!(video_cycles, 12);
    }

    #[test]
    fn halt_request_stops_the_run_loop() {
        let mut vcs = Vcs::new(Box::new(Basic::new(TvType::Ntsc)));
        vcs.attach(busy_rom()).unwrap();

        let mut hook = |_: &Tia| VideoCycleCommand::Halt;
        let halted = vcs.step(&mut hook).unwrap();
        assert!(halted);
    }

    #[test]
    fn wsync_consumes_cycles_to_the_next_scanline() {
        // SEI then STA WSYNC then NOP sled
        let mut rom = vec![0xea; 4096];
        rom[0x0000] = 0x78; // SEI
        rom[0x0001] = 0x85; // STA $02
        rom[0x0002] = 0x02;
        rom[0x0ffc] = 0x00;
        rom[0x0ffd] = 0xf0;

        let mut vcs = Vcs::new(Box::new(Basic::new(TvType::Ntsc)));
        vcs.attach(Cartridge::attach(rom).unwrap()).unwrap();

        let mut hook = |_: &Tia| VideoCycleCommand::Continue;
        vcs.step(&mut hook).unwrap(); // SEI
        vcs.step(&mut hook).unwrap(); // STA WSYNC

        // the CPU resumes at the start of a scanline
        assert_eq!(vcs.tia.clock() % 228, 0);
        assert_eq!(vcs.tv_state(StateReq::HorizPos).unwrap(), -68);
    }
}
