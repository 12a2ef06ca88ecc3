//! The RIOT (6532) timer and I/O ports.
//!
//! The programmable interval timer decrements once per 1, 8, 64 or
//! 1024 CPU cycles depending on which register started it. After
//! underflow it decrements every cycle and raises the TIMINT flag. The
//! I/O ports carry the joysticks and the console switches; input
//! devices write into them over the peripheral bus.

use crate::memory::addresses;
use crate::memory::ChipMemory;

/// Timer state.
#[derive(Debug, Clone, Copy)]
struct Timer {
    /// CPU cycles per decrement: 1, 8, 64 or 1024.
    interval: u32,
    /// Current INTIM value.
    value: u8,
    /// Cycles until the next decrement.
    divider: u32,
    /// Set at underflow; cleared by the next TIMxT write.
    expired: bool,
}

impl Timer {
    fn new() -> Self {
        Self {
            interval: 1024,
            value: 0,
            divider: 1024,
            expired: false,
        }
    }
}

pub struct Riot {
    timer: Timer,
}

impl Riot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            timer: Timer::new(),
        }
    }

    /// Initialise the port registers to their unpressed states.
    pub fn reset(&mut self, mem: &mut ChipMemory) {
        self.timer = Timer::new();
        // all joystick lines high (nothing pressed)
        mem.chip_write(addresses::SWCHA, 0xff);
        // console switches: b/w off, select/reset released
        mem.chip_write(addresses::SWCHB, 0x0b);
        mem.chip_write(addresses::INTIM, 0);
        mem.chip_write(addresses::TIMINT, 0);
    }

    /// Advance one CPU cycle: service port/timer writes, then step the
    /// timer.
    pub fn step(&mut self, mem: &mut ChipMemory) {
        while let Some(signal) = mem.chip_read() {
            match signal.register {
                addresses::TIM1T => self.start_timer(1, signal.value, mem),
                addresses::TIM8T => self.start_timer(8, signal.value, mem),
                addresses::TIM64T => self.start_timer(64, signal.value, mem),
                addresses::T1024T => self.start_timer(1024, signal.value, mem),
                // port direction and output writes store as-is; the
                // standard peripherals drive the ports themselves
                addresses::SWCHA | addresses::SWACNT | addresses::SWCHB | addresses::SWBCNT => {
                    mem.chip_write(signal.register, signal.value);
                }
                _ => log::debug!("unserviced RIOT write ({:#06x})", signal.register),
            }
        }

        self.tick_timer(mem);
    }

    fn start_timer(&mut self, interval: u32, value: u8, mem: &mut ChipMemory) {
        self.timer = Timer {
            interval,
            value,
            divider: interval,
            expired: false,
        };
        mem.chip_write(addresses::INTIM, value);
        mem.chip_write(addresses::TIMINT, 0);
    }

    fn tick_timer(&mut self, mem: &mut ChipMemory) {
        let timer = &mut self.timer;
        timer.divider -= 1;
        if timer.divider > 0 {
            return;
        }

        if timer.value == 0 {
            // underflow: flag it and fall back to every-cycle counting
            timer.expired = true;
            mem.chip_write(addresses::TIMINT, 0x80);
        }
        timer.value = timer.value.wrapping_sub(1);
        timer.divider = if timer.expired { 1 } else { timer.interval };
        mem.chip_write(addresses::INTIM, timer.value);
    }
}

impl Default for Riot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::map::extent;

    fn riot_mem() -> ChipMemory {
        ChipMemory::new(
            extent::RIOT_ORIGIN,
            extent::RIOT_MEMTOP,
            addresses::RIOT_READ,
            addresses::RIOT_WRITE,
        )
    }

    #[test]
    fn tim64t_decrements_every_64_cycles() {
        let mut mem = riot_mem();
        let mut riot = Riot::new();
        riot.reset(&mut mem);

        mem.write(addresses::TIM64T, 10).unwrap();
        riot.step(&mut mem);
        assert_eq!(mem.read(addresses::INTIM).unwrap(), 10);

        // 63 more cycles to complete the first interval
        for _ in 0..63 {
            riot.step(&mut mem);
        }
        assert_eq!(mem.read(addresses::INTIM).unwrap(), 9);

        for _ in 0..64 {
            riot.step(&mut mem);
        }
        assert_eq!(mem.read(addresses::INTIM).unwrap(), 8);
    }

    #[test]
    fn underflow_raises_timint_and_speeds_up() {
        let mut mem = riot_mem();
        let mut riot = Riot::new();
        riot.reset(&mut mem);

        mem.write(addresses::TIM8T, 1).unwrap();
        riot.step(&mut mem);

        // 7 more cycles complete the first interval: 1 -> 0
        for _ in 0..7 {
            riot.step(&mut mem);
        }
        assert_eq!(mem.read(addresses::INTIM).unwrap(), 0);
        assert_eq!(mem.read(addresses::TIMINT).unwrap(), 0);

        // the next interval underflows to 0xff with the flag up
        for _ in 0..8 {
            riot.step(&mut mem);
        }
        assert_eq!(mem.read(addresses::INTIM).unwrap(), 0xff);
        assert_eq!(mem.read(addresses::TIMINT).unwrap(), 0x80);

        // post-underflow the value drops every cycle
        riot.step(&mut mem);
        assert_eq!(mem.read(addresses::INTIM).unwrap(), 0xfe);

        // a new timer write clears the flag
        mem.write(addresses::TIM1T, 5).unwrap();
        riot.step(&mut mem);
        assert_eq!(mem.read(addresses::TIMINT).unwrap(), 0);
    }
}
