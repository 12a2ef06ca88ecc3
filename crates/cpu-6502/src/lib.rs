//! MOS 6502/6507 CPU emulation.
//!
//! The 6507 in the VCS is a 6502 with a narrower address bus; the
//! instruction set and timing are identical. Execution here is
//! whole-instruction (`execute_instruction`) but every consumed CPU cycle
//! is reported through the bus `cycle()` hook, after the bus access for
//! that cycle, so the machine can interleave its video chip at three
//! color-clocks per CPU cycle.
//!
//! Documented quirks are reproduced: the JMP-indirect page-wrap bug, the
//! read-modify-write dummy write, and the spurious read on indexed writes.

mod cpu;
mod execution;
mod instructions;
mod registers;

pub use cpu::Mos6507;
pub use execution::ExecutionResult;
pub use instructions::{definition, AddressingMode, Definition, Effect};
pub use registers::StatusRegister;

/// Reset vector location (low byte; high byte follows).
pub const RESET_VECTOR: u16 = 0xfffc;

/// BRK/IRQ vector location.
pub const BRK_VECTOR: u16 = 0xfffe;
