//! The CPU stepper.
//!
//! Whole-instruction execution with per-cycle accounting. Every bus
//! access consumes one cycle and is followed by the bus `cycle()` hook;
//! internal ALU cycles consume a cycle with no access. The observed cycle
//! and byte counts are recorded in `ExecutionResult` and checked against
//! the definitions table by `ExecutionResult::is_valid`.

use emu_core::{CpuBus, Error, Register};

use crate::execution::ExecutionResult;
use crate::instructions::{definition, AddressingMode, Effect};
use crate::registers::StatusRegister;
use crate::{BRK_VECTOR, RESET_VECTOR};

/// Stack page base address.
const STACK_BASE: u16 = 0x0100;

/// The MOS 6507 CPU.
///
/// Registers are bit-width cells so flag arithmetic threads through them
/// exactly as on the silicon.
#[derive(Debug, Clone)]
pub struct Mos6507 {
    pub pc: Register,
    pub a: Register,
    pub x: Register,
    pub y: Register,
    pub sp: Register,
    pub status: StatusRegister,

    /// Record of the most recently executed instruction.
    pub last_result: ExecutionResult,
}

impl Default for Mos6507 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6507 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pc: Register::new(0, 16),
            a: Register::new(0, 8),
            x: Register::new(0, 8),
            y: Register::new(0, 8),
            sp: Register::new(0xfd, 8),
            status: StatusRegister::new(),
            last_result: ExecutionResult::default(),
        }
    }

    /// Load PC from the reset vector and return registers to their
    /// power-on state. Reset does not consume counted cycles.
    ///
    /// # Errors
    ///
    /// Propagates fatal bus errors.
    pub fn reset<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), Error> {
        let lo = bus.read(RESET_VECTOR)?;
        let hi = bus.read(RESET_VECTOR + 1)?;
        self.pc.load(u16::from(lo) | u16::from(hi) << 8);
        self.a.load(0);
        self.x.load(0);
        self.y.load(0);
        self.sp.load(0xfd);
        self.status = StatusRegister::new();
        self.last_result = ExecutionResult {
            finalised: true,
            ..ExecutionResult::default()
        };
        Ok(())
    }

    /// Execute one whole instruction.
    ///
    /// The bus `cycle()` hook fires once per consumed CPU cycle, after
    /// the access for that cycle. On return `last_result` is finalised.
    ///
    /// # Errors
    ///
    /// `Error::InvalidResult` on an undocumented opcode; otherwise
    /// whatever fatal error the bus raises.
    pub fn execute_instruction<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), Error> {
        self.last_result = ExecutionResult::default();

        let opcode = self.read_cycle(bus, self.pc.value())?;
        self.advance_pc();
        self.last_result.byte_count = 1;

        let Some(defn) = definition(opcode) else {
            return Err(Error::InvalidResult(format!(
                "unimplemented opcode ({opcode:#04x})"
            )));
        };
        self.last_result.defn = Some(defn);

        match defn.mode {
            AddressingMode::Implied | AddressingMode::Accumulator => {
                self.idle_cycle(bus)?;
                self.execute_internal(bus, defn.mnemonic, defn.mode)?;
            }
            AddressingMode::Immediate => {
                let value = self.fetch_operand(bus)?;
                self.last_result.instruction_data = u16::from(value);
                self.execute_with_value(defn.mnemonic, value);
            }
            AddressingMode::Relative => {
                let offset = self.fetch_operand(bus)?;
                self.execute_branch(bus, defn.mnemonic, offset)?;
            }
            _ => {
                let address = self.resolve_address(bus, defn.mode, defn.effect)?;
                self.last_result.instruction_data = address;
                self.execute_addressed(bus, defn.mnemonic, defn.effect, address)?;
            }
        }

        self.last_result.finalised = true;
        Ok(())
    }

    // -----------------------------------------------------------------
    // cycle helpers
    // -----------------------------------------------------------------

    fn read_cycle<B: CpuBus>(&mut self, bus: &mut B, address: u16) -> Result<u8, Error> {
        let value = bus.read(address)?;
        self.last_result.actual_cycles += 1;
        bus.cycle()?;
        Ok(value)
    }

    fn write_cycle<B: CpuBus>(&mut self, bus: &mut B, address: u16, value: u8) -> Result<(), Error> {
        bus.write(address, value)?;
        self.last_result.actual_cycles += 1;
        bus.cycle()?;
        Ok(())
    }

    fn idle_cycle<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), Error> {
        self.last_result.actual_cycles += 1;
        bus.cycle()
    }

    fn advance_pc(&mut self) {
        self.pc.add(1, false);
    }

    /// Fetch the next operand byte, counting it towards the byte count.
    fn fetch_operand<B: CpuBus>(&mut self, bus: &mut B) -> Result<u8, Error> {
        let value = self.read_cycle(bus, self.pc.value())?;
        self.advance_pc();
        self.last_result.byte_count += 1;
        Ok(value)
    }

    // -----------------------------------------------------------------
    // addressing
    // -----------------------------------------------------------------

    /// Resolve the effective address for address-taking modes, consuming
    /// the documented cycles (page-crossing penalties, spurious reads on
    /// indexed writes, the JMP-indirect wrap).
    fn resolve_address<B: CpuBus>(
        &mut self,
        bus: &mut B,
        mode: AddressingMode,
        effect: Effect,
    ) -> Result<u16, Error> {
        match mode {
            AddressingMode::ZeroPage => Ok(u16::from(self.fetch_operand(bus)?)),

            AddressingMode::ZeroPageX => {
                let base = self.fetch_operand(bus)?;
                self.idle_cycle(bus)?;
                Ok(u16::from(base.wrapping_add(self.x.value() as u8)))
            }

            AddressingMode::ZeroPageY => {
                let base = self.fetch_operand(bus)?;
                self.idle_cycle(bus)?;
                Ok(u16::from(base.wrapping_add(self.y.value() as u8)))
            }

            AddressingMode::Absolute => {
                let lo = self.fetch_operand(bus)?;
                let hi = self.fetch_operand(bus)?;
                Ok(u16::from(lo) | u16::from(hi) << 8)
            }

            AddressingMode::AbsoluteX => {
                let lo = self.fetch_operand(bus)?;
                let hi = self.fetch_operand(bus)?;
                let base = u16::from(lo) | u16::from(hi) << 8;
                self.index_absolute(bus, base, self.x.value() as u8, effect)
            }

            AddressingMode::AbsoluteY => {
                let lo = self.fetch_operand(bus)?;
                let hi = self.fetch_operand(bus)?;
                let base = u16::from(lo) | u16::from(hi) << 8;
                self.index_absolute(bus, base, self.y.value() as u8, effect)
            }

            AddressingMode::Indirect => {
                let lo = self.fetch_operand(bus)?;
                let hi = self.fetch_operand(bus)?;
                let pointer = u16::from(lo) | u16::from(hi) << 8;

                let target_lo = self.read_cycle(bus, pointer)?;
                // the 6502 never carries into the pointer's high byte:
                // a pointer at the end of a page wraps within the page
                let hi_pointer = if pointer & 0x00ff == 0x00ff {
                    self.last_result.bug = Some("indirect JMP page wrap");
                    pointer & 0xff00
                } else {
                    pointer + 1
                };
                let target_hi = self.read_cycle(bus, hi_pointer)?;
                Ok(u16::from(target_lo) | u16::from(target_hi) << 8)
            }

            AddressingMode::IndexedIndirect => {
                let pointer = self.fetch_operand(bus)?;
                self.idle_cycle(bus)?;
                let pointer = pointer.wrapping_add(self.x.value() as u8);
                let lo = self.read_cycle(bus, u16::from(pointer))?;
                let hi = self.read_cycle(bus, u16::from(pointer.wrapping_add(1)))?;
                Ok(u16::from(lo) | u16::from(hi) << 8)
            }

            AddressingMode::IndirectIndexed => {
                let pointer = self.fetch_operand(bus)?;
                let lo = self.read_cycle(bus, u16::from(pointer))?;
                let hi = self.read_cycle(bus, u16::from(pointer.wrapping_add(1)))?;
                let base = u16::from(lo) | u16::from(hi) << 8;
                self.index_absolute(bus, base, self.y.value() as u8, effect)
            }

            _ => Err(Error::Panic("mode does not take an address".into())),
        }
    }

    /// Apply an index register to a base address with the documented
    /// penalty behaviour.
    fn index_absolute<B: CpuBus>(
        &mut self,
        bus: &mut B,
        base: u16,
        index: u8,
        effect: Effect,
    ) -> Result<u16, Error> {
        let indexed = base.wrapping_add(u16::from(index));
        let crossed = indexed & 0xff00 != base & 0xff00;
        // the address seen on the bus before the high byte is corrected
        let uncorrected = base & 0xff00 | indexed & 0x00ff;

        match effect {
            Effect::Read => {
                if crossed {
                    let _ = self.read_cycle(bus, uncorrected)?;
                    self.last_result.page_fault = true;
                }
            }
            Effect::Write => {
                // writes always spend the fix-up cycle reading the
                // uncorrected address; when the page crosses, that read
                // lands on the wrong address and is visible to hardware
                let _ = self.read_cycle(bus, uncorrected)?;
                if crossed {
                    self.last_result.bug = Some("indexed write spurious read");
                }
            }
            Effect::Rmw => {
                let _ = self.read_cycle(bus, uncorrected)?;
            }
            _ => {}
        }

        Ok(indexed)
    }

    // -----------------------------------------------------------------
    // execution
    // -----------------------------------------------------------------

    /// Instructions that touch memory through an effective address.
    fn execute_addressed<B: CpuBus>(
        &mut self,
        bus: &mut B,
        mnemonic: &str,
        effect: Effect,
        address: u16,
    ) -> Result<(), Error> {
        match effect {
            Effect::Read => {
                let value = self.read_cycle(bus, address)?;
                self.execute_with_value(mnemonic, value);
                Ok(())
            }

            Effect::Write => {
                let value = match mnemonic {
                    "STA" => self.a.value() as u8,
                    "STX" => self.x.value() as u8,
                    "STY" => self.y.value() as u8,
                    _ => return Err(Error::Panic(format!("unknown store ({mnemonic})"))),
                };
                self.write_cycle(bus, address, value)
            }

            Effect::Rmw => {
                let value = self.read_cycle(bus, address)?;
                // the unmodified value goes back first; real RMW
                // instructions write twice
                self.write_cycle(bus, address, value)?;
                let modified = self.modify(mnemonic, value);
                self.write_cycle(bus, address, modified)
            }

            Effect::Flow => {
                // JMP
                self.pc.load(address);
                Ok(())
            }

            Effect::Subroutine => self.execute_jsr(bus, address),

            _ => Err(Error::Panic(format!(
                "unexpected addressed instruction ({mnemonic})"
            ))),
        }
    }

    /// JSR: the return address pushed is the address of the last byte of
    /// the instruction; RTS corrects by one.
    fn execute_jsr<B: CpuBus>(&mut self, bus: &mut B, address: u16) -> Result<(), Error> {
        self.idle_cycle(bus)?;
        let return_addr = self.pc.value().wrapping_sub(1);
        self.push(bus, (return_addr >> 8) as u8)?;
        self.push(bus, (return_addr & 0xff) as u8)?;
        self.pc.load(address);
        Ok(())
    }

    /// Apply a read-style instruction to a fetched value.
    fn execute_with_value(&mut self, mnemonic: &str, value: u8) {
        let value16 = u16::from(value);
        match mnemonic {
            "LDA" => {
                self.a.load(value16);
                self.set_zn_a();
            }
            "LDX" => {
                self.x.load(value16);
                self.status.set_zn(value);
            }
            "LDY" => {
                self.y.load(value16);
                self.status.set_zn(value);
            }
            "AND" => {
                self.a.and(value16);
                self.set_zn_a();
            }
            "ORA" => {
                self.a.or(value16);
                self.set_zn_a();
            }
            "EOR" => {
                self.a.eor(value16);
                self.set_zn_a();
            }
            "ADC" => self.adc(value16),
            "SBC" => self.sbc(value16),
            "CMP" => {
                let (c, z, n) = self.a.compare(value16);
                self.status.carry = c;
                self.status.zero = z;
                self.status.negative = n;
            }
            "CPX" => {
                let (c, z, n) = self.x.compare(value16);
                self.status.carry = c;
                self.status.zero = z;
                self.status.negative = n;
            }
            "CPY" => {
                let (c, z, n) = self.y.compare(value16);
                self.status.carry = c;
                self.status.zero = z;
                self.status.negative = n;
            }
            "BIT" => {
                self.status.zero = self.a.value() & value16 == 0;
                self.status.negative = value & 0x80 != 0;
                self.status.overflow = value & 0x40 != 0;
            }
            _ => debug_assert!(false, "unknown read instruction ({mnemonic})"),
        }
    }

    fn adc(&mut self, value: u16) {
        if self.status.decimal {
            // N, V and Z come from the binary sum; A and the carry are
            // decimal adjusted
            let mut probe = self.a;
            let (_, overflow) = probe.add(value, self.status.carry);
            let (carry, _) = self.a.add_decimal(value, self.status.carry);
            self.status.carry = carry;
            self.status.overflow = overflow;
            self.status.zero = probe.is_zero();
            self.status.negative = probe.is_negative();
        } else {
            let (carry, overflow) = self.a.add(value, self.status.carry);
            self.status.carry = carry;
            self.status.overflow = overflow;
            self.set_zn_a();
        }
    }

    fn sbc(&mut self, value: u16) {
        if self.status.decimal {
            // all flags follow the binary subtraction; only A is adjusted
            let mut probe = self.a;
            let (carry, overflow) = probe.subtract(value, self.status.carry);
            self.a.subtract_decimal(value, self.status.carry);
            self.status.carry = carry;
            self.status.overflow = overflow;
            self.status.zero = probe.is_zero();
            self.status.negative = probe.is_negative();
        } else {
            let (carry, overflow) = self.a.subtract(value, self.status.carry);
            self.status.carry = carry;
            self.status.overflow = overflow;
            self.set_zn_a();
        }
    }

    /// The modify step of an RMW instruction.
    fn modify(&mut self, mnemonic: &str, value: u8) -> u8 {
        let mut cell = Register::new(u16::from(value), 8);
        match mnemonic {
            "ASL" => self.status.carry = cell.logical_shift_left(),
            "LSR" => self.status.carry = cell.logical_shift_right(),
            "ROL" => self.status.carry = cell.rotate_left(self.status.carry),
            "ROR" => self.status.carry = cell.rotate_right(self.status.carry),
            "INC" => {
                cell.add(1, false);
            }
            "DEC" => {
                cell.subtract(1, true);
            }
            _ => debug_assert!(false, "unknown rmw instruction ({mnemonic})"),
        }
        let result = cell.value() as u8;
        self.status.set_zn(result);
        result
    }

    /// Implied and accumulator instructions.
    fn execute_internal<B: CpuBus>(
        &mut self,
        bus: &mut B,
        mnemonic: &str,
        mode: AddressingMode,
    ) -> Result<(), Error> {
        if mode == AddressingMode::Accumulator {
            let mut a = self.a;
            match mnemonic {
                "ASL" => self.status.carry = a.logical_shift_left(),
                "LSR" => self.status.carry = a.logical_shift_right(),
                "ROL" => self.status.carry = a.rotate_left(self.status.carry),
                "ROR" => self.status.carry = a.rotate_right(self.status.carry),
                _ => return Err(Error::Panic(format!("unknown accumulator op ({mnemonic})"))),
            }
            self.a = a;
            self.set_zn_a();
            return Ok(());
        }

        match mnemonic {
            "NOP" => {}
            "CLC" => self.status.carry = false,
            "SEC" => self.status.carry = true,
            "CLI" => self.status.interrupt_disable = false,
            "SEI" => self.status.interrupt_disable = true,
            "CLV" => self.status.overflow = false,
            "CLD" => self.status.decimal = false,
            "SED" => self.status.decimal = true,
            "TAX" => {
                self.x = self.a;
                self.status.set_zn(self.x.value() as u8);
            }
            "TAY" => {
                self.y = self.a;
                self.status.set_zn(self.y.value() as u8);
            }
            "TXA" => {
                self.a = self.x;
                self.set_zn_a();
            }
            "TYA" => {
                self.a = self.y;
                self.set_zn_a();
            }
            "TSX" => {
                self.x = self.sp;
                self.status.set_zn(self.x.value() as u8);
            }
            "TXS" => self.sp = self.x,
            "INX" => {
                self.x.add(1, false);
                self.status.set_zn(self.x.value() as u8);
            }
            "INY" => {
                self.y.add(1, false);
                self.status.set_zn(self.y.value() as u8);
            }
            "DEX" => {
                self.x.subtract(1, true);
                self.status.set_zn(self.x.value() as u8);
            }
            "DEY" => {
                self.y.subtract(1, true);
                self.status.set_zn(self.y.value() as u8);
            }
            "PHA" => {
                let a = self.a.value() as u8;
                self.push(bus, a)?;
            }
            "PHP" => {
                let p = self.status.to_pushed_byte(true);
                self.push(bus, p)?;
            }
            "PLA" => {
                self.idle_cycle(bus)?;
                let value = self.pull(bus)?;
                self.a.load(u16::from(value));
                self.set_zn_a();
            }
            "PLP" => {
                self.idle_cycle(bus)?;
                let value = self.pull(bus)?;
                self.status.from_pulled_byte(value);
            }
            "RTS" => {
                self.idle_cycle(bus)?;
                let lo = self.pull(bus)?;
                let hi = self.pull(bus)?;
                self.pc.load(u16::from(lo) | u16::from(hi) << 8);
                self.advance_pc();
                self.idle_cycle(bus)?;
            }
            "RTI" => {
                self.idle_cycle(bus)?;
                let p = self.pull(bus)?;
                self.status.from_pulled_byte(p);
                let lo = self.pull(bus)?;
                let hi = self.pull(bus)?;
                self.pc.load(u16::from(lo) | u16::from(hi) << 8);
            }
            "BRK" => self.execute_brk(bus)?,
            _ => return Err(Error::Panic(format!("unknown implied op ({mnemonic})"))),
        }
        Ok(())
    }

    /// Software interrupt through the 0xFFFE vector. The byte after the
    /// opcode is padding: read and skipped, not part of the instruction.
    fn execute_brk<B: CpuBus>(&mut self, bus: &mut B) -> Result<(), Error> {
        self.advance_pc();
        let pc = self.pc.value();
        self.push(bus, (pc >> 8) as u8)?;
        self.push(bus, (pc & 0xff) as u8)?;
        let p = self.status.to_pushed_byte(true);
        self.push(bus, p)?;
        self.status.interrupt_disable = true;
        let lo = self.read_cycle(bus, BRK_VECTOR)?;
        let hi = self.read_cycle(bus, BRK_VECTOR + 1)?;
        self.pc.load(u16::from(lo) | u16::from(hi) << 8);
        Ok(())
    }

    /// Conditional branches: 2 cycles untaken, +1 taken, +1 more when
    /// the target is on a different page.
    fn execute_branch<B: CpuBus>(
        &mut self,
        bus: &mut B,
        mnemonic: &str,
        offset: u8,
    ) -> Result<(), Error> {
        let taken = match mnemonic {
            "BPL" => !self.status.negative,
            "BMI" => self.status.negative,
            "BVC" => !self.status.overflow,
            "BVS" => self.status.overflow,
            "BCC" => !self.status.carry,
            "BCS" => self.status.carry,
            "BNE" => !self.status.zero,
            "BEQ" => self.status.zero,
            _ => return Err(Error::Panic(format!("unknown branch ({mnemonic})"))),
        };

        let target = self.pc.value().wrapping_add(offset as i8 as u16);
        self.last_result.instruction_data = target;

        if taken {
            self.idle_cycle(bus)?;
            if target & 0xff00 != self.pc.value() & 0xff00 {
                self.idle_cycle(bus)?;
                self.last_result.page_fault = true;
            }
            self.pc.load(target);
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // stack
    // -----------------------------------------------------------------

    fn push<B: CpuBus>(&mut self, bus: &mut B, value: u8) -> Result<(), Error> {
        let addr = STACK_BASE | self.sp.value();
        self.write_cycle(bus, addr, value)?;
        self.sp.load(self.sp.value().wrapping_sub(1));
        Ok(())
    }

    fn pull<B: CpuBus>(&mut self, bus: &mut B) -> Result<u8, Error> {
        self.sp.load(self.sp.value().wrapping_add(1));
        let addr = STACK_BASE | self.sp.value();
        self.read_cycle(bus, addr)
    }

    fn set_zn_a(&mut self) {
        self.status.zero = self.a.is_zero();
        self.status.negative = self.a.is_negative();
    }
}
