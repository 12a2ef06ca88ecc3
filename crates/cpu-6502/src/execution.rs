//! Execution results and post-condition checks.

use emu_core::Error;

use crate::instructions::Definition;

/// The record of the most recently executed instruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionResult {
    /// Definition of the executed opcode.
    pub defn: Option<&'static Definition>,

    /// The operand as decoded: the immediate value, the effective
    /// address, or the branch offset.
    pub instruction_data: u16,

    /// Bytes read during decode, including the opcode.
    pub byte_count: u8,

    /// Cycles actually consumed.
    pub actual_cycles: u8,

    /// Whether a page-crossing penalty fired.
    pub page_fault: bool,

    /// Set when a documented CPU bug was triggered (eg. the JMP-indirect
    /// page wrap). Cycle checks are skipped for bugged executions.
    pub bug: Option<&'static str>,

    /// True once the instruction has run to completion - the CPU is at
    /// an instruction boundary.
    pub finalised: bool,
}

impl ExecutionResult {
    /// Check that the result is consistent with the instruction
    /// definition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidResult` describing the first inconsistency
    /// found.
    pub fn is_valid(&self) -> Result<(), Error> {
        if !self.finalised {
            return Err(Error::InvalidResult(
                "execution not finalised (bad opcode?)".into(),
            ));
        }

        let defn = self
            .defn
            .ok_or_else(|| Error::InvalidResult("no instruction definition".into()))?;

        if !defn.page_sensitive && self.page_fault {
            return Err(Error::InvalidResult("unexpected page fault".into()));
        }

        if self.byte_count != defn.bytes {
            return Err(Error::InvalidResult(format!(
                "unexpected number of bytes read during decode ({} instead of {})",
                self.byte_count, defn.bytes
            )));
        }

        // a triggered bug distorts the timing; skip the cycle checks
        if self.bug.is_some() {
            return Ok(());
        }

        if defn.is_branch() {
            if self.actual_cycles != defn.cycles
                && self.actual_cycles != defn.cycles + 1
                && self.actual_cycles != defn.cycles + 2
            {
                return Err(Error::InvalidResult(format!(
                    "number of cycles wrong for opcode {:#04x} [{}] ({} instead of {}, {} or {})",
                    defn.opcode,
                    defn.mnemonic,
                    self.actual_cycles,
                    defn.cycles,
                    defn.cycles + 1,
                    defn.cycles + 2
                )));
            }
        } else if defn.page_sensitive {
            let expected = if self.page_fault {
                defn.cycles + 1
            } else {
                defn.cycles
            };
            if self.actual_cycles != expected {
                return Err(Error::InvalidResult(format!(
                    "number of cycles wrong for opcode {:#04x} [{}] ({} instead of {})",
                    defn.opcode, defn.mnemonic, self.actual_cycles, expected
                )));
            }
        } else if self.actual_cycles != defn.cycles {
            return Err(Error::InvalidResult(format!(
                "number of cycles wrong for opcode {:#04x} [{}] ({} instead of {})",
                defn.opcode, defn.mnemonic, self.actual_cycles, defn.cycles
            )));
        }

        Ok(())
    }
}
