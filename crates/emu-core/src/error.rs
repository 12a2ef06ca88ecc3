//! Error taxonomy.
//!
//! Timing and protocol violations are non-fatal flags; hardware-visible
//! errors resolve to documented hardware behaviour at the call site;
//! invariant violations indicate an emulator bug and surface immediately.

use thiserror::Error;

/// Errors raised by the emulation core.
#[derive(Debug, Error)]
pub enum Error {
    /// Signal timing outside the programmer's-guide envelope. Non-fatal:
    /// the television flags itself out-of-spec and continues.
    #[error("out of spec: {0}")]
    OutOfSpec(String),

    /// Write to read-only cartridge space. The write is dropped and the
    /// instruction completes.
    #[error("unwritable address ({0:#06x})")]
    UnwritableAddress(u16),

    /// Read from a strobe or write-only register. The memory layer
    /// resolves the read to open-bus data.
    #[error("unreadable address ({0:#06x})")]
    UnreadableAddress(u16),

    /// CPU post-condition check failed (wrong cycle or byte count).
    #[error("invalid result: {0}")]
    InvalidResult(String),

    /// Unknown mapper or bad file size at cartridge load.
    #[error("cartridge error: {0}")]
    Cartridge(String),

    /// Memory invariant violation.
    #[error("memory error: {0}")]
    Memory(String),

    /// Command validation failure.
    #[error("{0}")]
    Validation(String),

    /// Internal invariant violation - an emulator bug.
    #[error("panic: {0}")]
    Panic(String),

    /// Unknown television state request.
    #[error("unknown tv request")]
    UnknownTvRequest,

    /// Control-flow signal: the user interrupted the emulation.
    #[error("user interrupt")]
    UserInterrupt,

    /// Control-flow signal: the user quit the emulation.
    #[error("user quit")]
    UserQuit,

    /// Control-flow signal: end of script.
    #[error("end of script")]
    ScriptEnd,
}

impl Error {
    /// Whether the error must halt the emulation.
    ///
    /// Out-of-spec timing and hardware-visible access errors resolve to
    /// documented hardware behaviour; everything else stops the current
    /// step.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::OutOfSpec(_) | Error::UnwritableAddress(_) | Error::UnreadableAddress(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatality_policy() {
        assert!(!Error::OutOfSpec("bad hsync".into()).is_fatal());
        assert!(!Error::UnwritableAddress(0x1000).is_fatal());
        assert!(!Error::UnreadableAddress(0x02).is_fatal());
        assert!(Error::Memory("area not mapped".into()).is_fatal());
        assert!(Error::Panic("illegal state".into()).is_fatal());
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::UnwritableAddress(0x1ff8).to_string(),
            "unwritable address (0x1ff8)"
        );
        assert_eq!(
            Error::Validation("unrecognised argument (bar)".into()).to_string(),
            "unrecognised argument (bar)"
        );
    }
}
