//! Fatal emulation faults.

use thiserror::Error;

/// A condition that stops the machine.
///
/// Emulated hardware has no error path of its own, so any of these means
/// the program (or the emulator) has gone somewhere it should not. They
/// propagate straight to the top of the fetch-execute loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("read from unmapped address ${address:04X}")]
    UnmappedRead { address: u16 },

    #[error("write of ${value:02X} to unmapped address ${address:04X}")]
    UnmappedWrite { address: u16, value: u8 },

    #[error("unimplemented opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
}
