//! Operand transfer strategies.
//!
//! An instruction's semantics never touch the bus themselves. They are
//! handed a value by a [`ReadStrategy`] and give back a value for a
//! [`WriteStrategy`], which is how `ROL $80` and `ROL A` share one
//! implementation.

use emu_core::{Bus, Clock, Fault};

use crate::Registers;

/// Where an instruction's input operand comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Ordinary bus read at the effective address.
    Bus,
    /// Operand unused; reads as zero.
    Null,
    /// The accumulator stands in for memory.
    Accumulator,
}

/// Where an instruction's result goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Read-modify-write back to the bus.
    Bus,
    /// Plain store of a register value to the bus.
    Register,
    /// Result discarded.
    Null,
    /// Result lands in the accumulator.
    Accumulator,
}

impl ReadStrategy {
    /// CPU cycles charged for the read.
    #[must_use]
    pub const fn cycles(self) -> u64 {
        match self {
            Self::Bus => 2,
            Self::Null | Self::Accumulator => 1,
        }
    }

    pub fn read<B: Bus>(
        self,
        regs: &Registers,
        bus: &mut B,
        clock: &Clock,
        address: u16,
    ) -> Result<u8, Fault> {
        match self {
            Self::Bus => bus.read(clock, address),
            Self::Null => Ok(0),
            Self::Accumulator => Ok(regs.a),
        }
    }
}

impl WriteStrategy {
    /// CPU cycles charged for the write.
    #[must_use]
    pub const fn cycles(self) -> u64 {
        match self {
            Self::Bus => 2,
            Self::Register | Self::Accumulator => 1,
            Self::Null => 0,
        }
    }

    pub fn write<B: Bus>(
        self,
        regs: &mut Registers,
        bus: &mut B,
        clock: &mut Clock,
        address: u16,
        value: u8,
    ) -> Result<(), Fault> {
        match self {
            Self::Bus | Self::Register => bus.write(clock, address, value),
            Self::Null => Ok(()),
            Self::Accumulator => {
                regs.a = value;
                Ok(())
            }
        }
    }
}
