//! CPU core trait.

use crate::{Bus, Clock, Fault};

/// A CPU core.
///
/// CPUs execute whole instructions against a bus, charging every cycle
/// they consume to the shared clock as they go. The bus and clock are
/// passed in, not owned, so other components can be driven by the same
/// counter.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Execute one instruction.
    fn step<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault>;

    /// Load the program counter from the reset vector.
    fn reset<B: Bus>(&mut self, bus: &mut B, clock: &Clock) -> Result<(), Fault>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;
}
