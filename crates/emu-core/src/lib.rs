//! Core traits and types for cycle-resolution emulation.
//!
//! Everything is timed against one shared [`Clock`]. Components never own
//! it: the machine hands a reference to whichever CPU step or bus access
//! is running, so every device observes the same monotonic counter.

mod bus;
mod clock;
mod cpu;
mod fault;

pub use bus::{Bus, STACK_BASE, SimpleBus};
pub use clock::{CYCLES_TO_CLOCK, Clock};
pub use cpu::Cpu;
pub use fault::Fault;
