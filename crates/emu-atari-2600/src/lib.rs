//! Cycle-resolution Atari 2600 emulator.
//!
//! The TIA colour clock (3.58 MHz NTSC) is the time base; the 6507 runs
//! at a third of it. One scanline is 228 colour clocks, 68 of them
//! horizontal blank, so 76 CPU cycles.
//!
//! Nothing is ticked. The CPU advances the clock as it executes, and the
//! TIA and RIOT work out their state from the clock whenever the bus
//! reaches them.

mod atari;
mod bus;
pub mod capture;
pub mod cartridge;
mod config;
mod error;
mod inputs;
pub mod snapshot;

pub use atari::Atari2600;
pub use bus::AtariBus;
pub use cartridge::{Cartridge, CartridgeState};
pub use config::{AtariConfig, CartridgeKind};
pub use error::{CartridgeError, Error};
pub use inputs::{Direction, Inputs, Switch};
pub use snapshot::Snapshot;
