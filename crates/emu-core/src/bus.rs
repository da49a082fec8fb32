//! Memory and I/O bus interface.

use crate::{Clock, Fault};

/// Base address of the 6502 hardware stack page.
pub const STACK_BASE: u16 = 0x0100;

/// Memory and I/O bus interface.
///
/// The clock is passed in, not owned, so the bus can forward it to devices
/// whose state is a function of time. Writes take it mutably because a
/// device may stall the CPU by advancing it (the TIA's `WSYNC`).
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, clock: &Clock, address: u16) -> Result<u8, Fault>;

    /// Write a byte to the given address.
    fn write(&mut self, clock: &mut Clock, address: u16, value: u8) -> Result<(), Fault>;

    /// Little-endian 16-bit read.
    fn read16(&mut self, clock: &Clock, address: u16) -> Result<u16, Fault> {
        let lo = self.read(clock, address)?;
        let hi = self.read(clock, address.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Read relative to the stack page.
    fn read_sp(&mut self, clock: &Clock, sp: u8) -> Result<u8, Fault> {
        self.read(clock, STACK_BASE | u16::from(sp))
    }

    /// Write relative to the stack page.
    fn write_sp(&mut self, clock: &mut Clock, sp: u8, value: u8) -> Result<(), Fault> {
        self.write(clock, STACK_BASE | u16::from(sp), value)
    }
}

/// Flat 64K RAM with no devices. Used to exercise CPUs in isolation.
pub struct SimpleBus {
    ram: Box<[u8; 0x10000]>,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at 64K.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            let addr = address.wrapping_add(offset as u16);
            self.ram[addr as usize] = byte;
        }
    }

    /// Read without going through the bus interface.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, _clock: &Clock, address: u16) -> Result<u8, Fault> {
        Ok(self.ram[address as usize])
    }

    fn write(&mut self, _clock: &mut Clock, address: u16, value: u8) -> Result<(), Fault> {
        self.ram[address as usize] = value;
        Ok(())
    }
}
