//! 6507 register file.

use serde::{Deserialize, Serialize};

use crate::Status;

/// CPU registers.
///
/// All 8-bit registers wrap modulo 256 and PC wraps modulo 65536; every
/// mutation in the core goes through `wrapping_*` arithmetic. The stack
/// lives in page one, so S addresses `$0100 + S`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub pc: u16,
    pub p: Status,
}

impl Registers {
    /// Power-on state: every register and flag cleared.
    ///
    /// Real silicon leaves them undefined; programs are expected to set
    /// up S and P themselves before relying on them.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0,
            pc: 0,
            p: Status(0),
        }
    }

    #[must_use]
    pub const fn pch(&self) -> u8 {
        (self.pc >> 8) as u8
    }

    #[must_use]
    pub const fn pcl(&self) -> u8 {
        self.pc as u8
    }

    pub fn set_pch(&mut self, value: u8) {
        self.pc = (self.pc & 0x00FF) | (u16::from(value) << 8);
    }

    pub fn set_pcl(&mut self, value: u8) {
        self.pc = (self.pc & 0xFF00) | u16::from(value);
    }

    pub fn advance_pc(&mut self, bytes: u16) {
        self.pc = self.pc.wrapping_add(bytes);
    }
}
