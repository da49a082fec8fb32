//! Processor status register (P).
//!
//! Bit layout, MSB first: `N V - B D I Z C`.

use serde::{Deserialize, Serialize};

/// Carry.
pub const C: u8 = 0x01;
/// Zero.
pub const Z: u8 = 0x02;
/// Interrupt disable.
pub const I: u8 = 0x04;
/// Decimal mode.
pub const D: u8 = 0x08;
/// Break. Only meaningful in the copy of P pushed by `BRK`/`PHP`.
pub const B: u8 = 0x10;
/// Unused bit 5.
pub const U: u8 = 0x20;
/// Overflow.
pub const V: u8 = 0x40;
/// Negative.
pub const N: u8 = 0x80;

/// Processor status register.
///
/// Holds the raw byte. Nothing forces bit 5 high: values pulled by `PLP`
/// and `RTI` are stored exactly as they were read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status(pub u8);

impl Status {
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The byte `BRK` pushes: P with break and bit 5 forced on.
    #[must_use]
    pub const fn with_break(self) -> u8 {
        self.0 | U | B
    }

    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Carry as an arithmetic operand.
    #[must_use]
    pub const fn carry(self) -> u8 {
        self.0 & C
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// N from bit 7, Z from zero.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }
}
