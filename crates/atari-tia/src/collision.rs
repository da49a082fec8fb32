//! Collision latches.

use serde::{Deserialize, Serialize};

/// The eight collision registers, as read at `CXM0P`..`CXPPMM`.
///
/// Only bits 6 and 7 are ever set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collisions {
    /// `CXM0P`, `CXM1P`.
    pub cxmp: [u8; 2],
    /// `CXP0FB`, `CXP1FB`.
    pub cxpfb: [u8; 2],
    /// `CXM0FB`, `CXM1FB`.
    pub cxmfb: [u8; 2],
    pub cxblpf: u8,
    pub cxppmm: u8,
}

impl Collisions {
    /// `CXCLR`.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Latch every pairwise overlap among the objects hit at one pixel.
    pub fn update(&mut self, p0: bool, p1: bool, m0: bool, m1: bool, bl: bool, pf: bool) {
        if m0 {
            latch(&mut self.cxmp[0], 0x80, p1);
            latch(&mut self.cxmp[0], 0x40, p0);
            latch(&mut self.cxmfb[0], 0x80, pf);
            latch(&mut self.cxmfb[0], 0x40, bl);
            latch(&mut self.cxppmm, 0x40, m1);
        }
        if m1 {
            latch(&mut self.cxmp[1], 0x80, p0);
            latch(&mut self.cxmp[1], 0x40, p1);
            latch(&mut self.cxmfb[1], 0x80, pf);
            latch(&mut self.cxmfb[1], 0x40, bl);
        }
        if bl {
            latch(&mut self.cxblpf, 0x80, pf);
            latch(&mut self.cxpfb[0], 0x40, p0);
            latch(&mut self.cxpfb[1], 0x40, p1);
        }
        if p0 {
            latch(&mut self.cxpfb[0], 0x80, pf);
            latch(&mut self.cxppmm, 0x80, p1);
        }
        if p1 {
            latch(&mut self.cxpfb[1], 0x80, pf);
        }
    }

    /// Register value for read address `index` (0..8).
    #[must_use]
    pub fn read(&self, index: u8) -> u8 {
        match index & 7 {
            0 => self.cxmp[0],
            1 => self.cxmp[1],
            2 => self.cxpfb[0],
            3 => self.cxpfb[1],
            4 => self.cxmfb[0],
            5 => self.cxmfb[1],
            6 => self.cxblpf,
            _ => self.cxppmm,
        }
    }
}

fn latch(register: &mut u8, bit: u8, hit: bool) {
    if hit {
        *register |= bit;
    }
}
