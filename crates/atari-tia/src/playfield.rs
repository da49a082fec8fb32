//! Playfield: 20 four-pixel cells, repeated or mirrored on the right half.

use serde::{Deserialize, Serialize};

use crate::{EMPTY_SCANLINE, FRAME_WIDTH, Scanline};

const CELL_WIDTH: usize = 4;
const HALF_WIDTH: usize = FRAME_WIDTH / 2;

/// CTRLPF bit selecting a mirrored right half.
const REFLECT: u8 = 0x01;

/// Playfield registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayfieldRegisters {
    pub pf0: u8,
    pub pf1: u8,
    pub pf2: u8,
    pub ctrlpf: u8,
}

/// Playfield registers plus the scanline they produce.
#[derive(Debug, Clone)]
pub struct Playfield {
    regs: PlayfieldRegisters,
    scan: Scanline,
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Playfield {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: PlayfieldRegisters::default(),
            scan: EMPTY_SCANLINE,
        }
    }

    #[must_use]
    pub fn scan(&self) -> &Scanline {
        &self.scan
    }

    #[must_use]
    pub fn registers(&self) -> PlayfieldRegisters {
        self.regs
    }

    pub fn restore(&mut self, regs: PlayfieldRegisters) {
        self.regs = regs;
        self.update();
    }

    pub fn set_pf0(&mut self, data: u8) {
        self.regs.pf0 = data;
        self.update();
    }

    pub fn set_pf1(&mut self, data: u8) {
        self.regs.pf1 = data;
        self.update();
    }

    pub fn set_pf2(&mut self, data: u8) {
        self.regs.pf2 = data;
        self.update();
    }

    pub fn set_ctrlpf(&mut self, data: u8) {
        self.regs.ctrlpf = data;
        self.update();
    }

    /// Whether cell `cell` (0..20) of the left half is lit.
    ///
    /// Cells run PF0 bits 4-7, then PF1 bits 7-0, then PF2 bits 0-7.
    fn cell(&self, cell: usize) -> bool {
        let (bits, shift) = match cell {
            0..4 => (self.regs.pf0, cell + 4),
            4..12 => (self.regs.pf1, 11 - cell),
            _ => (self.regs.pf2, cell - 12),
        };
        (bits >> shift) & 1 != 0
    }

    fn update(&mut self) {
        for x in 0..HALF_WIDTH {
            self.scan[x] = self.cell(x / CELL_WIDTH);
        }
        for x in 0..HALF_WIDTH {
            self.scan[HALF_WIDTH + x] = if self.regs.ctrlpf & REFLECT != 0 {
                self.scan[HALF_WIDTH - 1 - x]
            } else {
                self.scan[x]
            };
        }
    }
}
