//! Missiles.

use serde::{Deserialize, Serialize};

use crate::player::nusize;
use crate::{EMPTY_SCANLINE, FRAME_WIDTH, Scanline};

const ENABLE: u8 = 0x02;

/// Missile registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissileRegisters {
    pub nusiz: u8,
    pub enam: u8,
    /// Horizontal position in pixels, 0..160.
    pub resm: u8,
}

/// Missile registers plus the scanline they produce.
#[derive(Debug, Clone)]
pub struct Missile {
    regs: MissileRegisters,
    scan: Scanline,
}

impl Default for Missile {
    fn default() -> Self {
        Self::new()
    }
}

impl Missile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: MissileRegisters::default(),
            scan: EMPTY_SCANLINE,
        }
    }

    #[must_use]
    pub fn scan(&self) -> &Scanline {
        &self.scan
    }

    #[must_use]
    pub fn registers(&self) -> MissileRegisters {
        self.regs
    }

    pub fn restore(&mut self, regs: MissileRegisters) {
        self.regs = regs;
        self.update();
    }

    pub fn set_nusiz(&mut self, data: u8) {
        self.regs.nusiz = data;
        self.update();
    }

    pub fn set_enable(&mut self, data: u8) {
        self.regs.enam = data;
        self.update();
    }

    pub fn set_position(&mut self, pixel: u8) {
        self.regs.resm = pixel;
        self.update();
    }

    pub fn shift(&mut self, delta: i64) {
        self.regs.resm = (i64::from(self.regs.resm) - delta).rem_euclid(FRAME_WIDTH as i64) as u8;
        self.update();
    }

    // Copies and gaps follow the player, the width comes from NUSIZ bits 4-5
    // and the player stretch is ignored.
    fn update(&mut self) {
        self.scan = EMPTY_SCANLINE;
        if self.regs.enam & ENABLE == 0 {
            return;
        }
        let (number, _, gap) = nusize(self.regs.nusiz);
        let width = 1usize << ((self.regs.nusiz & 0x30) >> 4);
        for copy in 0..number {
            for i in 0..width {
                let x = (usize::from(self.regs.resm) + i + copy * gap * 8) % FRAME_WIDTH;
                self.scan[x] = true;
            }
        }
    }
}
