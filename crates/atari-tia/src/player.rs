//! Players (sprites).
//!
//! Every `(NUSIZ mode, reflect, graphic)` combination is rendered once into
//! a table of unshifted scanlines. A register write then only has to pick
//! an entry and rotate it to the player's position.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::{EMPTY_SCANLINE, FRAME_WIDTH, Scanline};

/// REFPx bit that flips the graphic.
const REFLECT: u8 = 0x08;

/// VDELPx bit selecting the delayed graphic.
const VERTICAL_DELAY: u8 = 0x01;

/// `(copies, pixel width, gap in 8-pixel units)` for the low three bits of
/// NUSIZx.
#[must_use]
pub const fn nusize(nusiz: u8) -> (usize, usize, usize) {
    match nusiz & 0x07 {
        0 => (1, 1, 0),
        1 => (2, 1, 2),
        2 => (2, 1, 4),
        3 => (3, 1, 2),
        4 => (2, 1, 8),
        5 => (1, 2, 0),
        6 => (3, 1, 4),
        _ => (1, 4, 0),
    }
}

/// Unshifted scanlines indexed by [`table_index`].
static PLAYER_TABLE: LazyLock<Box<[Scanline]>> = LazyLock::new(|| {
    let mut table = vec![EMPTY_SCANLINE; 8 * 2 * 256].into_boxed_slice();
    for mode in 0..8u8 {
        let (number, size, gap) = nusize(mode);
        for mirrored in [false, true] {
            for graphic in 0..=255u8 {
                let scan = &mut table[table_index(mode, mirrored, graphic)];
                for bit in 0..8 {
                    // Unreflected players draw bit 7 first.
                    let source = if mirrored { bit } else { 7 - bit };
                    if graphic >> source & 1 == 0 {
                        continue;
                    }
                    for copy in 0..number {
                        for s in 0..size {
                            scan[copy * gap * 8 + bit * size + s] = true;
                        }
                    }
                }
            }
        }
    }
    table
});

fn table_index(mode: u8, mirrored: bool, graphic: u8) -> usize {
    ((usize::from(mode & 7) << 1 | usize::from(mirrored)) << 8) | usize::from(graphic)
}

/// Player registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRegisters {
    pub nusiz: u8,
    /// GRPx as last written.
    pub p: u8,
    /// GRPx latched when the other player's graphic was written.
    pub p_old: u8,
    pub refp: u8,
    /// Horizontal position in pixels, 0..160.
    pub resp: u8,
    pub vdelp: u8,
}

/// Player registers plus the scanline they produce.
#[derive(Debug, Clone)]
pub struct Player {
    regs: PlayerRegisters,
    scan: Scanline,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: PlayerRegisters::default(),
            scan: EMPTY_SCANLINE,
        }
    }

    #[must_use]
    pub fn scan(&self) -> &Scanline {
        &self.scan
    }

    #[must_use]
    pub fn registers(&self) -> PlayerRegisters {
        self.regs
    }

    pub fn restore(&mut self, regs: PlayerRegisters) {
        self.regs = regs;
        self.update();
    }

    pub fn set_nusiz(&mut self, data: u8) {
        self.regs.nusiz = data;
        self.update();
    }

    pub fn set_graphic(&mut self, data: u8) {
        self.regs.p = data;
        self.update();
    }

    /// Latch the current graphic into the delayed copy.
    pub fn latch_graphic(&mut self) {
        self.regs.p_old = self.regs.p;
        self.update();
    }

    pub fn set_reflect(&mut self, data: u8) {
        self.regs.refp = data;
        self.update();
    }

    pub fn set_position(&mut self, pixel: u8) {
        self.regs.resp = pixel;
        self.update();
    }

    pub fn set_vertical_delay(&mut self, data: u8) {
        self.regs.vdelp = data;
        self.update();
    }

    /// Shift the position left by `delta` pixels, wrapping at the line width.
    pub fn shift(&mut self, delta: i64) {
        self.regs.resp = (i64::from(self.regs.resp) - delta).rem_euclid(FRAME_WIDTH as i64) as u8;
        self.update();
    }

    fn update(&mut self) {
        let graphic = if self.regs.vdelp & VERTICAL_DELAY == 0 {
            self.regs.p
        } else {
            self.regs.p_old
        };
        if graphic == 0 {
            self.scan = EMPTY_SCANLINE;
            return;
        }

        let mirrored = self.regs.refp & REFLECT != 0;
        let unshifted = &PLAYER_TABLE[table_index(self.regs.nusiz, mirrored, graphic)];
        let (_, size, _) = nusize(self.regs.nusiz);
        // Wide players start half their pixel width late.
        let start = (usize::from(self.regs.resp) + size / 2) % FRAME_WIDTH;
        for (x, pixel) in self.scan.iter_mut().enumerate() {
            *pixel = unshifted[(x + FRAME_WIDTH - start) % FRAME_WIDTH];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Brute-force placement: walk every copy, pixel and stretch step.
    /// Paint every copy pixel by pixel.
    fn reference(nusiz: u8, grp: u8, refp: u8, resp: u8) -> Scanline {
        let mut line = [false; FRAME_WIDTH];
        let (number, size, gap) = nusize(nusiz);
        for n in 0..number {
            for s in 0..size {
                for i in 0..8 {
                    let lit = if refp & 0x08 == 0 {
                        (grp << i) & 0x80 != 0
                    } else {
                        (grp >> i) & 0x01 != 0
                    };
                    let pos =
                        (usize::from(resp) + size / 2 + i * size + s + n * gap * 8) % FRAME_WIDTH;
                    line[pos] |= lit;
                }
            }
        }
        line
    }

    #[test]
    fn matches_brute_force_placement() {
        let mut player = Player::new();
        for nusiz in 0..8 {
            for refp in [0, 0x08] {
                for grp in 0..=u8::MAX {
                    for resp in 0..FRAME_WIDTH as u8 {
                        player.restore(PlayerRegisters {
                            nusiz,
                            p: grp,
                            p_old: grp,
                            refp,
                            resp,
                            vdelp: 0,
                        });
                        assert_eq!(
                            player.scan()[..],
                            reference(nusiz, grp, refp, resp)[..],
                            "nusiz={nusiz} refp={refp:02X} grp={grp:02X} resp={resp}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn lit_pixel_count_scales_with_copies_and_size() {
        let mut player = Player::new();
        player.set_graphic(0xFF);
        for nusiz in 0..8 {
            player.set_nusiz(nusiz);
            let (number, size, _) = nusize(nusiz);
            let lit = player.scan().iter().filter(|&&p| p).count();
            assert_eq!(lit, 8 * number * size, "nusiz={nusiz}");
        }
    }

    #[test]
    fn vertical_delay_draws_latched_graphic() {
        let mut player = Player::new();
        player.set_graphic(0x80);
        player.latch_graphic();
        player.set_graphic(0x00);
        assert!(player.scan().iter().all(|&p| !p));

        player.set_vertical_delay(1);
        assert!(player.scan()[0]);
    }

    #[test]
    fn shift_wraps_around_the_line() {
        let mut player = Player::new();
        player.set_position(2);
        player.shift(5);
        assert_eq!(player.registers().resp, 157);
        player.shift(-4);
        assert_eq!(player.registers().resp, 1);
    }
}
