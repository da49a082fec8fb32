//! Ball.

use serde::{Deserialize, Serialize};

use crate::{EMPTY_SCANLINE, FRAME_WIDTH, HORIZONTAL_BLANK, HORIZONTAL_TICKS, Scanline};

const ENABLE: u8 = 0x02;
const VERTICAL_DELAY: u8 = 0x01;

/// Ball registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallRegisters {
    pub enabl: u8,
    /// ENABL latched when GRP1 was written.
    pub enabl_old: u8,
    pub vdelbl: u8,
    /// Position in colour clocks from the start of the line, 0..228.
    pub resbl: u8,
    pub ctrlpf: u8,
}

/// Ball registers plus the scanline they produce.
#[derive(Debug, Clone)]
pub struct Ball {
    regs: BallRegisters,
    scan: Scanline,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

impl Ball {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: BallRegisters::default(),
            scan: EMPTY_SCANLINE,
        }
    }

    #[must_use]
    pub fn scan(&self) -> &Scanline {
        &self.scan
    }

    #[must_use]
    pub fn registers(&self) -> BallRegisters {
        self.regs
    }

    pub fn restore(&mut self, regs: BallRegisters) {
        self.regs = regs;
        self.update();
    }

    pub fn set_enable(&mut self, data: u8) {
        self.regs.enabl = data;
        self.update();
    }

    /// Latch ENABL into the delayed copy.
    pub fn latch_enable(&mut self) {
        self.regs.enabl_old = self.regs.enabl;
        self.update();
    }

    pub fn set_vertical_delay(&mut self, data: u8) {
        self.regs.vdelbl = data;
        self.update();
    }

    pub fn set_ctrlpf(&mut self, data: u8) {
        self.regs.ctrlpf = data;
        self.update();
    }

    pub fn set_position(&mut self, clock: u8) {
        self.regs.resbl = clock;
        self.update();
    }

    pub fn shift(&mut self, delta: i64) {
        self.regs.resbl =
            (i64::from(self.regs.resbl) - delta).rem_euclid(HORIZONTAL_TICKS as i64) as u8;
        self.update();
    }

    fn update(&mut self) {
        self.scan = EMPTY_SCANLINE;
        let enable = if self.regs.vdelbl & VERTICAL_DELAY == 0 {
            self.regs.enabl
        } else {
            self.regs.enabl_old
        };
        if enable & ENABLE == 0 {
            return;
        }
        let width = 1i64 << ((self.regs.ctrlpf & 0x30) >> 4);
        let start = i64::from(self.regs.resbl) - HORIZONTAL_BLANK as i64;
        for x in start..start + width {
            self.scan[x.rem_euclid(FRAME_WIDTH as i64) as usize] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(ball: &Ball) -> Vec<usize> {
        (0..FRAME_WIDTH).filter(|&x| ball.scan()[x]).collect()
    }

    #[test]
    fn position_is_in_colour_clocks() {
        let mut ball = Ball::new();
        ball.restore(BallRegisters {
            enabl: 0x02,
            ctrlpf: 0x10,
            resbl: 68 + 20,
            ..BallRegisters::default()
        });
        assert_eq!(lit(&ball), vec![20, 21]);
    }

    #[test]
    fn ball_inside_blank_wraps_to_the_right_edge() {
        let mut ball = Ball::new();
        ball.restore(BallRegisters {
            enabl: 0x02,
            ctrlpf: 0x30,
            resbl: 66,
            ..BallRegisters::default()
        });
        assert_eq!(lit(&ball), vec![0, 1, 2, 3, 4, 5, 158, 159]);
    }

    #[test]
    fn vertical_delay_uses_latched_enable() {
        let mut ball = Ball::new();
        ball.set_position(100);
        ball.set_enable(0x02);
        ball.set_vertical_delay(1);
        assert!(lit(&ball).is_empty());
        ball.latch_enable();
        assert_eq!(lit(&ball), vec![32]);
    }
}
