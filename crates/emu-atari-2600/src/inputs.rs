//! Joystick, console switch and paddle state.
//!
//! All lines are active low as the hardware presents them: SWCHA bits
//! clear while a direction is held, `input7` bit 7 clears while fire is
//! held. Front ends flip bits here; the TIA and RIOT read them through
//! [`InputPorts`] and [`Ports`].

use atari_tia::InputPorts;
use mos_riot_6532::Ports;
use serde::{Deserialize, Serialize};

/// Joystick direction bits in SWCHA (player 0 nibble).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    const fn mask(self) -> u8 {
        match self {
            Self::Up => 0x10,
            Self::Down => 0x20,
            Self::Left => 0x40,
            Self::Right => 0x80,
        }
    }
}

/// Console switch bits in SWCHB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    Select,
    Reset,
    /// Colour / black-and-white.
    Colour,
    LeftDifficulty,
    RightDifficulty,
}

impl Switch {
    const fn mask(self) -> u8 {
        match self {
            Self::Select => 0x01,
            Self::Reset => 0x02,
            Self::Colour => 0x08,
            Self::LeftDifficulty => 0x40,
            Self::RightDifficulty => 0x80,
        }
    }
}

const FIRE: u8 = 0x80;

/// Input lines plus the front end's quit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inputs {
    pub swcha: u8,
    pub swchb: u8,
    /// INPT4: fire button in bit 7.
    pub input7: u8,
    pub paddle0: u8,
    pub quit: bool,
}

impl Default for Inputs {
    fn default() -> Self {
        Self::new()
    }
}

impl Inputs {
    /// Nothing held, colour on, both difficulties B.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            swcha: 0xFF,
            swchb: 0x3F,
            input7: 0xFF,
            paddle0: 0,
            quit: false,
        }
    }

    pub fn set_direction(&mut self, direction: Direction, held: bool) {
        set_active_low(&mut self.swcha, direction.mask(), held);
    }

    pub fn set_fire(&mut self, held: bool) {
        set_active_low(&mut self.input7, FIRE, held);
    }

    /// Flip a console switch. Select and reset are momentary on the real
    /// console; difficulty and colour latch.
    pub fn toggle_switch(&mut self, switch: Switch) {
        self.swchb ^= switch.mask();
    }

    pub fn set_paddle(&mut self, value: u8) {
        self.paddle0 = value;
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

fn set_active_low(register: &mut u8, mask: u8, held: bool) {
    if held {
        *register &= !mask;
    } else {
        *register |= mask;
    }
}

impl InputPorts for Inputs {
    fn fire(&self) -> u8 {
        self.input7
    }

    fn paddle(&self, index: usize) -> u8 {
        if index == 0 { self.paddle0 } else { 0 }
    }
}

impl Ports for Inputs {
    fn swcha(&self) -> u8 {
        self.swcha
    }

    fn swchb(&self) -> u8 {
        self.swchb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_lines() {
        let inputs = Inputs::new();
        assert_eq!(inputs.swcha(), 0xFF);
        assert_eq!(inputs.swchb(), 0x3F);
        assert_eq!(inputs.fire(), 0xFF);
        assert!(!inputs.quit_requested());
    }

    #[test]
    fn directions_are_active_low() {
        let mut inputs = Inputs::new();
        inputs.set_direction(Direction::Left, true);
        inputs.set_direction(Direction::Up, true);
        assert_eq!(inputs.swcha(), 0xAF);
        inputs.set_direction(Direction::Left, false);
        assert_eq!(inputs.swcha(), 0xEF);
    }

    #[test]
    fn fire_clears_bit_seven() {
        let mut inputs = Inputs::new();
        inputs.set_fire(true);
        assert_eq!(inputs.fire(), 0x7F);
        inputs.set_fire(false);
        assert_eq!(inputs.fire(), 0xFF);
    }

    #[test]
    fn switches_toggle() {
        let mut inputs = Inputs::new();
        inputs.toggle_switch(Switch::Reset);
        assert_eq!(inputs.swchb(), 0x3D);
        inputs.toggle_switch(Switch::RightDifficulty);
        inputs.toggle_switch(Switch::Reset);
        assert_eq!(inputs.swchb(), 0xBF);
    }

    #[test]
    fn only_paddle_zero_is_wired() {
        let mut inputs = Inputs::new();
        inputs.set_paddle(0x40);
        assert_eq!(inputs.paddle(0), 0x40);
        assert_eq!(inputs.paddle(1), 0);
    }
}
