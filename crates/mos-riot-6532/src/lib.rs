//! MOS 6532 RAM-I/O-Timer (RIOT).
//!
//! 128 bytes of RAM, two 8-bit ports and an interval timer. The timer is
//! never ticked: a write records when it will expire, and reads work out
//! the current count from the clock.
//!
//! # Registers (address bit 9 set)
//!
//! | Addr      | Read        | Write                      |
//! |-----------|-------------|----------------------------|
//! | $00       | SWCHA       | (port A data, ignored)     |
//! | $02       | SWCHB       | (port B data, ignored)     |
//! | $04       | INTIM       |                            |
//! | $05       | TIMINT      |                            |
//! | $14-$17   | INTIM       | TIM1T, TIM8T, TIM64T, T1024T |
//!
//! Address bit 3 is the interrupt-enable line and is ignored. With bit 9
//! clear, the low seven bits index RAM.

use emu_core::{CYCLES_TO_CLOCK, Clock};
use log::debug;
use serde::{Deserialize, Serialize};

pub const RAM_SIZE: usize = 128;

const NOT_RAM_SELECT: u16 = 0x200;
const ADDRESS_MASK: u16 = 0x7F;
const INTERRUPT_ENABLE: u16 = 0x08;

const SWCHA: u16 = 0x00;
const SWCHB: u16 = 0x02;
const INTIM: u16 = 0x04;
const TIMINT: u16 = 0x05;
const TIM1T: u16 = 0x14;
const TIM8T: u16 = 0x15;
const TIM64T: u16 = 0x16;
const T1024T: u16 = 0x17;

/// Clocks of read latency folded into every timer read.
const READ_LOOKAHEAD: u64 = 12;

const POWER_ON_INTERVAL: u16 = 1024;
const POWER_ON_EXPIRATION: u64 = 1_000_000;

/// Port input lines.
pub trait Ports {
    /// SWCHA: joystick directions, active low.
    fn swcha(&self) -> u8;

    /// SWCHB: console switches.
    fn swchb(&self) -> u8;
}

/// RIOT state for save/restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiotState {
    pub interval: u16,
    pub expiration: u64,
    pub ram: Vec<u8>,
}

/// MOS 6532 RIOT.
#[derive(Debug, Clone)]
pub struct Riot {
    ram: [u8; RAM_SIZE],
    /// CPU cycles per timer tick: 1, 8, 64 or 1024.
    interval: u16,
    /// Clock at which the timer reaches zero.
    expiration: u64,
}

impl Default for Riot {
    fn default() -> Self {
        Self::new()
    }
}

impl Riot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: [0; RAM_SIZE],
            interval: POWER_ON_INTERVAL,
            expiration: POWER_ON_EXPIRATION,
        }
    }

    pub fn read(&self, clock: &Clock, address: u16, ports: &dyn Ports) -> u8 {
        if address & NOT_RAM_SELECT == 0 {
            return self.ram[(address & ADDRESS_MASK) as usize];
        }

        let now = clock.now() + READ_LOOKAHEAD;
        match address & ADDRESS_MASK & !INTERRUPT_ENABLE {
            SWCHA => ports.swcha(),
            SWCHB => ports.swchb(),
            INTIM | TIM1T | TIM8T | TIM64T | T1024T => self.timer(now),
            TIMINT => {
                if self.expiration >= now {
                    0
                } else {
                    0x80
                }
            }
            _ => {
                debug!("RIOT read from unhandled register ${address:03X}");
                0
            }
        }
    }

    pub fn write(&mut self, clock: &Clock, address: u16, data: u8) {
        if address & NOT_RAM_SELECT == 0 {
            self.ram[(address & ADDRESS_MASK) as usize] = data;
            return;
        }

        self.interval = match address & ADDRESS_MASK & !INTERRUPT_ENABLE {
            TIM1T => 1,
            TIM8T => 8,
            TIM64T => 64,
            T1024T => 1024,
            _ => {
                debug!("RIOT write ${data:02X} to unhandled register ${address:03X}");
                return;
            }
        };
        self.expiration = clock.now() + CYCLES_TO_CLOCK * u64::from(data) * u64::from(self.interval);
    }

    /// Timer count at `now`. Once expired it counts down from $FF once per
    /// CPU cycle.
    fn timer(&self, now: u64) -> u8 {
        if self.expiration >= now {
            ((self.expiration - now) / (u64::from(self.interval) * CYCLES_TO_CLOCK)) as u8
        } else {
            let past = ((now - self.expiration) / CYCLES_TO_CLOCK) & 0xFF;
            (0x100 - past) as u8
        }
    }

    /// Read RAM without going through the register decode.
    #[must_use]
    pub fn peek_ram(&self, index: usize) -> u8 {
        self.ram[index % RAM_SIZE]
    }

    #[must_use]
    pub fn save(&self) -> RiotState {
        RiotState {
            interval: self.interval,
            expiration: self.expiration,
            ram: self.ram.to_vec(),
        }
    }

    /// Restore a saved state. A short RAM image leaves the tail untouched.
    pub fn restore(&mut self, state: &RiotState) {
        self.interval = state.interval;
        self.expiration = state.expiration;
        let len = state.ram.len().min(RAM_SIZE);
        self.ram[..len].copy_from_slice(&state.ram[..len]);
    }
}
