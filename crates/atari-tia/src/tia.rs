//! TIA register interface and the lazy scan catch-up.

use emu_core::Clock;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, AudioState};
use crate::ball::{Ball, BallRegisters};
use crate::collision::Collisions;
use crate::missile::{Missile, MissileRegisters};
use crate::palette::colour;
use crate::player::{Player, PlayerRegisters};
use crate::playfield::{Playfield, PlayfieldRegisters};
use crate::{DISPLAY_LINES, END_DRAW_Y, FRAME_WIDTH, HORIZONTAL_BLANK, HORIZONTAL_TICKS};

// Write registers
const VSYNC: u8 = 0x00;
const VBLANK: u8 = 0x01;
const WSYNC: u8 = 0x02;
const RSYNC: u8 = 0x03;
const NUSIZ0: u8 = 0x04;
const NUSIZ1: u8 = 0x05;
const COLUP0: u8 = 0x06;
const COLUP1: u8 = 0x07;
const COLUPF: u8 = 0x08;
const COLUBK: u8 = 0x09;
const CTRLPF: u8 = 0x0A;
const REFP0: u8 = 0x0B;
const REFP1: u8 = 0x0C;
const PF0: u8 = 0x0D;
const PF1: u8 = 0x0E;
const PF2: u8 = 0x0F;
const RESP0: u8 = 0x10;
const RESP1: u8 = 0x11;
const RESM0: u8 = 0x12;
const RESM1: u8 = 0x13;
const RESBL: u8 = 0x14;
const AUDC0: u8 = 0x15;
const AUDC1: u8 = 0x16;
const AUDF0: u8 = 0x17;
const AUDF1: u8 = 0x18;
const AUDV0: u8 = 0x19;
const AUDV1: u8 = 0x1A;
const GRP0: u8 = 0x1B;
const GRP1: u8 = 0x1C;
const ENAM0: u8 = 0x1D;
const ENAM1: u8 = 0x1E;
const ENABL: u8 = 0x1F;
const HMP0: u8 = 0x20;
const HMP1: u8 = 0x21;
const HMM0: u8 = 0x22;
const HMM1: u8 = 0x23;
const HMBL: u8 = 0x24;
const VDELP0: u8 = 0x25;
const VDELP1: u8 = 0x26;
const VDELBL: u8 = 0x27;
const HMOVE: u8 = 0x2A;
const HMCLR: u8 = 0x2B;
const CXCLR: u8 = 0x2C;

const VSYNC_ON: u8 = 0x02;
const BLANK_ON: u8 = 0x02;
const INPUT_LATCH: u8 = 0x40;
const PADDLE_RECHARGE: u8 = 0x80;

const PF_SCORE: u8 = 0x02;
const PF_PRIORITY: u8 = 0x04;

/// Pixels are painted up to one clock past the access.
const FUTURE_PIXELS: i64 = 1;

/// Clocks past the access at which a player reset takes effect.
const PLAYER_RESET_DELAY: i64 = 5;

/// Clocks past the access at which a missile or ball reset takes effect.
const OBJECT_RESET_DELAY: i64 = 4;

/// Position given to objects reset during horizontal blank.
const BLANK_RESET_POSITION: u8 = 3;

/// `HMOVE` on this CPU cycle of the line moves every object 8 further.
const LATE_HMOVE_CYCLE: i64 = 73;

const RSYNC_FUDGE: i64 = 3;

const TICKS: i64 = HORIZONTAL_TICKS as i64;
const BLANK: i64 = HORIZONTAL_BLANK as i64;

/// Input lines read through the TIA.
pub trait InputPorts {
    /// `INPT4`/`INPT5`: fire buttons, bit 7 clear when pressed.
    fn fire(&self) -> u8;

    /// `INPT0`..`INPT2`: paddle pots.
    fn paddle(&self, _index: usize) -> u8 {
        0
    }
}

/// Colours, priority and motion registers used while painting a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineState {
    /// `COLUP0`/`COLUP1` register values.
    pub player_colour: [u8; 2],
    pub playfield_colour: u8,
    pub background_colour: u8,
    pub ctrlpf: u8,
    pub hmp: [u8; 2],
    pub hmm: [u8; 2],
    pub hmbl: u8,
}

/// Everything needed to resume the TIA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiaState {
    pub line: LineState,
    pub players: [PlayerRegisters; 2],
    pub missiles: [MissileRegisters; 2],
    pub ball: BallRegisters,
    pub playfield: PlayfieldRegisters,
    pub collisions: Collisions,
    pub audio: AudioState,
    pub is_vsync: bool,
    pub is_blank: bool,
    pub is_input_latched: bool,
    pub is_update_time: bool,
    pub screen_start_clock: i64,
    pub paddle_start_clock: i64,
    pub last_screen_update_clock: i64,
}

/// Television Interface Adaptor.
pub struct Tia {
    line: LineState,
    players: [Player; 2],
    missiles: [Missile; 2],
    ball: Ball,
    playfield: Playfield,
    collisions: Collisions,
    audio: Box<dyn AudioSink>,

    is_vsync: bool,
    is_blank: bool,
    is_input_latched: bool,
    /// A VSYNC has started a new frame that has not been flushed yet.
    is_update_time: bool,

    /// Clock at which the current frame's line 0 began. May precede zero.
    screen_start_clock: i64,
    paddle_start_clock: i64,
    /// One past the last clock already painted.
    last_screen_update_clock: i64,

    /// `0x00RRGGBB` pixels, one row per scanline.
    display: Vec<[u32; FRAME_WIDTH]>,
    frame_count: u64,
    frame_ready: bool,
}

impl Tia {
    /// A TIA at power-on, with the frame origin at clock 0.
    #[must_use]
    pub fn new(audio: Box<dyn AudioSink>) -> Self {
        Self {
            line: LineState::default(),
            players: [Player::new(), Player::new()],
            missiles: [Missile::new(), Missile::new()],
            ball: Ball::new(),
            playfield: Playfield::new(),
            collisions: Collisions::default(),
            audio,
            is_vsync: false,
            is_blank: true,
            is_input_latched: true,
            is_update_time: true,
            screen_start_clock: 0,
            paddle_start_clock: 0,
            last_screen_update_clock: 0,
            display: vec![[colour(0); FRAME_WIDTH]; DISPLAY_LINES],
            frame_count: 0,
            frame_ready: false,
        }
    }

    /// Read a TIA register. `address` has already been masked by the bus.
    pub fn read(&mut self, clock: &Clock, address: u16, inputs: &dyn InputPorts) -> u8 {
        self.update_scans();
        self.audio.step(clock);
        if !self.is_blank {
            self.screen_scan(clock.now() as i64);
        }

        let value = match address & 0x0F {
            index @ 0x0..=0x7 => self.collisions.read(index as u8),
            index @ 0x8..=0xA => inputs.paddle(usize::from(index as u8 - 0x8)),
            0xB | 0xC => inputs.fire(),
            0xD => 0x80,
            _ => 0,
        };
        // Low address bits leak onto the data bus. Some cartridges
        // depend on reading them back.
        let value = value | address as u8;
        trace!("TIA read ${address:02X} -> ${value:02X} @ {}", clock.now());
        value
    }

    /// Write a TIA register. `WSYNC` and `RSYNC` advance `clock`.
    pub fn write(&mut self, clock: &mut Clock, address: u16, data: u8) {
        trace!("TIA write ${address:02X} <- ${data:02X} @ {}", clock.now());
        self.update_scans();
        self.audio.step(clock);
        if !self.is_blank {
            self.screen_scan(clock.now() as i64);
        }

        let now = clock.now() as i64;
        match (address & 0x3F) as u8 {
            VSYNC => self.write_vsync(now, data),
            VBLANK => self.write_vblank(now, data),
            WSYNC => self.write_wsync(clock),
            RSYNC => self.write_rsync(clock),
            NUSIZ0 => {
                self.players[0].set_nusiz(data);
                self.missiles[0].set_nusiz(data);
            }
            NUSIZ1 => {
                self.players[1].set_nusiz(data);
                self.missiles[1].set_nusiz(data);
            }
            COLUP0 => self.line.player_colour[0] = data,
            COLUP1 => self.line.player_colour[1] = data,
            COLUPF => self.line.playfield_colour = data,
            COLUBK => self.line.background_colour = data,
            CTRLPF => {
                self.line.ctrlpf = data;
                self.playfield.set_ctrlpf(data);
                self.ball.set_ctrlpf(data);
            }
            REFP0 => self.players[0].set_reflect(data),
            REFP1 => self.players[1].set_reflect(data),
            PF0 => self.playfield.set_pf0(data),
            PF1 => self.playfield.set_pf1(data),
            PF2 => self.playfield.set_pf2(data),
            RESP0 => self.players[0].set_position(self.reset_pixel(now, PLAYER_RESET_DELAY)),
            RESP1 => self.players[1].set_position(self.reset_pixel(now, PLAYER_RESET_DELAY)),
            RESM0 => self.missiles[0].set_position(self.reset_pixel(now, OBJECT_RESET_DELAY)),
            RESM1 => self.missiles[1].set_position(self.reset_pixel(now, OBJECT_RESET_DELAY)),
            RESBL => self
                .ball
                .set_position(self.line_position(now + OBJECT_RESET_DELAY) as u8),
            AUDC0 => self.audio.write_control(clock, 0, data),
            AUDC1 => self.audio.write_control(clock, 1, data),
            AUDF0 => self.audio.write_frequency(clock, 0, data),
            AUDF1 => self.audio.write_frequency(clock, 1, data),
            AUDV0 => self.audio.write_volume(clock, 0, data),
            AUDV1 => self.audio.write_volume(clock, 1, data),
            GRP0 => {
                self.players[0].set_graphic(data);
                self.players[1].latch_graphic();
            }
            GRP1 => {
                self.players[1].set_graphic(data);
                self.players[0].latch_graphic();
                self.ball.latch_enable();
            }
            ENAM0 => self.missiles[0].set_enable(data),
            ENAM1 => self.missiles[1].set_enable(data),
            ENABL => self.ball.set_enable(data),
            HMP0 => self.line.hmp[0] = data,
            HMP1 => self.line.hmp[1] = data,
            HMM0 => self.line.hmm[0] = data,
            HMM1 => self.line.hmm[1] = data,
            HMBL => self.line.hmbl = data,
            VDELP0 => self.players[0].set_vertical_delay(data),
            VDELP1 => self.players[1].set_vertical_delay(data),
            VDELBL => self.ball.set_vertical_delay(data),
            HMOVE => self.hmove(now),
            HMCLR => {
                self.line.hmp = [0; 2];
                self.line.hmm = [0; 2];
                self.line.hmbl = 0;
            }
            CXCLR => self.collisions.clear(),
            _ => {}
        }
    }

    /// Colour clocks into the current line, for a clock value.
    fn line_position(&self, clock: i64) -> i64 {
        (clock - self.screen_start_clock).rem_euclid(TICKS)
    }

    /// Pixel a player or missile lands on when reset now.
    fn reset_pixel(&self, clock: i64, delay: i64) -> u8 {
        let position = self.line_position(clock + delay);
        if position < BLANK {
            BLANK_RESET_POSITION
        } else {
            (position - BLANK) as u8
        }
    }

    fn write_vsync(&mut self, clock: i64, data: u8) {
        if !self.is_vsync {
            if data & VSYNC_ON != 0 {
                self.is_update_time = true;
                self.is_vsync = true;
            }
        } else if data & VSYNC_ON == 0 {
            self.is_vsync = false;
            // Keep the line phase, move the origin to the last line start.
            self.screen_start_clock =
                clock - TICKS + (TICKS - clock + self.screen_start_clock).rem_euclid(TICKS);
            self.last_screen_update_clock = self.screen_start_clock;
        }
    }

    fn write_vblank(&mut self, clock: i64, data: u8) {
        self.is_input_latched = data & INPUT_LATCH != 0;
        if data & PADDLE_RECHARGE != 0 {
            self.paddle_start_clock = clock;
        }
        self.is_blank = data & BLANK_ON != 0;
    }

    fn write_wsync(&mut self, clock: &mut Clock) {
        let position = self.line_position(clock.now() as i64);
        if position != 0 {
            clock.advance((TICKS - position) as u64);
        }
    }

    fn write_rsync(&mut self, clock: &mut Clock) {
        let since_start = clock.now() as i64 - self.screen_start_clock;
        if since_start > RSYNC_FUDGE {
            clock.advance((TICKS - (since_start + RSYNC_FUDGE).rem_euclid(TICKS)) as u64);
        }
    }

    fn hmove(&mut self, clock: i64) {
        let late = self.line_position(clock) / 3 == LATE_HMOVE_CYCLE;
        let delta = |hm: u8| -> i64 { i64::from((hm as i8) >> 4) + if late { 8 } else { 0 } };

        self.players[0].shift(delta(self.line.hmp[0]));
        self.players[1].shift(delta(self.line.hmp[1]));
        self.missiles[0].shift(delta(self.line.hmm[0]));
        self.missiles[1].shift(delta(self.line.hmm[1]));
        self.ball.shift(delta(self.line.hmbl));
    }

    /// Flush a frame started by VSYNC.
    fn update_scans(&mut self) {
        if self.is_update_time {
            self.is_update_time = false;
            self.frame_count += 1;
            self.frame_ready = true;
            debug!("TIA frame {} started", self.frame_count);
        }
    }

    /// Paint every pixel that became visible since the last catch-up.
    fn screen_scan(&mut self, clock: i64) {
        let last_position = self.last_screen_update_clock - self.screen_start_clock;
        let position = clock - self.screen_start_clock + FUTURE_PIXELS;

        let y_start = last_position.div_euclid(TICKS).max(0) as usize;
        let y_stop = position.div_euclid(TICKS);

        if y_stop >= 0 && (y_stop as usize) < END_DRAW_Y {
            let y_stop = y_stop as usize;
            let mut x_start = (last_position.rem_euclid(TICKS) - BLANK).max(0) as usize;
            let last_x_stop = (position.rem_euclid(TICKS) - BLANK).max(0) as usize;

            for y in y_start..=y_stop {
                let x_stop = if y == y_stop { last_x_stop } else { FRAME_WIDTH };
                for x in x_start..x_stop {
                    self.display[y][x] = self.composite(x);
                }
                x_start = 0;
            }
        }

        self.last_screen_update_clock = clock + FUTURE_PIXELS;
    }

    /// Resolve one pixel and latch its collisions.
    fn composite(&mut self, x: usize) -> u32 {
        let pf = self.playfield.scan()[x];
        let bl = self.ball.scan()[x];
        let p0 = self.players[0].scan()[x];
        let p1 = self.players[1].scan()[x];
        let m0 = self.missiles[0].scan()[x];
        let m1 = self.missiles[1].scan()[x];

        let hits = [pf, bl, p0, p1, m0, m1].iter().filter(|&&hit| hit).count();
        if hits > 1 {
            self.collisions.update(p0, p1, m0, m1, bl, pf);
        }

        let line = &self.line;
        let playfield_colour = if pf && line.ctrlpf & PF_SCORE != 0 {
            line.player_colour[usize::from(x >= FRAME_WIDTH / 2)]
        } else {
            line.playfield_colour
        };

        // Later layers win.
        let layers = if line.ctrlpf & PF_PRIORITY == 0 {
            [
                (pf || bl, playfield_colour),
                (p1 || m1, line.player_colour[1]),
                (p0 || m0, line.player_colour[0]),
            ]
        } else {
            [
                (p1 || m1, line.player_colour[1]),
                (p0 || m0, line.player_colour[0]),
                (pf || bl, playfield_colour),
            ]
        };
        let register = layers
            .iter()
            .rev()
            .find(|(hit, _)| *hit)
            .map_or(line.background_colour, |&(_, value)| value);
        colour(register)
    }

    /// The display buffer, one row of `0x00RRGGBB` pixels per scanline.
    #[must_use]
    pub fn display(&self) -> &[[u32; FRAME_WIDTH]] {
        &self.display
    }

    /// Frames started by VSYNC so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// True once per completed frame.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    #[must_use]
    pub fn collisions(&self) -> &Collisions {
        &self.collisions
    }

    #[must_use]
    pub fn line(&self) -> &LineState {
        &self.line
    }

    #[must_use]
    pub fn player(&self, index: usize) -> &Player {
        &self.players[index]
    }

    #[must_use]
    pub fn missile(&self, index: usize) -> &Missile {
        &self.missiles[index]
    }

    #[must_use]
    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    #[must_use]
    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    #[must_use]
    pub fn is_vsync(&self) -> bool {
        self.is_vsync
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.is_blank
    }

    #[must_use]
    pub fn is_input_latched(&self) -> bool {
        self.is_input_latched
    }

    #[must_use]
    pub fn screen_start_clock(&self) -> i64 {
        self.screen_start_clock
    }

    #[must_use]
    pub fn paddle_start_clock(&self) -> i64 {
        self.paddle_start_clock
    }

    #[must_use]
    pub fn save(&self) -> TiaState {
        TiaState {
            line: self.line,
            players: [self.players[0].registers(), self.players[1].registers()],
            missiles: [self.missiles[0].registers(), self.missiles[1].registers()],
            ball: self.ball.registers(),
            playfield: self.playfield.registers(),
            collisions: self.collisions,
            audio: self.audio.save(),
            is_vsync: self.is_vsync,
            is_blank: self.is_blank,
            is_input_latched: self.is_input_latched,
            is_update_time: self.is_update_time,
            screen_start_clock: self.screen_start_clock,
            paddle_start_clock: self.paddle_start_clock,
            last_screen_update_clock: self.last_screen_update_clock,
        }
    }

    /// Restore a saved state. Every object scanline is re-derived; a
    /// pending frame flush stays pending.
    pub fn restore(&mut self, state: &TiaState) {
        self.line = state.line;
        for (player, regs) in self.players.iter_mut().zip(state.players) {
            player.restore(regs);
        }
        for (missile, regs) in self.missiles.iter_mut().zip(state.missiles) {
            missile.restore(regs);
        }
        self.ball.restore(state.ball);
        self.playfield.restore(state.playfield);
        self.collisions = state.collisions;
        self.audio.load(&state.audio);
        self.is_vsync = state.is_vsync;
        self.is_blank = state.is_blank;
        self.is_input_latched = state.is_input_latched;
        self.is_update_time = state.is_update_time;
        self.screen_start_clock = state.screen_start_clock;
        self.paddle_start_clock = state.paddle_start_clock;
        self.last_screen_update_clock = state.last_screen_update_clock;
    }
}
