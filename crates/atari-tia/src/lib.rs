//! Atari TIA (Television Interface Adaptor).
//!
//! The TIA has no tick entry point. Every register access first catches the
//! display up to the current [`emu_core::Clock`]: the pixels that became
//! visible since the previous access are composited from per-object
//! scanlines that were recomputed when their registers last changed. Work
//! is only done when something can observe it.
//!
//! Horizontal timing, in colour clocks:
//!
//! ```text
//! |<-- 68 blank -->|<------------ 160 visible ------------>|
//! |<-------------------- 228 per scanline ---------------->|
//! ```

mod audio;
mod ball;
mod collision;
mod missile;
mod palette;
mod player;
mod playfield;
mod tia;

pub use audio::{AudioSink, AudioState, CPU_CLOCK_RATE, SAMPLE_RATE, SilentAudio, TiaSound};
pub use ball::{Ball, BallRegisters};
pub use collision::Collisions;
pub use missile::{Missile, MissileRegisters};
pub use palette::{NTSC_PALETTE, colour};
pub use player::{Player, PlayerRegisters, nusize};
pub use playfield::{Playfield, PlayfieldRegisters};
pub use tia::{InputPorts, LineState, Tia, TiaState};

/// Colour clocks of horizontal blank at the start of each line.
pub const HORIZONTAL_BLANK: u64 = 68;

/// Visible pixels per line.
pub const FRAME_WIDTH: usize = 160;

/// Colour clocks per scanline.
pub const HORIZONTAL_TICKS: u64 = FRAME_WIDTH as u64 + HORIZONTAL_BLANK;

/// Visible picture lines.
pub const FRAME_HEIGHT: usize = 280;

/// Lines of vertical blank above the picture.
pub const VBLANK_LINES: usize = 37;

/// Lines of overscan below the picture.
pub const OVERSCAN_LINES: usize = 30;

/// Last line the scan catch-up will draw into.
pub const END_DRAW_Y: usize = VBLANK_LINES + FRAME_HEIGHT + OVERSCAN_LINES;

/// Lines held by the display buffer.
pub const DISPLAY_LINES: usize = END_DRAW_Y + 1;

/// One line of hit flags for a single object.
pub type Scanline = [bool; FRAME_WIDTH];

/// A line with nothing drawn on it.
pub const EMPTY_SCANLINE: Scanline = [false; FRAME_WIDTH];
