//! TIA audio.
//!
//! The TIA core only routes the six audio registers (`AUDC0/1`, `AUDF0/1`,
//! `AUDV0/1`) to an [`AudioSink`] and pokes it on every access. Nothing
//! flows back. [`TiaSound`] is the stock sink: two channels of the
//! poly4/poly5 shift-register tone generator, rendered lazily from elapsed
//! clock into 8-bit sample buffers.

use emu_core::Clock;
use serde::{Deserialize, Serialize};

/// Colour clocks per second, used to convert elapsed clock to samples.
pub const CPU_CLOCK_RATE: u64 = 3_580_000;

/// Output sample rate in Hz.
pub const SAMPLE_RATE: u64 = 32_050;

const CHANNELS: usize = 2;
const FREQUENCY_MASK: u8 = 0x1F;

/// Samples kept per channel before the oldest are dropped.
const MAX_BUFFERED: usize = SAMPLE_RATE as usize;

/// Receiver for the TIA audio registers.
pub trait AudioSink {
    /// `AUDCx`: waveform select.
    fn write_control(&mut self, clock: &Clock, channel: usize, value: u8);

    /// `AUDFx`: frequency divider.
    fn write_frequency(&mut self, clock: &Clock, channel: usize, value: u8);

    /// `AUDVx`: volume.
    fn write_volume(&mut self, clock: &Clock, channel: usize, value: u8);

    /// Called on every TIA register access.
    fn step(&mut self, clock: &Clock);

    /// Register and shift-register state for save states.
    fn save(&self) -> AudioState;

    fn load(&mut self, state: &AudioState);
}

/// Audio generator state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioState {
    pub volume: [u8; CHANNELS],
    pub frequency: [u8; CHANNELS],
    pub poly4: [u8; CHANNELS],
    pub poly5: [u8; CHANNELS],
    pub waveform: [u8; CHANNELS],
    /// Divider position per channel.
    #[serde(default)]
    pub frequency_position: [u32; CHANNELS],
    /// Clock the samples were last rendered up to.
    #[serde(default)]
    pub last_update: u64,
    #[serde(default)]
    pub remainder: u64,
}

/// A sink that remembers register values and produces no sound.
#[derive(Debug, Default)]
pub struct SilentAudio {
    state: AudioState,
}

impl AudioSink for SilentAudio {
    fn write_control(&mut self, _clock: &Clock, channel: usize, value: u8) {
        self.state.waveform[channel] = value;
    }

    fn write_frequency(&mut self, _clock: &Clock, channel: usize, value: u8) {
        self.state.frequency[channel] = value & FREQUENCY_MASK;
    }

    fn write_volume(&mut self, _clock: &Clock, channel: usize, value: u8) {
        self.state.volume[channel] = value;
    }

    fn step(&mut self, _clock: &Clock) {}

    fn save(&self) -> AudioState {
        self.state
    }

    fn load(&mut self, state: &AudioState) {
        self.state = *state;
    }
}

/// Poly4/poly5 tone generator.
///
/// The sub-sample remainder in `state` is kept in `clock * SAMPLE_RATE`
/// units.
#[derive(Debug)]
pub struct TiaSound {
    state: AudioState,
    buffers: [Vec<u8>; CHANNELS],
}

impl Default for TiaSound {
    fn default() -> Self {
        Self::new()
    }
}

impl TiaSound {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AudioState::default(),
            buffers: [Vec::new(), Vec::new()],
        }
    }

    /// Take the samples rendered so far for `channel`.
    pub fn take_samples(&mut self, channel: usize) -> Vec<u8> {
        std::mem::take(&mut self.buffers[channel])
    }

    /// Render samples up to `clock` with the current register values.
    fn generate(&mut self, clock: &Clock) {
        let now = clock.now();
        let elapsed = now.saturating_sub(self.state.last_update);
        self.state.last_update = now;

        let scaled = elapsed * SAMPLE_RATE + self.state.remainder;
        let samples = (scaled / CPU_CLOCK_RATE) as usize;
        self.state.remainder = scaled % CPU_CLOCK_RATE;

        for channel in 0..CHANNELS {
            for _ in 0..samples {
                let sample = self.next_sample(channel);
                self.buffers[channel].push(sample);
            }
            let buffer = &mut self.buffers[channel];
            if buffer.len() > MAX_BUFFERED {
                let excess = buffer.len() - MAX_BUFFERED;
                buffer.drain(..excess);
            }
        }
    }

    fn next_sample(&mut self, channel: usize) -> u8 {
        let divider = u32::from(self.state.frequency[channel]) + 1;
        if self.state.frequency_position[channel] % divider == 0 {
            let control = self.state.waveform[channel];
            let p4 = self.state.poly4[channel];
            let p5 = self.state.poly5[channel];
            if poly5_clocks(control, p5) {
                self.state.poly4[channel] = poly4(control, p5, p4);
            }
            self.state.poly5[channel] = poly5(control, p5, p4);
        }
        self.state.frequency_position[channel] =
            self.state.frequency_position[channel].wrapping_add(1);

        if self.state.poly4[channel] & 1 != 0 {
            (self.state.volume[channel] & 0x0F) * 7
        } else {
            0
        }
    }
}

impl AudioSink for TiaSound {
    fn write_control(&mut self, clock: &Clock, channel: usize, value: u8) {
        self.generate(clock);
        self.state.waveform[channel] = value;
    }

    fn write_frequency(&mut self, clock: &Clock, channel: usize, value: u8) {
        self.generate(clock);
        self.state.frequency[channel] = value & FREQUENCY_MASK;
    }

    fn write_volume(&mut self, clock: &Clock, channel: usize, value: u8) {
        self.generate(clock);
        self.state.volume[channel] = value;
    }

    fn step(&mut self, clock: &Clock) {
        self.generate(clock);
    }

    fn save(&self) -> AudioState {
        self.state
    }

    fn load(&mut self, state: &AudioState) {
        self.state = *state;
        for buffer in &mut self.buffers {
            buffer.clear();
        }
    }
}

/// Next poly4 state.
fn poly4(control: u8, p5: u8, p4: u8) -> u8 {
    let mode = control & 0x0C;
    let feed = control & 0x0F == 0
        || (mode == 0x00 && p4 & 0x03 != 0x03 && p4 & 0x03 != 0 && p4 & 0x0F != 0x0A)
        || (mode == 0x0C && p4 & 0x0C != 0 && p4 & 0x02 == 0)
        || (mode == 0x04 && p4 & 0x08 == 0)
        || (mode == 0x08 && p5 & 0x01 == 0);
    (0x07 ^ (p4 >> 1)) | u8::from(feed) << 3
}

/// Next poly5 state.
fn poly5(control: u8, p5: u8, p4: u8) -> u8 {
    let low = control & 0x03;
    let tap = (low != 0 || p4 & 0x01 == 0) && (p5 & 0x08 == 0 || low == 0);
    let feed = control & 0x0F == 0
        || ((low != 0 || p4 & 0x0F == 0x0A) && p5 & 0x1F == 0)
        || !(tap ^ (p5 & 0x01 != 0));
    (p5 >> 1) | u8::from(feed) << 4
}

/// Whether poly5 clocks poly4 this step.
fn poly5_clocks(control: u8, p5: u8) -> bool {
    let low = control & 0x03;
    (low != 0x02 || p5 & 0x1E == 0x02) && (low != 0x03 || p5 & 0x01 != 0)
}
