//! Top-level Atari 2600 system.
//!
//! The CPU is the only driver. Each [`step`](Atari2600::step) runs one
//! instruction, charging its cycles to the shared clock; the TIA and RIOT
//! catch up lazily whenever the instruction touches them.

use std::path::Path;

use atari_tia::{AudioSink, FRAME_WIDTH, HORIZONTAL_TICKS, Tia, TiaSound};
use emu_core::{Clock, Cpu, Fault};
use log::{Level, info, log_enabled, trace};
use mos_6502::Mos6502;

use crate::bus::AtariBus;
use crate::cartridge;
use crate::config::AtariConfig;
use crate::snapshot::{self, Snapshot};
use crate::{Error, Inputs};

/// Clocks a frame may take before [`Atari2600::run_frames`] gives up
/// waiting for VSYNC: two NTSC frames.
const FRAME_TIMEOUT: u64 = HORIZONTAL_TICKS * 262 * 2;

/// Atari 2600 system.
pub struct Atari2600 {
    cpu: Mos6502,
    bus: AtariBus,
    clock: Clock,
    stop_clock: Option<u64>,
}

impl Atari2600 {
    /// Power on with the stock tone generator and reset the CPU.
    pub fn new(config: &AtariConfig) -> Result<Self, Error> {
        Self::with_audio(config, Box::new(TiaSound::new()))
    }

    /// Power on with a caller-supplied audio sink.
    pub fn with_audio(config: &AtariConfig, audio: Box<dyn AudioSink>) -> Result<Self, Error> {
        let cartridge = cartridge::load(config.cartridge, &config.rom_data)?;
        let mut atari = Self {
            cpu: Mos6502::new(),
            bus: AtariBus::new(cartridge, Tia::new(audio)),
            clock: Clock::default(),
            stop_clock: config.stop_clock.filter(|&clock| clock != 0),
        };
        atari.reset()?;
        info!("reset to ${:04X}", atari.cpu.regs.pc);
        Ok(atari)
    }

    /// Load PC from the reset vector.
    pub fn reset(&mut self) -> Result<(), Fault> {
        self.cpu.reset(&mut self.bus, &self.clock)
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<(), Fault> {
        if log_enabled!(target: "cpu", Level::Trace) {
            trace!(target: "cpu", "{}", self.trace_line());
        }
        self.cpu.step(&mut self.bus, &mut self.clock)
    }

    /// Run until the configured stop clock, or until quit if there is none.
    pub fn run(&mut self) -> Result<(), Fault> {
        match self.stop_clock {
            Some(stop) => self.run_until(stop),
            None => {
                while !self.bus.inputs.quit_requested() {
                    self.step()?;
                }
                Ok(())
            }
        }
    }

    /// Run until the clock reaches `stop_clock` or quit is requested.
    pub fn run_until(&mut self, stop_clock: u64) -> Result<(), Fault> {
        while self.clock.now() < stop_clock && !self.bus.inputs.quit_requested() {
            self.step()?;
        }
        Ok(())
    }

    /// Run until `frames` more frames have been flushed. Returns how many
    /// were; fewer if the program stops producing VSYNC or quit is
    /// requested.
    pub fn run_frames(&mut self, frames: u64) -> Result<u64, Fault> {
        let first = self.bus.tia.frame_count();
        let target = first.saturating_add(frames);
        let deadline = self
            .clock
            .now()
            .saturating_add(frames.saturating_mul(FRAME_TIMEOUT));
        while self.bus.tia.frame_count() < target
            && self.clock.now() < deadline
            && !self.bus.inputs.quit_requested()
        {
            self.step()?;
        }
        Ok(self.bus.tia.frame_count() - first)
    }

    /// One-line register dump, CPU cycles counted from the frame origin.
    #[must_use]
    pub fn trace_line(&self) -> String {
        let regs = &self.cpu.regs;
        let frame_clock = self.clock.now() as i64 - self.bus.tia.screen_start_clock();
        format!(
            "{} clock:{} PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} S:{:02X} P:{:02X}",
            self.clock.now(),
            frame_clock / 3,
            regs.pc,
            regs.a,
            regs.x,
            regs.y,
            regs.s,
            regs.p.bits(),
        )
    }

    // ========================================================================
    // Save states
    // ========================================================================

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            magic: snapshot::MAGIC.to_owned(),
            version: snapshot::VERSION,
            clock: self.clock.now(),
            cpu: self.cpu.regs,
            cartridge: self.bus.cartridge.save(),
            riot: self.bus.riot.save(),
            inputs: self.bus.inputs,
            tia: self.bus.tia.save(),
        }
    }

    /// Restore a snapshot. The cartridge is checked first, so a mismatched
    /// snapshot leaves the machine untouched.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        self.bus.cartridge.restore(&snapshot.cartridge)?;
        self.clock.set(snapshot.clock);
        self.cpu.regs = snapshot.cpu;
        self.bus.riot.restore(&snapshot.riot);
        self.bus.inputs = snapshot.inputs;
        self.bus.tia.restore(&snapshot.tia);
        Ok(())
    }

    pub fn save_state(&self, path: &Path) -> Result<(), Error> {
        self.snapshot().write_to(path)?;
        info!("state saved to {}", path.display());
        Ok(())
    }

    pub fn load_state(&mut self, path: &Path) -> Result<(), Error> {
        self.restore(&Snapshot::read_from(path)?)?;
        info!("state loaded from {}", path.display());
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mos6502 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &AtariBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut AtariBus {
        &mut self.bus
    }

    #[must_use]
    pub fn clock(&self) -> u64 {
        self.clock.now()
    }

    pub fn inputs_mut(&mut self) -> &mut Inputs {
        &mut self.bus.inputs
    }

    /// `0x00RRGGBB` pixels, one row per scanline including blanking.
    #[must_use]
    pub fn display(&self) -> &[[u32; FRAME_WIDTH]] {
        self.bus.tia.display()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.bus.tia.frame_count()
    }
}
