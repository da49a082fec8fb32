//! Save states.
//!
//! A snapshot is every component's state side by side, written as JSON.
//! The layout follows the structs and may change between versions; the
//! magic and version fields only guard against loading something that
//! isn't a snapshot at all.

use std::fs;
use std::path::Path;

use atari_tia::TiaState;
use mos_6502::Registers;
use mos_riot_6532::RiotState;
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeState;
use crate::{Error, Inputs};

pub const MAGIC: &str = "emu-atari-2600 snapshot";
pub const VERSION: u32 = 1;

/// Whole-machine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub magic: String,
    pub version: u32,
    pub clock: u64,
    pub cpu: Registers,
    pub cartridge: CartridgeState,
    pub riot: RiotState,
    pub inputs: Inputs,
    pub tia: TiaState,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and check the header.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.magic != MAGIC {
            return Err(Error::SnapshotMagic(snapshot.magic));
        }
        if snapshot.version != VERSION {
            return Err(Error::SnapshotVersion {
                found: snapshot.version,
                expected: VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, Error> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
