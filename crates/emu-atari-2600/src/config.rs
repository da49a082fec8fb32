//! Atari 2600 configuration.

use std::fmt;
use std::str::FromStr;

use crate::CartridgeError;

/// Cartridge bank-switching scheme, chosen at load time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CartridgeKind {
    /// Up to eight 4K banks, hot spots at $FF2-$FF9 (F8/F6/F4 family).
    #[default]
    Default,
    /// Up to four 4K banks, hot spots ending at $FF9.
    Fallback,
    /// Parker Brothers E0: 1K slices.
    ParkerBros,
    /// M-Network E7: 2K banks plus paged RAM.
    MNetwork,
    /// CBS RAM Plus: three banks, 256 bytes of RAM.
    Cbs,
    /// Activision FE: two banks selected by address bit 13.
    Fe,
    /// Super Chip: four banks, 128 bytes of RAM.
    SuperChip,
    /// F4: eight banks, hot spots ending at $FFB.
    F4,
    /// Eight banks with 128 bytes of RAM, hot spots ending at $FFB.
    FeRam,
    /// A single 4K bank (2K images are mirrored).
    SingleBank,
}

impl CartridgeKind {
    /// The selector string accepted on the command line.
    #[must_use]
    pub const fn selector(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Fallback => "fallback",
            Self::ParkerBros => "pb",
            Self::MNetwork => "mnet",
            Self::Cbs => "cbs",
            Self::Fe => "e",
            Self::SuperChip => "super",
            Self::F4 => "f4",
            Self::FeRam => "fe",
            Self::SingleBank => "single_bank",
        }
    }
}

impl FromStr for CartridgeKind {
    type Err = CartridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "default" => Self::Default,
            "fallback" => Self::Fallback,
            "pb" => Self::ParkerBros,
            "mnet" => Self::MNetwork,
            "cbs" => Self::Cbs,
            "e" => Self::Fe,
            "super" => Self::SuperChip,
            "f4" => Self::F4,
            "fe" => Self::FeRam,
            "single_bank" => Self::SingleBank,
            other => return Err(CartridgeError::UnknownKind(other.to_owned())),
        })
    }
}

impl fmt::Display for CartridgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Atari 2600 configuration.
#[derive(Debug, Clone, Default)]
pub struct AtariConfig {
    /// Raw cartridge image.
    pub rom_data: Vec<u8>,
    /// Bank-switching scheme.
    pub cartridge: CartridgeKind,
    /// Stop once the clock reaches this value. `None` runs until quit.
    pub stop_clock: Option<u64>,
}
