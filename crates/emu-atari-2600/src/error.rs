//! Machine-level errors.

use emu_core::Fault;
use thiserror::Error;

/// A cartridge image or cartridge state that can't be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    #[error("cartridge image is empty")]
    Empty,

    #[error("cartridge has {banks} banks but the mapper supports at most {max}")]
    TooLarge { banks: usize, max: usize },

    #[error("unknown cartridge type `{0}`")]
    UnknownKind(String),

    #[error("saved cartridge state does not match the loaded mapper")]
    StateMismatch,
}

/// Anything that stops the machine or a save/load.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fault(#[from] Fault),

    #[error(transparent)]
    Cartridge(#[from] CartridgeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a snapshot file (magic `{0}`)")]
    SnapshotMagic(String),

    #[error("snapshot version {found} is not supported (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },
}
