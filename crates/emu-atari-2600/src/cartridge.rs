//! Cartridge images and bank-switching mappers.
//!
//! The cartridge sees the 4K window at $1000-$1FFF. Addresses arrive with
//! the top bits masked off except bit 13, which the FE scheme decodes; all
//! other mappers only look at the low 12 bits.
//!
//! Mappers implement [`Cartridge`]. Bank switching happens on *access* to
//! a hot spot, read or write, so reads take `&mut self`.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{CartridgeError, CartridgeKind};

const WINDOW_MASK: u16 = 0x0FFF;
const BANK_4K: usize = 0x1000;

/// A cartridge as seen from the bus.
pub trait Cartridge {
    fn read(&mut self, address: u16) -> u8;
    fn write(&mut self, address: u16, data: u8);

    /// Bank registers and cartridge RAM.
    fn save(&self) -> CartridgeState;

    /// Restore a state taken from a cartridge of the same kind and size.
    fn restore(&mut self, state: &CartridgeState) -> Result<(), CartridgeError>;
}

/// Mapper state for save states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartridgeState {
    /// Whole-window banking: the selected bank plus any cartridge RAM.
    Banked { bank: usize, ram: Vec<u8> },
    /// Parker Brothers slice selection.
    Sliced { slices: [usize; 4] },
    /// M-Network bank, RAM page and RAM.
    Paged {
        bank: usize,
        ram_select: usize,
        ram: Vec<u8>,
    },
}

/// Build the mapper `kind` over `data`.
pub fn load(kind: CartridgeKind, data: &[u8]) -> Result<Box<dyn Cartridge>, CartridgeError> {
    if data.is_empty() {
        return Err(CartridgeError::Empty);
    }
    info!("loading {} byte {kind} cartridge", data.len());

    Ok(match kind {
        CartridgeKind::Default => Box::new(Generic::new(data, 8, 0xFF9, 0)?),
        CartridgeKind::Fallback => Box::new(Generic::new(data, 4, 0xFF9, 0)?),
        CartridgeKind::FeRam => Box::new(Generic::new(data, 8, 0xFFB, 0x80)?),
        CartridgeKind::Cbs => Box::new(Generic::new(data, 3, 0xFFA, 0x100)?),
        CartridgeKind::SuperChip => Box::new(Generic::new(data, 4, 0xFF9, 0x80)?),
        CartridgeKind::F4 => Box::new(Generic::new(data, 8, 0xFFB, 0)?),
        CartridgeKind::Fe => Box::new(Fe::new(data)?),
        CartridgeKind::SingleBank => Box::new(SingleBank::new(data)),
        CartridgeKind::ParkerBros => Box::new(ParkerBros::new(data)?),
        CartridgeKind::MNetwork => Box::new(MNetwork::new(data)?),
    })
}

/// Split `data` into `bank_size` banks. A short final bank is zero padded,
/// and one no longer than half a bank is repeated to fill it.
fn split_banks(data: &[u8], bank_size: usize) -> Vec<Vec<u8>> {
    if data.len() % bank_size != 0 {
        warn!("short cartridge: {} bytes in {bank_size} byte banks", data.len());
    }
    data.chunks(bank_size)
        .map(|chunk| {
            let half = bank_size / 2;
            if chunk.len() <= half {
                let mut bank = chunk.to_vec();
                bank.resize(half, 0);
                bank.extend_from_within(..);
                bank
            } else {
                let mut bank = chunk.to_vec();
                bank.resize(bank_size, 0);
                bank
            }
        })
        .collect()
}

fn banks_up_to(
    data: &[u8],
    bank_size: usize,
    max: usize,
) -> Result<Vec<Vec<u8>>, CartridgeError> {
    let banks = split_banks(data, bank_size);
    if banks.len() > max {
        return Err(CartridgeError::TooLarge {
            banks: banks.len(),
            max,
        });
    }
    info!("{} banks of {bank_size} bytes", banks.len());
    Ok(banks)
}

/// Pad with empty banks so every selectable bank exists.
fn pad_banks(mut banks: Vec<Vec<u8>>, bank_size: usize, count: usize) -> Vec<Vec<u8>> {
    banks.resize_with(count, || vec![0; bank_size]);
    banks
}

// ============================================================================
// Generic hot-swap
// ============================================================================

/// 4K banks switched by touching one of the addresses just below
/// `hot_swap + 1`, one per bank. Optional RAM is written through the
/// bottom `ram_size` bytes and read back through the next `ram_size`.
pub struct Generic {
    banks: Vec<Vec<u8>>,
    hot_swap: u16,
    ram: Vec<u8>,
    bank: usize,
}

impl Generic {
    pub fn new(
        data: &[u8],
        max_banks: usize,
        hot_swap: u16,
        ram_size: usize,
    ) -> Result<Self, CartridgeError> {
        Ok(Self {
            banks: banks_up_to(data, BANK_4K, max_banks)?,
            hot_swap,
            ram: vec![0; ram_size],
            bank: 0,
        })
    }

    fn hot_spot(&mut self, address: u16) {
        let end = self.hot_swap + 1;
        let first = end.saturating_sub(self.banks.len() as u16);
        if (first..end).contains(&address) {
            let bank = self.banks.len() - usize::from(end - address);
            if bank != self.bank {
                debug!("bank {bank} selected by ${address:03X}");
            }
            self.bank = bank;
        }
    }
}

impl Cartridge for Generic {
    fn read(&mut self, address: u16) -> u8 {
        let address = address & WINDOW_MASK;
        let ram_size = self.ram.len();
        let offset = usize::from(address);
        if ram_size > 0 && (ram_size..2 * ram_size).contains(&offset) {
            return self.ram[offset & (ram_size - 1)];
        }
        self.hot_spot(address);
        self.banks[self.bank][offset]
    }

    fn write(&mut self, address: u16, data: u8) {
        let address = address & WINDOW_MASK;
        let offset = usize::from(address);
        if offset < self.ram.len() {
            self.ram[offset] = data;
        }
        self.hot_spot(address);
    }

    fn save(&self) -> CartridgeState {
        CartridgeState::Banked {
            bank: self.bank,
            ram: self.ram.clone(),
        }
    }

    fn restore(&mut self, state: &CartridgeState) -> Result<(), CartridgeError> {
        match state {
            CartridgeState::Banked { bank, ram }
                if *bank < self.banks.len() && ram.len() == self.ram.len() =>
            {
                self.bank = *bank;
                self.ram.clone_from(ram);
                Ok(())
            }
            _ => Err(CartridgeError::StateMismatch),
        }
    }
}

// ============================================================================
// FE
// ============================================================================

/// Two 4K banks chosen by address bit 13 on every access: clear selects
/// bank 1, set selects bank 0.
pub struct Fe {
    banks: Vec<Vec<u8>>,
    bank: usize,
}

impl Fe {
    const BANKS: usize = 2;
    const SELECT: u16 = 0x2000;

    pub fn new(data: &[u8]) -> Result<Self, CartridgeError> {
        let banks = banks_up_to(data, BANK_4K, Self::BANKS)?;
        Ok(Self {
            banks: pad_banks(banks, BANK_4K, Self::BANKS),
            bank: 0,
        })
    }

    fn select(&mut self, address: u16) {
        self.bank = usize::from(address & Self::SELECT == 0);
    }
}

impl Cartridge for Fe {
    fn read(&mut self, address: u16) -> u8 {
        self.select(address);
        self.banks[self.bank][usize::from(address & WINDOW_MASK)]
    }

    fn write(&mut self, address: u16, _data: u8) {
        self.select(address);
    }

    fn save(&self) -> CartridgeState {
        CartridgeState::Banked {
            bank: self.bank,
            ram: Vec::new(),
        }
    }

    fn restore(&mut self, state: &CartridgeState) -> Result<(), CartridgeError> {
        match state {
            CartridgeState::Banked { bank, ram } if *bank < Self::BANKS && ram.is_empty() => {
                self.bank = *bank;
                Ok(())
            }
            _ => Err(CartridgeError::StateMismatch),
        }
    }
}

// ============================================================================
// Single bank
// ============================================================================

/// 4K of ROM, no switching. Only the first 4K of a larger image is used.
pub struct SingleBank {
    rom: Vec<u8>,
}

impl SingleBank {
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        let mut banks = split_banks(data, BANK_4K);
        if banks.len() > 1 {
            warn!("single bank cartridge ignores {} extra banks", banks.len() - 1);
        }
        banks.truncate(1);
        Self {
            rom: banks.pop().unwrap_or_else(|| vec![0; BANK_4K]),
        }
    }
}

impl Cartridge for SingleBank {
    fn read(&mut self, address: u16) -> u8 {
        self.rom[usize::from(address & WINDOW_MASK)]
    }

    fn write(&mut self, _address: u16, _data: u8) {}

    fn save(&self) -> CartridgeState {
        CartridgeState::Banked {
            bank: 0,
            ram: Vec::new(),
        }
    }

    fn restore(&mut self, state: &CartridgeState) -> Result<(), CartridgeError> {
        match state {
            CartridgeState::Banked { bank: 0, ram } if ram.is_empty() => Ok(()),
            _ => Err(CartridgeError::StateMismatch),
        }
    }
}

// ============================================================================
// Parker Brothers (E0)
// ============================================================================

/// Eight 1K banks viewed through four 1K slices. Slices 0-2 are selected
/// by touching $FE0-$FE7, $FE8-$FEF and $FF0-$FF7; slice 3 is fixed to
/// the last bank.
pub struct ParkerBros {
    banks: Vec<Vec<u8>>,
    slices: [usize; 4],
}

impl ParkerBros {
    const BANKS: usize = 8;
    const BANK_SIZE: usize = 0x400;

    pub fn new(data: &[u8]) -> Result<Self, CartridgeError> {
        let banks = banks_up_to(data, Self::BANK_SIZE, Self::BANKS)?;
        Ok(Self {
            banks: pad_banks(banks, Self::BANK_SIZE, Self::BANKS),
            slices: [4, 5, 6, 7],
        })
    }

    fn hot_spot(&mut self, address: u16) {
        let slice = match address & 0xFF8 {
            0xFE0 => 0,
            0xFE8 => 1,
            0xFF0 => 2,
            _ => return,
        };
        self.slices[slice] = usize::from(address & 7);
        debug!("slice {slice} -> bank {}", address & 7);
    }
}

impl Cartridge for ParkerBros {
    fn read(&mut self, address: u16) -> u8 {
        let address = address & WINDOW_MASK;
        self.hot_spot(address);
        let slice = usize::from((address & 0xC00) >> 10);
        self.banks[self.slices[slice]][usize::from(address & 0x3FF)]
    }

    fn write(&mut self, address: u16, _data: u8) {
        self.hot_spot(address & WINDOW_MASK);
    }

    fn save(&self) -> CartridgeState {
        CartridgeState::Sliced {
            slices: self.slices,
        }
    }

    fn restore(&mut self, state: &CartridgeState) -> Result<(), CartridgeError> {
        match state {
            CartridgeState::Sliced { slices } if slices.iter().all(|&s| s < Self::BANKS) => {
                self.slices = *slices;
                Ok(())
            }
            _ => Err(CartridgeError::StateMismatch),
        }
    }
}

// ============================================================================
// M-Network (E7)
// ============================================================================

/// Eight 2K banks and 2K of RAM.
///
/// | Window       | Contents                                         |
/// |--------------|--------------------------------------------------|
/// | $000-$7FF    | selected bank, or with bank 7 selected: 1K RAM   |
/// |              | written at $000-$3FF and read at $400-$7FF       |
/// | $800-$8FF    | 256-byte RAM page, write                         |
/// | $900-$9FF    | 256-byte RAM page, read                          |
/// | $A00-$FFF    | fixed to bank 7                                  |
///
/// $FE0-$FE7 select the bank, $FE8-$FEB the RAM page.
pub struct MNetwork {
    banks: Vec<Vec<u8>>,
    ram: Vec<u8>,
    bank: usize,
    ram_select: usize,
}

impl MNetwork {
    const BANKS: usize = 8;
    const BANK_SIZE: usize = 0x800;
    const RAM_SIZE: usize = 0x800;
    const FIXED_BANK: usize = 7;
    const PAGE_BASE: usize = 0x400;

    pub fn new(data: &[u8]) -> Result<Self, CartridgeError> {
        let banks = banks_up_to(data, Self::BANK_SIZE, Self::BANKS)?;
        Ok(Self {
            banks: pad_banks(banks, Self::BANK_SIZE, Self::BANKS),
            ram: vec![0; Self::RAM_SIZE],
            bank: 0,
            ram_select: 0,
        })
    }

    fn hot_spot(&mut self, address: u16) {
        match address & 0xFF8 {
            0xFE0 => self.bank = usize::from(address & 7),
            0xFE8 => self.ram_select = usize::from(address & 3),
            _ => {}
        }
    }

    fn page_index(&self, address: u16) -> usize {
        Self::PAGE_BASE + (self.ram_select << 8) + usize::from(address & 0xFF)
    }

    fn ram_enabled(&self) -> bool {
        self.bank == Self::FIXED_BANK
    }
}

impl Cartridge for MNetwork {
    fn read(&mut self, address: u16) -> u8 {
        let address = address & WINDOW_MASK;
        self.hot_spot(address);
        if self.ram_enabled() && address & 0xC00 == 0x400 {
            self.ram[usize::from(address & 0x3FF)]
        } else if address & 0x800 == 0 {
            self.banks[self.bank][usize::from(address & 0x7FF)]
        } else if address & 0xF00 == 0x900 {
            self.ram[self.page_index(address)]
        } else if address & 0xF00 >= 0xA00 {
            self.banks[Self::FIXED_BANK][usize::from(address & 0x7FF)]
        } else {
            debug!("read from write-only RAM page ${address:03X}");
            0
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        let address = address & WINDOW_MASK;
        self.hot_spot(address);
        if self.ram_enabled() && address & 0xC00 == 0 {
            self.ram[usize::from(address & 0x3FF)] = data;
        } else if address & 0xF00 == 0x800 {
            let index = self.page_index(address);
            self.ram[index] = data;
        }
    }

    fn save(&self) -> CartridgeState {
        CartridgeState::Paged {
            bank: self.bank,
            ram_select: self.ram_select,
            ram: self.ram.clone(),
        }
    }

    fn restore(&mut self, state: &CartridgeState) -> Result<(), CartridgeError> {
        match state {
            CartridgeState::Paged {
                bank,
                ram_select,
                ram,
            } if *bank < Self::BANKS && *ram_select < 4 && ram.len() == Self::RAM_SIZE => {
                self.bank = *bank;
                self.ram_select = *ram_select;
                self.ram.clone_from(ram);
                Ok(())
            }
            _ => Err(CartridgeError::StateMismatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Each bank filled with its own index.
    fn numbered(banks: usize, bank_size: usize) -> Vec<u8> {
        (0..banks)
            .flat_map(|bank| std::iter::repeat_n(bank as u8, bank_size))
            .collect()
    }

    /// 2K of `offset as u8`.
    fn ramp() -> Vec<u8> {
        (0..0x800).map(|i: usize| i as u8).collect()
    }

    #[test]
    fn empty_image_is_rejected() {
        assert_eq!(
            load(CartridgeKind::Default, &[]).err(),
            Some(CartridgeError::Empty)
        );
    }

    #[test]
    fn too_many_banks_is_rejected() {
        assert_eq!(
            load(CartridgeKind::Cbs, &numbered(4, BANK_4K)).err(),
            Some(CartridgeError::TooLarge { banks: 4, max: 3 })
        );
    }

    #[test]
    fn half_bank_image_is_mirrored() {
        let mut cart = load(CartridgeKind::Fallback, &ramp()).unwrap();
        cart.write(0, 7);
        assert_eq!(cart.read(0), 0);
        assert_eq!(cart.read(3), 3);
        assert_eq!(cart.read(0x800 + 2), 2);
    }

    #[test]
    fn short_bank_is_zero_padded() {
        let mut cart = load(CartridgeKind::SingleBank, &[0xAA; 0xC00]).unwrap();
        assert_eq!(cart.read(0xBFF), 0xAA);
        assert_eq!(cart.read(0xC00), 0);
    }

    #[test]
    fn hot_spots_select_banks_on_read_and_write() {
        // F8: two banks, hot spots $FF8/$FF9.
        let mut cart = load(CartridgeKind::Default, &numbered(2, BANK_4K)).unwrap();
        assert_eq!(cart.read(0x100), 0);
        cart.read(0xFF9);
        assert_eq!(cart.read(0x100), 1);
        cart.write(0xFF8, 0);
        assert_eq!(cart.read(0x100), 0);
        // Window masking: $1FF9 is the same hot spot.
        cart.read(0x1FF9);
        assert_eq!(cart.save(), CartridgeState::Banked { bank: 1, ram: vec![] });
    }

    #[test]
    fn f4_hot_spots_end_at_ffb() {
        let mut cart = load(CartridgeKind::F4, &numbered(8, BANK_4K)).unwrap();
        for (bank, address) in (0xFF4..=0xFFB).enumerate() {
            cart.read(address);
            assert_eq!(cart.read(0x200), bank as u8);
        }
    }

    #[test]
    fn super_chip_ram_write_then_read_port() {
        let mut cart = load(CartridgeKind::SuperChip, &ramp()).unwrap();
        cart.write(0, 7);
        assert_eq!(cart.read(0x80), 7);
        cart.write(0, 31);
        assert_eq!(cart.read(0x80), 31);
        cart.write(0x7F, 9);
        assert_eq!(cart.read(0xFF), 9);
    }

    #[test]
    fn cbs_ram_is_256_bytes() {
        let mut cart = load(CartridgeKind::Cbs, &numbered(3, BANK_4K)).unwrap();
        cart.write(0xFF, 0x5A);
        assert_eq!(cart.read(0x1FF), 0x5A);
        assert_eq!(cart.read(0x200), 0);
    }

    #[test]
    fn fe_selects_by_address_bit_13() {
        let mut cart = load(CartridgeKind::Fe, &numbered(2, BANK_4K)).unwrap();
        assert_eq!(cart.read(0x0123), 1);
        assert_eq!(cart.read(0x2123), 0);
        cart.write(0x01FE, 0);
        assert_eq!(cart.save(), CartridgeState::Banked { bank: 1, ram: vec![] });
    }

    #[test]
    fn parker_bros_slices() {
        let mut cart = load(CartridgeKind::ParkerBros, &numbered(8, 0x400)).unwrap();
        assert_eq!(
            [0x000, 0x400, 0x800, 0xC00].map(|a| cart.read(a)),
            [4, 5, 6, 7]
        );
        cart.read(0xFE2);
        cart.write(0xFE9, 0);
        cart.read(0xFF3);
        assert_eq!(
            [0x010, 0x410, 0x810, 0xC10].map(|a| cart.read(a)),
            [2, 1, 3, 7]
        );
    }

    #[test]
    fn m_network_banks_and_fixed_window() {
        let mut cart = load(CartridgeKind::MNetwork, &numbered(8, 0x800)).unwrap();
        assert_eq!(cart.read(0x100), 0);
        assert_eq!(cart.read(0xA00), 7);
        cart.read(0xFE3);
        assert_eq!(cart.read(0x100), 3);
        assert_eq!(cart.read(0xF00), 7);
    }

    #[test]
    fn m_network_ram() {
        let mut cart = load(CartridgeKind::MNetwork, &numbered(8, 0x800)).unwrap();

        // 1K RAM only while bank 7 is selected.
        cart.read(0xFE7);
        cart.write(0x010, 0x42);
        assert_eq!(cart.read(0x410), 0x42);

        // Paged RAM: write at $8xx, read at $9xx, in the selected page.
        cart.read(0xFEA);
        cart.write(0x820, 0x99);
        assert_eq!(cart.read(0x920), 0x99);
        cart.read(0xFE9);
        assert_eq!(cart.read(0x920), 0);
        assert_eq!(cart.read(0x410), 0x42);
    }

    #[test]
    fn state_restores_only_into_the_same_mapper() {
        let mut cart = load(CartridgeKind::MNetwork, &numbered(8, 0x800)).unwrap();
        cart.read(0xFE5);
        cart.read(0xFEB);
        cart.write(0x8FF, 1);
        let state = cart.save();

        let json = serde_json::to_string(&state).unwrap();
        let state: CartridgeState = serde_json::from_str(&json).unwrap();

        let mut fresh = load(CartridgeKind::MNetwork, &numbered(8, 0x800)).unwrap();
        fresh.restore(&state).unwrap();
        assert_eq!(fresh.save(), state);
        assert_eq!(fresh.read(0x100), 5);
        assert_eq!(fresh.read(0x9FF), 1);

        let mut other = load(CartridgeKind::ParkerBros, &numbered(8, 0x400)).unwrap();
        assert_eq!(other.restore(&state), Err(CartridgeError::StateMismatch));
    }
}
