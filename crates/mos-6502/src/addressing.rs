//! Addressing unit.
//!
//! Each mode knows its operand size, its base cycle cost and the extra
//! cycle it costs when indexing carries into the next page. Operand bytes
//! are fetched relative to the opcode at PC; none of those fetches are
//! charged here, the mode's base cost already accounts for them.

use emu_core::{Bus, Clock, Fault};

use crate::Registers;

/// 6502 addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// `(zp,X)`
    IndexedIndirect,
    /// `zp,X`
    ZeroPageX,
    /// `zp,Y`
    ZeroPageY,
    /// `zp`
    ZeroPage,
    /// `#imm`; the effective address is the operand byte itself.
    Immediate,
    /// `(zp),Y`
    IndirectIndexed,
    /// `abs`
    Absolute,
    /// `(abs)`, `JMP` only.
    Indirect,
    /// `abs,Y`
    AbsoluteY,
    /// `abs,X`
    AbsoluteX,
    /// `A`; resolves to address 0 and pairs only with accumulator transfers.
    Accumulator,
}

/// A resolved operand address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effective {
    pub address: u16,
    /// Indexing crossed a page. Only ever set when the caller asked for the
    /// check, and only meaningful for the access that produced it.
    pub crossed: bool,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    #[must_use]
    pub const fn size(self) -> u16 {
        match self {
            Self::Accumulator => 0,
            Self::IndexedIndirect
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::ZeroPage
            | Self::Immediate
            | Self::IndirectIndexed => 1,
            Self::Absolute | Self::Indirect | Self::AbsoluteY | Self::AbsoluteX => 2,
        }
    }

    /// CPU cycles spent forming the address.
    #[must_use]
    pub const fn base_cycles(self) -> u64 {
        match self {
            Self::IndexedIndirect | Self::Indirect => 4,
            Self::IndirectIndexed => 3,
            Self::ZeroPageX | Self::ZeroPageY | Self::Absolute | Self::AbsoluteX | Self::AbsoluteY => 2,
            Self::ZeroPage => 1,
            Self::Immediate | Self::Accumulator => 0,
        }
    }

    /// Extra CPU cycles when indexing crosses a page.
    #[must_use]
    pub const fn page_penalty(self) -> u64 {
        match self {
            Self::AbsoluteX | Self::AbsoluteY | Self::IndirectIndexed => 1,
            _ => 0,
        }
    }

    /// Total addressing cost for one access.
    #[must_use]
    pub const fn cycles(self, crossed: bool) -> u64 {
        if crossed {
            self.base_cycles() + self.page_penalty()
        } else {
            self.base_cycles()
        }
    }

    /// Compute the effective address for the instruction at `regs.pc`.
    ///
    /// `check_page` enables page-crossing detection; with it off
    /// [`Effective::crossed`] is always false.
    pub fn resolve<B: Bus>(
        self,
        regs: &Registers,
        bus: &mut B,
        clock: &Clock,
        check_page: bool,
    ) -> Result<Effective, Fault> {
        let operand = regs.pc.wrapping_add(1);
        let plain = |address: u16| Effective {
            address,
            crossed: false,
        };
        let indexed = |base: u16, index: u8| {
            let address = base.wrapping_add(u16::from(index));
            Effective {
                address,
                crossed: check_page && crosses_page(base, address),
            }
        };

        Ok(match self {
            Self::IndexedIndirect => {
                let pointer = bus.read(clock, operand)?.wrapping_add(regs.x);
                plain(read_zero_page_pointer(bus, clock, pointer)?)
            }
            Self::ZeroPageX => plain(u16::from(bus.read(clock, operand)?.wrapping_add(regs.x))),
            Self::ZeroPageY => plain(u16::from(bus.read(clock, operand)?.wrapping_add(regs.y))),
            Self::ZeroPage => plain(u16::from(bus.read(clock, operand)?)),
            Self::Immediate => plain(operand),
            Self::IndirectIndexed => {
                let pointer = bus.read(clock, operand)?;
                let base = read_zero_page_pointer(bus, clock, pointer)?;
                indexed(base, regs.y)
            }
            Self::Absolute => plain(bus.read16(clock, operand)?),
            Self::Indirect => {
                let pointer = bus.read16(clock, operand)?;
                plain(bus.read16(clock, pointer)?)
            }
            Self::AbsoluteY => indexed(bus.read16(clock, operand)?, regs.y),
            Self::AbsoluteX => indexed(bus.read16(clock, operand)?, regs.x),
            Self::Accumulator => plain(0),
        })
    }
}

/// True when `a` and `b` lie in different 256-byte pages.
#[must_use]
pub const fn crosses_page(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

/// Pointer fetch that stays inside page zero.
fn read_zero_page_pointer<B: Bus>(bus: &mut B, clock: &Clock, pointer: u8) -> Result<u16, Fault> {
    let lo = bus.read(clock, u16::from(pointer))?;
    let hi = bus.read(clock, u16::from(pointer.wrapping_add(1)))?;
    Ok(u16::from_le_bytes([lo, hi]))
}
