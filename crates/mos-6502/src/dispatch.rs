//! Opcode dispatch table.
//!
//! Every opcode byte maps to an [`Instruction`] descriptor. Most are a
//! composition of addressing mode, transfer strategies and semantics; the
//! control-flow and stack instructions are their own variants because
//! their bus sequences don't fit that shape.

use crate::addressing::AddressingMode::{
    self, Absolute, AbsoluteX, AbsoluteY, Accumulator, Immediate, IndexedIndirect, Indirect,
    IndirectIndexed, ZeroPage, ZeroPageX, ZeroPageY,
};
use crate::ops::Op;
use crate::transfer::{ReadStrategy, WriteStrategy};

/// Register operand of an implied single-byte instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    A,
    X,
    Y,
    S,
    /// No operand (flag instructions).
    None,
}

/// Addressing, transfer and semantics composed into one instruction:
/// address, read, apply, write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Composed {
    pub mode: AddressingMode,
    pub read: ReadStrategy,
    pub write: WriteStrategy,
    pub op: Op,
    /// Fixed cycles added on top of addressing and transfer costs.
    pub extra: u8,
    /// Charge the mode's page penalty when indexing crosses a page.
    pub page_check: bool,
}

/// One entry in the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ReadWrite(Composed),
    /// Two-cycle implied instruction: `dst = op(src)`.
    Implied { src: Register, dst: Register, op: Op },
    Break,
    JumpSubroutine,
    ReturnFromSubroutine,
    ReturnFromInterrupt,
    /// Taken when `P & mask == condition`.
    Branch { mask: u8, condition: u8 },
    Jump(AddressingMode),
    PushStatus,
    PullStatus,
    PushAccumulator,
    PullAccumulator,
    /// Not implemented; executing it is a fault.
    Illegal,
}

/// The 256-entry opcode table.
pub static INSTRUCTIONS: [Instruction; 256] = build_table();

const fn build_table() -> [Instruction; 256] {
    let mut table = [Instruction::Illegal; 256];
    let mut opcode = 0;
    while opcode < 256 {
        table[opcode] = decode(opcode as u8);
        opcode += 1;
    }
    table
}

/// Read-only access: bus read, result discarded, page penalty applies.
const fn load(mode: AddressingMode, op: Op) -> Instruction {
    Instruction::ReadWrite(Composed {
        mode,
        read: ReadStrategy::Bus,
        write: WriteStrategy::Null,
        op,
        extra: 0,
        page_check: true,
    })
}

/// Store of a register value. Indexed stores always pay the extra cycle.
const fn store(mode: AddressingMode, op: Op) -> Instruction {
    Instruction::ReadWrite(Composed {
        mode,
        read: ReadStrategy::Null,
        write: WriteStrategy::Register,
        op,
        extra: indexed_penalty(mode),
        page_check: false,
    })
}

/// Read-modify-write on memory. Indexed forms always pay the extra cycle.
const fn modify(mode: AddressingMode, op: Op) -> Instruction {
    Instruction::ReadWrite(Composed {
        mode,
        read: ReadStrategy::Bus,
        write: WriteStrategy::Bus,
        op,
        extra: indexed_penalty(mode),
        page_check: false,
    })
}

/// Read-modify-write on the accumulator.
const fn accumulator(op: Op) -> Instruction {
    Instruction::ReadWrite(Composed {
        mode: Accumulator,
        read: ReadStrategy::Accumulator,
        write: WriteStrategy::Accumulator,
        op,
        extra: 0,
        page_check: false,
    })
}

/// Undocumented NOP with an operand: burns cycles, touches nothing.
const fn skip(mode: AddressingMode) -> Instruction {
    Instruction::ReadWrite(Composed {
        mode,
        read: ReadStrategy::Null,
        write: WriteStrategy::Null,
        op: Op::Nop,
        extra: 1,
        page_check: false,
    })
}

const fn implied(src: Register, dst: Register, op: Op) -> Instruction {
    Instruction::Implied { src, dst, op }
}

const fn branch(mask: u8, condition: u8) -> Instruction {
    Instruction::Branch { mask, condition }
}

const fn indexed_penalty(mode: AddressingMode) -> u8 {
    match mode {
        AbsoluteX | AbsoluteY | IndirectIndexed => 1,
        _ => 0,
    }
}

/// Descriptor for a single opcode.
#[must_use]
pub const fn decode(opcode: u8) -> Instruction {
    use Register as R;

    match opcode {
        // Control flow and stack
        0x00 => Instruction::Break,
        0x20 => Instruction::JumpSubroutine,
        0x40 => Instruction::ReturnFromInterrupt,
        0x60 => Instruction::ReturnFromSubroutine,
        0x4C => Instruction::Jump(Absolute),
        0x6C => Instruction::Jump(Indirect),
        0x08 => Instruction::PushStatus,
        0x28 => Instruction::PullStatus,
        0x48 => Instruction::PushAccumulator,
        0x68 => Instruction::PullAccumulator,
        0x10 => branch(0x80, 0x00),
        0x30 => branch(0x80, 0x80),
        0x50 => branch(0x40, 0x00),
        0x70 => branch(0x40, 0x40),
        0x90 => branch(0x01, 0x00),
        0xB0 => branch(0x01, 0x01),
        0xD0 => branch(0x02, 0x00),
        0xF0 => branch(0x02, 0x02),

        // Implied
        0xEA => implied(R::A, R::A, Op::Nop),
        0x0A => implied(R::A, R::A, Op::Asl),
        0x4A => implied(R::A, R::A, Op::Lsr),
        0xE8 => implied(R::X, R::X, Op::Inc),
        0xC8 => implied(R::Y, R::Y, Op::Inc),
        0xCA => implied(R::X, R::X, Op::Dec),
        0x88 => implied(R::Y, R::Y, Op::Dec),
        0x18 => implied(R::None, R::None, Op::Clc),
        0xD8 => implied(R::None, R::None, Op::Cld),
        0x58 => implied(R::None, R::None, Op::Cli),
        0xB8 => implied(R::None, R::None, Op::Clv),
        0x38 => implied(R::None, R::None, Op::Sec),
        0x78 => implied(R::None, R::None, Op::Sei),
        0xF8 => implied(R::None, R::None, Op::Sed),
        0x9A => implied(R::X, R::S, Op::Transfer),
        0xBA => implied(R::S, R::X, Op::Transfer),
        0x8A => implied(R::X, R::A, Op::TransferNz),
        0xAA => implied(R::A, R::X, Op::TransferNz),
        0xA8 => implied(R::A, R::Y, Op::TransferNz),
        0x98 => implied(R::Y, R::A, Op::TransferNz),
        0x2A => accumulator(Op::Rol),
        0x6A => accumulator(Op::Ror),

        // ADC
        0x61 => load(IndexedIndirect, Op::Adc),
        0x69 => load(Immediate, Op::Adc),
        0x65 => load(ZeroPage, Op::Adc),
        0x75 => load(ZeroPageX, Op::Adc),
        0x71 => load(IndirectIndexed, Op::Adc),
        0x6D => load(Absolute, Op::Adc),
        0x7D => load(AbsoluteX, Op::Adc),
        0x79 => load(AbsoluteY, Op::Adc),

        // AND
        0x21 => load(IndexedIndirect, Op::And),
        0x29 => load(Immediate, Op::And),
        0x25 => load(ZeroPage, Op::And),
        0x35 => load(ZeroPageX, Op::And),
        0x31 => load(IndirectIndexed, Op::And),
        0x2D => load(Absolute, Op::And),
        0x3D => load(AbsoluteX, Op::And),
        0x39 => load(AbsoluteY, Op::And),

        // ASL
        0x06 => modify(ZeroPage, Op::Asl),
        0x16 => modify(ZeroPageX, Op::Asl),
        0x0E => modify(Absolute, Op::Asl),
        0x1E => modify(AbsoluteX, Op::Asl),

        // BIT
        0x24 => load(ZeroPage, Op::Bit),
        0x2C => load(Absolute, Op::Bit),

        // CMP
        0xC1 => load(IndexedIndirect, Op::Cmp),
        0xC9 => load(Immediate, Op::Cmp),
        0xC5 => load(ZeroPage, Op::Cmp),
        0xD5 => load(ZeroPageX, Op::Cmp),
        0xD1 => load(IndirectIndexed, Op::Cmp),
        0xCD => load(Absolute, Op::Cmp),
        0xDD => load(AbsoluteX, Op::Cmp),
        0xD9 => load(AbsoluteY, Op::Cmp),

        // CPX, CPY
        0xE0 => load(Immediate, Op::Cpx),
        0xE4 => load(ZeroPage, Op::Cpx),
        0xEC => load(Absolute, Op::Cpx),
        0xC0 => load(Immediate, Op::Cpy),
        0xC4 => load(ZeroPage, Op::Cpy),
        0xCC => load(Absolute, Op::Cpy),

        // DEC
        0xC6 => modify(ZeroPage, Op::Dec),
        0xD6 => modify(ZeroPageX, Op::Dec),
        0xCE => modify(Absolute, Op::Dec),
        0xDE => modify(AbsoluteX, Op::Dec),

        // EOR
        0x41 => load(IndexedIndirect, Op::Eor),
        0x49 => load(Immediate, Op::Eor),
        0x45 => load(ZeroPage, Op::Eor),
        0x55 => load(ZeroPageX, Op::Eor),
        0x51 => load(IndirectIndexed, Op::Eor),
        0x4D => load(Absolute, Op::Eor),
        0x5D => load(AbsoluteX, Op::Eor),
        0x59 => load(AbsoluteY, Op::Eor),

        // INC
        0xE6 => modify(ZeroPage, Op::Inc),
        0xF6 => modify(ZeroPageX, Op::Inc),
        0xEE => modify(Absolute, Op::Inc),
        0xFE => modify(AbsoluteX, Op::Inc),

        // LDA
        0xA1 => load(IndexedIndirect, Op::Lda),
        0xA9 => load(Immediate, Op::Lda),
        0xA5 => load(ZeroPage, Op::Lda),
        0xB5 => load(ZeroPageX, Op::Lda),
        0xB1 => load(IndirectIndexed, Op::Lda),
        0xAD => load(Absolute, Op::Lda),
        0xBD => load(AbsoluteX, Op::Lda),
        0xB9 => load(AbsoluteY, Op::Lda),

        // LDX
        0xA2 => load(Immediate, Op::Ldx),
        0xA6 => load(ZeroPage, Op::Ldx),
        0xB6 => load(ZeroPageY, Op::Ldx),
        0xAE => load(Absolute, Op::Ldx),
        0xBE => load(AbsoluteY, Op::Ldx),

        // LDY
        0xA0 => load(Immediate, Op::Ldy),
        0xA4 => load(ZeroPage, Op::Ldy),
        0xB4 => load(ZeroPageX, Op::Ldy),
        0xAC => load(Absolute, Op::Ldy),
        0xBC => load(AbsoluteX, Op::Ldy),

        // LSR
        0x46 => modify(ZeroPage, Op::Lsr),
        0x56 => modify(ZeroPageX, Op::Lsr),
        0x4E => modify(Absolute, Op::Lsr),
        0x5E => modify(AbsoluteX, Op::Lsr),

        // ORA
        0x01 => load(IndexedIndirect, Op::Ora),
        0x09 => load(Immediate, Op::Ora),
        0x05 => load(ZeroPage, Op::Ora),
        0x15 => load(ZeroPageX, Op::Ora),
        0x11 => load(IndirectIndexed, Op::Ora),
        0x0D => load(Absolute, Op::Ora),
        0x1D => load(AbsoluteX, Op::Ora),
        0x19 => load(AbsoluteY, Op::Ora),

        // ROL, ROR
        0x26 => modify(ZeroPage, Op::Rol),
        0x36 => modify(ZeroPageX, Op::Rol),
        0x2E => modify(Absolute, Op::Rol),
        0x3E => modify(AbsoluteX, Op::Rol),
        0x66 => modify(ZeroPage, Op::Ror),
        0x76 => modify(ZeroPageX, Op::Ror),
        0x6E => modify(Absolute, Op::Ror),
        0x7E => modify(AbsoluteX, Op::Ror),

        // SBC
        0xE1 => load(IndexedIndirect, Op::Sbc),
        0xE9 => load(Immediate, Op::Sbc),
        0xE5 => load(ZeroPage, Op::Sbc),
        0xF5 => load(ZeroPageX, Op::Sbc),
        0xF1 => load(IndirectIndexed, Op::Sbc),
        0xED => load(Absolute, Op::Sbc),
        0xFD => load(AbsoluteX, Op::Sbc),
        0xF9 => load(AbsoluteY, Op::Sbc),

        // STA, STX, STY
        0x81 => store(IndexedIndirect, Op::Sta),
        0x85 => store(ZeroPage, Op::Sta),
        0x95 => store(ZeroPageX, Op::Sta),
        0x91 => store(IndirectIndexed, Op::Sta),
        0x8D => store(Absolute, Op::Sta),
        0x9D => store(AbsoluteX, Op::Sta),
        0x99 => store(AbsoluteY, Op::Sta),
        0x86 => store(ZeroPage, Op::Stx),
        0x96 => store(ZeroPageY, Op::Stx),
        0x8E => store(Absolute, Op::Stx),
        0x84 => store(ZeroPage, Op::Sty),
        0x94 => store(ZeroPageX, Op::Sty),
        0x8C => store(Absolute, Op::Sty),

        // Undocumented: SAX
        0x83 => store(IndexedIndirect, Op::Sax),
        0x87 => store(ZeroPage, Op::Sax),
        0x8F => store(Absolute, Op::Sax),
        0x97 => store(ZeroPageY, Op::Sax),

        // Undocumented: DCP
        0xC3 => modify(IndexedIndirect, Op::Dcp),
        0xC7 => modify(ZeroPage, Op::Dcp),
        0xD7 => modify(ZeroPageX, Op::Dcp),
        0xD3 => modify(IndirectIndexed, Op::Dcp),
        0xCF => modify(Absolute, Op::Dcp),
        0xDF => modify(AbsoluteX, Op::Dcp),
        0xDB => modify(AbsoluteY, Op::Dcp),

        // Undocumented: SLO
        0x03 => modify(IndexedIndirect, Op::Slo),
        0x07 => modify(ZeroPage, Op::Slo),
        0x17 => modify(ZeroPageX, Op::Slo),
        0x13 => modify(IndirectIndexed, Op::Slo),
        0x0F => modify(Absolute, Op::Slo),
        0x1F => modify(AbsoluteX, Op::Slo),
        0x1B => modify(AbsoluteY, Op::Slo),

        // Undocumented: LAX
        0xA7 => load(ZeroPage, Op::Lax),
        0xB7 => load(ZeroPageY, Op::Lax),
        0xAF => load(Absolute, Op::Lax),
        0xBF => load(AbsoluteY, Op::Lax),
        0xA3 => load(IndexedIndirect, Op::Lax),
        0xB3 => load(IndirectIndexed, Op::Lax),

        // Undocumented: ASR, SBX
        0x4B => load(Immediate, Op::Asr),
        0xCB => load(Immediate, Op::Sbx),

        // Undocumented NOPs with operands
        0x04 | 0x44 | 0x64 => skip(ZeroPage),
        0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 => skip(ZeroPageX),
        0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 => skip(Immediate),

        _ => Instruction::Illegal,
    }
}
