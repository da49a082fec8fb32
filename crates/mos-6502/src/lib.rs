//! MOS 6502 CPU core, as used (in its 6507 package) by the Atari 2600.
//!
//! Execution is instruction-granular but cycle-accounted: a [`Mos6502`]
//! executes one whole instruction per [`step`](emu_core::Cpu::step),
//! charging the shared [`Clock`](emu_core::Clock) as the instruction's
//! bus cycles elapse.
//!
//! # Structure
//!
//! - [`AddressingMode`]: effective-address computation and its cycle cost.
//! - [`ReadStrategy`] / [`WriteStrategy`]: where the operand comes from and
//!   where the result goes.
//! - [`Op`]: pure instruction semantics, including decimal-mode arithmetic
//!   and the undocumented opcodes 2600 games use (`LAX`, `SAX`, `DCP`,
//!   `SLO`, `ASR`, `SBX`, multi-byte `NOP`s).
//! - [`INSTRUCTIONS`]: the 256-entry dispatch table composing the above.
//!
//! Opcodes the table doesn't implement stop the machine with
//! [`Fault::IllegalOpcode`](emu_core::Fault::IllegalOpcode).

mod addressing;
mod cpu;
mod dispatch;
pub mod flags;
mod ops;
mod registers;
mod transfer;

pub use addressing::{AddressingMode, Effective, crosses_page};
pub use cpu::Mos6502;
pub use dispatch::{Composed, INSTRUCTIONS, Instruction, Register, decode};
pub use flags::Status;
pub use ops::{Op, add_with_carry, compare, subtract_with_borrow};
pub use registers::Registers;
pub use transfer::{ReadStrategy, WriteStrategy};
