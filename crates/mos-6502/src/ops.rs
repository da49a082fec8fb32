//! Opcode semantics.
//!
//! Each [`Op`] is a pure function of the register file and one operand
//! byte. It mutates registers and flags and returns the byte its write
//! strategy should store; operations that write nothing return 0.

use crate::Registers;
use crate::flags::{C, D, I, N, V, Z};

/// Instruction semantics, independent of addressing and transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Nop,
    Ora,
    And,
    Eor,
    Adc,
    Sbc,
    Cmp,
    Cpx,
    Cpy,
    Bit,
    Asl,
    Lsr,
    Rol,
    Ror,
    Inc,
    Dec,
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    Clc,
    Cld,
    Cli,
    Clv,
    Sec,
    Sed,
    Sei,
    /// Register copy leaving flags alone (`TXS`, `TSX`).
    Transfer,
    /// Register copy setting N and Z.
    TransferNz,
    // Undocumented
    Sax,
    Dcp,
    Slo,
    Lax,
    Asr,
    Sbx,
}

impl Op {
    /// Apply the operation to `data`, returning the byte to write back.
    pub fn apply(self, regs: &mut Registers, data: u8) -> u8 {
        match self {
            Self::Nop => data,
            Self::Ora => {
                regs.a |= data;
                regs.p.update_nz(regs.a);
                0
            }
            Self::And => {
                regs.a &= data;
                regs.p.update_nz(regs.a);
                0
            }
            Self::Eor => {
                regs.a ^= data;
                regs.p.update_nz(regs.a);
                0
            }
            Self::Adc => {
                let (a, carry) = (regs.a, regs.p.carry());
                regs.a = add_with_carry(regs, a, data, carry);
                0
            }
            Self::Sbc => {
                let (a, borrow) = (regs.a, 1 - regs.p.carry());
                regs.a = subtract_with_borrow(regs, a, data, borrow);
                0
            }
            Self::Cmp => {
                let a = regs.a;
                compare(regs, a, data);
                0
            }
            Self::Cpx => {
                let x = regs.x;
                compare(regs, x, data);
                0
            }
            Self::Cpy => {
                let y = regs.y;
                compare(regs, y, data);
                0
            }
            Self::Bit => {
                regs.p.set_if(N, data & 0x80 != 0);
                regs.p.set_if(V, data & 0x40 != 0);
                regs.p.set_if(Z, regs.a & data == 0);
                0
            }
            Self::Asl => shift_left(regs, data),
            Self::Lsr => {
                regs.p.set_if(C, data & 0x01 != 0);
                let result = data >> 1;
                regs.p.update_nz(result);
                result
            }
            Self::Rol => {
                let result = (data << 1) | regs.p.carry();
                regs.p.set_if(C, data & 0x80 != 0);
                regs.p.update_nz(result);
                result
            }
            Self::Ror => {
                let result = (data >> 1) | (regs.p.carry() << 7);
                regs.p.set_if(C, data & 0x01 != 0);
                regs.p.update_nz(result);
                result
            }
            Self::Inc => {
                let result = data.wrapping_add(1);
                regs.p.update_nz(result);
                result
            }
            Self::Dec => {
                let result = data.wrapping_sub(1);
                regs.p.update_nz(result);
                result
            }
            Self::Lda => {
                regs.a = data;
                regs.p.update_nz(data);
                0
            }
            Self::Ldx => {
                regs.x = data;
                regs.p.update_nz(data);
                0
            }
            Self::Ldy => {
                regs.y = data;
                regs.p.update_nz(data);
                0
            }
            Self::Sta => regs.a,
            Self::Stx => regs.x,
            Self::Sty => regs.y,
            Self::Clc => flag(regs, C, false),
            Self::Cld => flag(regs, D, false),
            Self::Cli => flag(regs, I, false),
            Self::Clv => flag(regs, V, false),
            Self::Sec => flag(regs, C, true),
            Self::Sed => flag(regs, D, true),
            Self::Sei => flag(regs, I, true),
            Self::Transfer => data,
            Self::TransferNz => {
                regs.p.update_nz(data);
                data
            }
            Self::Sax => regs.a & regs.x,
            Self::Dcp => {
                let result = data.wrapping_sub(1);
                let a = regs.a;
                compare(regs, a, result);
                result
            }
            Self::Slo => {
                let result = shift_left(regs, data);
                regs.a |= result;
                regs.p.update_nz(regs.a);
                result
            }
            Self::Lax => {
                regs.a = data;
                regs.x = data;
                regs.p.update_nz(data);
                0
            }
            Self::Asr => {
                let masked = regs.a & data;
                regs.p.set_if(C, masked & 0x01 != 0);
                regs.a = masked >> 1;
                regs.p.update_nz(regs.a);
                0
            }
            Self::Sbx => {
                let value = regs.a & regs.x;
                let result = value.wrapping_sub(data);
                regs.p.set_if(C, value >= data);
                regs.p.update_nz(result);
                regs.x = result;
                0
            }
        }
    }
}

fn flag(regs: &mut Registers, flag: u8, set: bool) -> u8 {
    regs.p.set_if(flag, set);
    0
}

fn shift_left(regs: &mut Registers, data: u8) -> u8 {
    regs.p.set_if(C, data & 0x80 != 0);
    let result = data << 1;
    regs.p.update_nz(result);
    result
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Flags as for `CMP`: C when `a >= b`, Z when equal, N from `a - b`.
pub fn compare(regs: &mut Registers, a: u8, b: u8) {
    regs.p.set_if(C, a >= b);
    regs.p.update_nz(a.wrapping_sub(b));
}

/// `ADC`, binary or decimal depending on D.
pub fn add_with_carry(regs: &mut Registers, a: u8, b: u8, carry: u8) -> u8 {
    if regs.p.is_set(D) {
        return add_decimal(regs, a, b, carry);
    }
    let sum = u16::from(a) + u16::from(b) + u16::from(carry);
    let result = sum as u8;
    regs.p.set_if(C, sum > 0xFF);
    regs.p.set_if(V, (a ^ result) & (b ^ result) & 0x80 != 0);
    regs.p.update_nz(result);
    result
}

/// `SBC`, binary or decimal depending on D. `borrow` is the inverted carry.
pub fn subtract_with_borrow(regs: &mut Registers, a: u8, b: u8, borrow: u8) -> u8 {
    if regs.p.is_set(D) {
        return subtract_decimal(regs, a, b, borrow);
    }
    let difference = i16::from(a) - i16::from(b) - i16::from(borrow);
    let result = difference as u8;
    regs.p.set_if(C, difference >= 0);
    regs.p.set_if(V, (a ^ b) & (a ^ result) & 0x80 != 0);
    regs.p.update_nz(result);
    result
}

/// Value of a packed BCD byte. Nibbles above 9 are folded modulo 10.
fn bcd_value(value: u8) -> i16 {
    i16::from(value >> 4) * 10 + i16::from(value & 0x0F) % 10
}

/// Re-pack a decimal result. Tens truncate toward zero, the digits then
/// fold into 0..=9 so a result of -1 packs as `$09`.
fn bcd_pack(value: i16) -> u8 {
    let tens = (value / 10).rem_euclid(10);
    let ones = value.rem_euclid(10);
    (((tens << 4) & 0xF0) + ones) as u8
}

// Decimal-mode flags are an approximation of NMOS behaviour: Z follows the
// binary sum and V is left untouched for ADC; SBC forces V on.
fn add_decimal(regs: &mut Registers, a: u8, b: u8, carry: u8) -> u8 {
    let result = bcd_value(a) + bcd_value(b) + i16::from(carry);
    let binary = a.wrapping_add(b).wrapping_add(carry);
    regs.p.set_if(N, result < 0);
    regs.p.set_if(Z, binary == 0);
    regs.p.set_if(C, !(0..=99).contains(&result));
    bcd_pack(result)
}

fn subtract_decimal(regs: &mut Registers, a: u8, b: u8, borrow: u8) -> u8 {
    let result = bcd_value(a) - bcd_value(b) - i16::from(borrow);
    regs.p.set_if(N, result < 0);
    regs.p.set_if(Z, result == 0);
    regs.p.set(V);
    regs.p.set_if(C, (0..=99).contains(&result));
    bcd_pack(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regs_with(a: u8, p: u8) -> Registers {
        let mut regs = Registers::new();
        regs.a = a;
        regs.p.0 = p;
        regs
    }

    #[test]
    fn adc_signed_overflow() {
        let mut regs = regs_with(0x50, 0);
        Op::Adc.apply(&mut regs, 0x50);
        assert_eq!(regs.a, 0xA0);
        assert!(regs.p.is_set(V));
        assert!(regs.p.is_set(N));
        assert!(!regs.p.is_set(C));
    }

    #[test]
    fn sbc_carry_means_no_borrow() {
        let mut regs = regs_with(0x10, C);
        Op::Sbc.apply(&mut regs, 0x20);
        assert_eq!(regs.a, 0xF0);
        assert!(!regs.p.is_set(C));

        let mut regs = regs_with(0x20, C);
        Op::Sbc.apply(&mut regs, 0x10);
        assert_eq!(regs.a, 0x10);
        assert!(regs.p.is_set(C));
    }

    #[test]
    fn decimal_add_carries_past_99() {
        let mut regs = regs_with(0x58, D | C);
        Op::Adc.apply(&mut regs, 0x46);
        assert_eq!(regs.a, 0x05);
        assert!(regs.p.is_set(C));
    }

    #[test]
    fn decimal_subtract_below_zero_packs_folded_digits() {
        let mut regs = regs_with(0x00, D | C);
        Op::Sbc.apply(&mut regs, 0x01);
        assert_eq!(regs.a, 0x09);
        assert!(regs.p.is_set(N));
        assert!(regs.p.is_set(V));
        assert!(!regs.p.is_set(C));
    }

    #[test]
    fn rotates_through_carry() {
        let mut regs = regs_with(0, C);
        assert_eq!(Op::Rol.apply(&mut regs, 0x80), 0x01);
        assert!(regs.p.is_set(C));
        assert_eq!(Op::Ror.apply(&mut regs, 0x02), 0x81);
        assert!(!regs.p.is_set(C));
        assert!(regs.p.is_set(N));
    }

    #[test]
    fn bit_copies_high_bits() {
        let mut regs = regs_with(0x01, 0);
        Op::Bit.apply(&mut regs, 0xC0);
        assert!(regs.p.is_set(N));
        assert!(regs.p.is_set(V));
        assert!(regs.p.is_set(Z));
    }

    #[test]
    fn dcp_decrements_then_compares() {
        let mut regs = regs_with(0x41, 0);
        assert_eq!(Op::Dcp.apply(&mut regs, 0x42), 0x41);
        assert!(regs.p.is_set(Z));
        assert!(regs.p.is_set(C));
    }

    #[test]
    fn slo_writes_shifted_value() {
        let mut regs = regs_with(0x01, 0);
        assert_eq!(Op::Slo.apply(&mut regs, 0x81), 0x02);
        assert_eq!(regs.a, 0x03);
        assert!(regs.p.is_set(C));
    }

    #[test]
    fn asr_masks_shifts_and_carries() {
        let mut regs = regs_with(0xFF, 0);
        Op::Asr.apply(&mut regs, 0x03);
        assert_eq!(regs.a, 0x01);
        assert!(regs.p.is_set(C));
    }

    #[test]
    fn sbx_subtracts_from_a_and_x() {
        let mut regs = regs_with(0xF0, 0);
        regs.x = 0x3C;
        Op::Sbx.apply(&mut regs, 0x10);
        assert_eq!(regs.x, 0x20);
        assert!(regs.p.is_set(C));
    }

    #[test]
    fn lax_loads_both() {
        let mut regs = regs_with(0, 0);
        Op::Lax.apply(&mut regs, 0x80);
        assert_eq!((regs.a, regs.x), (0x80, 0x80));
        assert!(regs.p.is_set(N));
    }
}
