//! Property tests for flag derivation and timing.

use emu_core::{CYCLES_TO_CLOCK, Clock, Cpu, SimpleBus};
use mos_6502::{AddressingMode, Mos6502, Registers, add_with_carry, compare, flags};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_adc_binary_flags(a in any::<u8>(), b in any::<u8>(), carry in 0u8..=1) {
        let mut regs = Registers::new();
        let result = add_with_carry(&mut regs, a, b, carry);
        let sum = u16::from(a) + u16::from(b) + u16::from(carry);
        let signed = i16::from(a as i8) + i16::from(b as i8) + i16::from(carry);

        prop_assert_eq!(result, sum as u8);
        prop_assert_eq!(regs.p.is_set(flags::C), sum > 255);
        prop_assert_eq!(regs.p.is_set(flags::V), !(-128..=127).contains(&signed));
        prop_assert_eq!(regs.p.is_set(flags::Z), result == 0);
        prop_assert_eq!(regs.p.is_set(flags::N), result & 0x80 != 0);
    }

    #[test]
    fn prop_compare_is_unsigned_ordering(a in any::<u8>(), b in any::<u8>()) {
        let mut regs = Registers::new();
        compare(&mut regs, a, b);
        prop_assert_eq!(regs.p.is_set(flags::C), a >= b);
        prop_assert_eq!(regs.p.is_set(flags::Z), a == b);
    }

    #[test]
    fn prop_absolute_indexed_page_penalty(base in any::<u16>(), index in any::<u8>()) {
        let mut bus = SimpleBus::new();
        let mut regs = Registers::new();
        regs.pc = 0x0200;
        regs.y = index;
        bus.load(0x0201, &base.to_le_bytes());

        let effective = AddressingMode::AbsoluteY
            .resolve(&regs, &mut bus, &Clock::default(), true)
            .unwrap();
        let crossed = (base & 0xFF00) != (base.wrapping_add(u16::from(index)) & 0xFF00);
        prop_assert_eq!(effective.crossed, crossed);
        prop_assert_eq!(
            AddressingMode::AbsoluteY.cycles(effective.crossed),
            2 + u64::from(crossed)
        );
    }

    #[test]
    fn prop_taken_branch_costs(origin in 0x0200u16..0xF000, delta in any::<u8>()) {
        let mut bus = SimpleBus::new();
        let mut cpu = Mos6502::new();
        let mut clock = Clock::default();
        bus.load(origin, &[0xD0, delta]); // BNE, Z clear
        cpu.regs.pc = origin;
        cpu.step(&mut bus, &mut clock).unwrap();

        let next = origin.wrapping_add(2);
        let target = next.wrapping_add_signed(i16::from(delta as i8));
        let page_cycle = u64::from((next & 0xFF00) != (target & 0xFF00));
        prop_assert_eq!(cpu.regs.pc, target);
        prop_assert_eq!(clock.now(), (2 + 1 + page_cycle) * CYCLES_TO_CLOCK);
    }
}
