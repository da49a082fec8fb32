//! Instruction behaviour and cycle counts.

use emu_core::{Clock, Cpu, CYCLES_TO_CLOCK, SimpleBus};
use mos_6502::{Mos6502, flags};

/// Run one instruction, returning the CPU cycles it consumed.
fn run_instruction(cpu: &mut Mos6502, bus: &mut SimpleBus, clock: &mut Clock) -> u64 {
    let before = clock.now();
    cpu.step(bus, clock).expect("instruction faulted");
    (clock.now() - before) / CYCLES_TO_CLOCK
}

/// Load a program at $0200 and set PC there.
fn setup_program(bus: &mut SimpleBus, cpu: &mut Mos6502, program: &[u8]) {
    bus.load(0x0200, program);
    cpu.regs.pc = 0x0200;
}

fn run_all(cpu: &mut Mos6502, bus: &mut SimpleBus, count: usize) -> u64 {
    let mut clock = Clock::default();
    (0..count)
        .map(|_| run_instruction(cpu, bus, &mut clock))
        .sum()
}

/// Cycles for the single instruction `program` after `prepare` runs.
fn cycles_of(program: &[u8], prepare: impl FnOnce(&mut Mos6502, &mut SimpleBus)) -> u64 {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    setup_program(&mut bus, &mut cpu, program);
    prepare(&mut cpu, &mut bus);
    run_all(&mut cpu, &mut bus, 1)
}

#[test]
fn test_stack_pha_pla() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    let program = [
        0xA9, 0x42, // LDA #$42
        0xA2, 0xFF, // LDX #$FF
        0x9A, // TXS
        0x48, // PHA
        0xA9, 0x00, // LDA #$00
        0x68, // PLA
    ];
    setup_program(&mut bus, &mut cpu, &program);
    run_all(&mut cpu, &mut bus, 6);

    assert_eq!(cpu.regs.a, 0x42, "PLA should restore A");
    assert_eq!(cpu.regs.s, 0xFF, "S should be back to $FF after PLA");
    assert_eq!(bus.peek(0x01FF), 0x42, "PHA writes to page one");
}

#[test]
fn test_stack_php_plp() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    let program = [
        0xA2, 0xFF, // LDX #$FF
        0x9A, // TXS
        0x38, // SEC
        0x08, // PHP
        0x18, // CLC
        0x28, // PLP
    ];
    setup_program(&mut bus, &mut cpu, &program);
    run_all(&mut cpu, &mut bus, 6);

    assert!(cpu.regs.p.is_set(flags::C), "PLP should restore carry");
    // LDX #$FF left N set.
    assert_eq!(
        bus.peek(0x01FF),
        flags::N | flags::C | flags::B | flags::U
    );
    assert_eq!(cpu.regs.s, 0xFF);
}

#[test]
fn test_brk_stack_layout() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(0xFFFE, &[0x00, 0x03]);
    let program = [
        0xA2, 0xFF, // LDX #$FF    @ $0200
        0x9A, // TXS         @ $0202
        0x58, // CLI         @ $0203
        0x00, // BRK         @ $0204
        0xEA, // padding     @ $0205
    ];
    setup_program(&mut bus, &mut cpu, &program);
    let cycles = run_all(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.pc(), 0x0300, "PC should be at BRK vector target");
    assert_eq!(cpu.regs.s, 0xFC, "three pushes from $FF");
    assert_eq!(bus.peek(0x01FF), 0x02, "pushed PCH");
    assert_eq!(bus.peek(0x01FE), 0x06, "pushed PCL skips the padding byte");
    assert_eq!(bus.peek(0x01FD) & 0x30, 0x30, "pushed P has B and bit 5");
    assert!(!cpu.regs.p.is_set(flags::B), "B never sticks in P");
    assert_eq!(cycles, 2 + 2 + 2 + 7);
}

#[test]
fn test_brk_rti_round_trip() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(0xFFFE, &[0x00, 0x03]);
    bus.load(0x0300, &[0x40]); // RTI
    let program = [
        0xA2, 0xFF, // LDX #$FF
        0x9A, // TXS
        0x38, // SEC
        0x00, // BRK
        0xEA, // padding
        0xE8, // INX
    ];
    setup_program(&mut bus, &mut cpu, &program);
    run_all(&mut cpu, &mut bus, 5);

    assert_eq!(cpu.pc(), 0x0206, "RTI resumes after the padding byte");
    assert_eq!(cpu.regs.s, 0xFF);
    assert!(cpu.regs.p.is_set(flags::C));
}

#[test]
fn test_jsr_rts_round_trip() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(0x0300, &[0xA9, 0x99, 0x60]); // LDA #$99; RTS
    let program = [
        0xA2, 0xFF, // LDX #$FF
        0x9A, // TXS
        0x20, 0x00, 0x03, // JSR $0300
        0xE8, // INX
    ];
    setup_program(&mut bus, &mut cpu, &program);
    let mut clock = Clock::default();
    run_instruction(&mut cpu, &mut bus, &mut clock);
    run_instruction(&mut cpu, &mut bus, &mut clock);

    assert_eq!(run_instruction(&mut cpu, &mut bus, &mut clock), 6);
    assert_eq!(cpu.pc(), 0x0300);
    assert_eq!(bus.peek(0x01FF), 0x02);
    assert_eq!(bus.peek(0x01FE), 0x05, "JSR pushes its last operand byte");

    run_instruction(&mut cpu, &mut bus, &mut clock);
    assert_eq!(run_instruction(&mut cpu, &mut bus, &mut clock), 6);
    assert_eq!(cpu.pc(), 0x0206);
    assert_eq!(cpu.regs.a, 0x99);
    assert_eq!(cpu.regs.s, 0xFF);
}

#[test]
fn test_transfers_and_flags() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    let program = [
        0xA9, 0x80, // LDA #$80
        0xAA, // TAX
        0xA9, 0x00, // LDA #$00
        0x9A, // TXS (no flags)
        0xBA, // TSX (no flags)
        0xA8, // TAY
    ];
    setup_program(&mut bus, &mut cpu, &program);
    run_all(&mut cpu, &mut bus, 3);
    assert!(cpu.regs.p.is_set(flags::Z));
    run_all(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.s, 0x80);
    assert!(cpu.regs.p.is_set(flags::Z), "stack transfers leave flags alone");
    run_all(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.y, 0x00);
}

#[test]
fn test_rol_accumulator() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    setup_program(&mut bus, &mut cpu, &[0x38, 0x2A]); // SEC; ROL A
    cpu.regs.a = 0x40;
    let cycles = run_all(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.a, 0x81);
    assert_eq!(cpu.pc(), 0x0202);
    assert_eq!(cycles, 4);
}

#[test]
fn test_dcp_zero_page() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(0x0080, &[0x10]);
    setup_program(&mut bus, &mut cpu, &[0xC7, 0x80]); // DCP $80
    cpu.regs.a = 0x0F;
    assert_eq!(run_all(&mut cpu, &mut bus, 1), 5);
    assert_eq!(bus.peek(0x0080), 0x0F);
    assert!(cpu.regs.p.is_set(flags::Z));
    assert!(cpu.regs.p.is_set(flags::C));
}

#[test]
fn test_sax_stores_a_and_x() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    setup_program(&mut bus, &mut cpu, &[0x87, 0x90]); // SAX $90
    cpu.regs.a = 0xF0;
    cpu.regs.x = 0x3C;
    run_all(&mut cpu, &mut bus, 1);
    assert_eq!(bus.peek(0x0090), 0x30);
}

#[test]
fn test_operand_nops_write_nothing() {
    for opcode in [0x04, 0x14, 0x34, 0x44, 0x54, 0x64, 0x74, 0xD4, 0xF4] {
        let mut bus = SimpleBus::new();
        let mut cpu = Mos6502::new();
        bus.load(0x0080, &[0x5A]);
        setup_program(&mut bus, &mut cpu, &[opcode, 0x80]);
        run_all(&mut cpu, &mut bus, 1);
        assert_eq!(bus.peek(0x0080), 0x5A, "opcode {opcode:02X}");
        assert_eq!(cpu.pc(), 0x0202, "opcode {opcode:02X}");
    }
}

#[test]
fn test_jmp_indirect() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(0x0400, &[0x34, 0x12]);
    setup_program(&mut bus, &mut cpu, &[0x6C, 0x00, 0x04]);
    assert_eq!(run_all(&mut cpu, &mut bus, 1), 5);
    assert_eq!(cpu.pc(), 0x1234);
}

// ============================================================================
// Cycle counts
// ============================================================================

#[test]
fn test_cycle_counts() {
    let none = |_: &mut Mos6502, _: &mut SimpleBus| {};
    let table: [(&str, &[u8], u64); 22] = [
        ("LDA #", &[0xA9, 0x00], 2),
        ("LDA zp", &[0xA5, 0x80], 3),
        ("LDA zp,X", &[0xB5, 0x80], 4),
        ("LDA abs", &[0xAD, 0x00, 0x10], 4),
        ("LDA abs,X", &[0xBD, 0x00, 0x10], 4),
        ("LDA (zp,X)", &[0xA1, 0x80], 6),
        ("LDA (zp),Y", &[0xB1, 0x80], 5),
        ("STA zp", &[0x85, 0x80], 3),
        ("STA abs,X", &[0x9D, 0x00, 0x10], 5),
        ("STA (zp),Y", &[0x91, 0x80], 6),
        ("INC zp", &[0xE6, 0x80], 5),
        ("INC zp,X", &[0xF6, 0x80], 6),
        ("INC abs", &[0xEE, 0x00, 0x10], 6),
        ("INC abs,X", &[0xFE, 0x00, 0x10], 7),
        ("DCP (zp,X)", &[0xC3, 0x80], 8),
        ("DCP (zp),Y", &[0xD3, 0x80], 8),
        ("DCP abs,Y", &[0xDB, 0x00, 0x10], 7),
        ("NOP zp", &[0x04, 0x80], 3),
        ("NOP zp,X", &[0x14, 0x80], 4),
        ("NOP #", &[0x80, 0x00], 2),
        ("INX", &[0xE8], 2),
        ("JMP abs", &[0x4C, 0x00, 0x10], 3),
    ];
    for (name, program, expected) in table {
        assert_eq!(cycles_of(program, none), expected, "{name}");
    }
}

#[test]
fn test_indexed_read_pays_for_page_cross() {
    let cross = cycles_of(&[0xBD, 0xF0, 0x10], |cpu, _| cpu.regs.x = 0x20);
    let same = cycles_of(&[0xBD, 0x00, 0x10], |cpu, _| cpu.regs.x = 0x20);
    assert_eq!((same, cross), (4, 5));

    let cross = cycles_of(&[0xB1, 0x80], |cpu, bus| {
        bus.load(0x0080, &[0xFF, 0x10]);
        cpu.regs.y = 0x01;
    });
    assert_eq!(cross, 6);
}

#[test]
fn test_indexed_store_never_pays_for_page_cross() {
    let cross = cycles_of(&[0x9D, 0xF0, 0x10], |cpu, _| cpu.regs.x = 0x20);
    assert_eq!(cross, 5);
}

#[test]
fn test_stack_instruction_cycles() {
    let table: [(&[u8], u64); 4] = [(&[0x48], 3), (&[0x68], 4), (&[0x08], 3), (&[0x28], 4)];
    for (program, expected) in table {
        assert_eq!(cycles_of(program, |_, _| {}), expected, "{:02X}", program[0]);
    }
}

// ============================================================================
// Branches
// ============================================================================

fn branch_cycles(origin: u16, program: [u8; 2], p: u8) -> (u64, u16) {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6502::new();
    bus.load(origin, &program);
    cpu.regs.pc = origin;
    cpu.regs.p.0 = p;
    let cycles = run_all(&mut cpu, &mut bus, 1);
    (cycles, cpu.pc())
}

#[test]
fn test_branch_not_taken() {
    assert_eq!(branch_cycles(0x0200, [0xD0, 0x10], flags::Z), (2, 0x0202));
}

#[test]
fn test_branch_taken_same_page() {
    assert_eq!(branch_cycles(0x0200, [0xD0, 0x10], 0), (3, 0x0212));
}

#[test]
fn test_branch_taken_backwards() {
    assert_eq!(branch_cycles(0x0210, [0xF0, 0xFC], flags::Z), (3, 0x020E));
}

#[test]
fn test_branch_taken_cross_page() {
    assert_eq!(branch_cycles(0x02F0, [0x10, 0x20], 0), (4, 0x0312));
}

#[test]
fn test_all_branch_conditions() {
    let cases = [
        (0x10, flags::N, false),
        (0x30, flags::N, true),
        (0x50, flags::V, false),
        (0x70, flags::V, true),
        (0x90, flags::C, false),
        (0xB0, flags::C, true),
        (0xD0, flags::Z, false),
        (0xF0, flags::Z, true),
    ];
    for (opcode, flag, on_set) in cases {
        let (_, taken_pc) = branch_cycles(0x0200, [opcode, 0x10], if on_set { flag } else { 0 });
        let (_, skipped_pc) =
            branch_cycles(0x0200, [opcode, 0x10], if on_set { 0 } else { flag });
        assert_eq!(taken_pc, 0x0212, "{opcode:02X} taken");
        assert_eq!(skipped_pc, 0x0202, "{opcode:02X} not taken");
    }
}
