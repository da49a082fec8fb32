//! Fetch-execute loop.
//!
//! Instructions run to completion in one [`Mos6502::step`]. Cycles are
//! charged to the shared clock at the point in the instruction where the
//! hardware spends them, so a bus write lands at the clock value the real
//! write would have.

use emu_core::{Bus, Clock, Cpu, Fault};

use crate::Registers;
use crate::addressing::{AddressingMode, crosses_page};
use crate::dispatch::{Composed, INSTRUCTIONS, Instruction, Register};
use crate::flags;
use crate::ops::Op;

const RESET_VECTOR: u16 = 0xFFFC;
const BREAK_VECTOR: u16 = 0xFFFE;

/// The 6507 core.
#[derive(Debug, Default, Clone)]
pub struct Mos6502 {
    pub regs: Registers,
}

impl Mos6502 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
        }
    }

    fn read_register(&self, register: Register) -> u8 {
        match register {
            Register::A => self.regs.a,
            Register::X => self.regs.x,
            Register::Y => self.regs.y,
            Register::S => self.regs.s,
            Register::None => 0,
        }
    }

    fn write_register(&mut self, register: Register, value: u8) {
        match register {
            Register::A => self.regs.a = value,
            Register::X => self.regs.x = value,
            Register::Y => self.regs.y = value,
            Register::S => self.regs.s = value,
            Register::None => {}
        }
    }

    fn push<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock, value: u8) -> Result<(), Fault> {
        bus.write_sp(clock, self.regs.s, value)?;
        self.regs.s = self.regs.s.wrapping_sub(1);
        Ok(())
    }

    fn pull<B: Bus>(&mut self, bus: &mut B, clock: &Clock) -> Result<u8, Fault> {
        self.regs.s = self.regs.s.wrapping_add(1);
        bus.read_sp(clock, self.regs.s)
    }

    // ========================================================================
    // Instruction shapes
    // ========================================================================

    fn read_write<B: Bus>(
        &mut self,
        bus: &mut B,
        clock: &mut Clock,
        instruction: Composed,
    ) -> Result<(), Fault> {
        let Composed {
            mode,
            read,
            write,
            op,
            extra,
            page_check,
        } = instruction;
        let effective = mode.resolve(&self.regs, bus, clock, page_check)?;
        clock.cycles(mode.cycles(effective.crossed));

        let value = read.read(&self.regs, bus, clock, effective.address)?;
        clock.cycles(read.cycles());

        let result = op.apply(&mut self.regs, value);
        clock.cycles(u64::from(extra) + write.cycles());
        write.write(&mut self.regs, bus, clock, effective.address, result)?;

        self.regs.advance_pc(mode.size() + 1);
        Ok(())
    }

    fn implied(&mut self, clock: &mut Clock, src: Register, dst: Register, op: Op) {
        clock.cycles(1);
        let value = self.read_register(src);
        let result = op.apply(&mut self.regs, value);
        self.write_register(dst, result);
        clock.cycles(1);
        self.regs.advance_pc(1);
    }

    fn brk<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault> {
        clock.cycles(1);
        self.regs.advance_pc(1);

        clock.cycles(1);
        let lo = bus.read(clock, BREAK_VECTOR)?;

        clock.cycles(1);
        self.push(bus, clock, self.regs.pch())?;
        self.regs.advance_pc(1);

        clock.cycles(1);
        self.push(bus, clock, self.regs.pcl())?;

        clock.cycles(1);
        self.push(bus, clock, self.regs.p.with_break())?;
        self.regs.p.clear(flags::B);
        self.regs.p.set(flags::I);

        clock.cycles(1);
        let hi = bus.read(clock, BREAK_VECTOR + 1)?;

        clock.cycles(1);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        Ok(())
    }

    fn jsr<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault> {
        clock.cycles(1);
        self.regs.advance_pc(1);

        clock.cycles(1);
        let lo = bus.read(clock, self.regs.pc)?;

        // PC now holds the address of the last operand byte, which is what
        // gets pushed.
        clock.cycles(1);
        self.regs.advance_pc(1);
        self.push(bus, clock, self.regs.pch())?;

        clock.cycles(1);
        self.push(bus, clock, self.regs.pcl())?;

        clock.cycles(1);
        let hi = bus.read(clock, self.regs.pc)?;

        clock.cycles(1);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        Ok(())
    }

    fn rts<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault> {
        clock.cycles(1);
        self.regs.advance_pc(1);

        clock.cycles(2);
        let lo = self.pull(bus, clock)?;
        self.regs.set_pcl(lo);

        clock.cycles(1);
        let hi = self.pull(bus, clock)?;
        self.regs.set_pch(hi);

        clock.cycles(1);
        bus.read(clock, self.regs.pc)?;

        clock.cycles(1);
        self.regs.advance_pc(1);
        Ok(())
    }

    fn rti<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault> {
        clock.cycles(1);
        self.regs.advance_pc(1);

        clock.cycles(1);
        self.regs.p.0 = self.pull(bus, clock)?;

        clock.cycles(1);
        let lo = self.pull(bus, clock)?;
        self.regs.set_pcl(lo);

        clock.cycles(1);
        let hi = self.pull(bus, clock)?;
        self.regs.set_pch(hi);

        clock.cycles(1);
        bus.read(clock, self.regs.pc)?;

        clock.cycles(1);
        Ok(())
    }

    fn branch<B: Bus>(
        &mut self,
        bus: &mut B,
        clock: &mut Clock,
        mask: u8,
        condition: u8,
    ) -> Result<(), Fault> {
        clock.cycles(1);
        if self.regs.p.bits() & mask == condition {
            let origin = self.regs.pc;
            let delta = bus.read(clock, origin.wrapping_add(1))? as i8;
            self.regs.pc = origin.wrapping_add_signed(i16::from(delta));
            if crosses_page(origin.wrapping_add(2), self.regs.pc.wrapping_add(2)) {
                clock.cycles(1);
            }
            clock.cycles(1);
        }
        self.regs.advance_pc(2);
        clock.cycles(1);
        Ok(())
    }

    fn jump<B: Bus>(
        &mut self,
        bus: &mut B,
        clock: &mut Clock,
        mode: AddressingMode,
    ) -> Result<(), Fault> {
        clock.cycles(1);
        let effective = mode.resolve(&self.regs, bus, clock, false)?;
        clock.cycles(mode.base_cycles());
        self.regs.pc = effective.address;
        Ok(())
    }

    fn php<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault> {
        clock.cycles(1);
        self.regs.advance_pc(1);

        clock.cycles(1);
        self.regs.p.set(flags::B | flags::U);
        self.push(bus, clock, self.regs.p.bits())?;

        clock.cycles(1);
        Ok(())
    }

    fn plp<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault> {
        clock.cycles(1);
        self.regs.advance_pc(1);

        clock.cycles(1);
        bus.read_sp(clock, self.regs.s)?;

        clock.cycles(1);
        self.regs.p.0 = self.pull(bus, clock)?;

        clock.cycles(1);
        Ok(())
    }

    fn pha<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault> {
        clock.cycles(1);
        self.regs.advance_pc(1);

        clock.cycles(1);
        self.push(bus, clock, self.regs.a)?;

        clock.cycles(1);
        Ok(())
    }

    fn pla<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault> {
        clock.cycles(1);
        self.regs.advance_pc(1);

        clock.cycles(1);
        bus.read_sp(clock, self.regs.s)?;

        clock.cycles(1);
        self.regs.a = self.pull(bus, clock)?;
        self.regs.p.update_nz(self.regs.a);

        clock.cycles(1);
        Ok(())
    }
}

impl Cpu for Mos6502 {
    type Registers = Registers;

    fn step<B: Bus>(&mut self, bus: &mut B, clock: &mut Clock) -> Result<(), Fault> {
        let pc = self.regs.pc;
        let opcode = bus.read(clock, pc)?;

        match INSTRUCTIONS[opcode as usize] {
            Instruction::ReadWrite(composed) => self.read_write(bus, clock, composed),
            Instruction::Implied { src, dst, op } => {
                self.implied(clock, src, dst, op);
                Ok(())
            }
            Instruction::Break => self.brk(bus, clock),
            Instruction::JumpSubroutine => self.jsr(bus, clock),
            Instruction::ReturnFromSubroutine => self.rts(bus, clock),
            Instruction::ReturnFromInterrupt => self.rti(bus, clock),
            Instruction::Branch { mask, condition } => self.branch(bus, clock, mask, condition),
            Instruction::Jump(mode) => self.jump(bus, clock, mode),
            Instruction::PushStatus => self.php(bus, clock),
            Instruction::PullStatus => self.plp(bus, clock),
            Instruction::PushAccumulator => self.pha(bus, clock),
            Instruction::PullAccumulator => self.pla(bus, clock),
            Instruction::Illegal => Err(Fault::IllegalOpcode { opcode, pc }),
        }
    }

    fn reset<B: Bus>(&mut self, bus: &mut B, clock: &Clock) -> Result<(), Fault> {
        self.regs.pc = bus.read16(clock, RESET_VECTOR)?;
        Ok(())
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn run(program: &[u8]) -> (Mos6502, SimpleBus, Clock) {
        let mut cpu = Mos6502::new();
        let mut bus = SimpleBus::new();
        let mut clock = Clock::default();
        bus.load(0x0000, program);
        cpu.step(&mut bus, &mut clock).unwrap();
        (cpu, bus, clock)
    }

    #[test]
    fn lda_immediate() {
        let (cpu, _, clock) = run(&[0xA9, 0x42]);
        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.pc, 0x0002);
        assert_eq!(clock.now(), 2 * 3);
    }

    #[test]
    fn sta_zeropage() {
        let mut cpu = Mos6502::new();
        let mut bus = SimpleBus::new();
        let mut clock = Clock::default();
        cpu.regs.a = 0x55;
        bus.load(0x0000, &[0x85, 0x10]);
        cpu.step(&mut bus, &mut clock).unwrap();
        assert_eq!(bus.peek(0x0010), 0x55);
        assert_eq!(clock.now(), 3 * 3);
    }

    #[test]
    fn jmp_absolute() {
        let (cpu, _, clock) = run(&[0x4C, 0x34, 0x12]);
        assert_eq!(cpu.regs.pc, 0x1234);
        assert_eq!(clock.now(), 3 * 3);
    }

    #[test]
    fn illegal_opcode_faults() {
        let mut cpu = Mos6502::new();
        let mut bus = SimpleBus::new();
        let mut clock = Clock::default();
        bus.load(0x0000, &[0x02]);
        assert_eq!(
            cpu.step(&mut bus, &mut clock),
            Err(Fault::IllegalOpcode {
                opcode: 0x02,
                pc: 0x0000
            })
        );
    }

    #[test]
    fn reset_loads_vector() {
        let mut cpu = Mos6502::new();
        let mut bus = SimpleBus::new();
        bus.load(0xFFFC, &[0x00, 0xF0]);
        cpu.reset(&mut bus, &Clock::default()).unwrap();
        assert_eq!(cpu.pc(), 0xF000);
    }
}
