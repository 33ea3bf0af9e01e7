//! [Addressing mode](https://www.nesdev.org/wiki/CPU_addressing_modes) resolvers.
//!
//! Resolvers read operands with PC on the opcode byte and return the effective address as a
//! `u32`; [`CPU::resolve`] then moves PC past the instruction by [`AddressingMode::width`].
//! Values above `$FFFF` are sentinels: [`ACCUMULATOR`] for instructions that operate on A,
//! [`IMPLIED`] for instructions with no operand. Relative is the exception: it returns the
//! branch target and leaves PC alone for the branch to advance.

use crate::bus::Bus;
use crate::cpu::cpu::CPU;
use crate::cpu::table::AddressingMode;

/// Operand is the accumulator.
pub const ACCUMULATOR: u32 = 0x1_0000;
/// No operand.
pub const IMPLIED: u32 = 0x2_0000;

fn crosses_page(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

impl<B: Bus> CPU<B> {
    pub(crate) fn resolve(&mut self, mode: AddressingMode) -> u32 {
        let addr = match mode {
            AddressingMode::Implied => IMPLIED,
            AddressingMode::Accumulator => ACCUMULATOR,
            AddressingMode::Immediate => self.immediate(),
            AddressingMode::ZeroPage => self.zero_page(),
            AddressingMode::ZeroPageX => self.zero_page_indexed(self.x),
            AddressingMode::ZeroPageY => self.zero_page_indexed(self.y),
            AddressingMode::Relative => return self.relative(),
            AddressingMode::Absolute => self.absolute(),
            AddressingMode::AbsoluteX => self.absolute_indexed(self.x),
            AddressingMode::AbsoluteY => self.absolute_indexed(self.y),
            AddressingMode::Indirect => self.indirect(),
            AddressingMode::IndexedIndirect => self.indexed_indirect(),
            AddressingMode::IndirectIndexed => self.indirect_indexed(),
        };
        self.pc = self.pc.wrapping_add(mode.width());
        addr
    }

    fn operand_byte(&mut self) -> u8 {
        self.bus.read(self.pc.wrapping_add(1))
    }

    fn operand_word(&mut self) -> u16 {
        self.read_word(self.pc.wrapping_add(1))
    }

    fn immediate(&self) -> u32 {
        self.pc.wrapping_add(1) as u32
    }

    fn zero_page(&mut self) -> u32 {
        self.operand_byte() as u32
    }

    /// Index wraps inside page zero.
    fn zero_page_indexed(&mut self, index: u8) -> u32 {
        self.operand_byte().wrapping_add(index) as u32
    }

    /// Target is relative to the following instruction; the branch handler advances PC.
    fn relative(&mut self) -> u32 {
        let offset = self.operand_byte() as i8;
        self.pc.wrapping_add(2).wrapping_add(offset as u16) as u32
    }

    fn absolute(&mut self) -> u32 {
        self.operand_word() as u32
    }

    fn absolute_indexed(&mut self, index: u8) -> u32 {
        let base = self.operand_word();
        let addr = base.wrapping_add(index as u16);
        self.page_crossed = crosses_page(base, addr);
        addr as u32
    }

    /// JMP ($xxFF) fetches the high byte from $xx00, not the next page.
    fn indirect(&mut self) -> u32 {
        let ptr = self.operand_word();
        let lo = self.bus.read(ptr) as u16;
        let hi = self.bus.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)) as u16;
        ((hi << 8) | lo) as u32
    }

    fn zero_page_pointer(&mut self, zp: u8) -> u16 {
        let lo = self.bus.read(zp as u16) as u16;
        let hi = self.bus.read(zp.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    /// ($nn,X): X is added to the pointer address before dereferencing.
    fn indexed_indirect(&mut self) -> u32 {
        let zp = self.operand_byte().wrapping_add(self.x);
        self.zero_page_pointer(zp) as u32
    }

    /// ($nn),Y: Y is added to the dereferenced pointer.
    fn indirect_indexed(&mut self) -> u32 {
        let zp = self.operand_byte();
        let base = self.zero_page_pointer(zp);
        let addr = base.wrapping_add(self.y as u16);
        self.page_crossed = crosses_page(base, addr);
        addr as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::tests::{TestBus, new_cpu};

    fn cpu_at(pc: u16, bytes: &[u8]) -> CPU<TestBus> {
        let mut bus = TestBus::new();
        bus.load(pc, bytes);
        let mut cpu = new_cpu(bus);
        cpu.pc = pc;
        cpu
    }

    #[test]
    fn implied_and_accumulator_advance_one() {
        let mut cpu = cpu_at(0x8000, &[0xEA]);
        assert_eq!(cpu.resolve(AddressingMode::Implied), IMPLIED);
        assert_eq!(cpu.pc, 0x8001);
        assert_eq!(cpu.resolve(AddressingMode::Accumulator), ACCUMULATOR);
        assert_eq!(cpu.pc, 0x8002);
    }

    #[test]
    fn pc_moves_by_mode_width() {
        use AddressingMode::*;
        for mode in [
            Implied, Accumulator, Immediate, ZeroPage, ZeroPageX, ZeroPageY, Absolute, AbsoluteX,
            AbsoluteY, Indirect, IndexedIndirect, IndirectIndexed,
        ] {
            let mut cpu = cpu_at(0x8000, &[0xEA, 0x10, 0x20]);
            cpu.resolve(mode);
            assert_eq!(cpu.pc, 0x8000 + mode.width(), "{mode:?}");
        }
    }

    #[test]
    fn immediate_points_at_operand() {
        let mut cpu = cpu_at(0x8000, &[0xA9, 0x42]);
        assert_eq!(cpu.resolve(AddressingMode::Immediate), 0x8001);
        assert_eq!(cpu.pc, 0x8002);
    }

    #[test]
    fn zero_page_x_wraps_in_page_zero() {
        let mut cpu = cpu_at(0x8000, &[0xB5, 0xF0]);
        cpu.x = 0x20;
        assert_eq!(cpu.resolve(AddressingMode::ZeroPageX), 0x0010);
        assert_eq!(cpu.pc, 0x8002);
    }

    #[test]
    fn zero_page_y_wraps_in_page_zero() {
        let mut cpu = cpu_at(0x8000, &[0xB6, 0xFF]);
        cpu.y = 0x02;
        assert_eq!(cpu.resolve(AddressingMode::ZeroPageY), 0x0001);
    }

    #[test]
    fn relative_does_not_move_pc() {
        let mut cpu = cpu_at(0x8010, &[0xD0, 0xFC]); // -4
        assert_eq!(cpu.resolve(AddressingMode::Relative), 0x800E);
        assert_eq!(cpu.pc, 0x8010);

        let mut cpu = cpu_at(0x8010, &[0xD0, 0x7F]);
        assert_eq!(cpu.resolve(AddressingMode::Relative), 0x8091);
    }

    #[test]
    fn absolute_x_flags_page_cross() {
        let mut cpu = cpu_at(0x8000, &[0xBD, 0xF0, 0x12]);
        cpu.x = 0x0F;
        assert_eq!(cpu.resolve(AddressingMode::AbsoluteX), 0x12FF);
        assert!(!cpu.page_crossed);
        assert_eq!(cpu.pc, 0x8003);

        let mut cpu = cpu_at(0x8000, &[0xBD, 0xF0, 0x12]);
        cpu.x = 0x10;
        assert_eq!(cpu.resolve(AddressingMode::AbsoluteX), 0x1300);
        assert!(cpu.page_crossed);
    }

    #[test]
    fn absolute_y_wraps_address_space() {
        let mut cpu = cpu_at(0x8000, &[0xB9, 0xFF, 0xFF]);
        cpu.y = 0x02;
        assert_eq!(cpu.resolve(AddressingMode::AbsoluteY), 0x0001);
        assert!(cpu.page_crossed);
    }

    #[test]
    fn indirect_reproduces_page_wrap_bug() {
        let mut cpu = cpu_at(0x8000, &[0x6C, 0xFF, 0x02]);
        cpu.bus.mem[0x02FF] = 0x34;
        cpu.bus.mem[0x0200] = 0x12;
        cpu.bus.mem[0x0300] = 0x99;
        assert_eq!(cpu.resolve(AddressingMode::Indirect), 0x1234);
        assert_eq!(cpu.pc, 0x8003);
    }

    #[test]
    fn indexed_indirect_wraps_pointer_in_zero_page() {
        let mut cpu = cpu_at(0x8000, &[0xA1, 0xFE]);
        cpu.x = 0x01;
        cpu.bus.mem[0x00FF] = 0x78;
        cpu.bus.mem[0x0000] = 0x56;
        assert_eq!(cpu.resolve(AddressingMode::IndexedIndirect), 0x5678);
        assert_eq!(cpu.pc, 0x8002);
    }

    #[test]
    fn indirect_indexed_adds_y_after_dereference() {
        let mut cpu = cpu_at(0x8000, &[0xB1, 0x10]);
        cpu.y = 0x10;
        cpu.bus.mem[0x0010] = 0xF8;
        cpu.bus.mem[0x0011] = 0x20;
        assert_eq!(cpu.resolve(AddressingMode::IndirectIndexed), 0x2108);
        assert!(cpu.page_crossed);
    }
}
