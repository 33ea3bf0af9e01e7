//! Instruction handlers. Operands arrive as resolved effective addresses; flags follow the
//! [6502 reference](https://www.nesdev.org/wiki/Instruction_reference). Decimal mode is stored
//! in P but ignored by ADC/SBC, as on the 2A03.

use crate::bus::Bus;
use crate::cpu::addressing::ACCUMULATOR;
use crate::cpu::cpu::{CPU, IRQ_VECTOR};
use crate::cpu::flags::{
    FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE, FLAG_OVERFLOW, FLAG_ZERO,
    status_for_push, status_from_pull,
};
use crate::cpu::table::{AddressingMode, Mnemonic};

impl<B: Bus> CPU<B> {
    pub(crate) fn execute(&mut self, mnemonic: Mnemonic, addr: u32) {
        use Mnemonic::*;

        match mnemonic {
            // Load / store
            LDA => {
                self.a = self.read_operand(addr);
                self.set_zn(self.a);
            }
            LDX => {
                self.x = self.read_operand(addr);
                self.set_zn(self.x);
            }
            LDY => {
                self.y = self.read_operand(addr);
                self.set_zn(self.y);
            }
            STA => self.write_operand(addr, self.a),
            STX => self.write_operand(addr, self.x),
            STY => self.write_operand(addr, self.y),

            // Transfers
            TAX => {
                self.x = self.a;
                self.set_zn(self.x);
            }
            TAY => {
                self.y = self.a;
                self.set_zn(self.y);
            }
            TXA => {
                self.a = self.x;
                self.set_zn(self.a);
            }
            TYA => {
                self.a = self.y;
                self.set_zn(self.a);
            }
            TSX => {
                self.x = self.sp;
                self.set_zn(self.x);
            }
            TXS => self.sp = self.x,

            // Logical
            AND => {
                self.a &= self.read_operand(addr);
                self.set_zn(self.a);
            }
            ORA => {
                self.a |= self.read_operand(addr);
                self.set_zn(self.a);
            }
            EOR => {
                self.a ^= self.read_operand(addr);
                self.set_zn(self.a);
            }
            BIT => {
                let m = self.read_operand(addr);
                self.set_flag(FLAG_ZERO, (self.a & m) == 0);
                self.set_flag(FLAG_OVERFLOW, m & 0x40 != 0);
                self.set_flag(FLAG_NEGATIVE, m & 0x80 != 0);
            }

            // Arithmetic
            ADC => {
                let m = self.read_operand(addr);
                self.add_with_carry(m);
            }
            SBC => {
                let m = self.read_operand(addr);
                self.add_with_carry(!m);
            }
            CMP => self.compare(self.a, addr),
            CPX => self.compare(self.x, addr),
            CPY => self.compare(self.y, addr),

            // Increments / decrements
            INC => {
                let v = self.read_operand(addr).wrapping_add(1);
                self.write_operand(addr, v);
                self.set_zn(v);
            }
            DEC => {
                let v = self.read_operand(addr).wrapping_sub(1);
                self.write_operand(addr, v);
                self.set_zn(v);
            }
            INX => {
                self.x = self.x.wrapping_add(1);
                self.set_zn(self.x);
            }
            INY => {
                self.y = self.y.wrapping_add(1);
                self.set_zn(self.y);
            }
            DEX => {
                self.x = self.x.wrapping_sub(1);
                self.set_zn(self.x);
            }
            DEY => {
                self.y = self.y.wrapping_sub(1);
                self.set_zn(self.y);
            }

            // Shifts / rotates
            ASL => self.shift(addr, |v, _| (v << 1, v & 0x80 != 0)),
            LSR => self.shift(addr, |v, _| (v >> 1, v & 0x01 != 0)),
            ROL => self.shift(addr, |v, c| ((v << 1) | c as u8, v & 0x80 != 0)),
            ROR => self.shift(addr, |v, c| ((v >> 1) | ((c as u8) << 7), v & 0x01 != 0)),

            // Branches
            BCC => self.branch(addr, !self.flag(FLAG_CARRY)),
            BCS => self.branch(addr, self.flag(FLAG_CARRY)),
            BNE => self.branch(addr, !self.flag(FLAG_ZERO)),
            BEQ => self.branch(addr, self.flag(FLAG_ZERO)),
            BPL => self.branch(addr, !self.flag(FLAG_NEGATIVE)),
            BMI => self.branch(addr, self.flag(FLAG_NEGATIVE)),
            BVC => self.branch(addr, !self.flag(FLAG_OVERFLOW)),
            BVS => self.branch(addr, self.flag(FLAG_OVERFLOW)),

            // Jumps / subroutines
            JMP => self.pc = addr as u16,
            JSR => {
                // PC is past the operand; push return address - 1
                self.push_word(self.pc.wrapping_sub(1));
                self.pc = addr as u16;
            }
            RTS => self.pc = self.pull_word().wrapping_add(1),
            BRK => {
                // Padding byte after BRK is skipped on return
                self.push_word(self.pc.wrapping_add(1));
                self.push(status_for_push(self.status, true));
                self.status |= FLAG_INTERRUPT_DISABLE;
                self.pc = self.read_word(IRQ_VECTOR);
            }
            RTI => {
                self.status = status_from_pull(self.pull());
                self.pc = self.pull_word();
            }

            // Stack
            PHA => self.push(self.a),
            PHP => self.push(status_for_push(self.status, true)),
            PLA => {
                self.a = self.pull();
                self.set_zn(self.a);
            }
            PLP => self.status = status_from_pull(self.pull()),

            // Flags
            CLC => self.set_flag(FLAG_CARRY, false),
            SEC => self.set_flag(FLAG_CARRY, true),
            CLI => self.set_flag(FLAG_INTERRUPT_DISABLE, false),
            SEI => self.set_flag(FLAG_INTERRUPT_DISABLE, true),
            CLD => self.set_flag(FLAG_DECIMAL, false),
            SED => self.set_flag(FLAG_DECIMAL, true),
            CLV => self.set_flag(FLAG_OVERFLOW, false),

            NOP => {}
        }
    }

    fn read_operand(&mut self, addr: u32) -> u8 {
        if addr == ACCUMULATOR {
            self.a
        } else {
            self.bus.read(addr as u16)
        }
    }

    fn write_operand(&mut self, addr: u32, value: u8) {
        if addr == ACCUMULATOR {
            self.a = value;
        } else {
            self.bus.write(addr as u16, value);
        }
    }

    pub(crate) fn flag(&self, flag: u8) -> bool {
        self.status & flag != 0
    }

    pub(crate) fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn set_zn(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }

    /// 9-bit A + M + C. SBC passes the one's complement of M.
    fn add_with_carry(&mut self, m: u8) {
        let sum = self.a as u16 + m as u16 + self.flag(FLAG_CARRY) as u16;
        let result = sum as u8;
        self.set_flag(FLAG_CARRY, sum > 0xFF);
        // Both inputs share a sign that the result lacks
        self.set_flag(FLAG_OVERFLOW, (self.a ^ result) & (m ^ result) & 0x80 != 0);
        self.a = result;
        self.set_zn(result);
    }

    fn compare(&mut self, register: u8, addr: u32) {
        let m = self.read_operand(addr);
        let result = register.wrapping_sub(m);
        self.set_flag(FLAG_CARRY, register >= m);
        self.set_flag(FLAG_ZERO, register == m);
        self.set_flag(FLAG_NEGATIVE, result & 0x80 != 0);
    }

    /// Read-modify-write shift. `op` gets the operand and incoming carry, and returns the
    /// result and outgoing carry.
    fn shift(&mut self, addr: u32, op: impl FnOnce(u8, bool) -> (u8, bool)) {
        let value = self.read_operand(addr);
        let (result, carry) = op(value, self.flag(FLAG_CARRY));
        self.write_operand(addr, result);
        self.set_flag(FLAG_CARRY, carry);
        self.set_zn(result);
    }

    /// PC always moves past the branch; it is replaced by the target only when taken.
    /// Taken costs +1, +2 when the target is on another page.
    fn branch(&mut self, target: u32, taken: bool) {
        self.pc = self.pc.wrapping_add(AddressingMode::Relative.width());
        if taken {
            let target = target as u16;
            self.extra_cycles += if self.pc & 0xFF00 != target & 0xFF00 { 2 } else { 1 };
            self.pc = target;
        }
    }
}
