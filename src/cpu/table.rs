//! Opcode dispatch table for the 151 official 6502 opcodes.
//!
//! `OPCODES[op]` pairs an instruction with its addressing mode, base cycle count, and whether a
//! page crossing during address resolution costs an extra cycle. Unofficial opcodes are `None`
//! and surface as `CpuError::UnimplementedOpcode`. Cycle counts follow the
//! [6502 instruction reference](https://www.nesdev.org/obelisk-6502-guide/reference.html).

/// The 56 official instructions.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS, CLC,
    CLD, CLI, CLV, CMP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY, JMP,
    JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA, PHP, PLA, PLP, ROL, ROR, RTI,
    RTS, SBC, SEC, SED, SEI, STA, STX, STY, TAX, TAY, TSX, TXA, TXS, TYA,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand (CLC, RTS, ...).
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// JMP ($nnnn) only.
    Indirect,
    /// ($nn,X)
    IndexedIndirect,
    /// ($nn),Y
    IndirectIndexed,
}

impl AddressingMode {
    /// Instruction width in bytes, opcode included.
    pub const fn width(self) -> u16 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 3,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Base cycles, before page-cross and branch penalties.
    pub cycles: u8,
    /// +1 cycle when the indexed address crosses a page.
    pub page_penalty: bool,
}

pub static OPCODES: [Option<Instruction>; 256] = build();

pub fn decode(opcode: u8) -> Option<Instruction> {
    OPCODES[opcode as usize]
}

const fn op(mnemonic: Mnemonic, mode: AddressingMode, cycles: u8) -> Option<Instruction> {
    Some(Instruction {
        mnemonic,
        mode,
        cycles,
        page_penalty: false,
    })
}

/// Read instruction whose indexed forms pay for page crossings.
const fn rd(mnemonic: Mnemonic, mode: AddressingMode, cycles: u8) -> Option<Instruction> {
    Some(Instruction {
        mnemonic,
        mode,
        cycles,
        page_penalty: true,
    })
}

const fn build() -> [Option<Instruction>; 256] {
    use AddressingMode::*;
    use Mnemonic::*;

    let mut t: [Option<Instruction>; 256] = [None; 256];

    t[0x69] = op(ADC, Immediate, 2);
    t[0x65] = op(ADC, ZeroPage, 3);
    t[0x75] = op(ADC, ZeroPageX, 4);
    t[0x6D] = op(ADC, Absolute, 4);
    t[0x7D] = rd(ADC, AbsoluteX, 4);
    t[0x79] = rd(ADC, AbsoluteY, 4);
    t[0x61] = op(ADC, IndexedIndirect, 6);
    t[0x71] = rd(ADC, IndirectIndexed, 5);

    t[0x29] = op(AND, Immediate, 2);
    t[0x25] = op(AND, ZeroPage, 3);
    t[0x35] = op(AND, ZeroPageX, 4);
    t[0x2D] = op(AND, Absolute, 4);
    t[0x3D] = rd(AND, AbsoluteX, 4);
    t[0x39] = rd(AND, AbsoluteY, 4);
    t[0x21] = op(AND, IndexedIndirect, 6);
    t[0x31] = rd(AND, IndirectIndexed, 5);

    t[0x0A] = op(ASL, Accumulator, 2);
    t[0x06] = op(ASL, ZeroPage, 5);
    t[0x16] = op(ASL, ZeroPageX, 6);
    t[0x0E] = op(ASL, Absolute, 6);
    t[0x1E] = op(ASL, AbsoluteX, 7);

    t[0x90] = op(BCC, Relative, 2);
    t[0xB0] = op(BCS, Relative, 2);
    t[0xF0] = op(BEQ, Relative, 2);
    t[0x30] = op(BMI, Relative, 2);
    t[0xD0] = op(BNE, Relative, 2);
    t[0x10] = op(BPL, Relative, 2);
    t[0x50] = op(BVC, Relative, 2);
    t[0x70] = op(BVS, Relative, 2);

    t[0x24] = op(BIT, ZeroPage, 3);
    t[0x2C] = op(BIT, Absolute, 4);

    t[0x00] = op(BRK, Implied, 7);

    t[0x18] = op(CLC, Implied, 2);
    t[0xD8] = op(CLD, Implied, 2);
    t[0x58] = op(CLI, Implied, 2);
    t[0xB8] = op(CLV, Implied, 2);

    t[0xC9] = op(CMP, Immediate, 2);
    t[0xC5] = op(CMP, ZeroPage, 3);
    t[0xD5] = op(CMP, ZeroPageX, 4);
    t[0xCD] = op(CMP, Absolute, 4);
    t[0xDD] = rd(CMP, AbsoluteX, 4);
    t[0xD9] = rd(CMP, AbsoluteY, 4);
    t[0xC1] = op(CMP, IndexedIndirect, 6);
    t[0xD1] = rd(CMP, IndirectIndexed, 5);

    t[0xE0] = op(CPX, Immediate, 2);
    t[0xE4] = op(CPX, ZeroPage, 3);
    t[0xEC] = op(CPX, Absolute, 4);

    t[0xC0] = op(CPY, Immediate, 2);
    t[0xC4] = op(CPY, ZeroPage, 3);
    t[0xCC] = op(CPY, Absolute, 4);

    t[0xC6] = op(DEC, ZeroPage, 5);
    t[0xD6] = op(DEC, ZeroPageX, 6);
    t[0xCE] = op(DEC, Absolute, 6);
    t[0xDE] = op(DEC, AbsoluteX, 7);

    t[0xCA] = op(DEX, Implied, 2);
    t[0x88] = op(DEY, Implied, 2);

    t[0x49] = op(EOR, Immediate, 2);
    t[0x45] = op(EOR, ZeroPage, 3);
    t[0x55] = op(EOR, ZeroPageX, 4);
    t[0x4D] = op(EOR, Absolute, 4);
    t[0x5D] = rd(EOR, AbsoluteX, 4);
    t[0x59] = rd(EOR, AbsoluteY, 4);
    t[0x41] = op(EOR, IndexedIndirect, 6);
    t[0x51] = rd(EOR, IndirectIndexed, 5);

    t[0xE6] = op(INC, ZeroPage, 5);
    t[0xF6] = op(INC, ZeroPageX, 6);
    t[0xEE] = op(INC, Absolute, 6);
    t[0xFE] = op(INC, AbsoluteX, 7);

    t[0xE8] = op(INX, Implied, 2);
    t[0xC8] = op(INY, Implied, 2);

    t[0x4C] = op(JMP, Absolute, 3);
    t[0x6C] = op(JMP, Indirect, 5);
    t[0x20] = op(JSR, Absolute, 6);

    t[0xA9] = op(LDA, Immediate, 2);
    t[0xA5] = op(LDA, ZeroPage, 3);
    t[0xB5] = op(LDA, ZeroPageX, 4);
    t[0xAD] = op(LDA, Absolute, 4);
    t[0xBD] = rd(LDA, AbsoluteX, 4);
    t[0xB9] = rd(LDA, AbsoluteY, 4);
    t[0xA1] = op(LDA, IndexedIndirect, 6);
    t[0xB1] = rd(LDA, IndirectIndexed, 5);

    t[0xA2] = op(LDX, Immediate, 2);
    t[0xA6] = op(LDX, ZeroPage, 3);
    t[0xB6] = op(LDX, ZeroPageY, 4);
    t[0xAE] = op(LDX, Absolute, 4);
    t[0xBE] = rd(LDX, AbsoluteY, 4);

    t[0xA0] = op(LDY, Immediate, 2);
    t[0xA4] = op(LDY, ZeroPage, 3);
    t[0xB4] = op(LDY, ZeroPageX, 4);
    t[0xAC] = op(LDY, Absolute, 4);
    t[0xBC] = rd(LDY, AbsoluteX, 4);

    t[0x4A] = op(LSR, Accumulator, 2);
    t[0x46] = op(LSR, ZeroPage, 5);
    t[0x56] = op(LSR, ZeroPageX, 6);
    t[0x4E] = op(LSR, Absolute, 6);
    t[0x5E] = op(LSR, AbsoluteX, 7);

    t[0xEA] = op(NOP, Implied, 2);

    t[0x09] = op(ORA, Immediate, 2);
    t[0x05] = op(ORA, ZeroPage, 3);
    t[0x15] = op(ORA, ZeroPageX, 4);
    t[0x0D] = op(ORA, Absolute, 4);
    t[0x1D] = rd(ORA, AbsoluteX, 4);
    t[0x19] = rd(ORA, AbsoluteY, 4);
    t[0x01] = op(ORA, IndexedIndirect, 6);
    t[0x11] = rd(ORA, IndirectIndexed, 5);

    t[0x48] = op(PHA, Implied, 3);
    t[0x08] = op(PHP, Implied, 3);
    t[0x68] = op(PLA, Implied, 4);
    t[0x28] = op(PLP, Implied, 4);

    t[0x2A] = op(ROL, Accumulator, 2);
    t[0x26] = op(ROL, ZeroPage, 5);
    t[0x36] = op(ROL, ZeroPageX, 6);
    t[0x2E] = op(ROL, Absolute, 6);
    t[0x3E] = op(ROL, AbsoluteX, 7);

    t[0x6A] = op(ROR, Accumulator, 2);
    t[0x66] = op(ROR, ZeroPage, 5);
    t[0x76] = op(ROR, ZeroPageX, 6);
    t[0x6E] = op(ROR, Absolute, 6);
    t[0x7E] = op(ROR, AbsoluteX, 7);

    t[0x40] = op(RTI, Implied, 6);
    t[0x60] = op(RTS, Implied, 6);

    t[0xE9] = op(SBC, Immediate, 2);
    t[0xE5] = op(SBC, ZeroPage, 3);
    t[0xF5] = op(SBC, ZeroPageX, 4);
    t[0xED] = op(SBC, Absolute, 4);
    t[0xFD] = rd(SBC, AbsoluteX, 4);
    t[0xF9] = rd(SBC, AbsoluteY, 4);
    t[0xE1] = op(SBC, IndexedIndirect, 6);
    t[0xF1] = rd(SBC, IndirectIndexed, 5);

    t[0x38] = op(SEC, Implied, 2);
    t[0xF8] = op(SED, Implied, 2);
    t[0x78] = op(SEI, Implied, 2);

    // Stores always take the indexed cycle; no page penalty
    t[0x85] = op(STA, ZeroPage, 3);
    t[0x95] = op(STA, ZeroPageX, 4);
    t[0x8D] = op(STA, Absolute, 4);
    t[0x9D] = op(STA, AbsoluteX, 5);
    t[0x99] = op(STA, AbsoluteY, 5);
    t[0x81] = op(STA, IndexedIndirect, 6);
    t[0x91] = op(STA, IndirectIndexed, 6);

    t[0x86] = op(STX, ZeroPage, 3);
    t[0x96] = op(STX, ZeroPageY, 4);
    t[0x8E] = op(STX, Absolute, 4);

    t[0x84] = op(STY, ZeroPage, 3);
    t[0x94] = op(STY, ZeroPageX, 4);
    t[0x8C] = op(STY, Absolute, 4);

    t[0xAA] = op(TAX, Implied, 2);
    t[0xA8] = op(TAY, Implied, 2);
    t[0xBA] = op(TSX, Implied, 2);
    t[0x8A] = op(TXA, Implied, 2);
    t[0x9A] = op(TXS, Implied, 2);
    t[0x98] = op(TYA, Implied, 2);

    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_opcode_is_defined_or_illegal() {
        let defined = OPCODES.iter().filter(|e| e.is_some()).count();
        assert_eq!(defined, 151);
        let illegal: Vec<u8> = (0..=255u8).filter(|&op| decode(op).is_none()).collect();
        assert_eq!(illegal.len(), 105);
        // A few well-known unofficial opcodes
        for op in [0x02u8, 0x1A, 0x80, 0xA7, 0xEB, 0xFF] {
            assert!(illegal.contains(&op), "{op:02X} should be illegal");
        }
    }

    #[test]
    fn all_56_instructions_present() {
        let mnemonics: HashSet<Mnemonic> = OPCODES.iter().flatten().map(|i| i.mnemonic).collect();
        assert_eq!(mnemonics.len(), 56);
    }

    #[test]
    fn all_addressing_modes_used() {
        let modes: HashSet<AddressingMode> = OPCODES.iter().flatten().map(|i| i.mode).collect();
        assert_eq!(modes.len(), 13);
    }

    #[test]
    fn spot_check_entries() {
        assert_eq!(
            decode(0x6C),
            Some(Instruction {
                mnemonic: Mnemonic::JMP,
                mode: AddressingMode::Indirect,
                cycles: 5,
                page_penalty: false
            })
        );
        let lda = decode(0xB1).unwrap();
        assert_eq!((lda.mnemonic, lda.mode, lda.cycles), (Mnemonic::LDA, AddressingMode::IndirectIndexed, 5));
        assert!(lda.page_penalty);
        assert!(!decode(0x91).unwrap().page_penalty);
    }

    #[test]
    fn instruction_widths() {
        assert_eq!(AddressingMode::Implied.width(), 1);
        assert_eq!(AddressingMode::Relative.width(), 2);
        assert_eq!(AddressingMode::IndirectIndexed.width(), 2);
        assert_eq!(AddressingMode::Indirect.width(), 3);
    }
}
