use std::fmt;

use log::{debug, info, trace};

use crate::{
    bus::Bus,
    cpu::flags::{FLAG_INTERRUPT_DISABLE, STATUS_POWER_ON, status_for_push},
    cpu::table,
};

pub const STACK_BASE: u16 = 0x0100;
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles taken by interrupt entry (NMI, IRQ, BRK).
const INTERRUPT_CYCLES: u64 = 7;
/// Cycles of the reset sequence, as counted by reference traces that start at CYC:7.
const RESET_CYCLES: u64 = 7;

/// Point-in-time copy of the register file, for debug views and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub pc: u16,
    pub sp: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub opcode: u8,
    pub cycles: u64,
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X}  {:02X}        A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc, self.opcode, self.a, self.x, self.y, self.p, self.sp, self.cycles
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuError {
    /// Opcode with no handler. PC still points at it; nothing else changed.
    UnimplementedOpcode {
        opcode: u8,
        pc: u16,
        registers: Registers,
    },
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuError::UnimplementedOpcode {
                opcode,
                pc,
                registers,
            } => write!(
                f,
                "unimplemented opcode ${opcode:02X} at ${pc:04X} [{registers}]"
            ),
        }
    }
}

impl std::error::Error for CpuError {}

/// 6502 core. Every memory access goes through `bus`.
pub struct CPU<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    /// Monotonic; starts at 0 and is never reset.
    pub cycles: u64,
    /// Opcode of the last executed instruction.
    pub opcode: u8,
    /// PC of the last executed instruction.
    pub prev_pc: u16,
    pub bus: B,
    /// Set by resolvers when indexing crosses a page.
    pub(crate) page_crossed: bool,
    /// Branch-taken penalty for the instruction in flight.
    pub(crate) extra_cycles: u64,
    trace_enabled: bool,
}

impl<B: Bus> CPU<B> {
    /// Power-on state. PC stays 0 until [`CPU::reset`] loads the reset vector.
    pub fn new(bus: B) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: STATUS_POWER_ON,
            cycles: 0,
            opcode: 0,
            prev_pc: 0,
            bus,
            page_crossed: false,
            extra_cycles: 0,
            trace_enabled: false,
        }
    }

    /// Load PC from $FFFC/$FFFD, SP = $FD, P = I|U, A = X = Y = 0. The cycle counter is kept.
    pub fn reset(&mut self) {
        self.pc = self.read_word(RESET_VECTOR);
        self.sp = 0xFD;
        self.status = STATUS_POWER_ON;
        self.a = 0;
        self.x = 0;
        self.y = 0;
        info!(pc = self.pc; "cpu reset");
    }

    /// Reset, then start at `entry` instead of the reset vector. Charges the 7-cycle reset
    /// sequence so a trace lines up with reference logs such as nestest.log.
    pub fn reset_to(&mut self, entry: u16) {
        self.reset();
        self.pc = entry;
        self.cycles += RESET_CYCLES;
        self.bus.tick(RESET_CYCLES as usize);
        info!(pc = self.pc; "cpu entry override");
    }

    /// Log a nestest-style line for every instruction.
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace_enabled
    }

    /// Execute one instruction. A pending NMI takes the whole step instead: its 7-cycle entry
    /// sequence runs and the handler's first instruction waits for the next tick.
    ///
    /// An opcode without a handler returns [`CpuError::UnimplementedOpcode`] with no state
    /// changed; PC stays on the opcode.
    pub fn tick(&mut self) -> Result<(), CpuError> {
        if self.bus.poll_nmi() {
            self.nmi();
            return Ok(());
        }

        let pc = self.pc;
        let opcode = self.bus.read(pc);
        let Some(instruction) = table::decode(opcode) else {
            let mut registers = self.registers();
            registers.opcode = opcode;
            return Err(CpuError::UnimplementedOpcode {
                opcode,
                pc,
                registers,
            });
        };

        self.prev_pc = pc;
        self.opcode = opcode;
        trace!(
            pc, opcode, a = self.a, x = self.x, y = self.y, p = self.status, sp = self.sp,
            cycles = self.cycles, mnemonic:? = instruction.mnemonic;
            "tick"
        );
        if self.trace_enabled {
            debug!("{}", self.registers());
        }

        self.page_crossed = false;
        self.extra_cycles = 0;
        let addr = self.resolve(instruction.mode);
        self.execute(instruction.mnemonic, addr);

        let mut cycles = instruction.cycles as u64 + self.extra_cycles;
        if instruction.page_penalty && self.page_crossed {
            cycles += 1;
        }
        self.cycles += cycles;
        self.bus.tick(cycles as usize);
        Ok(())
    }

    /// Step past an unimplemented opcode without executing anything.
    pub fn skip_opcode(&mut self) {
        self.pc = self.pc.wrapping_add(1);
    }

    /// Treat an unimplemented opcode as a 1-byte, 2-cycle NOP.
    pub fn substitute_nop(&mut self) {
        self.pc = self.pc.wrapping_add(1);
        self.cycles += 2;
        self.bus.tick(2);
    }

    /// Non-maskable interrupt: push PC and P (B clear), set I, jump through $FFFA.
    pub fn nmi(&mut self) {
        self.interrupt(NMI_VECTOR);
        debug!(pc = self.pc; "nmi");
    }

    /// Maskable interrupt. Ignored while I is set; returns whether it was taken.
    pub fn irq(&mut self) -> bool {
        if self.status & FLAG_INTERRUPT_DISABLE != 0 {
            return false;
        }
        self.interrupt(IRQ_VECTOR);
        true
    }

    fn interrupt(&mut self, vector: u16) {
        self.push_word(self.pc);
        self.push(status_for_push(self.status, false));
        self.status |= FLAG_INTERRUPT_DISABLE;
        self.pc = self.read_word(vector);
        self.cycles += INTERRUPT_CYCLES;
        self.bus.tick(INTERRUPT_CYCLES as usize);
    }

    pub fn registers(&self) -> Registers {
        Registers {
            pc: self.pc,
            sp: self.sp,
            a: self.a,
            x: self.x,
            y: self.y,
            p: self.status,
            opcode: self.opcode,
            cycles: self.cycles,
        }
    }

    /// Little-endian word at `addr` and `addr + 1`.
    pub(crate) fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.bus.read(addr) as u16;
        let hi = self.bus.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub(crate) fn push(&mut self, value: u8) {
        self.bus.write(STACK_BASE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.bus.read(STACK_BASE | self.sp as u16)
    }

    /// High byte first, so the low byte ends up at the lower address.
    pub(crate) fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    pub(crate) fn pull_word(&mut self) -> u16 {
        let lo = self.pull() as u16;
        let hi = self.pull() as u16;
        (hi << 8) | lo
    }
}
