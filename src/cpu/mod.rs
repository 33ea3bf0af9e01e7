//! 6502 CPU emulation for the NES.
//!
//! Table-driven: [`table::OPCODES`] maps each opcode byte to an instruction and addressing mode,
//! [`addressing`] resolves operands, [`instructions`] executes them. The 151 official opcodes
//! are implemented; anything else is reported to the caller as `CpuError::UnimplementedOpcode`.

pub mod addressing;
pub mod cpu;
pub mod flags;
pub mod instructions;
pub mod table;


pub use cpu::{CPU, CpuError, Registers};
