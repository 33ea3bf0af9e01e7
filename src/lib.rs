//! Fidelis: the hardware core of an NES (Nintendo Entertainment System) written in Rust.
//!
//! Implements the NES chipset pieces a program's correctness depends on, as documented on the
//! [NESdev Wiki](https://www.nesdev.org/wiki/NES_reference_guide): the Ricoh 2A03's 6502 core,
//! the CPU memory bus, iNES cartridges with their mappers, and the 2C02 PPU register/memory
//! interface.
//!
//! ## Modules (NESdev references)
//!
//! - **bus** – [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map): RAM, PPU registers,
//!   open-bus I/O window, cartridge; 3 PPU dots per CPU cycle
//! - **cartridge** – [iNES](https://www.nesdev.org/wiki/INES) loading; [Mapper](https://www.nesdev.org/wiki/Mapper) NROM (0)
//! - **cpu** – [6502](https://www.nesdev.org/wiki/CPU): table-driven official opcode set, [NMI](https://www.nesdev.org/wiki/NMI)/IRQ
//! - **ppu** – [PPU registers](https://www.nesdev.org/wiki/PPU_registers), VRAM, palette, OAM, vblank timing
//! - **system** – owns the CPU/bus/PPU/cartridge graph; ROM loading and stepping for drivers
//! - **config** – illegal-opcode policy, debug mode, window scale
//! - **dialog** – ROM picker on a worker thread

pub mod bus;
pub mod cartridge;
pub mod config;
pub mod cpu;
pub mod dialog;
pub mod ppu;
pub mod system;
