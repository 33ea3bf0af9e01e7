//! [PPU registers](https://www.nesdev.org/wiki/PPU_registers) $2000–$2007 and their bit layouts.

use bitflags::bitflags;

bitflags! {
    /// PPUCTRL ($2000), write-only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuCtrl: u8 {
        /// Base nametable select, low bit ($2400).
        const NAMETABLE_X       = 1 << 0;
        /// Base nametable select, high bit ($2800).
        const NAMETABLE_Y       = 1 << 1;
        /// VRAM address increment per PPUDATA access: 0 = +1 (across), 1 = +32 (down).
        const VRAM_INCREMENT_32 = 1 << 2;
        const SPRITE_TABLE      = 1 << 3;
        /// Background pattern table: 0 = $0000, 1 = $1000.
        const BACKGROUND_TABLE  = 1 << 4;
        const SPRITE_SIZE_16    = 1 << 5;
        const MASTER_SLAVE      = 1 << 6;
        /// Generate NMI at the start of vblank.
        const NMI_ENABLE        = 1 << 7;
    }
}

bitflags! {
    /// PPUSTATUS ($2002), read-only. Bits 0–4 are open bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuStatus: u8 {
        const SPRITE_OVERFLOW = 1 << 5;
        const SPRITE_ZERO_HIT = 1 << 6;
        const VBLANK          = 1 << 7;
    }
}

impl PpuCtrl {
    /// Base nametable index 0..=3.
    pub fn nametable(self) -> u8 {
        self.bits() & 0x03
    }

    pub fn vram_increment(self) -> u16 {
        if self.contains(PpuCtrl::VRAM_INCREMENT_32) { 32 } else { 1 }
    }

    pub fn background_table(self) -> u16 {
        if self.contains(PpuCtrl::BACKGROUND_TABLE) { 0x1000 } else { 0x0000 }
    }
}

/// One slot of the 8-register window, selected by `address & 7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Ctrl,
    Mask,
    Status,
    OamAddr,
    OamData,
    Scroll,
    Addr,
    Data,
}

impl Register {
    pub fn from_index(index: u8) -> Self {
        match index & 0x07 {
            0 => Register::Ctrl,
            1 => Register::Mask,
            2 => Register::Status,
            3 => Register::OamAddr,
            4 => Register::OamData,
            5 => Register::Scroll,
            6 => Register::Addr,
            _ => Register::Data,
        }
    }

    /// Reads of anything else return the open-bus latch.
    pub fn is_readable(self) -> bool {
        matches!(self, Register::Status | Register::OamData | Register::Data)
    }

    /// PPUSTATUS ignores the value written; the write still resets the address latch.
    pub fn is_writable(self) -> bool {
        self != Register::Status
    }
}
