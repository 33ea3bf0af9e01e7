//! Mapper trait: PRG/CHR address translation.

use std::fmt;

/// Trait for NES cartridge mappers. The cartridge owns the ROM bytes; a mapper only computes
/// where inside them an address lands.
pub trait Mapper: fmt::Debug {
    /// iNES mapper number.
    fn id(&self) -> u8;

    /// Translate a CPU address in cartridge space ($4020–$FFFF) to a PRG-ROM offset.
    /// `None` means the board leaves the address unmapped (open bus).
    fn map_prg(&self, addr: u16) -> Option<usize>;

    /// Translate a PPU pattern-table address ($0000–$1FFF) to a CHR offset.
    fn map_chr(&self, addr: u16) -> Option<usize>;

    /// Write into cartridge space. Boards with bank registers latch them here and return true;
    /// boards without registers ignore the write.
    fn write(&mut self, _addr: u16, _data: u8) -> bool {
        false
    }
}
