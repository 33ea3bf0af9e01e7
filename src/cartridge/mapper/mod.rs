//! NES mappers for PRG/CHR address translation.
//!
//! A mapper turns a CPU address ($4020–$FFFF) or a PPU pattern address ($0000–$1FFF) into an
//! offset inside the cartridge's PRG or CHR image. Mapper 0 (NROM) is the only board wired up;
//! [`for_id`] is the single place a new board gets registered.

use crate::cartridge::cartridge::CartridgeError;

pub mod mapper;
pub mod mapper0;

use mapper::Mapper;
use mapper0::Mapper0;

/// Nametable mirroring mode for PPU, from iNES flags 6 bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000 = $2400 and $2800 = $2C00 (vertical arrangement, horizontal scrolling games).
    Horizontal,
    /// $2000 = $2800 and $2400 = $2C00 (horizontal arrangement).
    Vertical,
}

impl Mirroring {
    /// Bit 0 of flags 6: 0 = horizontal, 1 = vertical.
    pub fn from_flags6(flags6: u8) -> Self {
        if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }
}

/// Build the mapper for an iNES mapper number. Unknown boards are an error, never a fallback.
pub fn for_id(id: u8, prg_banks: u8) -> Result<Box<dyn Mapper>, CartridgeError> {
    match id {
        0 => Ok(Box::new(Mapper0::new(prg_banks))),
        _ => Err(CartridgeError::UnsupportedMapper(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirroring_follows_flags6_bit0() {
        assert_eq!(Mirroring::from_flags6(0x00), Mirroring::Horizontal);
        assert_eq!(Mirroring::from_flags6(0x01), Mirroring::Vertical);
        assert_eq!(Mirroring::from_flags6(0xF0), Mirroring::Horizontal);
    }

    #[test]
    fn unknown_mapper_reports_its_id() {
        match for_id(4, 2) {
            Err(CartridgeError::UnsupportedMapper(id)) => assert_eq!(id, 4),
            other => panic!("expected UnsupportedMapper, got {other:?}"),
        }
    }
}
