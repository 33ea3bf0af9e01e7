//! Mapper 0 (NROM): no bank switching, 16/32KB PRG, 8KB CHR.

use crate::cartridge::mapper::mapper::Mapper;

/// NROM mapper: fixed PRG and CHR, optionally 16KB PRG mirror.
#[derive(Debug, Clone, Copy)]
pub struct Mapper0 {
    prg_banks: u8,
}

impl Mapper0 {
    /// Create Mapper0 for the given number of 16 KiB PRG banks. CHR is always one 8 KiB window.
    pub fn new(prg_banks: u8) -> Self {
        Self { prg_banks }
    }

    /// NROM-128 mirrors $C000-$FFFF onto $8000-$BFFF; NROM-256 addresses all 32 KiB.
    fn prg_mask(&self) -> u16 {
        if self.prg_banks > 1 { 0x7FFF } else { 0x3FFF }
    }
}

impl Mapper for Mapper0 {
    fn id(&self) -> u8 {
        0
    }

    fn map_prg(&self, addr: u16) -> Option<usize> {
        match addr {
            0x8000..=0xFFFF => Some((addr & self.prg_mask()) as usize),
            // No PRG RAM or expansion on NROM
            _ => None,
        }
    }

    fn map_chr(&self, addr: u16) -> Option<usize> {
        match addr {
            0x0000..=0x1FFF => Some(addr as usize),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bank_mirrors_upper_half() {
        let m = Mapper0::new(1);
        for offset in 0..0x4000u16 {
            assert_eq!(m.map_prg(0x8000 + offset), m.map_prg(0xC000 + offset));
            assert_eq!(m.map_prg(0x8000 + offset), Some(offset as usize));
        }
    }

    #[test]
    fn two_banks_address_full_32k() {
        let m = Mapper0::new(2);
        assert_eq!(m.map_prg(0x8000), Some(0x0000));
        assert_eq!(m.map_prg(0xC000), Some(0x4000));
        assert_eq!(m.map_prg(0xFFFF), Some(0x7FFF));
    }

    #[test]
    fn below_prg_window_is_unmapped() {
        let m = Mapper0::new(2);
        assert_eq!(m.map_prg(0x4020), None);
        assert_eq!(m.map_prg(0x6000), None);
        assert_eq!(m.map_prg(0x7FFF), None);
    }

    #[test]
    fn chr_is_identity_within_8k() {
        let m = Mapper0::new(1);
        assert_eq!(m.map_chr(0x0000), Some(0));
        assert_eq!(m.map_chr(0x1FFF), Some(0x1FFF));
        assert_eq!(m.map_chr(0x2000), None);
    }
}
