//! In-memory iNES images for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

pub const PRG_BANK: usize = 16 * 1024;
pub const CHR_BANK: usize = 8 * 1024;

/// Builds an NROM image. PRG is NOP-filled so stray execution stays harmless.
pub struct RomBuilder {
    prg: Vec<u8>,
    chr: Vec<u8>,
    flags6: u8,
    flags7: u8,
    trainer: bool,
}

impl RomBuilder {
    /// One 16 KiB PRG bank, one CHR bank.
    pub fn nrom128() -> Self {
        Self {
            prg: vec![0xEA; PRG_BANK],
            chr: vec![0; CHR_BANK],
            flags6: 0,
            flags7: 0,
            trainer: false,
        }
    }

    /// Two 16 KiB PRG banks, one CHR bank.
    pub fn nrom256() -> Self {
        Self {
            prg: vec![0xEA; 2 * PRG_BANK],
            ..Self::nrom128()
        }
    }

    /// Place `bytes` at CPU address `addr` ($8000-$FFFF).
    pub fn code(mut self, addr: u16, bytes: &[u8]) -> Self {
        let mask = self.prg.len() - 1;
        for (i, byte) in bytes.iter().enumerate() {
            let offset = (addr as usize + i) & mask;
            self.prg[offset] = *byte;
        }
        self
    }

    pub fn reset_vector(self, addr: u16) -> Self {
        self.code(0xFFFC, &addr.to_le_bytes())
    }

    pub fn nmi_vector(self, addr: u16) -> Self {
        self.code(0xFFFA, &addr.to_le_bytes())
    }

    pub fn chr_fill(mut self, value: u8) -> Self {
        self.chr.fill(value);
        self
    }

    pub fn chr_ram(mut self) -> Self {
        self.chr.clear();
        self
    }

    pub fn vertical(mut self) -> Self {
        self.flags6 |= 0x01;
        self
    }

    pub fn with_trainer(mut self) -> Self {
        self.flags6 |= 0x04;
        self.trainer = true;
        self
    }

    pub fn mapper(mut self, id: u8) -> Self {
        self.flags6 = (self.flags6 & 0x0F) | (id << 4);
        self.flags7 = (self.flags7 & 0x0F) | (id & 0xF0);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(16 + self.prg.len() + self.chr.len());
        data.extend_from_slice(b"NES\x1A");
        data.push((self.prg.len() / PRG_BANK) as u8);
        data.push((self.chr.len() / CHR_BANK) as u8);
        data.push(self.flags6);
        data.push(self.flags7);
        data.extend_from_slice(&[0; 8]);
        if self.trainer {
            data.extend_from_slice(&[0; 512]);
        }
        data.extend_from_slice(&self.prg);
        data.extend_from_slice(&self.chr);
        data
    }
}

/// Write `data` to a per-process temp file and return its path.
pub fn write_temp_rom(name: &str, data: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("fidelis-{}-{name}.nes", std::process::id()));
    std::fs::write(&path, data).unwrap();
    path
}
