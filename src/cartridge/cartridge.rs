//! NES cartridge loading from iNES format (.nes files).
//!
//! Implements the [iNES](https://www.nesdev.org/wiki/INES) format: 16-byte header (magic "NES\x1A",
//! PRG size in 16 KiB units, CHR size in 8 KiB units, flags 6–7 for mapper, etc.), an optional
//! 512-byte trainer, then PRG ROM, then CHR ROM. A CHR count of zero means the board carries
//! 8 KiB of CHR RAM instead. [Mapper](https://www.nesdev.org/wiki/Mapper) decides where CPU PRG
//! ($8000–$FFFF) and PPU CHR ($0000–$1FFF) addresses land inside those images.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info, warn};

use crate::cartridge::mapper::mapper::Mapper;
use crate::cartridge::mapper::{self, Mirroring};

pub const INES_MAGIC: [u8; 4] = *b"NES\x1A";
pub const HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_BANK_SIZE: usize = 16 * 1024;
pub const CHR_BANK_SIZE: usize = 8 * 1024;

/// Why a ROM image was rejected. Nothing is constructed when any of these is returned.
#[derive(Debug)]
pub enum CartridgeError {
    /// Missing or wrong "NES\x1A" magic.
    InvalidHeader,
    /// File ends before the sections the header declares.
    TruncatedRom { expected: usize, actual: usize },
    /// Mapper number with no board implementation.
    UnsupportedMapper(u8),
    Io(io::Error),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::InvalidHeader => write!(f, "not an iNES image (bad magic)"),
            CartridgeError::TruncatedRom { expected, actual } => write!(
                f,
                "truncated ROM: header declares {expected} bytes, file has {actual}"
            ),
            CartridgeError::UnsupportedMapper(id) => write!(f, "unsupported mapper {id}"),
            CartridgeError::Io(e) => write!(f, "failed to read ROM: {e}"),
        }
    }
}

impl std::error::Error for CartridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CartridgeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CartridgeError {
    fn from(e: io::Error) -> Self {
        CartridgeError::Io(e)
    }
}

/// Decoded 16-byte iNES header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InesHeader {
    /// PRG ROM size in 16 KiB units (byte 4).
    pub prg_banks: u8,
    /// CHR ROM size in 8 KiB units (byte 5); 0 means CHR RAM.
    pub chr_banks: u8,
    /// High nibble of byte 7 | high nibble of byte 6 >> 4.
    pub mapper_id: u8,
    pub mirroring: Mirroring,
    /// Flags 6 bit 1: battery-backed PRG RAM. Recorded only.
    pub has_battery: bool,
    /// Flags 6 bit 2: 512-byte trainer between header and PRG.
    pub has_trainer: bool,
}

impl InesHeader {
    /// Parse the first 16 bytes of an image. Only the magic is checked here; section sizes are
    /// checked against the file length by [`Cartridge::from_bytes`].
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < INES_MAGIC.len() || data[..4] != INES_MAGIC {
            return Err(CartridgeError::InvalidHeader);
        }
        if data.len() < HEADER_SIZE {
            return Err(CartridgeError::TruncatedRom {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }
        let flags6 = data[6];
        let flags7 = data[7];
        Ok(Self {
            prg_banks: data[4],
            chr_banks: data[5],
            mapper_id: (flags6 >> 4) | (flags7 & 0xF0),
            mirroring: Mirroring::from_flags6(flags6),
            has_battery: flags6 & 0x02 != 0,
            has_trainer: flags6 & 0x04 != 0,
        })
    }

    pub fn prg_size(&self) -> usize {
        self.prg_banks as usize * PRG_BANK_SIZE
    }

    pub fn chr_size(&self) -> usize {
        self.chr_banks as usize * CHR_BANK_SIZE
    }

    /// Header + trainer + PRG + CHR.
    pub fn image_size(&self) -> usize {
        let trainer = if self.has_trainer { TRAINER_SIZE } else { 0 };
        HEADER_SIZE + trainer + self.prg_size() + self.chr_size()
    }
}

/// Cartridge: holds PRG/CHR and the mapper that decodes addresses into them.
/// CPU reads PRG via bus at $4020–$FFFF; PPU pattern tables are filled from CHR.
#[derive(Debug)]
pub struct Cartridge {
    header: InesHeader,
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Read and parse an iNES file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        debug!(path:% = path.display(), len = data.len(); "read ROM image");
        Self::from_bytes(&data)
    }

    /// Parse an in-memory iNES image. All validation happens before anything is built.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = InesHeader::parse(data)?;

        let expected = header.image_size();
        if data.len() < expected {
            return Err(CartridgeError::TruncatedRom {
                expected,
                actual: data.len(),
            });
        }

        let mapper = mapper::for_id(header.mapper_id, header.prg_banks)?;

        let prg_start = HEADER_SIZE + if header.has_trainer { TRAINER_SIZE } else { 0 };
        let prg_end = prg_start + header.prg_size();
        let chr_end = prg_end + header.chr_size();

        let prg_rom = data[prg_start..prg_end].to_vec();
        let chr_is_ram = header.chr_banks == 0;
        let chr = if chr_is_ram {
            vec![0; CHR_BANK_SIZE]
        } else {
            data[prg_end..chr_end].to_vec()
        };

        info!(
            mapper = header.mapper_id,
            prg_kib = prg_rom.len() / 1024,
            chr_kib = chr.len() / 1024,
            chr_ram = chr_is_ram,
            mirroring:? = header.mirroring;
            "cartridge loaded"
        );

        Ok(Self {
            header,
            prg_rom,
            chr,
            chr_is_ram,
            mapper,
        })
    }

    pub fn header(&self) -> &InesHeader {
        &self.header
    }

    pub fn mapper_id(&self) -> u8 {
        self.mapper.id()
    }

    pub fn mirroring(&self) -> Mirroring {
        self.header.mirroring
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    /// CHR image as the PPU should see it at $0000–$1FFF.
    pub fn chr(&self) -> &[u8] {
        &self.chr
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }

    /// CPU read in cartridge space ($4020–$FFFF). Unmapped addresses read 0.
    pub fn read(&self, addr: u16) -> u8 {
        self.mapper
            .map_prg(addr)
            .and_then(|offset| self.prg_rom.get(offset).copied())
            .unwrap_or(0)
    }

    /// CPU write in cartridge space. PRG ROM is read-only; the mapper sees the write.
    pub fn write(&mut self, addr: u16, data: u8) {
        if !self.mapper.write(addr, data) {
            warn!(addr, data, mapper = self.mapper.id(); "write to cartridge ROM ignored");
        }
    }

    /// PPU read from CHR ($0000–$1FFF).
    pub fn read_chr(&self, addr: u16) -> u8 {
        self.mapper
            .map_chr(addr)
            .and_then(|offset| self.chr.get(offset).copied())
            .unwrap_or(0)
    }
}
