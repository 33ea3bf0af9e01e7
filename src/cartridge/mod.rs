//! NES cartridge loading and mapper support.
//!
//! - **cartridge**: Parses iNES (.nes) images, holds PRG/CHR and the mapper.
//! - **mapper**: NROM (0) PRG/CHR address decoding and nametable mirroring.

pub mod cartridge;
pub mod mapper;

pub use cartridge::{Cartridge, CartridgeError, InesHeader};
pub use mapper::Mirroring;
