pub mod ppu;
pub mod registers;

pub use ppu::PPU;
