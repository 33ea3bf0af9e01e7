//! NES PPU (Picture Processing Unit) register and memory interface.
//!
//! The CPU sees the PPU only through an 8-register window ($2000–$2007, mirrored to $3FFF).
//! Behind it the PPU owns two 4 KiB pattern tables, two 1 KiB nametables, 32 bytes of palette
//! RAM and 256 bytes of OAM. Scroll/address writes go through the shared `w` latch into the
//! temporary address `t`, following the [PPU scrolling](https://www.nesdev.org/wiki/PPU_scrolling)
//! register model (`v`, `t`, `x`, `w`).

use log::{trace, warn};

use crate::cartridge::{cartridge::Cartridge, mapper::Mirroring};
use crate::ppu::registers::{PpuCtrl, PpuStatus, Register};

/// NES 2C02-style 64-color palette (0xRRGGBB). Index 0 = backdrop.
pub const NES_PALETTE_RGB: [u32; 64] = [
    0x545454, 0x001E74, 0x081090, 0x300088, 0x440064, 0x5C0030, 0x540400, 0x3C1800, 0x202A00,
    0x083A00, 0x004000, 0x003C00, 0x00302C, 0x000000, 0x000000, 0x000000, 0x989698, 0x084CC4,
    0x3032EC, 0x5C1EE4, 0x8814B0, 0xA01464, 0x982220, 0x783C00, 0x545A00, 0x287200, 0x087C00,
    0x007628, 0x006678, 0x000000, 0x000000, 0x000000, 0xECEEEC, 0x3C7EEC, 0x5C5CEC, 0x8844EC,
    0xB02CEC, 0xE028B0, 0xD83C50, 0xC45400, 0xAC7000, 0x808800, 0x409C30, 0x20A458, 0x209A88,
    0x404040, 0x000000, 0x000000, 0xECEEEC, 0xA8BCEC, 0xBCACEC, 0xD4A0EC, 0xEC94EC, 0xEC90D4,
    0xEC9CB4, 0xE4B090, 0xDCC878, 0xD4DC78, 0xB8EC98, 0xA8ECBC, 0xA0E4E4, 0xA0A0A0, 0x000000,
    0x000000,
];

/// OAM (Object Attribute Memory): 64 sprites × 4 bytes. Each entry: Y, tile, attr, X.
pub const OAM_LEN: usize = 256;

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;

/// Dots per scanline and scanlines per frame (NTSC).
pub const DOTS_PER_SCANLINE: u16 = 341;
pub const SCANLINES_PER_FRAME: u16 = 262;
pub const VBLANK_SCANLINE: u16 = 241;
pub const PRE_RENDER_SCANLINE: u16 = 261;

const PATTERN_TABLE_SIZE: usize = 0x1000;
const NAMETABLE_SIZE: usize = 0x400;

/// PPU state: register file, latch, VRAM, palette, OAM, and dot/scanline timing.
#[derive(Debug, Clone)]
pub struct PPU {
    ctrl: PpuCtrl,
    mask: u8,
    status: PpuStatus,
    oam_addr: u8,
    /// Current VRAM address (15 bits).
    v: u16,
    /// Temporary VRAM address; the top-left onscreen tile.
    t: u16,
    fine_x: u8,
    /// Write latch shared by $2005 and $2006. false = first write pending.
    w: bool,
    /// PPUDATA read buffer for non-palette reads.
    read_buffer: u8,
    /// Last value driven on the CPU-PPU data bus.
    open_bus: u8,

    pattern_tables: [[u8; PATTERN_TABLE_SIZE]; 2],
    chr_writable: bool,
    nametables: [[u8; NAMETABLE_SIZE]; 2],
    /// Palette RAM $3F00-$3F1F (32 bytes, with NES mirroring).
    palette: [u8; 32],
    oam: [u8; OAM_LEN],
    mirroring: Mirroring,

    dot: u16,
    scanline: u16,
    frame: u64,
    nmi_pending: bool,
    /// Set when entering vblank; cleared by [`PPU::take_frame`].
    frame_ready: bool,
}

impl Default for PPU {
    fn default() -> Self {
        Self::new()
    }
}

impl PPU {
    /// Power-on state: all memory zeroed, first dot of scanline 0.
    pub fn new() -> Self {
        Self {
            ctrl: PpuCtrl::empty(),
            mask: 0,
            status: PpuStatus::empty(),
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            w: false,
            read_buffer: 0,
            open_bus: 0,
            pattern_tables: [[0; PATTERN_TABLE_SIZE]; 2],
            chr_writable: false,
            nametables: [[0; NAMETABLE_SIZE]; 2],
            palette: [0; 32],
            oam: [0; OAM_LEN],
            mirroring: Mirroring::Horizontal,
            dot: 0,
            scanline: 0,
            frame: 0,
            nmi_pending: false,
            frame_ready: false,
        }
    }

    /// Copy the cartridge's CHR into the pattern tables and adopt its mirroring.
    pub fn load_cartridge(&mut self, cart: &Cartridge) {
        for (table_index, table) in self.pattern_tables.iter_mut().enumerate() {
            let base = (table_index * PATTERN_TABLE_SIZE) as u16;
            for (offset, byte) in table.iter_mut().enumerate() {
                *byte = cart.read_chr(base + offset as u16);
            }
        }
        self.chr_writable = cart.chr_is_ram();
        self.mirroring = cart.mirroring();
    }

    /// Read from the register window. `index` is taken modulo 8.
    pub fn read_register(&mut self, index: u8) -> u8 {
        let register = Register::from_index(index);
        if !register.is_readable() {
            return self.open_bus;
        }
        let value = match register {
            Register::Status => {
                let value = (self.status.bits() & 0xE0) | (self.open_bus & 0x1F);
                self.status.remove(PpuStatus::VBLANK);
                self.w = false;
                value
            }
            Register::OamData => self.oam[self.oam_addr as usize],
            Register::Data => self.read_data(),
            _ => self.open_bus,
        };
        self.open_bus = value;
        value
    }

    /// Write to the register window. `index` is taken modulo 8.
    pub fn write_register(&mut self, index: u8, value: u8) {
        self.open_bus = value;
        let register = Register::from_index(index);
        if !register.is_writable() {
            // Value is dropped; the address latch still resets
            self.w = false;
            return;
        }
        match register {
            Register::Ctrl => {
                let was_enabled = self.ctrl.contains(PpuCtrl::NMI_ENABLE);
                self.ctrl = PpuCtrl::from_bits_retain(value);
                self.t = (self.t & !0x0C00) | (((value & 0x03) as u16) << 10);
                // Enabling NMI during vblank fires immediately
                if !was_enabled
                    && self.ctrl.contains(PpuCtrl::NMI_ENABLE)
                    && self.status.contains(PpuStatus::VBLANK)
                {
                    self.nmi_pending = true;
                }
            }
            Register::Mask => self.mask = value,
            // Read-only, returned above
            Register::Status => {}
            Register::OamAddr => self.oam_addr = value,
            Register::OamData => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            Register::Scroll => {
                if !self.w {
                    self.t = (self.t & !0x001F) | (value >> 3) as u16;
                    self.fine_x = value & 0x07;
                } else {
                    self.t = (self.t & !0x73E0)
                        | (((value & 0x07) as u16) << 12)
                        | (((value & 0xF8) as u16) << 2);
                }
                self.w = !self.w;
            }
            Register::Addr => {
                if !self.w {
                    self.t = (self.t & 0x00FF) | (((value & 0x3F) as u16) << 8);
                } else {
                    self.t = (self.t & 0xFF00) | value as u16;
                    self.v = self.t;
                }
                self.w = !self.w;
            }
            Register::Data => {
                self.write_vram(self.v, value);
                self.increment_vram_addr();
            }
        }
        trace!(register:? = register, value, v = self.v, t = self.t, w = self.w; "ppu register write");
    }

    /// PPUDATA read: nametable/pattern reads return the buffered byte from the previous read;
    /// palette reads return immediately and refill the buffer from the nametable underneath.
    fn read_data(&mut self) -> u8 {
        let addr = self.v & 0x3FFF;
        let value = if addr >= 0x3F00 {
            self.read_buffer = self.read_vram(addr - 0x1000);
            self.read_vram(addr)
        } else {
            let buffered = self.read_buffer;
            self.read_buffer = self.read_vram(addr);
            buffered
        };
        self.increment_vram_addr();
        value
    }

    fn increment_vram_addr(&mut self) {
        self.v = self.v.wrapping_add(self.ctrl.vram_increment()) & 0x7FFF;
    }

    /// Read PPU address space ($0000–$3FFF, higher addresses mirror down).
    pub fn read_vram(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => {
                self.pattern_tables[(addr >> 12) as usize][(addr & 0x0FFF) as usize]
            }
            0x2000..=0x3EFF => {
                let (table, offset) = Self::map_nametable_addr(addr, self.mirroring);
                self.nametables[table][offset]
            }
            _ => self.palette[Self::palette_index(addr)],
        }
    }

    /// Write PPU address space. Pattern writes only land on CHR RAM.
    pub fn write_vram(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => {
                if self.chr_writable {
                    self.pattern_tables[(addr >> 12) as usize][(addr & 0x0FFF) as usize] = value;
                } else {
                    warn!(addr, value; "write to CHR ROM ignored");
                }
            }
            0x2000..=0x3EFF => {
                let (table, offset) = Self::map_nametable_addr(addr, self.mirroring);
                self.nametables[table][offset] = value;
            }
            // Palette entries are 6 bits wide
            _ => self.palette[Self::palette_index(addr)] = value & 0x3F,
        }
    }

    /// Map a nametable address ($2000–$3EFF) to (physical table, offset).
    /// Horizontal: $2000/$2400 share table 0, $2800/$2C00 share table 1.
    /// Vertical: $2000/$2800 share table 0, $2400/$2C00 share table 1.
    pub fn map_nametable_addr(addr: u16, mirroring: Mirroring) -> (usize, usize) {
        let addr = (addr - 0x2000) & 0x0FFF;
        let window = addr / 0x400;
        let offset = (addr & 0x3FF) as usize;
        let table = match mirroring {
            Mirroring::Horizontal => window >> 1,
            Mirroring::Vertical => window & 1,
        };
        (table as usize, offset)
    }

    /// Resolve palette address $3F00–$3FFF to a 32-byte index.
    /// $3F10/$3F14/$3F18/$3F1C mirror $3F00/$3F04/$3F08/$3F0C.
    pub fn palette_index(addr: u16) -> usize {
        let i = (addr & 0x1F) as usize;
        if i & 0x13 == 0x10 { i & 0x0F } else { i }
    }

    /// Advance one dot (341 per scanline, 262 scanlines per frame). Sets vblank and requests NMI
    /// at scanline 241 dot 1; clears vblank on the pre-render line.
    pub fn tick(&mut self) {
        self.dot += 1;
        if self.dot == DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline == SCANLINES_PER_FRAME {
                self.scanline = 0;
                self.frame += 1;
            }
        }

        if self.dot == 1 {
            match self.scanline {
                VBLANK_SCANLINE => {
                    self.status.insert(PpuStatus::VBLANK);
                    self.frame_ready = true;
                    if self.ctrl.contains(PpuCtrl::NMI_ENABLE) {
                        self.nmi_pending = true;
                    }
                }
                PRE_RENDER_SCANLINE => {
                    self.status.remove(
                        PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
                    );
                }
                _ => {}
            }
        }
    }

    /// Take the pending NMI request, if any.
    pub fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// True once per frame, when vblank starts.
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    /// Render logical nametable `index` (0..=3, through mirroring) as a 256×240 0x00RRGGBB image
    /// using the background pattern table selected in PPUCTRL.
    pub fn render_nametable(&self, index: usize) -> Vec<u32> {
        let base = 0x2000 + ((index & 0x03) as u16) * 0x400;
        let pattern_base = self.ctrl.background_table();
        let mut pixels = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];

        for tile_y in 0..30u16 {
            for tile_x in 0..32u16 {
                let tile = self.read_vram(base + tile_y * 32 + tile_x) as u16;
                let attr = self.read_vram(base + 0x3C0 + (tile_y / 4) * 8 + tile_x / 4);
                let shift = ((tile_y & 0x02) << 1) | (tile_x & 0x02);
                let palette_bank = ((attr >> shift) & 0x03) as u16;

                for row in 0..8u16 {
                    let lo = self.read_vram(pattern_base + tile * 16 + row);
                    let hi = self.read_vram(pattern_base + tile * 16 + row + 8);
                    for col in 0..8u16 {
                        let bit = 7 - col;
                        let pixel = (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1);
                        let palette_addr = if pixel == 0 {
                            0x3F00
                        } else {
                            0x3F00 + palette_bank * 4 + pixel as u16
                        };
                        let color = self.palette[Self::palette_index(palette_addr)] as usize;
                        let x = (tile_x * 8 + col) as usize;
                        let y = (tile_y * 8 + row) as usize;
                        pixels[y * SCREEN_WIDTH + x] = NES_PALETTE_RGB[color & 0x3F];
                    }
                }
            }
        }
        pixels
    }

    pub fn ctrl(&self) -> PpuCtrl {
        self.ctrl
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    pub fn status(&self) -> PpuStatus {
        self.status
    }

    pub fn vram_addr(&self) -> u16 {
        self.v
    }

    pub fn temp_addr(&self) -> u16 {
        self.t
    }

    pub fn fine_x(&self) -> u8 {
        self.fine_x
    }

    /// true when the next $2005/$2006 write is the second of a pair.
    pub fn write_latch(&self) -> bool {
        self.w
    }

    pub fn oam(&self) -> &[u8; OAM_LEN] {
        &self.oam
    }

    pub fn oam_addr(&self) -> u8 {
        self.oam_addr
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}
