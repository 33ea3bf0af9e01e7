//! Memory bus and address decoding for the NES.
//!
//! Maps the [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map) onto internal RAM,
//! the PPU register window and the cartridge. Every 16-bit address lands in exactly one region:
//!
//! | Range           | Target                                   |
//! |-----------------|------------------------------------------|
//! | `$0000–$1FFF`   | 2 KiB RAM, `addr & $07FF`                |
//! | `$2000–$3FFF`   | PPU registers, `addr & 7`                |
//! | `$4000–$401F`   | APU/IO, open bus (reads 0, writes drop)  |
//! | `$4020–$FFFF`   | Cartridge via its mapper                 |

use std::fmt;

use log::info;

use crate::cartridge::cartridge::Cartridge;
use crate::ppu::ppu::PPU;

pub const RAM_SIZE: usize = 0x0800;

/// Value returned by reads from the unmapped APU/IO window.
pub const OPEN_BUS: u8 = 0;

/// Trait for memory-mapped I/O and bus access used by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Advance devices clocked off the CPU by `cycles` CPU cycles.
    fn tick(&mut self, _cycles: usize) {}

    /// Take a pending non-maskable interrupt request.
    fn poll_nmi(&mut self) -> bool {
        false
    }
}

/// Collaborator a bus region forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Ppu,
    Cartridge,
}

/// An access reached a region whose collaborator was never attached. This is a wiring bug in the
/// caller; [`NesBus`] panics with this message instead of inventing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusContractViolation {
    pub address: u16,
    pub region: Region,
}

impl fmt::Display for BusContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.region {
            Region::Ppu => "PPU",
            Region::Cartridge => "cartridge",
        };
        write!(
            f,
            "bus contract violation: ${:04X} accessed with no {what} attached",
            self.address
        )
    }
}

impl std::error::Error for BusContractViolation {}

/// Main NES bus: RAM plus the attached PPU and cartridge.
#[derive(Debug)]
pub struct NesBus {
    ram: [u8; RAM_SIZE],
    ppu: Option<PPU>,
    cart: Option<Cartridge>,
}

impl Default for NesBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NesBus {
    /// Bus with RAM only. Attach a PPU and cartridge before touching $2000+ (except $4000–$401F).
    pub fn new() -> Self {
        Self {
            ram: [0; RAM_SIZE],
            ppu: None,
            cart: None,
        }
    }

    /// Bus with a fresh PPU attached.
    pub fn with_ppu() -> Self {
        let mut bus = Self::new();
        bus.attach_ppu(PPU::new());
        bus
    }

    pub fn attach_ppu(&mut self, mut ppu: PPU) {
        if let Some(cart) = &self.cart {
            ppu.load_cartridge(cart);
        }
        self.ppu = Some(ppu);
    }

    /// Attach `cart`, replacing any previous cartridge, which is returned. The PPU's pattern
    /// tables and mirroring are switched before the cartridge becomes visible to reads, all
    /// within this one call.
    pub fn insert_cartridge(&mut self, cart: Cartridge) -> Option<Cartridge> {
        if let Some(ppu) = &mut self.ppu {
            ppu.load_cartridge(&cart);
        }
        let previous = self.cart.replace(cart);
        if previous.is_some() {
            info!("cartridge hot-swapped");
        }
        previous
    }

    pub fn ppu(&self) -> Option<&PPU> {
        self.ppu.as_ref()
    }

    pub fn ppu_mut(&mut self) -> Option<&mut PPU> {
        self.ppu.as_mut()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cart.as_ref()
    }

    pub fn ram(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    fn attached_ppu(&mut self, address: u16) -> &mut PPU {
        match self.ppu.as_mut() {
            Some(ppu) => ppu,
            None => panic!(
                "{}",
                BusContractViolation {
                    address,
                    region: Region::Ppu
                }
            ),
        }
    }

    fn attached_cart(&mut self, address: u16) -> &mut Cartridge {
        match self.cart.as_mut() {
            Some(cart) => cart,
            None => panic!(
                "{}",
                BusContractViolation {
                    address,
                    region: Region::Cartridge
                }
            ),
        }
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            // Internal RAM (mirrored 4x in 0x0000-0x1FFF)
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            // PPU registers $2000-$3FFF (mirrored every 8 bytes)
            0x2000..=0x3FFF => self.attached_ppu(addr).read_register((addr & 0x0007) as u8),
            // APU and I/O: open bus
            0x4000..=0x401F => OPEN_BUS,
            0x4020..=0xFFFF => self.attached_cart(addr).read(addr),
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,
            0x2000..=0x3FFF => self
                .attached_ppu(addr)
                .write_register((addr & 0x0007) as u8, data),
            0x4000..=0x401F => {}
            0x4020..=0xFFFF => self.attached_cart(addr).write(addr, data),
        }
    }

    fn tick(&mut self, cycles: usize) {
        // 3 PPU dots per CPU cycle
        if let Some(ppu) = &mut self.ppu {
            for _ in 0..cycles * 3 {
                ppu.tick();
            }
        }
    }

    fn poll_nmi(&mut self) -> bool {
        self.ppu.as_mut().is_some_and(PPU::poll_nmi)
    }
}
