//! The console as a whole: the CPU, which owns the bus, which owns the PPU and cartridge.
//!
//! `System` is what a driver talks to. It loads ROMs, steps the CPU, applies the configured
//! [`IllegalOpcodePolicy`], and exposes read-only views for debug displays.

use std::io;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::bus::NesBus;
use crate::cartridge::cartridge::{Cartridge, CartridgeError};
use crate::config::{Config, IllegalOpcodePolicy};
use crate::cpu::cpu::{CPU, CpuError, Registers};
use crate::dialog::{PickOutcome, RomPicker};
use crate::ppu::ppu::PPU;

pub struct System {
    cpu: CPU<NesBus>,
    config: Config,
    /// The error that stopped execution under [`IllegalOpcodePolicy::Halt`].
    halted: Option<CpuError>,
    picker: Option<RomPicker>,
}

impl System {
    pub fn new(config: Config) -> Self {
        let mut cpu = CPU::new(NesBus::with_ppu());
        cpu.set_trace(config.debug);
        Self {
            cpu,
            config,
            halted: None,
            picker: None,
        }
    }

    /// Load an iNES file and reset into it. On error the current cartridge stays attached.
    pub fn load_cart(&mut self, path: impl AsRef<Path>) -> Result<(), CartridgeError> {
        let path = path.as_ref();
        let cart = Cartridge::load(path)?;
        info!(path:% = path.display(); "ROM loaded");
        self.attach(cart);
        Ok(())
    }

    /// Load an in-memory iNES image and reset into it. On error the current cartridge stays
    /// attached.
    pub fn load_cart_bytes(&mut self, data: &[u8]) -> Result<(), CartridgeError> {
        let cart = Cartridge::from_bytes(data)?;
        self.attach(cart);
        Ok(())
    }

    /// The cartridge is fully built before this point; the swap itself is one bus call.
    fn attach(&mut self, cart: Cartridge) {
        self.cpu.bus.insert_cartridge(cart);
        self.reset();
    }

    /// Open the native ROM picker on a worker thread. A second call while one is open is ignored.
    #[cfg(feature = "dialog")]
    pub fn open_cart_dialog(&mut self) -> io::Result<()> {
        if self.picker.is_none() {
            self.picker = Some(RomPicker::spawn()?);
        }
        Ok(())
    }

    /// Like [`System::open_cart_dialog`] with a caller-supplied picker.
    pub fn open_cart_with<F>(&mut self, pick: F) -> io::Result<()>
    where
        F: FnOnce() -> Option<PathBuf> + Send + 'static,
    {
        if self.picker.is_none() {
            self.picker = Some(RomPicker::spawn_with(pick)?);
        }
        Ok(())
    }

    pub fn dialog_pending(&self) -> bool {
        self.picker.is_some()
    }

    /// Check the picker without blocking. When a path has come back, the ROM is loaded here,
    /// on the calling thread. Returns `None` while the dialog is open, when none is open, and on
    /// cancel.
    pub fn poll_cart_dialog(&mut self) -> Option<Result<PathBuf, CartridgeError>> {
        let outcome = self.picker.as_ref()?.try_recv()?;
        self.picker = None;
        match outcome {
            PickOutcome::Picked(path) => Some(self.load_cart(&path).map(|()| path)),
            PickOutcome::Cancelled => {
                info!("ROM selection cancelled");
                None
            }
        }
    }

    /// Reset the CPU through the cartridge's reset vector, or to [`Config::entry_point`] when
    /// set, and clear a halt. Without a cartridge there is no vector to read, so nothing happens.
    pub fn reset(&mut self) {
        if !self.has_cartridge() {
            warn!("reset ignored: no cartridge attached");
            return;
        }
        match self.config.entry_point {
            Some(entry) => self.cpu.reset_to(entry),
            None => self.cpu.reset(),
        }
        self.halted = None;
    }

    pub fn set_debug_mode(&mut self, enabled: bool) {
        self.config.debug = enabled;
        self.cpu.set_trace(enabled);
        info!(enabled; "debug mode");
    }

    pub fn debug_mode(&self) -> bool {
        self.config.debug
    }

    pub fn set_illegal_opcode_policy(&mut self, policy: IllegalOpcodePolicy) {
        self.config.illegal_opcode = policy;
    }

    /// Execute one instruction.
    ///
    /// Requires a cartridge. Once halted, keeps returning the halting error until reset.
    pub fn step(&mut self) -> Result<(), CpuError> {
        if let Some(err) = &self.halted {
            return Err(err.clone());
        }
        let Err(err) = self.cpu.tick() else {
            return Ok(());
        };
        match self.config.illegal_opcode {
            IllegalOpcodePolicy::Halt => {
                error!("{err}");
                self.halted = Some(err.clone());
                Err(err)
            }
            IllegalOpcodePolicy::Skip => {
                warn!("{err}; skipping");
                self.cpu.skip_opcode();
                Ok(())
            }
            IllegalOpcodePolicy::Nop => {
                warn!("{err}; executing as NOP");
                self.cpu.substitute_nop();
                Ok(())
            }
        }
    }

    /// Step until the PPU enters vblank.
    pub fn run_frame(&mut self) -> Result<(), CpuError> {
        loop {
            self.step()?;
            if self.cpu.bus.ppu_mut().is_some_and(PPU::take_frame) {
                return Ok(());
            }
        }
    }

    pub fn has_cartridge(&self) -> bool {
        self.cpu.bus.cartridge().is_some()
    }

    /// True when a cartridge is attached and execution is not halted.
    pub fn is_running(&self) -> bool {
        self.has_cartridge() && self.halted.is_none()
    }

    pub fn halted(&self) -> Option<&CpuError> {
        self.halted.as_ref()
    }

    pub fn registers(&self) -> Registers {
        self.cpu.registers()
    }

    pub fn cpu(&self) -> &CPU<NesBus> {
        &self.cpu
    }

    pub fn ppu(&self) -> Option<&PPU> {
        self.cpu.bus.ppu()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cpu.bus.cartridge()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Logical nametable `index` (0..=3) rendered as 256×240 0x00RRGGBB.
    pub fn render_nametable(&self, index: usize) -> Vec<u32> {
        self.ppu()
            .map(|ppu| ppu.render_nametable(index))
            .unwrap_or_default()
    }

    /// The nametable PPUCTRL currently selects, as the screen image.
    pub fn screen(&self) -> Vec<u32> {
        let index = self.ppu().map_or(0, |ppu| ppu.ctrl().nametable() as usize);
        self.render_nametable(index)
    }
}
