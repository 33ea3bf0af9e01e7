//! Fidelis driver.
//!
//! Opens a window and runs a cartridge at ~60 fps, or runs headless for a fixed number of frames
//! and prints the final register state.
//! Usage: fidelis [--rom path/to/game.nes] [--headless --frames N] [--nestest --debug]

use std::path::PathBuf;

use ansi_term::Colour::{Green, Red, Yellow};
use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use fidelis::config::{Config, IllegalOpcodePolicy, NESTEST_ENTRY};
use fidelis::system::System;

#[derive(Parser, Debug)]
#[command(name = "fidelis", version, about = "NES hardware core")]
struct Args {
    /// iNES ROM to load at startup
    #[arg(short, long)]
    rom: Option<PathBuf>,

    /// Log a nestest-style line per instruction
    #[arg(short, long)]
    debug: bool,

    /// What to do on an opcode with no handler
    #[arg(long, value_enum, default_value_t = IllegalOpcodePolicy::Halt)]
    illegal_opcode: IllegalOpcodePolicy,

    /// Window scale (1, 2, 4 or 8)
    #[arg(long, default_value_t = 2)]
    scale: usize,

    /// Run without a window
    #[arg(long, requires = "rom")]
    headless: bool,

    /// Frames to run in headless mode
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Start at $C000 with CYC:7 so the --debug trace lines up with nestest.log
    #[arg(long, requires = "rom")]
    nestest: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "fidelis=debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config {
        illegal_opcode: args.illegal_opcode,
        debug: args.debug,
        scale: args.scale,
        entry_point: args.nestest.then_some(NESTEST_ENTRY),
    };
    let mut system = System::new(config);

    if let Some(path) = &args.rom {
        system
            .load_cart(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        println!("{} loaded {}", Green.bold().paint("INFO"), path.display());
    }

    if args.headless {
        return run_headless(&mut system, args.frames);
    }
    run_window(&mut system)
}

fn run_headless(system: &mut System, frames: u64) -> Result<()> {
    for frame in 0..frames {
        if let Err(err) = system.run_frame() {
            eprintln!("{} frame {frame}: {err}", Red.bold().paint("ERROR"));
            println!("{}", system.registers());
            bail!("halted after {frame} frames");
        }
    }
    info!(frames; "headless run finished");
    println!("{}", system.registers());
    Ok(())
}

#[cfg(feature = "display")]
fn run_window(system: &mut System) -> Result<()> {
    use std::time::{Duration, Instant};

    use fidelis::ppu::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
    use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

    /// NES runs at ~60.0988 Hz (NTSC). Target one frame per 16.67 ms for ~60 fps.
    const FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);

    let scale = match system.config().scale {
        1 => Scale::X1,
        4 => Scale::X4,
        8 => Scale::X8,
        _ => Scale::X2,
    };
    let mut window = Window::new(
        "Fidelis",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        WindowOptions {
            resize: true,
            scale,
            ..WindowOptions::default()
        },
    )
    .context("failed to create window")?;

    let blank = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];
    if !system.has_cartridge() {
        println!("{} press O to open a ROM", Yellow.bold().paint("INFO"));
    }

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let frame_start = Instant::now();

        #[cfg(feature = "dialog")]
        if window.is_key_pressed(Key::O, KeyRepeat::No) {
            system.open_cart_dialog().context("failed to start ROM picker")?;
        }
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            system.reset();
        }
        if window.is_key_pressed(Key::D, KeyRepeat::No) {
            let enabled = !system.debug_mode();
            system.set_debug_mode(enabled);
        }

        match system.poll_cart_dialog() {
            Some(Ok(path)) => println!("{} loaded {}", Green.bold().paint("INFO"), path.display()),
            Some(Err(err)) => eprintln!("{} {err}", Red.bold().paint("ERROR")),
            None => {}
        }

        if system.is_running() {
            if let Err(err) = system.run_frame() {
                eprintln!("{} {err}", Red.bold().paint("ERROR"));
                eprintln!("press R to reset or O to load another ROM");
            }
        }

        let screen = if system.has_cartridge() {
            system.screen()
        } else {
            blank.clone()
        };
        window
            .update_with_buffer(&screen, SCREEN_WIDTH, SCREEN_HEIGHT)
            .context("failed to update window")?;

        // Pace to ~60 fps so we don't burn CPU (emulation is far faster than real NES)
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }
    Ok(())
}

#[cfg(not(feature = "display"))]
fn run_window(_system: &mut System) -> Result<()> {
    bail!("built without the `display` feature; use --headless --rom <PATH>")
}
