//! Atari 2600 emulator binary.
//!
//! Headless: runs a cartridge for a number of frames or up to a clock
//! limit, then optionally writes a screenshot and a save state.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use emu_atari_2600::{Atari2600, AtariConfig, CartridgeKind, capture};
use log::{LevelFilter, info, warn};

#[derive(Parser, Debug)]
#[command(name = "emu-atari-2600", about = "Cycle-resolution Atari 2600 emulator")]
struct Cli {
    /// Cartridge image.
    #[arg(value_name = "CARTRIDGE")]
    cartridge: PathBuf,

    /// Bank-switching scheme: default, fallback, pb, mnet, cbs, e, fe,
    /// super, f4 or single_bank.
    #[arg(short = 'c', long = "cart-type", default_value = "default")]
    cart_type: CartridgeKind,

    /// Stop once the clock reaches this value; 0 runs until quit.
    #[arg(short = 's', long = "stop-clock", default_value_t = 0)]
    stop_clock: u64,

    /// Run this many frames instead of using the stop clock.
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Write the final display as a PNG.
    #[arg(long, value_name = "PATH")]
    screenshot: Option<PathBuf>,

    /// Write a save state when the run ends.
    #[arg(long, value_name = "PATH")]
    save_state: Option<PathBuf>,

    /// Restore a save state before running.
    #[arg(long, value_name = "PATH")]
    load_state: Option<PathBuf>,

    /// Log every instruction with the registers and clock.
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug {
        builder.filter(Some("cpu"), LevelFilter::Trace);
    }
    builder.init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = AtariConfig {
        rom_data: fs::read(&cli.cartridge)?,
        cartridge: cli.cart_type,
        stop_clock: (cli.stop_clock != 0).then_some(cli.stop_clock),
    };
    let mut atari = Atari2600::new(&config)?;

    if let Some(ref path) = cli.load_state {
        atari.load_state(path)?;
    }

    let result = match cli.frames {
        Some(frames) => atari.run_frames(frames).map(|done| {
            if done < frames {
                warn!("only {done} of {frames} frames completed");
            }
        }),
        None => atari.run(),
    };
    if let Err(fault) = result {
        return Err(format!("{fault}\n  at {}", atari.trace_line()).into());
    }
    info!(
        "finished at clock {} after {} frames",
        atari.clock(),
        atari.frame_count()
    );

    if let Some(ref path) = cli.screenshot {
        capture::save_screenshot(&atari, path)?;
        eprintln!("Screenshot saved to {}", path.display());
    }
    if let Some(ref path) = cli.save_state {
        atari.save_state(path)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
