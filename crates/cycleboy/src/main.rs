use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cycleboy_core::{EmulatorConfig, FrameBuffer, GameBoy, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Grey levels for the four DMG shades, lightest first.
const SHADES: [u8; 4] = [0xFF, 0xAA, 0x55, 0x00];

#[derive(Parser)]
#[command(version, about = "Run a Game Boy ROM headless")]
struct Args {
    /// Path to ROM file
    rom: PathBuf,

    /// Path to a 256-byte DMG boot ROM
    #[arg(long)]
    boot_rom: Option<PathBuf>,

    /// Stop after this many frames instead of running until an error
    #[arg(long)]
    frames: Option<u64>,

    /// Echo serial output to stdout
    #[arg(long)]
    serial: bool,

    /// Write the last frame to this path as a binary PGM
    #[arg(long)]
    dump_frame: Option<PathBuf>,

    /// Print execution statistics when done
    #[arg(long)]
    profile: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("Failed to read ROM {}", args.rom.display()))?;
    let config = match &args.boot_rom {
        Some(path) => {
            let image = std::fs::read(path)
                .with_context(|| format!("Failed to read boot ROM {}", path.display()))?;
            EmulatorConfig::builder()
                .boot_rom(image)
                .profile(args.profile)
                .build()
        }
        None => EmulatorConfig::builder().profile(args.profile).build(),
    };

    let mut gb = GameBoy::from_rom(&rom, config).context("Failed to start machine")?;
    match args.frames {
        Some(frames) => log::info!("Running {frames} frames of {}", args.rom.display()),
        None => log::info!("Running {}", args.rom.display()),
    }
    if args.serial {
        gb.set_serial_sink(|byte: u8| {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(&[byte]);
            let _ = stdout.flush();
        });
    }

    for frame in frames(args.frames) {
        gb.run_frame().with_context(|| {
            format!(
                "Emulation stopped in frame {frame} at PC=0x{:04X}",
                gb.cpu().regs.pc
            )
        })?;
        if gb.cpu().is_stopped() {
            log::info!("CPU entered STOP in frame {frame}, ending run");
            break;
        }
    }

    if let Some(path) = &args.dump_frame {
        write_pgm(path, &gb.frame_buffer())?;
        log::info!("Wrote frame to {}", path.display());
    }

    if let Some(report) = gb.profile_report() {
        println!("{report:#?}");
    }
    Ok(())
}

/// Frame indices to run: `limit` of them, or without end.
fn frames(limit: Option<u64>) -> impl Iterator<Item = u64> {
    (0u64..).take_while(move |&frame| limit.map_or(true, |limit| frame < limit))
}

fn write_pgm(path: &Path, frame: &FrameBuffer) -> Result<()> {
    let mut image = format!("P5\n{SCREEN_WIDTH} {SCREEN_HEIGHT}\n255\n").into_bytes();
    image.extend(frame.as_slice().iter().map(|&shade| SHADES[(shade & 0x03) as usize]));
    std::fs::write(path, image).with_context(|| format!("Failed to write {}", path.display()))
}
