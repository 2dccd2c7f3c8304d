pub mod clock;
pub mod config;
pub mod cpu;
pub mod error;
pub mod machine;

pub use clock::{Clocked, SyncPoint, SystemClock};
pub use config::EmulatorConfig;
pub use cpu::{Cpu, Execution};
pub use error::{CartridgeError, EmulationError, Result};
pub use machine::{
    Buttons, Cartridge, CartridgeHeader, FrameBuffer, FrameSink, GameBoy, InputSource,
    Interrupt, InterruptController, Interconnect, MemoryMapped, ProfileReport, Profiler,
    SerialSink,
};

/// Logical screen width in pixels for the Game Boy DMG.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
/// Master clock frequency in T-states per second.
pub const CLOCK_HZ: u64 = 4_194_304;
/// T-states in one full video frame (154 scanlines of 456 cycles).
pub const CYCLES_PER_FRAME: u64 = 70_224;
