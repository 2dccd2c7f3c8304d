mod cartridge;
mod gameboy;
mod interconnect;
mod interrupts;
mod joypad;
mod memory;
mod profiler;
mod serial;
mod timer;
mod video;

pub use cartridge::{Cartridge, CartridgeHeader};
pub use gameboy::GameBoy;
pub use interconnect::{BusRequest, Handler, Interconnect, MemoryMapped, Remap, Trigger, TriggeredMapping};
pub use interrupts::{Interrupt, InterruptController};
pub use joypad::{Buttons, InputSource, Joypad};
pub use memory::{BootRom, Ram, SoundStub, Unmapped, Unusable};
pub use profiler::{ProfileReport, Profiler};
pub use serial::{Serial, SerialSink};
pub use timer::Timer;
pub use video::{FrameBuffer, FrameSink, Mode, VideoController};

#[cfg(test)]
mod tests;
