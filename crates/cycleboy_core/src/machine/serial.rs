//! Serial shift register (SB/SC).
//!
//! Only the internal clock is driven: an 8192 Hz tick derived from the
//! master clock shifts one bit per tick. No link partner is attached, so
//! the incoming line reads high and the register fills with ones.

use super::interconnect::MemoryMapped;
use super::interrupts::{Interrupt, InterruptController};
use crate::clock::{Clocked, SyncPoint, SystemClock};
use crate::{EmulationError, Result, CLOCK_HZ};

pub const SB: u16 = 0xFF01;
pub const SC: u16 = 0xFF02;

const SERIAL_HZ: u64 = 8192;
/// T-states between two serial clock ticks.
pub const TICK_PERIOD: u64 = CLOCK_HZ / SERIAL_HZ;

const SC_START: u8 = 0x80;
const SC_INTERNAL_CLOCK: u8 = 0x01;
const SC_UNUSED: u8 = 0x7E;

/// Receives every byte whose transfer completed.
pub trait SerialSink {
    fn transfer_complete(&mut self, byte: u8);
}

impl<F: FnMut(u8)> SerialSink for F {
    fn transfer_complete(&mut self, byte: u8) {
        self(byte)
    }
}

pub struct Serial {
    sync: SyncPoint,
    interrupts: InterruptController,
    data: u8,
    control: u8,
    internal_clock: bool,
    running: bool,
    /// Byte latched when the transfer started.
    outgoing: u8,
    bits_transferred: u8,
    /// T-states accumulated towards the next 8192 Hz tick.
    divider: u64,
    sink: Option<Box<dyn SerialSink>>,
}

impl Serial {
    pub fn new(clock: SystemClock, interrupts: InterruptController) -> Self {
        Self {
            sync: SyncPoint::new(clock),
            interrupts,
            data: 0,
            control: 0,
            internal_clock: false,
            running: false,
            outgoing: 0,
            bits_transferred: 0,
            divider: 0,
            sink: None,
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn SerialSink>) {
        self.sink = Some(sink);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self) {
        self.running = true;
        self.bits_transferred = 0;
        self.outgoing = self.data;
    }

    fn shift(&mut self) {
        self.data = (self.data << 1) | 1;
        self.bits_transferred += 1;
        if self.bits_transferred == 8 {
            self.complete();
        }
    }

    fn complete(&mut self) {
        self.running = false;
        self.control &= !SC_START;
        log::debug!("Serial transfer complete: 0x{:02X}", self.outgoing);
        if let Some(sink) = self.sink.as_mut() {
            sink.transfer_complete(self.outgoing);
        }
        self.interrupts.request(Interrupt::SERIAL);
    }
}

impl Clocked for Serial {
    fn sync_point(&mut self) -> &mut SyncPoint {
        &mut self.sync
    }

    fn advance(&mut self, cycles: u64) {
        self.divider += cycles;
        let ticks = self.divider / TICK_PERIOD;
        self.divider %= TICK_PERIOD;
        if !(self.running && self.internal_clock) {
            return;
        }
        for _ in 0..ticks {
            self.shift();
            if !self.running {
                break;
            }
        }
    }
}

impl MemoryMapped for Serial {
    fn read(&mut self, address: u16) -> Result<u8> {
        self.synchronize();
        match address {
            SB if self.running => Ok(0xFF),
            SB => Ok(self.data),
            SC => Ok(self.control | SC_UNUSED),
            _ => Err(EmulationError::UnhandledRegister {
                component: "serial",
                address,
            }),
        }
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        self.synchronize();
        match address {
            SB => self.data = value,
            SC => {
                self.control = value & (SC_START | SC_INTERNAL_CLOCK);
                self.internal_clock = (value & SC_INTERNAL_CLOCK) != 0;
                if (value & SC_START) != 0 {
                    self.start();
                } else {
                    self.running = false;
                }
            }
            _ => {
                return Err(EmulationError::UnhandledRegister {
                    component: "serial",
                    address,
                })
            }
        }
        Ok(())
    }
}
