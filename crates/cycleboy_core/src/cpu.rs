//! Sharp LR35902 instruction engine.
//!
//! Every bus access goes through a cycle-charging wrapper (`read_cycle`,
//! `write_cycle`, `idle_cycle`) that advances the shared clock by one
//! machine cycle before the access reaches the bus. Instruction timing is
//! therefore the sum of the accesses an instruction performs plus its
//! explicit internal delays, and memory-mapped side effects observe the
//! clock value at which they really happen.

mod alu;
mod bus;
mod cb;
mod exec;
mod helpers;
mod init;
mod interrupts;
mod regs;

pub use bus::Bus;
pub use regs::{Flag, Registers};

use crate::clock::SystemClock;
use crate::machine::InterruptController;
use crate::Result;

/// What a call to `Cpu::execute` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Execution {
    /// Decoded and executed one instruction.
    Instruction { opcode: u8 },
    /// Idled one machine cycle in HALT.
    Halted,
    /// In STOP; no time passed.
    Stopped,
}

pub struct Cpu {
    pub regs: Registers,
    clock: SystemClock,
    interrupts: InterruptController,
    ime: bool,
    /// EI was executed by the current instruction.
    ime_enable_pending: bool,
    /// IME turns on once the instruction after EI completes.
    ime_enable_delay: bool,
    halted: bool,
    stopped: bool,
    /// Next opcode fetch does not increment PC.
    halt_bug: bool,
}

impl Cpu {
    pub fn ime(&self) -> bool {
        self.ime
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Leave STOP mode. Called by the machine on a joypad press.
    pub fn resume(&mut self) {
        if self.stopped {
            log::debug!("CPU leaving STOP at PC=0x{:04X}", self.regs.pc);
        }
        self.stopped = false;
    }

    /// Run one instruction, or one idle cycle while halted.
    ///
    /// Interrupts are not considered here; the caller services them first
    /// through `service_interrupts`.
    pub fn execute<B: Bus>(&mut self, bus: &mut B) -> Result<Execution> {
        if self.stopped {
            return Ok(Execution::Stopped);
        }
        if self.halted {
            self.idle_cycle();
            return Ok(Execution::Halted);
        }

        let pc = self.regs.pc;
        let opcode = self.fetch8(bus)?;
        self.exec_opcode(bus, opcode, pc)?;
        self.promote_ime();
        Ok(Execution::Instruction { opcode })
    }

    fn promote_ime(&mut self) {
        if self.ime_enable_delay {
            self.ime_enable_delay = false;
            self.ime = true;
        }
        if self.ime_enable_pending {
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }

    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        self.regs.flag(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        self.regs.set_flag(flag, value);
    }

    /// Set Z, N, H, C at once.
    #[inline]
    pub(crate) fn set_flags(&mut self, z: bool, n: bool, h: bool, c: bool) {
        self.regs.f = ((z as u8) << Flag::Z as u8)
            | ((n as u8) << Flag::N as u8)
            | ((h as u8) << Flag::H as u8)
            | ((c as u8) << Flag::C as u8);
    }
}
