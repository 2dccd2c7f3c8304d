use crate::cpu::{Bus, Cpu};
use crate::Result;

impl Cpu {
    /// HALT. With an interrupt already pending the CPU does not halt:
    /// - IME clear: the following opcode byte is read twice.
    /// - IME about to be set by a preceding EI: the interrupt is taken with
    ///   the HALT itself as the return address.
    pub(super) fn exec_halt(&mut self) -> Result<()> {
        if self.interrupts.pending().is_empty() || self.ime {
            self.halted = true;
        } else if self.ime_enable_delay {
            log::debug!("HALT after EI with pending interrupt at PC=0x{:04X}", self.regs.pc);
            self.regs.pc = self.regs.pc.wrapping_sub(1);
        } else {
            log::debug!("HALT bug at PC=0x{:04X}", self.regs.pc);
            self.halt_bug = true;
        }
        Ok(())
    }

    /// STOP is two bytes long; the second is discarded.
    pub(super) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> Result<()> {
        let _padding = self.fetch8(bus)?;
        log::debug!("CPU entering STOP at PC=0x{:04X}", self.regs.pc);
        self.stopped = true;
        Ok(())
    }

    pub(super) fn exec_di(&mut self) -> Result<()> {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        Ok(())
    }

    pub(super) fn exec_ei(&mut self) -> Result<()> {
        self.ime_enable_pending = true;
        Ok(())
    }
}
