use super::{Bus, Cpu};
use crate::machine::Interrupt;
use crate::Result;

impl Cpu {
    /// Called before every fetch.
    ///
    /// Any pending interrupt ends HALT, whatever IME says. With IME set the
    /// highest-priority pending source is dispatched: two internal cycles,
    /// PC pushed high byte first, one more internal cycle, then PC jumps to
    /// the vector. Returns the interrupt that was dispatched.
    pub fn service_interrupts<B: Bus>(&mut self, bus: &mut B) -> Result<Option<Interrupt>> {
        let pending = self.interrupts.pending();
        let Some(interrupt) = pending.highest_priority() else {
            return Ok(None);
        };

        self.halted = false;
        if !self.ime {
            return Ok(None);
        }

        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        self.interrupts.acknowledge(interrupt);

        self.idle_cycle();
        self.idle_cycle();
        let return_address = self.regs.pc;
        self.push_u16(bus, return_address)?;
        self.idle_cycle();
        self.regs.pc = interrupt.vector();

        log::debug!(
            "Interrupt {:?}: 0x{:04X} -> 0x{:04X}",
            interrupt,
            return_address,
            self.regs.pc
        );
        Ok(Some(interrupt))
    }
}
