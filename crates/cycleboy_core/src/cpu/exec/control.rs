use crate::cpu::{Bus, Cpu};
use crate::Result;

impl Cpu {
    pub(super) fn exec_jr_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0x20 | 0x28 | 0x30 | 0x38));
        self.jr(bus, self.condition(opcode >> 3))
    }

    pub(super) fn exec_jp_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0xC2 | 0xCA | 0xD2 | 0xDA));
        self.jp(bus, self.condition(opcode >> 3))
    }

    /// JP HL: 1 cycle.
    pub(super) fn exec_jp_hl(&mut self) -> Result<()> {
        self.regs.pc = self.regs.hl();
        Ok(())
    }

    pub(super) fn exec_call_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0xC4 | 0xCC | 0xD4 | 0xDC));
        self.call(bus, self.condition(opcode >> 3))
    }

    /// RET cc: 5 cycles taken, 2 not taken. The condition check itself
    /// costs a cycle.
    pub(super) fn exec_ret_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0xC0 | 0xC8 | 0xD0 | 0xD8));
        self.idle_cycle();
        if self.condition(opcode >> 3) {
            self.ret(bus)?;
        }
        Ok(())
    }

    /// RETI enables IME with no delay.
    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) -> Result<()> {
        self.ret(bus)?;
        self.ime = true;
        Ok(())
    }
}
