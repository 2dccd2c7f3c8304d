use super::{Bus, Cpu, Flag};
use crate::Result;

impl Cpu {
    /// CB-prefixed table: shifts/rotates, BIT, RES, SET.
    ///
    /// Register forms take 2 machine cycles, BIT n,(HL) takes 3 and the
    /// read-modify-write (HL) forms take 4.
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B) -> Result<()> {
        let cb = self.fetch8(bus)?;
        let group = cb >> 6;
        let bit = (cb >> 3) & 0x07;
        let target = cb & 0x07;

        let value = self.read_reg8(bus, target)?;
        let result = match group {
            0 => self.alu_shift(bit, value),
            1 => {
                self.set_flag(Flag::Z, value & (1 << bit) == 0);
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, true);
                return Ok(());
            }
            2 => value & !(1 << bit),
            _ => value | (1 << bit),
        };
        self.write_reg8(bus, target, result)
    }
}
