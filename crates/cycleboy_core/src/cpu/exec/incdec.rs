use crate::cpu::{Bus, Cpu};
use crate::Result;

impl Cpu {
    pub(super) fn exec_inc8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!(
            matches!(opcode, 0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C),
            "unexpected INC r opcode {opcode:#04x}"
        );
        let reg = (opcode >> 3) & 0x07;
        let value = self.read_reg8(bus, reg)?;
        let result = self.alu_inc8(value);
        self.write_reg8(bus, reg, result)
    }

    pub(super) fn exec_dec8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!(
            matches!(opcode, 0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D),
            "unexpected DEC r opcode {opcode:#04x}"
        );
        let reg = (opcode >> 3) & 0x07;
        let value = self.read_reg8(bus, reg)?;
        let result = self.alu_dec8(value);
        self.write_reg8(bus, reg, result)
    }

    fn pair_by_index(&self, index: u8) -> u16 {
        match index & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.sp,
        }
    }

    fn set_pair_by_index(&mut self, index: u8, value: u16) {
        match index & 0x03 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            _ => self.regs.sp = value,
        }
    }

    /// INC rr: 2 cycles, no flags.
    pub(super) fn exec_inc16(&mut self, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0x03 | 0x13 | 0x23 | 0x33));
        let index = opcode >> 4;
        self.idle_cycle();
        self.set_pair_by_index(index, self.pair_by_index(index).wrapping_add(1));
        Ok(())
    }

    /// DEC rr: 2 cycles, no flags.
    pub(super) fn exec_dec16(&mut self, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0x0B | 0x1B | 0x2B | 0x3B));
        let index = opcode >> 4;
        self.idle_cycle();
        self.set_pair_by_index(index, self.pair_by_index(index).wrapping_sub(1));
        Ok(())
    }

    /// ADD HL,rr: 2 cycles.
    pub(super) fn exec_add_hl_rr(&mut self, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0x09 | 0x19 | 0x29 | 0x39));
        let value = self.pair_by_index(opcode >> 4);
        self.idle_cycle();
        self.alu_add16_hl(value);
        Ok(())
    }
}
