use crate::cpu::{Bus, Cpu, Flag};
use crate::Result;

impl Cpu {
    pub(super) fn exec_alu_r<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!((0x80..=0xBF).contains(&opcode));
        let value = self.read_reg8(bus, opcode & 0x07)?;
        self.alu_op(opcode >> 3, value);
        Ok(())
    }

    pub(super) fn exec_alu_d8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        let value = self.fetch8(bus)?;
        self.alu_op(opcode >> 3, value);
        Ok(())
    }

    /// ADD SP,e: 4 cycles, flags from the low byte.
    pub(super) fn exec_add_sp_e<B: Bus>(&mut self, bus: &mut B) -> Result<()> {
        let offset = self.fetch8(bus)?;
        self.regs.sp = self.alu_add_sp_signed(offset);
        self.idle_cycle();
        self.idle_cycle();
        Ok(())
    }

    /// RLCA, RRCA, RLA, RRA: like their CB forms but Z is always cleared.
    pub(super) fn exec_rotate_a(&mut self, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0x07 | 0x0F | 0x17 | 0x1F));
        self.regs.a = self.alu_shift(opcode >> 3, self.regs.a);
        self.set_flag(Flag::Z, false);
        Ok(())
    }

    pub(super) fn exec_daa(&mut self) -> Result<()> {
        self.alu_daa();
        Ok(())
    }

    /// CPL: Z and C kept, N and H set.
    pub(super) fn exec_cpl(&mut self) -> Result<()> {
        self.regs.a = !self.regs.a;
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, true);
        Ok(())
    }

    /// SCF: Z kept, N and H cleared, C set.
    pub(super) fn exec_scf(&mut self) -> Result<()> {
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, true);
        Ok(())
    }

    /// CCF: Z kept, N and H cleared, C toggled.
    pub(super) fn exec_ccf(&mut self) -> Result<()> {
        let carry = self.get_flag(Flag::C);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, !carry);
        Ok(())
    }
}
