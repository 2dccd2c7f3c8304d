use crate::cpu::{Bus, Cpu};
use crate::Result;

/// High page used by LDH.
const HIGH_PAGE: u16 = 0xFF00;

impl Cpu {
    pub(super) fn exec_ld_rr_d16<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0x01 | 0x11 | 0x21 | 0x31));
        let value = self.fetch16(bus)?;
        match (opcode >> 4) & 0x03 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            _ => self.regs.sp = value,
        }
        Ok(())
    }

    pub(super) fn exec_ld_r_d8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        let value = self.fetch8(bus)?;
        self.write_reg8(bus, (opcode >> 3) & 0x07, value)
    }

    /// LD r,r' and the (HL) forms. 0x76 is HALT and never reaches here.
    pub(super) fn exec_ld_r_r<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!((0x40..=0x7F).contains(&opcode) && opcode != 0x76);
        let value = self.read_reg8(bus, opcode & 0x07)?;
        self.write_reg8(bus, (opcode >> 3) & 0x07, value)
    }

    /// Address for the (BC), (DE), (HL+), (HL-) forms, applying the HL step.
    fn indirect_address(&mut self, opcode: u8) -> u16 {
        match (opcode >> 4) & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            _ => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    pub(super) fn exec_ld_indirect_a<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0x02 | 0x12 | 0x22 | 0x32));
        let address = self.indirect_address(opcode);
        self.write_cycle(bus, address, self.regs.a)
    }

    pub(super) fn exec_ld_a_indirect<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        debug_assert!(matches!(opcode, 0x0A | 0x1A | 0x2A | 0x3A));
        let address = self.indirect_address(opcode);
        self.regs.a = self.read_cycle(bus, address)?;
        Ok(())
    }

    pub(super) fn exec_ld_a16_sp<B: Bus>(&mut self, bus: &mut B) -> Result<()> {
        let address = self.fetch16(bus)?;
        let [hi, lo] = self.regs.sp.to_be_bytes();
        self.write_cycle(bus, address, lo)?;
        self.write_cycle(bus, address.wrapping_add(1), hi)
    }

    pub(super) fn exec_ldh_a8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        let address = HIGH_PAGE | self.fetch8(bus)? as u16;
        if opcode == 0xE0 {
            self.write_cycle(bus, address, self.regs.a)
        } else {
            self.regs.a = self.read_cycle(bus, address)?;
            Ok(())
        }
    }

    pub(super) fn exec_ldh_c<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        let address = HIGH_PAGE | self.regs.c as u16;
        if opcode == 0xE2 {
            self.write_cycle(bus, address, self.regs.a)
        } else {
            self.regs.a = self.read_cycle(bus, address)?;
            Ok(())
        }
    }

    pub(super) fn exec_ld_a16_a<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<()> {
        let address = self.fetch16(bus)?;
        if opcode == 0xEA {
            self.write_cycle(bus, address, self.regs.a)
        } else {
            self.regs.a = self.read_cycle(bus, address)?;
            Ok(())
        }
    }

    /// LD HL,SP+e: 3 cycles, flags from the low byte.
    pub(super) fn exec_ld_hl_sp_e<B: Bus>(&mut self, bus: &mut B) -> Result<()> {
        let offset = self.fetch8(bus)?;
        let value = self.alu_add_sp_signed(offset);
        self.idle_cycle();
        self.regs.set_hl(value);
        Ok(())
    }

    pub(super) fn exec_ld_sp_hl(&mut self) -> Result<()> {
        self.idle_cycle();
        self.regs.sp = self.regs.hl();
        Ok(())
    }
}
