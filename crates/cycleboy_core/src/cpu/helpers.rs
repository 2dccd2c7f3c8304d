use super::{Bus, Cpu};
use crate::Result;

impl Cpu {
    /// Read an 8-bit operand by its opcode encoding:
    /// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A.
    #[inline]
    pub(super) fn read_reg8<B: Bus>(&mut self, bus: &mut B, index: u8) -> Result<u8> {
        Ok(match index {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            6 => return self.read_cycle(bus, self.regs.hl()),
            7 => self.regs.a,
            _ => unreachable!("register index {index} out of range"),
        })
    }

    #[inline]
    pub(super) fn write_reg8<B: Bus>(&mut self, bus: &mut B, index: u8, value: u8) -> Result<()> {
        match index {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            6 => return self.write_cycle(bus, self.regs.hl(), value),
            7 => self.regs.a = value,
            _ => unreachable!("register index {index} out of range"),
        }
        Ok(())
    }

    #[inline]
    pub(super) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> Result<u8> {
        let value = self.read_cycle(bus, self.regs.pc)?;
        if self.halt_bug {
            self.halt_bug = false;
        } else {
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
        Ok(value)
    }

    /// Little-endian immediate: low byte first.
    #[inline]
    pub(super) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> Result<u16> {
        let lo = self.fetch8(bus)?;
        let hi = self.fetch8(bus)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// High byte goes to SP-1 first, then low byte to SP-2.
    pub(super) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) -> Result<()> {
        let [hi, lo] = value.to_be_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write_cycle(bus, self.regs.sp, hi)?;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write_cycle(bus, self.regs.sp, lo)
    }

    pub(super) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> Result<u16> {
        let lo = self.read_cycle(bus, self.regs.sp)?;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.read_cycle(bus, self.regs.sp)?;
        self.regs.sp = self.regs.sp.wrapping_add(1);
        Ok(u16::from_le_bytes([lo, hi]))
    }

    #[inline]
    pub(super) fn condition(&self, cc: u8) -> bool {
        use super::Flag;
        match cc & 0x03 {
            0 => !self.get_flag(Flag::Z),
            1 => self.get_flag(Flag::Z),
            2 => !self.get_flag(Flag::C),
            _ => self.get_flag(Flag::C),
        }
    }

    /// JR: 3 cycles taken, 2 not taken.
    pub(super) fn jr<B: Bus>(&mut self, bus: &mut B, taken: bool) -> Result<()> {
        let offset = self.fetch8(bus)? as i8;
        if taken {
            self.idle_cycle();
            self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
        }
        Ok(())
    }

    /// JP a16: 4 cycles taken, 3 not taken.
    pub(super) fn jp<B: Bus>(&mut self, bus: &mut B, taken: bool) -> Result<()> {
        let target = self.fetch16(bus)?;
        if taken {
            self.idle_cycle();
            self.regs.pc = target;
        }
        Ok(())
    }

    /// CALL a16: 6 cycles taken, 3 not taken.
    pub(super) fn call<B: Bus>(&mut self, bus: &mut B, taken: bool) -> Result<()> {
        let target = self.fetch16(bus)?;
        if taken {
            self.idle_cycle();
            self.push_u16(bus, self.regs.pc)?;
            self.regs.pc = target;
        }
        Ok(())
    }

    /// Pop PC and spend the internal cycle that follows.
    pub(super) fn ret<B: Bus>(&mut self, bus: &mut B) -> Result<()> {
        self.regs.pc = self.pop_u16(bus)?;
        self.idle_cycle();
        Ok(())
    }
}
