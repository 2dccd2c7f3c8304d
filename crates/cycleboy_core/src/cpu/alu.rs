use super::{Cpu, Flag};

impl Cpu {
    /// ADD (`with_carry` false) or ADC into A.
    pub(super) fn alu_add(&mut self, value: u8, with_carry: bool) {
        let a = self.regs.a;
        let carry = (with_carry && self.get_flag(Flag::C)) as u8;
        let result = a.wrapping_add(value).wrapping_add(carry);
        let half = (a & 0x0F) + (value & 0x0F) + carry > 0x0F;
        let full = a as u16 + value as u16 + carry as u16 > 0xFF;
        self.regs.a = result;
        self.set_flags(result == 0, false, half, full);
    }

    /// SUB (`with_carry` false) or SBC from A.
    pub(super) fn alu_sub(&mut self, value: u8, with_carry: bool) {
        let result = self.compare(value, with_carry);
        self.regs.a = result;
    }

    /// CP: flags of A - value, A unchanged.
    pub(super) fn alu_cp(&mut self, value: u8) {
        self.compare(value, false);
    }

    fn compare(&mut self, value: u8, with_carry: bool) -> u8 {
        let a = self.regs.a;
        let carry = (with_carry && self.get_flag(Flag::C)) as u8;
        let result = a.wrapping_sub(value).wrapping_sub(carry);
        let half = (a & 0x0F) < (value & 0x0F) + carry;
        let borrow = (a as u16) < value as u16 + carry as u16;
        self.set_flags(result == 0, true, half, borrow);
        result
    }

    pub(super) fn alu_and(&mut self, value: u8) {
        self.regs.a &= value;
        self.set_flags(self.regs.a == 0, false, true, false);
    }

    pub(super) fn alu_or(&mut self, value: u8) {
        self.regs.a |= value;
        self.set_flags(self.regs.a == 0, false, false, false);
    }

    pub(super) fn alu_xor(&mut self, value: u8) {
        self.regs.a ^= value;
        self.set_flags(self.regs.a == 0, false, false, false);
    }

    /// Dispatch one of the eight accumulator operations by opcode bits 3-5.
    pub(super) fn alu_op(&mut self, operation: u8, value: u8) {
        match operation & 0x07 {
            0 => self.alu_add(value, false),
            1 => self.alu_add(value, true),
            2 => self.alu_sub(value, false),
            3 => self.alu_sub(value, true),
            4 => self.alu_and(value),
            5 => self.alu_xor(value),
            6 => self.alu_or(value),
            _ => self.alu_cp(value),
        }
    }

    /// BCD correction of A after an ADD/ADC (N clear) or SUB/SBC (N set).
    ///
    /// Leaves N alone, clears H, and sets C when the high digit needed
    /// correcting.
    pub(super) fn alu_daa(&mut self) {
        let mut a = self.regs.a;
        let subtract = self.get_flag(Flag::N);
        let mut correction = 0u8;
        let mut carry = false;

        if self.get_flag(Flag::H) || (!subtract && (a & 0x0F) > 0x09) {
            correction |= 0x06;
        }
        if self.get_flag(Flag::C) || (!subtract && a > 0x99) {
            correction |= 0x60;
            carry = true;
        }

        a = if subtract {
            a.wrapping_sub(correction)
        } else {
            a.wrapping_add(correction)
        };

        self.regs.a = a;
        self.set_flags(a == 0, subtract, false, carry);
    }

    /// INC r / INC (HL). C is untouched.
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, value & 0x0F == 0x0F);
        result
    }

    /// DEC r / DEC (HL). C is untouched.
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, value & 0x0F == 0);
        result
    }

    /// ADD HL,rr: Z untouched, H from bit 11, C from bit 15.
    pub(super) fn alu_add16_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.set_flag(Flag::C, hl as u32 + value as u32 > 0xFFFF);
        self.regs.set_hl(hl.wrapping_add(value));
    }

    /// SP plus a signed immediate, shared by ADD SP,e and LD HL,SP+e.
    ///
    /// H and C come from the unsigned addition of the low byte, not from
    /// the 16-bit result. Z and N are cleared.
    pub(super) fn alu_add_sp_signed(&mut self, offset: u8) -> u16 {
        let sp = self.regs.sp;
        let low = sp as u8;
        let half = (low & 0x0F) + (offset & 0x0F) > 0x0F;
        let carry = low as u16 + offset as u16 > 0xFF;
        self.set_flags(false, false, half, carry);
        sp.wrapping_add(offset as i8 as u16)
    }

    /// Shift and rotate group selected by CB opcode bits 3-5.
    pub(super) fn alu_shift(&mut self, operation: u8, value: u8) -> u8 {
        let carry_in = self.get_flag(Flag::C) as u8;
        let (result, carry) = match operation & 0x07 {
            // RLC
            0 => (value.rotate_left(1), value & 0x80 != 0),
            // RRC
            1 => (value.rotate_right(1), value & 0x01 != 0),
            // RL
            2 => ((value << 1) | carry_in, value & 0x80 != 0),
            // RR
            3 => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
            // SLA
            4 => (value << 1, value & 0x80 != 0),
            // SRA
            5 => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            // SWAP
            6 => (value.rotate_left(4), false),
            // SRL
            _ => (value >> 1, value & 0x01 != 0),
        };
        self.set_flags(result == 0, false, false, carry);
        result
    }
}
