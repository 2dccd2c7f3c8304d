use super::{Cpu, Registers};
use crate::clock::SystemClock;
use crate::machine::InterruptController;

impl Cpu {
    /// Power-on state: everything zero, execution starts at 0x0000 where
    /// the boot ROM lives.
    pub fn new(clock: SystemClock, interrupts: InterruptController) -> Self {
        Self {
            regs: Registers::default(),
            clock,
            interrupts,
            ime: false,
            ime_enable_pending: false,
            ime_enable_delay: false,
            halted: false,
            stopped: false,
            halt_bug: false,
        }
    }

    /// Registers as the DMG boot ROM leaves them when it jumps to 0x0100.
    pub fn apply_post_boot_state(&mut self) {
        self.regs.set_af(0x01B0);
        self.regs.set_bc(0x0013);
        self.regs.set_de(0x00D8);
        self.regs.set_hl(0x014D);
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
        self.ime = false;
    }
}
