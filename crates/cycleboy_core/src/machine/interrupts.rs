use std::cell::Cell;
use std::rc::Rc;

use bitflags::bitflags;

use super::interconnect::MemoryMapped;
use crate::{EmulationError, Result};

pub const IF_ADDRESS: u16 = 0xFF0F;
pub const IE_ADDRESS: u16 = 0xFFFF;

/// IF bits 5-7 are not backed by storage and always read as 1.
const IF_UNUSED: u8 = 0b1110_0000;

bitflags! {
    /// Interrupt sources in priority order (bit 0 is serviced first).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Interrupt: u8 {
        const VBLANK = 1 << 0;
        const LCD_STAT = 1 << 1;
        const TIMER = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

impl Interrupt {
    /// Handler address for a single interrupt source.
    pub fn vector(self) -> u16 {
        0x0040 + (self.bits().trailing_zeros() as u16) * 8
    }

    /// Highest-priority source contained in `self`.
    pub fn highest_priority(self) -> Option<Interrupt> {
        if self.is_empty() {
            None
        } else {
            Interrupt::from_bits(1 << self.bits().trailing_zeros())
        }
    }
}

#[derive(Debug, Default)]
struct Registers {
    flag: Cell<u8>,
    enable: Cell<u8>,
}

/// Owner of the IF and IE registers.
///
/// Peripherals hold clones of this handle and request interrupts by setting
/// IF bits; the CPU inspects `pending` before every fetch.
#[derive(Clone, Debug, Default)]
pub struct InterruptController {
    registers: Rc<Registers>,
}

impl InterruptController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self, interrupt: Interrupt) {
        let flag = &self.registers.flag;
        flag.set(flag.get() | interrupt.bits());
    }

    /// Clear one IF bit once the CPU has taken the interrupt.
    pub fn acknowledge(&self, interrupt: Interrupt) {
        let flag = &self.registers.flag;
        flag.set(flag.get() & !interrupt.bits());
    }

    /// Requested and enabled sources (`IE & IF`).
    pub fn pending(&self) -> Interrupt {
        Interrupt::from_bits_truncate(self.registers.flag.get() & self.registers.enable.get())
    }

    pub fn read_flag(&self) -> u8 {
        self.registers.flag.get() | IF_UNUSED
    }

    pub fn write_flag(&self, value: u8) {
        self.registers.flag.set(value & !IF_UNUSED);
    }

    pub fn read_enable(&self) -> u8 {
        self.registers.enable.get()
    }

    pub fn write_enable(&self, value: u8) {
        self.registers.enable.set(value);
    }
}

impl MemoryMapped for InterruptController {
    fn read(&mut self, address: u16) -> Result<u8> {
        match address {
            IF_ADDRESS => Ok(self.read_flag()),
            IE_ADDRESS => Ok(self.read_enable()),
            _ => Err(EmulationError::UnhandledRegister {
                component: "interrupt controller",
                address,
            }),
        }
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        match address {
            IF_ADDRESS => self.write_flag(value),
            IE_ADDRESS => self.write_enable(value),
            _ => {
                return Err(EmulationError::UnhandledRegister {
                    component: "interrupt controller",
                    address,
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_register_forces_top_bits() {
        let ic = InterruptController::new();
        assert_eq!(ic.read_flag(), 0xE0);
        ic.write_flag(0x00);
        assert_eq!(ic.read_flag(), 0xE0);
        ic.write_flag(0xFF);
        assert_eq!(ic.read_flag(), 0xFF);
        assert_eq!(ic.pending(), Interrupt::empty());
    }

    #[test]
    fn enable_register_is_plain_storage() {
        let mut ic = InterruptController::new();
        ic.write(IE_ADDRESS, 0xA5).unwrap();
        assert_eq!(ic.read(IE_ADDRESS).unwrap(), 0xA5);
    }

    #[test]
    fn clones_share_state() {
        let ic = InterruptController::new();
        let peripheral = ic.clone();
        ic.write_enable(0x1F);
        peripheral.request(Interrupt::TIMER);
        assert_eq!(ic.pending(), Interrupt::TIMER);
        assert_eq!(ic.read_flag(), 0xE4);
        ic.acknowledge(Interrupt::TIMER);
        assert!(peripheral.pending().is_empty());
    }

    #[test]
    fn priority_and_vectors() {
        let both = Interrupt::TIMER | Interrupt::SERIAL;
        assert_eq!(both.highest_priority(), Some(Interrupt::TIMER));
        assert_eq!(Interrupt::VBLANK.vector(), 0x40);
        assert_eq!(Interrupt::LCD_STAT.vector(), 0x48);
        assert_eq!(Interrupt::TIMER.vector(), 0x50);
        assert_eq!(Interrupt::SERIAL.vector(), 0x58);
        assert_eq!(Interrupt::JOYPAD.vector(), 0x60);
        assert_eq!(Interrupt::empty().highest_priority(), None);
    }

    #[test]
    fn unknown_address_is_a_wiring_fault() {
        let mut ic = InterruptController::new();
        assert!(matches!(
            ic.read(0xFF10),
            Err(EmulationError::UnhandledRegister { address: 0xFF10, .. })
        ));
    }
}
