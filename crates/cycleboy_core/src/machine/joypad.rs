use bitflags::bitflags;

use super::interconnect::MemoryMapped;
use super::interrupts::{Interrupt, InterruptController};
use crate::{EmulationError, Result};

pub const JOYP: u16 = 0xFF00;

const SELECT_DPAD: u8 = 0x10;
const SELECT_BUTTONS: u8 = 0x20;

bitflags! {
    /// Buttons currently held down.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Buttons: u8 {
        const RIGHT = 1 << 0;
        const LEFT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
        const A = 1 << 4;
        const B = 1 << 5;
        const SELECT = 1 << 6;
        const START = 1 << 7;
    }
}

impl Buttons {
    fn dpad_nibble(self) -> u8 {
        self.bits() & 0x0F
    }

    fn button_nibble(self) -> u8 {
        self.bits() >> 4
    }
}

/// Host-side provider of button state.
pub trait InputSource {
    fn poll(&mut self) -> Buttons;
}

impl<F: FnMut() -> Buttons> InputSource for F {
    fn poll(&mut self) -> Buttons {
        self()
    }
}

pub struct Joypad {
    interrupts: InterruptController,
    select: u8,
    pressed: Buttons,
    source: Option<Box<dyn InputSource>>,
}

impl Joypad {
    pub fn new(interrupts: InterruptController) -> Self {
        Self {
            interrupts,
            select: SELECT_DPAD | SELECT_BUTTONS,
            pressed: Buttons::empty(),
            source: None,
        }
    }

    pub fn set_source(&mut self, source: Box<dyn InputSource>) {
        self.source = Some(source);
    }

    pub fn pressed(&self) -> Buttons {
        self.pressed
    }

    /// Sample the input source. Returns true when a button went from
    /// released to pressed, in which case the joypad interrupt is raised.
    pub fn poll(&mut self) -> bool {
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        let now = source.poll();
        let newly_pressed = now & !self.pressed;
        self.pressed = now;
        if newly_pressed.is_empty() {
            return false;
        }
        log::debug!("Joypad press: {newly_pressed:?}");
        self.interrupts.request(Interrupt::JOYPAD);
        true
    }

    fn register(&self) -> u8 {
        // Pressed reads as 0; bits 7-6 are always set.
        let mut low = 0x0F;
        if (self.select & SELECT_DPAD) == 0 {
            low &= !self.pressed.dpad_nibble();
        }
        if (self.select & SELECT_BUTTONS) == 0 {
            low &= !self.pressed.button_nibble();
        }
        0xC0 | self.select | (low & 0x0F)
    }
}

impl MemoryMapped for Joypad {
    fn read(&mut self, address: u16) -> Result<u8> {
        if address != JOYP {
            return Err(EmulationError::UnhandledRegister {
                component: "joypad",
                address,
            });
        }
        self.poll();
        Ok(self.register())
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        if address != JOYP {
            return Err(EmulationError::UnhandledRegister {
                component: "joypad",
                address,
            });
        }
        self.select = value & (SELECT_DPAD | SELECT_BUTTONS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn joypad_with(held: Rc<Cell<Buttons>>) -> (Joypad, InterruptController) {
        let interrupts = InterruptController::new();
        let mut joypad = Joypad::new(interrupts.clone());
        joypad.set_source(Box::new(move || held.get()));
        (joypad, interrupts)
    }

    #[test]
    fn nothing_selected_reads_all_released() {
        let held = Rc::new(Cell::new(Buttons::A | Buttons::UP));
        let (mut joypad, _) = joypad_with(held);
        joypad.write(JOYP, 0x30).unwrap();
        assert_eq!(joypad.read(JOYP).unwrap(), 0xFF);
    }

    #[test]
    fn groups_report_pressed_as_zero() {
        let held = Rc::new(Cell::new(Buttons::A | Buttons::START | Buttons::DOWN));
        let (mut joypad, _) = joypad_with(held);

        joypad.write(JOYP, 0x20).unwrap();
        assert_eq!(joypad.read(JOYP).unwrap(), 0xE0 | 0x07);

        joypad.write(JOYP, 0x10).unwrap();
        assert_eq!(joypad.read(JOYP).unwrap(), 0xD0 | 0x06);
    }

    #[test]
    fn only_press_transitions_request_the_interrupt() {
        let held = Rc::new(Cell::new(Buttons::empty()));
        let (mut joypad, interrupts) = joypad_with(Rc::clone(&held));

        assert!(!joypad.poll());
        held.set(Buttons::B);
        assert!(joypad.poll());
        assert_eq!(joypad.pressed(), Buttons::B);
        assert_eq!(interrupts.read_flag() & 0x10, 0x10);

        interrupts.write_flag(0);
        assert!(!joypad.poll());
        held.set(Buttons::empty());
        assert!(!joypad.poll());
        assert_eq!(interrupts.read_flag() & 0x1F, 0);
    }
}
