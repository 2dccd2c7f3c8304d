//! Timer / divider unit.
//!
//! A 16-bit system counter advances once per T-state and DIV exposes its
//! upper byte. TIMA is clocked by falling edges of one counter bit,
//! selected by TAC[1:0] and gated by TAC bit 2. Because the gate and the
//! selected bit are combined before edge detection, disabling the timer or
//! resetting DIV while the selected bit is high also produces an edge, as
//! on hardware.

use super::interconnect::MemoryMapped;
use super::interrupts::{Interrupt, InterruptController};
use crate::clock::{Clocked, SyncPoint, SystemClock};
use crate::{EmulationError, Result};

pub const DIV: u16 = 0xFF04;
pub const TIMA: u16 = 0xFF05;
pub const TMA: u16 = 0xFF06;
pub const TAC: u16 = 0xFF07;

const TAC_ENABLE: u8 = 0b100;
const TAC_UNUSED: u8 = 0b1111_1000;

/// Counter value at PC=0x0100 after the DMG boot ROM ran; DIV reads 0xAB.
pub const POST_BOOT_COUNTER: u16 = 0xABCC;

pub struct Timer {
    sync: SyncPoint,
    interrupts: InterruptController,
    /// Hidden system counter; DIV is its high byte.
    counter: u16,
    tima: u8,
    tma: u8,
    /// TAC raw value (lower 3 bits meaningful).
    tac: u8,
    /// Gated input bit as of the previous T-state.
    previous_edge: bool,
}

impl Timer {
    pub fn new(clock: SystemClock, interrupts: InterruptController) -> Self {
        Self {
            sync: SyncPoint::new(clock),
            interrupts,
            counter: 0,
            tima: 0,
            tma: 0,
            tac: 0,
            previous_edge: false,
        }
    }

    pub fn set_counter(&mut self, counter: u16) {
        self.synchronize();
        self.counter = counter;
        self.detect_edge();
    }

    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Zero the system counter, as a DIV write or STOP does.
    pub fn reset_divider(&mut self) {
        self.synchronize();
        self.counter = 0;
        self.detect_edge();
    }

    /// System counter bit feeding TIMA for the current TAC frequency.
    ///
    /// - 00 → bit 9 (4096 Hz)
    /// - 01 → bit 3 (262144 Hz)
    /// - 10 → bit 5 (65536 Hz)
    /// - 11 → bit 7 (16384 Hz)
    #[inline]
    fn selected_bit(&self) -> u16 {
        match self.tac & 0x03 {
            0x00 => 1 << 9,
            0x01 => 1 << 3,
            0x02 => 1 << 5,
            _ => 1 << 7,
        }
    }

    #[inline]
    fn gated_input(&self) -> bool {
        (self.tac & TAC_ENABLE) != 0 && (self.counter & self.selected_bit()) != 0
    }

    #[inline]
    fn detect_edge(&mut self) {
        let input = self.gated_input();
        if self.previous_edge && !input {
            self.increment_tima();
        }
        self.previous_edge = input;
    }

    fn increment_tima(&mut self) {
        let (next, overflow) = self.tima.overflowing_add(1);
        if overflow {
            self.tima = self.tma;
            self.interrupts.request(Interrupt::TIMER);
        } else {
            self.tima = next;
        }
    }
}

impl Clocked for Timer {
    fn sync_point(&mut self) -> &mut SyncPoint {
        &mut self.sync
    }

    fn advance(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.counter = self.counter.wrapping_add(1);
            self.detect_edge();
        }
    }
}

impl MemoryMapped for Timer {
    fn read(&mut self, address: u16) -> Result<u8> {
        self.synchronize();
        match address {
            DIV => Ok((self.counter >> 8) as u8),
            TIMA => Ok(self.tima),
            TMA => Ok(self.tma),
            TAC => Ok(self.tac | TAC_UNUSED),
            _ => Err(EmulationError::UnhandledRegister {
                component: "timer",
                address,
            }),
        }
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        self.synchronize();
        match address {
            // Any write clears the whole counter regardless of the value.
            DIV => {
                self.counter = 0;
                self.detect_edge();
            }
            TIMA => self.tima = value,
            TMA => self.tma = value,
            TAC => {
                self.tac = value & 0x07;
                self.detect_edge();
            }
            _ => {
                return Err(EmulationError::UnhandledRegister {
                    component: "timer",
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

    fn timer() -> (Timer, SystemClock, InterruptController) {
        let clock = SystemClock::new();
        let interrupts = InterruptController::new();
        let timer = Timer::new(clock.clone(), interrupts.clone());
        (timer, clock, interrupts)
    }

    #[test]
    fn div_is_the_counter_high_byte() {
        let (mut t, clock, _) = timer();
        clock.advance(64); // 256 T-states
        assert_eq!(t.read(DIV).unwrap(), 1);
        clock.advance(64 * 9);
        assert_eq!(t.read(DIV).unwrap(), 10);
    }

    #[test]
    fn div_write_resets_counter_and_ignores_value() {
        let (mut t, clock, _) = timer();
        clock.advance(1000);
        t.write(DIV, 0x12).unwrap();
        assert_eq!(t.read(DIV).unwrap(), 0);
        assert_eq!(t.counter(), 0);
    }

    #[test]
    fn tima_ticks_once_per_256_cycles_at_16384_hz() {
        let (mut t, clock, _) = timer();
        t.write(TAC, 0b111).unwrap();
        clock.advance(63); // 252 T-states
        assert_eq!(t.read(TIMA).unwrap(), 0);
        clock.advance(1); // 256
        assert_eq!(t.read(TIMA).unwrap(), 1);
        clock.advance(64);
        assert_eq!(t.read(TIMA).unwrap(), 2);
    }

    #[test]
    fn frequency_select_periods() {
        for (tac, period) in [(0b100u8, 1024u64), (0b101, 16), (0b110, 64), (0b111, 256)] {
            let (mut t, clock, _) = timer();
            t.write(TAC, tac).unwrap();
            clock.advance(period * 10 / 4);
            assert_eq!(t.read(TIMA).unwrap(), 10, "TAC={tac:03b}");
        }
    }

    #[test]
    fn disabled_timer_does_not_count() {
        let (mut t, clock, _) = timer();
        t.write(TAC, 0b011).unwrap();
        clock.advance(10_000);
        assert_eq!(t.read(TIMA).unwrap(), 0);
        assert_eq!(t.read(TAC).unwrap(), 0xFB);
    }

    #[test]
    fn overflow_reloads_tma_and_requests_interrupt() {
        let (mut t, clock, interrupts) = timer();
        interrupts.write_enable(0x1F);
        t.write(TMA, 0xAB).unwrap();
        t.write(TIMA, 0xFF).unwrap();
        t.write(TAC, 0b101).unwrap();
        clock.advance(4); // 16 T-states: one increment
        assert_eq!(t.read(TIMA).unwrap(), 0xAB);
        assert_eq!(interrupts.pending(), Interrupt::TIMER);
    }

    #[test]
    fn div_reset_with_selected_bit_high_is_a_falling_edge() {
        let (mut t, _, _) = timer();
        t.set_counter(1 << 9);
        t.write(TAC, 0b100).unwrap();
        t.write(DIV, 0).unwrap();
        assert_eq!(t.read(TIMA).unwrap(), 1);
    }

    #[test]
    fn disabling_with_selected_bit_high_is_a_falling_edge() {
        let (mut t, _, _) = timer();
        t.set_counter(1 << 9);
        t.write(TAC, 0b100).unwrap();
        t.write(TAC, 0b000).unwrap();
        assert_eq!(t.read(TIMA).unwrap(), 1);
    }

    #[test]
    fn out_of_range_register_is_a_fault() {
        let (mut t, _, _) = timer();
        assert!(t.read(0xFF03).is_err());
        assert!(t.write(0xFF08, 0).is_err());
    }
}
