use super::Cpu;
use crate::Result;

/// The CPU's view of the address space.
///
/// Accesses are fallible because a misrouted register access is a fatal
/// wiring fault. Implementors do not advance time; the CPU charges the
/// clock itself around each access.
pub trait Bus {
    fn read8(&mut self, address: u16) -> Result<u8>;
    fn write8(&mut self, address: u16, value: u8) -> Result<()>;

    /// Machine cycles the last access owes beyond its own, e.g. for an
    /// OAM DMA it triggered.
    fn take_stall_cycles(&mut self) -> u64 {
        0
    }
}

impl Cpu {
    /// One machine cycle, then a read.
    #[inline]
    pub(super) fn read_cycle<B: Bus>(&mut self, bus: &mut B, address: u16) -> Result<u8> {
        self.clock.advance(1);
        bus.read8(address)
    }

    /// One machine cycle, then a write, plus any stall it provoked.
    #[inline]
    pub(super) fn write_cycle<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) -> Result<()> {
        self.clock.advance(1);
        bus.write8(address, value)?;
        let stall = bus.take_stall_cycles();
        if stall > 0 {
            self.clock.advance(stall);
        }
        Ok(())
    }

    /// One machine cycle of internal work.
    #[inline]
    pub(super) fn idle_cycle(&mut self) {
        self.clock.advance(1);
    }
}
