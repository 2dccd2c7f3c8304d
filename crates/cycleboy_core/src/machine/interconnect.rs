//! Address-indexed dispatch table for the 64 KiB bus.
//!
//! Every one of the 65536 addresses is bound to exactly one component
//! handle. Several slots usually share the same handle (a component owns a
//! range), and remapping is a mutation of the table rather than a new
//! table. Components never touch the table directly: side effects that
//! need the bus (remapping, OAM DMA) are returned as a `BusRequest` after
//! the access and executed here.

use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::rc::Rc;

use super::memory::Unmapped;
use super::video::{OAM_SIZE, OAM_START};
use crate::cpu::Bus;
use crate::Result;

/// Machine cycles the CPU is charged for one OAM DMA transfer.
pub const DMA_MACHINE_CYCLES: u64 = 160;

const ADDRESS_SPACE: usize = 0x10000;

/// A memory-mapped component.
///
/// Implementors receive absolute bus addresses.
pub trait MemoryMapped {
    fn read(&mut self, address: u16) -> Result<u8>;
    fn write(&mut self, address: u16, value: u8) -> Result<()>;

    /// Side effect on the bus requested by the access that just completed.
    fn take_bus_request(&mut self) -> Option<BusRequest> {
        None
    }
}

pub type Handler = Rc<RefCell<dyn MemoryMapped>>;

/// One table mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Remap {
    /// Bind `from..=to` to whichever component currently serves `source`.
    CopyFrom { from: u16, to: u16, source: u16 },
    /// Return `from..=to` to the unmapped handler.
    Unbind { from: u16, to: u16 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusRequest {
    Remap(Vec<Remap>),
    /// Copy 160 bytes from `source` into OAM.
    OamDma { source: u16 },
}

pub struct Interconnect {
    slots: Vec<Handler>,
    unmapped: Handler,
    stall_cycles: u64,
}

impl Default for Interconnect {
    fn default() -> Self {
        Self::new()
    }
}

impl Interconnect {
    pub fn new() -> Self {
        let unmapped: Handler = Rc::new(RefCell::new(Unmapped));
        Self {
            slots: vec![Rc::clone(&unmapped); ADDRESS_SPACE],
            unmapped,
            stall_cycles: 0,
        }
    }

    pub fn bind(&mut self, address: u16, component: Handler) {
        self.slots[address as usize] = component;
    }

    /// Bind the inclusive range `from..=to`.
    pub fn bind_range(&mut self, from: u16, to: u16, component: Handler) {
        for slot in &mut self.slots[Self::span(from, to)] {
            *slot = Rc::clone(&component);
        }
    }

    /// Bind `from..=to` to the component currently serving `source`.
    pub fn rebind_from(&mut self, from: u16, to: u16, source: u16) {
        let component = Rc::clone(&self.slots[source as usize]);
        self.bind_range(from, to, component);
    }

    pub fn unbind(&mut self, from: u16, to: u16) {
        let unmapped = Rc::clone(&self.unmapped);
        self.bind_range(from, to, unmapped);
    }

    pub fn handler_at(&self, address: u16) -> &Handler {
        &self.slots[address as usize]
    }

    pub fn read(&mut self, address: u16) -> Result<u8> {
        let (value, request) = {
            let mut component = self.slots[address as usize].borrow_mut();
            let value = component.read(address)?;
            (value, component.take_bus_request())
        };
        if let Some(request) = request {
            self.apply(request)?;
        }
        Ok(value)
    }

    pub fn write(&mut self, address: u16, value: u8) -> Result<()> {
        let request = {
            let mut component = self.slots[address as usize].borrow_mut();
            component.write(address, value)?;
            component.take_bus_request()
        };
        if let Some(request) = request {
            self.apply(request)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, request: BusRequest) -> Result<()> {
        match request {
            BusRequest::Remap(remaps) => {
                for remap in remaps {
                    log::debug!("Bus remap: {remap:?}");
                    match remap {
                        Remap::CopyFrom { from, to, source } => self.rebind_from(from, to, source),
                        Remap::Unbind { from, to } => self.unbind(from, to),
                    }
                }
            }
            BusRequest::OamDma { source } => {
                for offset in 0..OAM_SIZE as u16 {
                    let byte = self.read(source.wrapping_add(offset))?;
                    self.write(OAM_START + offset, byte)?;
                }
                self.stall_cycles += DMA_MACHINE_CYCLES;
            }
        }
        Ok(())
    }

    /// Machine cycles owed by bus activity that the CPU has not yet paid for.
    pub fn take_stall_cycles(&mut self) -> u64 {
        std::mem::take(&mut self.stall_cycles)
    }

    fn span(from: u16, to: u16) -> RangeInclusive<usize> {
        debug_assert!(from <= to, "inverted range 0x{from:04X}..=0x{to:04X}");
        from as usize..=to as usize
    }
}

impl Bus for Interconnect {
    fn read8(&mut self, addr: u16) -> Result<u8> {
        self.read(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<()> {
        self.write(addr, value)
    }

    fn take_stall_cycles(&mut self) -> u64 {
        std::mem::take(&mut self.stall_cycles)
    }
}

/// Which kind of access fires a `TriggeredMapping`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Read,
    Write,
    ReadWrite,
}

impl Trigger {
    fn on_read(self) -> bool {
        matches!(self, Trigger::Read | Trigger::ReadWrite)
    }

    fn on_write(self) -> bool {
        matches!(self, Trigger::Write | Trigger::ReadWrite)
    }
}

/// Placeholder handler that remaps the bus on first touch.
///
/// The triggering access itself reads as 0xFF (writes are dropped); the
/// configured remaps take effect immediately afterwards.
pub struct TriggeredMapping {
    trigger: Trigger,
    remaps: Vec<Remap>,
    pending: Option<BusRequest>,
}

impl TriggeredMapping {
    pub const SENTINEL: u8 = 0xFF;

    pub fn new(trigger: Trigger, remaps: Vec<Remap>) -> Self {
        Self {
            trigger,
            remaps,
            pending: None,
        }
    }

    fn fire(&mut self) {
        self.pending = Some(BusRequest::Remap(self.remaps.clone()));
    }
}

impl MemoryMapped for TriggeredMapping {
    fn read(&mut self, _address: u16) -> Result<u8> {
        if self.trigger.on_read() {
            self.fire();
        }
        Ok(Self::SENTINEL)
    }

    fn write(&mut self, _address: u16, _value: u8) -> Result<()> {
        if self.trigger.on_write() {
            self.fire();
        }
        Ok(())
    }

    fn take_bus_request(&mut self) -> Option<BusRequest> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::memory::Ram;

    fn ram(base: u16, size: usize) -> Rc<RefCell<Ram>> {
        Rc::new(RefCell::new(Ram::new(base, size)))
    }

    #[test]
    fn unbound_addresses_read_ff_and_drop_writes() {
        let mut bus = Interconnect::new();
        bus.write(0x1234, 0x42).unwrap();
        assert_eq!(bus.read(0x1234).unwrap(), 0xFF);
    }

    #[test]
    fn range_binding_dispatches_to_component() {
        let mut bus = Interconnect::new();
        bus.bind_range(0xC000, 0xC0FF, ram(0xC000, 0x100));
        bus.write(0xC010, 0x99).unwrap();
        assert_eq!(bus.read(0xC010).unwrap(), 0x99);
        assert_eq!(bus.read(0xC100).unwrap(), 0xFF);
    }

    #[test]
    fn rebind_from_shares_the_source_component() {
        let mut bus = Interconnect::new();
        let backing = ram(0x4000, 0x100);
        bus.bind_range(0x4000, 0x40FF, backing.clone());
        bus.rebind_from(0x0000, 0x00FF, 0x4000);

        assert!(Rc::ptr_eq(bus.handler_at(0x0000), bus.handler_at(0x4000)));
        bus.write(0x0001, 0x11).unwrap();
        assert_eq!(bus.read(0x4001).unwrap(), 0x11);
    }

    #[test]
    fn write_triggered_mapping_fires_once_and_replaces_itself() {
        let mut bus = Interconnect::new();
        bus.bind_range(0xD000, 0xD0FF, ram(0xD000, 0x100));
        let trigger = TriggeredMapping::new(
            Trigger::Write,
            vec![
                Remap::CopyFrom {
                    from: 0xA000,
                    to: 0xA0FF,
                    source: 0xD000,
                },
                Remap::Unbind {
                    from: 0xFF50,
                    to: 0xFF50,
                },
            ],
        );
        bus.bind(0xFF50, Rc::new(RefCell::new(trigger)));

        // Reads do not fire a write trigger.
        assert_eq!(bus.read(0xFF50).unwrap(), 0xFF);
        assert_eq!(bus.read(0xA000).unwrap(), 0xFF);
        bus.write(0xD000, 0x5A).unwrap();
        assert_eq!(bus.read(0xA000).unwrap(), 0xFF);

        bus.write(0xFF50, 0x01).unwrap();
        assert_eq!(bus.read(0xA000).unwrap(), 0x5A);
        assert!(Rc::ptr_eq(bus.handler_at(0xFF50), &bus.unmapped));
    }

    #[test]
    fn read_triggered_mapping_returns_sentinel_on_the_triggering_read() {
        let mut bus = Interconnect::new();
        let backing = ram(0x8000, 0x100);
        backing.borrow_mut().write(0x8000, 0x33).unwrap();
        bus.bind_range(0x8000, 0x80FF, backing);
        let trigger = TriggeredMapping::new(
            Trigger::ReadWrite,
            vec![Remap::CopyFrom {
                from: 0x9000,
                to: 0x90FF,
                source: 0x8000,
            }],
        );
        bus.bind_range(0x9000, 0x90FF, Rc::new(RefCell::new(trigger)));

        assert_eq!(bus.read(0x9000).unwrap(), TriggeredMapping::SENTINEL);
        assert_eq!(bus.read(0x9000).unwrap(), 0x33);
    }

    #[test]
    fn stall_cycles_are_taken_once() {
        let mut bus = Interconnect::new();
        bus.stall_cycles = 7;
        assert_eq!(bus.take_stall_cycles(), 7);
        assert_eq!(bus.take_stall_cycles(), 0);
    }
}
