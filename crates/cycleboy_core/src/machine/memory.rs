//! Plain storage components and the fixed-behaviour filler handlers.

use super::interconnect::MemoryMapped;
use crate::Result;

/// Default handler for addresses no component claims.
pub struct Unmapped;

impl MemoryMapped for Unmapped {
    fn read(&mut self, address: u16) -> Result<u8> {
        log::debug!("Read from unmapped address 0x{address:04X}");
        Ok(0xFF)
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        log::debug!("Dropped write 0x{value:02X} to unmapped address 0x{address:04X}");
        Ok(())
    }
}

/// 0xFEA0-0xFEFF: reads as zero, writes vanish.
pub struct Unusable;

impl MemoryMapped for Unusable {
    fn read(&mut self, _address: u16) -> Result<u8> {
        Ok(0x00)
    }

    fn write(&mut self, _address: u16, _value: u8) -> Result<()> {
        Ok(())
    }
}

/// Byte-addressable RAM starting at `base`.
///
/// Addresses past the end wrap around, which is how the work RAM echo at
/// 0xE000-0xFDFF reaches the same storage as 0xC000-0xDDFF.
pub struct Ram {
    base: u16,
    data: Vec<u8>,
}

impl Ram {
    pub fn new(base: u16, size: usize) -> Self {
        Self {
            base,
            data: vec![0; size],
        }
    }

    #[inline]
    fn index(&self, address: u16) -> usize {
        address.wrapping_sub(self.base) as usize % self.data.len()
    }
}

impl MemoryMapped for Ram {
    fn read(&mut self, address: u16) -> Result<u8> {
        Ok(self.data[self.index(address)])
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        let index = self.index(address);
        self.data[index] = value;
        Ok(())
    }
}

pub const BOOT_ROM_SIZE: usize = 0x100;

/// 256-byte DMG boot program visible at 0x0000-0x00FF until locked out.
pub struct BootRom {
    data: [u8; BOOT_ROM_SIZE],
}

impl BootRom {
    pub fn new(data: [u8; BOOT_ROM_SIZE]) -> Self {
        Self { data }
    }
}

impl MemoryMapped for BootRom {
    fn read(&mut self, address: u16) -> Result<u8> {
        Ok(self.data[address as usize % BOOT_ROM_SIZE])
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        log::warn!("Ignored write 0x{value:02X} to boot ROM at 0x{address:04X}");
        Ok(())
    }
}

pub const SOUND_START: u16 = 0xFF10;
pub const SOUND_END: u16 = 0xFF3F;

/// Latches sound register writes so software reading them back sees its own
/// values. No audio is generated.
pub struct SoundStub {
    registers: [u8; (SOUND_END - SOUND_START + 1) as usize],
}

impl Default for SoundStub {
    fn default() -> Self {
        Self {
            registers: [0; (SOUND_END - SOUND_START + 1) as usize],
        }
    }
}

impl SoundStub {
    /// Register values left behind by the DMG boot ROM.
    pub fn post_boot() -> Self {
        let mut stub = Self::default();
        let values: [(u16, u8); 20] = [
            (0xFF10, 0x80),
            (0xFF11, 0xBF),
            (0xFF12, 0xF3),
            (0xFF13, 0xFF),
            (0xFF14, 0xBF),
            (0xFF16, 0x3F),
            (0xFF18, 0xFF),
            (0xFF19, 0xBF),
            (0xFF1A, 0x7F),
            (0xFF1B, 0xFF),
            (0xFF1C, 0x9F),
            (0xFF1D, 0xFF),
            (0xFF1E, 0xBF),
            (0xFF20, 0xFF),
            (0xFF23, 0xBF),
            (0xFF24, 0x77),
            (0xFF25, 0xF3),
            (0xFF26, 0xF1),
            (0xFF21, 0x00),
            (0xFF22, 0x00),
        ];
        for (address, value) in values {
            stub.registers[(address - SOUND_START) as usize] = value;
        }
        stub
    }

    fn index(address: u16) -> Option<usize> {
        (SOUND_START..=SOUND_END)
            .contains(&address)
            .then(|| (address - SOUND_START) as usize)
    }
}

impl MemoryMapped for SoundStub {
    fn read(&mut self, address: u16) -> Result<u8> {
        match Self::index(address) {
            Some(index) => Ok(self.registers[index]),
            None => Err(crate::EmulationError::UnhandledRegister {
                component: "sound",
                address,
            }),
        }
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        match Self::index(address) {
            Some(index) => {
                self.registers[index] = value;
                Ok(())
            }
            None => Err(crate::EmulationError::UnhandledRegister {
                component: "sound",
                address,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_ram_echo_wraps_onto_the_same_bytes() {
        let mut wram = Ram::new(0xC000, 0x2000);
        wram.write(0xC123, 0x77).unwrap();
        assert_eq!(wram.read(0xE123).unwrap(), 0x77);
        wram.write(0xFDFF, 0x12).unwrap();
        assert_eq!(wram.read(0xDDFF).unwrap(), 0x12);
    }

    #[test]
    fn high_ram_is_offset_from_its_base() {
        let mut hram = Ram::new(0xFF80, 0x7F);
        hram.write(0xFF80, 1).unwrap();
        hram.write(0xFFFE, 2).unwrap();
        assert_eq!(hram.read(0xFF80).unwrap(), 1);
        assert_eq!(hram.read(0xFFFE).unwrap(), 2);
    }

    #[test]
    fn boot_rom_ignores_writes() {
        let mut data = [0u8; BOOT_ROM_SIZE];
        data[0] = 0x31;
        let mut rom = BootRom::new(data);
        rom.write(0x0000, 0x00).unwrap();
        assert_eq!(rom.read(0x0000).unwrap(), 0x31);
    }

    #[test]
    fn sound_stub_latches_values() {
        let mut sound = SoundStub::post_boot();
        assert_eq!(sound.read(0xFF26).unwrap(), 0xF1);
        sound.write(0xFF30, 0xAB).unwrap();
        assert_eq!(sound.read(0xFF30).unwrap(), 0xAB);
        assert!(sound.read(0xFF40).is_err());
    }
}
