mod header;
mod mbc1;

pub use header::CartridgeHeader;
use mbc1::Mbc1;

use super::interconnect::MemoryMapped;
use crate::{CartridgeError, EmulationError, Result};

pub const ROM_START: u16 = 0x0000;
pub const ROM_END: u16 = 0x7FFF;
pub const RAM_START: u16 = 0xA000;
pub const RAM_END: u16 = 0xBFFF;

enum Mapper {
    RomOnly { rom: Vec<u8>, ram: Vec<u8> },
    Mbc1(Mbc1),
}

/// A loaded cartridge: parsed header plus its memory bank controller.
pub struct Cartridge {
    header: CartridgeHeader,
    mapper: Mapper,
}

impl Cartridge {
    /// Validate the header and build the mapper named by the cartridge type.
    pub fn from_rom(rom: Vec<u8>) -> std::result::Result<Self, CartridgeError> {
        let header = CartridgeHeader::parse(&rom)?;
        let expected = header.rom_size()?;
        if rom.len() < expected {
            return Err(CartridgeError::RomSizeMismatch {
                code: header.rom_size_code,
                expected,
                actual: rom.len(),
            });
        }
        let ram_size = header.ram_size()?;
        if !header.checksum_ok() {
            log::warn!(
                "Header checksum mismatch: stored 0x{:02X}, computed 0x{:02X}",
                header.header_checksum,
                header.computed_checksum
            );
        }

        let mapper = match header.cartridge_type {
            0x00 | 0x08 | 0x09 => Mapper::RomOnly {
                rom,
                ram: vec![0xFF; ram_size.min(0x2000)],
            },
            0x01..=0x03 => Mapper::Mbc1(Mbc1::new(rom, ram_size)),
            other => return Err(CartridgeError::UnsupportedMapper(other)),
        };

        log::info!(
            "Loaded \"{}\" (type 0x{:02X}, {} KiB ROM, {} KiB RAM)",
            header.title,
            header.cartridge_type,
            expected / 1024,
            ram_size / 1024
        );
        Ok(Self { header, mapper })
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    fn unhandled(address: u16) -> EmulationError {
        EmulationError::UnhandledRegister {
            component: "cartridge",
            address,
        }
    }
}

impl MemoryMapped for Cartridge {
    fn read(&mut self, address: u16) -> Result<u8> {
        Ok(match (&self.mapper, address) {
            (Mapper::RomOnly { rom, .. }, ROM_START..=ROM_END) => {
                rom.get(address as usize).copied().unwrap_or(0xFF)
            }
            (Mapper::RomOnly { ram, .. }, RAM_START..=RAM_END) if !ram.is_empty() => {
                ram[(address - RAM_START) as usize % ram.len()]
            }
            (Mapper::RomOnly { .. }, RAM_START..=RAM_END) => 0xFF,
            (Mapper::Mbc1(mbc), ROM_START..=ROM_END) => mbc.rom_read(address),
            (Mapper::Mbc1(mbc), RAM_START..=RAM_END) => mbc.ram_read(address),
            _ => return Err(Self::unhandled(address)),
        })
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        match (&mut self.mapper, address) {
            (Mapper::RomOnly { .. }, ROM_START..=ROM_END) => {
                log::debug!("Ignored ROM write 0x{value:02X} at 0x{address:04X}");
            }
            (Mapper::RomOnly { ram, .. }, RAM_START..=RAM_END) => {
                if !ram.is_empty() {
                    let len = ram.len();
                    ram[(address - RAM_START) as usize % len] = value;
                }
            }
            (Mapper::Mbc1(mbc), ROM_START..=ROM_END) => mbc.rom_write(address, value),
            (Mapper::Mbc1(mbc), RAM_START..=RAM_END) => mbc.ram_write(address, value),
            _ => return Err(Self::unhandled(address)),
        }
        Ok(())
    }
}
