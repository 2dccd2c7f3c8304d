use crate::CartridgeError;

pub const HEADER_END: usize = 0x150;

const TITLE: std::ops::Range<usize> = 0x134..0x13F;
const GAME_CODE: std::ops::Range<usize> = 0x13F..0x143;
const CGB_FLAG: usize = 0x143;
const MAKER_CODE: std::ops::Range<usize> = 0x144..0x146;
const SGB_FLAG: usize = 0x146;
const CARTRIDGE_TYPE: usize = 0x147;
const ROM_SIZE: usize = 0x148;
const RAM_SIZE: usize = 0x149;
const DESTINATION: usize = 0x14A;
const OLD_LICENSEE: usize = 0x14B;
const ROM_VERSION: usize = 0x14C;
const HEADER_CHECKSUM: usize = 0x14D;
const GLOBAL_CHECKSUM: usize = 0x14E;

/// Cartridge header fields at 0x0134..0x0150.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub game_code: [u8; 4],
    pub cgb_flag: u8,
    pub maker_code: [u8; 2],
    pub sgb_flag: u8,
    pub cartridge_type: u8,
    pub rom_size_code: u8,
    pub ram_size_code: u8,
    pub destination: u8,
    pub old_licensee: u8,
    pub rom_version: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
    /// Checksum recomputed over 0x134..=0x14C.
    pub computed_checksum: u8,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < HEADER_END {
            return Err(CartridgeError::TooSmall { len: rom.len() });
        }

        let title = rom[TITLE]
            .iter()
            .take_while(|&&byte| byte != 0)
            .map(|&byte| match byte {
                b' ' | 0x21..=0x7E => byte as char,
                _ => '?',
            })
            .collect::<String>()
            .trim_end()
            .to_string();

        let computed_checksum = rom[TITLE.start..=ROM_VERSION]
            .iter()
            .fold(0u8, |x, &byte| x.wrapping_sub(byte).wrapping_sub(1));

        Ok(Self {
            title,
            game_code: std::array::from_fn(|i| rom[GAME_CODE.start + i]),
            cgb_flag: rom[CGB_FLAG],
            maker_code: std::array::from_fn(|i| rom[MAKER_CODE.start + i]),
            sgb_flag: rom[SGB_FLAG],
            cartridge_type: rom[CARTRIDGE_TYPE],
            rom_size_code: rom[ROM_SIZE],
            ram_size_code: rom[RAM_SIZE],
            destination: rom[DESTINATION],
            old_licensee: rom[OLD_LICENSEE],
            rom_version: rom[ROM_VERSION],
            header_checksum: rom[HEADER_CHECKSUM],
            global_checksum: u16::from_be_bytes([rom[GLOBAL_CHECKSUM], rom[GLOBAL_CHECKSUM + 1]]),
            computed_checksum,
        })
    }

    pub fn checksum_ok(&self) -> bool {
        self.header_checksum == self.computed_checksum
    }

    /// Declared ROM size in bytes (32 KiB shifted by the size code).
    pub fn rom_size(&self) -> Result<usize, CartridgeError> {
        match self.rom_size_code {
            code @ 0x00..=0x08 => Ok(0x8000 << code),
            code => Err(CartridgeError::UnknownRomSize(code)),
        }
    }

    /// Declared external RAM size in bytes.
    pub fn ram_size(&self) -> Result<usize, CartridgeError> {
        Ok(match self.ram_size_code {
            0x00 => 0,
            0x01 => 0x800,
            0x02 => 0x2000,
            0x03 => 0x8000,
            0x04 => 0x2_0000,
            0x05 => 0x1_0000,
            code => return Err(CartridgeError::UnknownRamSize(code)),
        })
    }
}
