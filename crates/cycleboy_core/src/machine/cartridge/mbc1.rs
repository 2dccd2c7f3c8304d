/// MBC1 banking state.
///
/// ROM banks are selected by a 5-bit low register plus a 2-bit high
/// register. In mode 1 the high register also banks the 0x0000-0x3FFF
/// window and the external RAM. Battery persistence is not modelled.
pub(super) struct Mbc1 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_banks: usize,
    ram_banks: usize,
    bank_low5: u8,
    bank_high2: u8,
    ram_enabled: bool,
    advanced_mode: bool,
}

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

impl Mbc1 {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        let rom_banks = (rom.len() / ROM_BANK_SIZE).max(2);
        // 2 KiB carts still decode a full 8 KiB window; the extra bytes mirror.
        let ram_banks = ram_size.div_ceil(RAM_BANK_SIZE);
        Self {
            rom,
            ram: vec![0xFF; ram_size],
            rom_banks,
            ram_banks,
            bank_low5: 1,
            bank_high2: 0,
            ram_enabled: false,
            advanced_mode: false,
        }
    }

    fn rom_bank(&self, address: u16) -> usize {
        let bank = if address < 0x4000 {
            if self.advanced_mode {
                (self.bank_high2 as usize) << 5
            } else {
                0
            }
        } else {
            ((self.bank_high2 as usize) << 5) | self.bank_low5 as usize
        };
        bank % self.rom_banks
    }

    fn ram_offset(&self, address: u16) -> Option<usize> {
        if !self.ram_enabled || self.ram.is_empty() {
            return None;
        }
        let bank = if self.advanced_mode {
            self.bank_high2 as usize % self.ram_banks
        } else {
            0
        };
        let offset = bank * RAM_BANK_SIZE + (address - 0xA000) as usize;
        Some(offset % self.ram.len())
    }

    pub(super) fn rom_read(&self, address: u16) -> u8 {
        let index = self.rom_bank(address) * ROM_BANK_SIZE + (address as usize & 0x3FFF);
        self.rom.get(index).copied().unwrap_or(0xFF)
    }

    pub(super) fn rom_write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => self.ram_enabled = (value & 0x0F) == 0x0A,
            0x2000..=0x3FFF => {
                // Bank 0 can never be selected into the upper window.
                self.bank_low5 = (value & 0x1F).max(1);
            }
            0x4000..=0x5FFF => self.bank_high2 = value & 0x03,
            _ => self.advanced_mode = (value & 0x01) != 0,
        }
    }

    pub(super) fn ram_read(&self, address: u16) -> u8 {
        self.ram_offset(address)
            .map_or(0xFF, |offset| self.ram[offset])
    }

    pub(super) fn ram_write(&mut self, address: u16, value: u8) {
        if let Some(offset) = self.ram_offset(address) {
            self.ram[offset] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every bank starts with its own index.
    fn banked_rom(banks: usize) -> Vec<u8> {
        let mut rom = vec![0u8; banks * ROM_BANK_SIZE];
        for bank in 0..banks {
            rom[bank * ROM_BANK_SIZE] = bank as u8;
        }
        rom
    }

    #[test]
    fn low_register_zero_selects_bank_one() {
        let mut mbc = Mbc1::new(banked_rom(8), 0);
        assert_eq!(mbc.rom_read(0x4000), 1);
        mbc.rom_write(0x2000, 0x00);
        assert_eq!(mbc.rom_read(0x4000), 1);
        mbc.rom_write(0x2000, 0x05);
        assert_eq!(mbc.rom_read(0x4000), 5);
        assert_eq!(mbc.rom_read(0x0000), 0);
    }

    #[test]
    fn bank_number_wraps_to_rom_size() {
        let mut mbc = Mbc1::new(banked_rom(4), 0);
        mbc.rom_write(0x2000, 0x06);
        assert_eq!(mbc.rom_read(0x4000), 2);
    }

    #[test]
    fn high_bits_extend_the_bank_and_mode_one_banks_the_low_window() {
        let mut mbc = Mbc1::new(banked_rom(64), 0);
        mbc.rom_write(0x2000, 0x02);
        mbc.rom_write(0x4000, 0x01);
        assert_eq!(mbc.rom_read(0x4000), 0x22);
        assert_eq!(mbc.rom_read(0x0000), 0);
        mbc.rom_write(0x6000, 0x01);
        assert_eq!(mbc.rom_read(0x0000), 0x20);
    }

    #[test]
    fn ram_requires_enable_and_banks_in_mode_one() {
        let mut mbc = Mbc1::new(banked_rom(4), 0x8000);
        mbc.ram_write(0xA000, 0x11);
        assert_eq!(mbc.ram_read(0xA000), 0xFF);

        mbc.rom_write(0x0000, 0x0A);
        mbc.ram_write(0xA000, 0x11);
        mbc.rom_write(0x6000, 0x01);
        mbc.rom_write(0x4000, 0x02);
        mbc.ram_write(0xA000, 0x22);
        assert_eq!(mbc.ram_read(0xA000), 0x22);

        mbc.rom_write(0x6000, 0x00);
        assert_eq!(mbc.ram_read(0xA000), 0x11);

        mbc.rom_write(0x0000, 0x00);
        assert_eq!(mbc.ram_read(0xA000), 0xFF);
    }
}
