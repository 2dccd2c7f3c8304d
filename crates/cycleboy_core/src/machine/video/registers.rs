/// Where background and window tile indices point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileData {
    /// 0x8000 base, index 0..=255.
    Unsigned,
    /// 0x8800 base, index interpreted as -128..=127 around 0x9000.
    Signed,
}

impl TileData {
    /// Offset into VRAM of the first byte of `index`.
    pub fn tile_offset(self, index: u8) -> usize {
        match self {
            TileData::Unsigned => index as usize * 16,
            TileData::Signed => 0x0800 + index.wrapping_add(128) as usize * 16,
        }
    }
}

/// LCDC decoded into its eight fields.
///
/// The byte is only ever decoded as a whole so the renderer never sees a
/// combination of old and new fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lcdc {
    pub raw: u8,
    pub display_enabled: bool,
    /// VRAM offset of the window tile map.
    pub window_tile_map: usize,
    pub window_enabled: bool,
    pub tile_data: TileData,
    /// VRAM offset of the background tile map.
    pub bg_tile_map: usize,
    pub sprite_height: u8,
    pub sprites_enabled: bool,
    /// On DMG this also gates the window.
    pub bg_enabled: bool,
}

impl Lcdc {
    pub fn decode(raw: u8) -> Self {
        Self {
            raw,
            display_enabled: raw & 0x80 != 0,
            window_tile_map: if raw & 0x40 != 0 { 0x1C00 } else { 0x1800 },
            window_enabled: raw & 0x20 != 0,
            tile_data: if raw & 0x10 != 0 {
                TileData::Unsigned
            } else {
                TileData::Signed
            },
            bg_tile_map: if raw & 0x08 != 0 { 0x1C00 } else { 0x1800 },
            sprite_height: if raw & 0x04 != 0 { 16 } else { 8 },
            sprites_enabled: raw & 0x02 != 0,
            bg_enabled: raw & 0x01 != 0,
        }
    }
}

impl Default for Lcdc {
    fn default() -> Self {
        Self::decode(0)
    }
}

/// A palette register with its four shades pre-expanded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    raw: u8,
    shades: [u8; 4],
}

impl Palette {
    pub fn new(raw: u8) -> Self {
        let mut shades = [0; 4];
        for (index, shade) in shades.iter_mut().enumerate() {
            *shade = (raw >> (index * 2)) & 0x03;
        }
        Self { raw, shades }
    }

    #[inline]
    pub fn shade(&self, color: u8) -> u8 {
        self.shades[(color & 0x03) as usize]
    }

    pub fn raw(&self) -> u8 {
        self.raw
    }
}

/// STAT interrupt select bits.
pub const STAT_SELECT_HBLANK: u8 = 1 << 3;
pub const STAT_SELECT_VBLANK: u8 = 1 << 4;
pub const STAT_SELECT_OAM: u8 = 1 << 5;
pub const STAT_SELECT_LYC: u8 = 1 << 6;
pub const STAT_SELECT_MASK: u8 = 0x78;
pub const STAT_COINCIDENCE: u8 = 1 << 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcdc_fields_decode_together() {
        let lcdc = Lcdc::decode(0x91);
        assert!(lcdc.display_enabled);
        assert_eq!(lcdc.tile_data, TileData::Unsigned);
        assert_eq!(lcdc.bg_tile_map, 0x1800);
        assert!(lcdc.bg_enabled);
        assert!(!lcdc.sprites_enabled);
        assert!(!lcdc.window_enabled);
        assert_eq!(lcdc.sprite_height, 8);

        let lcdc = Lcdc::decode(0x6E);
        assert!(!lcdc.display_enabled);
        assert_eq!(lcdc.window_tile_map, 0x1C00);
        assert!(lcdc.window_enabled);
        assert_eq!(lcdc.tile_data, TileData::Signed);
        assert_eq!(lcdc.bg_tile_map, 0x1C00);
        assert_eq!(lcdc.sprite_height, 16);
        assert!(lcdc.sprites_enabled);
        assert!(!lcdc.bg_enabled);
    }

    #[test]
    fn signed_tile_data_wraps_around_0x9000() {
        assert_eq!(TileData::Signed.tile_offset(0), 0x1000);
        assert_eq!(TileData::Signed.tile_offset(0x7F), 0x17F0);
        assert_eq!(TileData::Signed.tile_offset(0x80), 0x0800);
        assert_eq!(TileData::Signed.tile_offset(0xFF), 0x0FF0);
        assert_eq!(TileData::Unsigned.tile_offset(0xFF), 0x0FF0);
    }

    #[test]
    fn palette_expands_two_bits_per_color() {
        let palette = Palette::new(0xE4);
        assert_eq!(
            [0, 1, 2, 3].map(|c| palette.shade(c)),
            [0, 1, 2, 3]
        );
        let palette = Palette::new(0xFC);
        assert_eq!([0, 1, 2, 3].map(|c| palette.shade(c)), [0, 3, 3, 3]);
    }
}
