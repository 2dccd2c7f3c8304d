use super::registers::Palette;
use super::VideoController;
use crate::SCREEN_WIDTH;

const MAX_SPRITES_PER_LINE: usize = 10;

const ATTR_BEHIND_BG: u8 = 0x80;
const ATTR_FLIP_Y: u8 = 0x40;
const ATTR_FLIP_X: u8 = 0x20;
const ATTR_PALETTE: u8 = 0x10;

#[derive(Clone, Copy, Debug)]
struct Sprite {
    index: usize,
    y: i16,
    x: i16,
    tile: u8,
    attributes: u8,
}

/// 2-bit color of column `bit` within a tile row.
#[inline]
fn color_at(lo: u8, hi: u8, column: u8) -> u8 {
    let bit = 7 - column;
    (((hi >> bit) & 0x01) << 1) | ((lo >> bit) & 0x01)
}

impl VideoController {
    /// Render line `ly` into the back buffer.
    pub(super) fn render_scanline(&mut self) {
        let mut colors = [0u8; SCREEN_WIDTH];
        let mut shades = [0u8; SCREEN_WIDTH];

        if self.lcdc.bg_enabled {
            self.render_background(&mut colors);
            self.render_window(&mut colors);
            for (shade, &color) in shades.iter_mut().zip(colors.iter()) {
                *shade = self.bgp.shade(color);
            }
        }
        if self.lcdc.sprites_enabled {
            self.render_sprites(&colors, &mut shades);
        }

        let ly = self.ly as usize;
        self.back_buffer.row_mut(ly).copy_from_slice(&shades);
    }

    fn tile_map_color(&self, map: usize, x: u8, y: u8) -> u8 {
        let tile_row = (y / 8) as usize;
        let tile_col = (x / 8) as usize;
        let index = self.vram[map + tile_row * 32 + tile_col];
        let row = self.lcdc.tile_data.tile_offset(index) + (y % 8) as usize * 2;
        color_at(self.vram[row], self.vram[row + 1], x % 8)
    }

    fn render_background(&self, colors: &mut [u8; SCREEN_WIDTH]) {
        let y = self.ly.wrapping_add(self.scy);
        for (x, color) in colors.iter_mut().enumerate() {
            let bg_x = (x as u8).wrapping_add(self.scx);
            *color = self.tile_map_color(self.lcdc.bg_tile_map, bg_x, y);
        }
    }

    fn render_window(&mut self, colors: &mut [u8; SCREEN_WIDTH]) {
        if !self.lcdc.window_enabled || self.ly < self.wy || self.wx > 166 {
            return;
        }
        let start = self.wx as i16 - 7;
        let y = self.window_line;
        for (x, color) in colors.iter_mut().enumerate() {
            let window_x = x as i16 - start;
            if window_x < 0 {
                continue;
            }
            *color = self.tile_map_color(self.lcdc.window_tile_map, window_x as u8, y);
        }
        self.window_line = self.window_line.wrapping_add(1);
    }

    /// Up to ten sprites overlapping this line, in priority order.
    fn line_sprites(&self) -> Vec<Sprite> {
        let height = self.lcdc.sprite_height as i16;
        let ly = self.ly as i16;
        let mut sprites: Vec<Sprite> = self
            .oam
            .chunks_exact(4)
            .enumerate()
            .map(|(index, entry)| Sprite {
                index,
                y: entry[0] as i16 - 16,
                x: entry[1] as i16 - 8,
                tile: entry[2],
                attributes: entry[3],
            })
            .filter(|sprite| ly >= sprite.y && ly < sprite.y + height)
            .take(MAX_SPRITES_PER_LINE)
            .collect();
        // Lower X wins; ties go to the earlier OAM entry.
        sprites.sort_by_key(|sprite| (sprite.x, sprite.index));
        sprites
    }

    fn sprite_color(&self, sprite: &Sprite, column: i16) -> u8 {
        let height = self.lcdc.sprite_height as i16;
        let mut row = self.ly as i16 - sprite.y;
        if sprite.attributes & ATTR_FLIP_Y != 0 {
            row = height - 1 - row;
        }
        let mut column = column as u8;
        if sprite.attributes & ATTR_FLIP_X != 0 {
            column = 7 - column;
        }
        let tile = if height == 16 {
            sprite.tile & 0xFE
        } else {
            sprite.tile
        };
        let address = tile as usize * 16 + row as usize * 2;
        color_at(self.vram[address], self.vram[address + 1], column)
    }

    fn sprite_palette(&self, sprite: &Sprite) -> &Palette {
        if sprite.attributes & ATTR_PALETTE != 0 {
            &self.obp1
        } else {
            &self.obp0
        }
    }

    fn render_sprites(&self, bg_colors: &[u8; SCREEN_WIDTH], shades: &mut [u8; SCREEN_WIDTH]) {
        let sprites = self.line_sprites();
        if sprites.is_empty() {
            return;
        }
        for (x, shade) in shades.iter_mut().enumerate() {
            let x = x as i16;
            let hit = sprites.iter().find_map(|sprite| {
                let column = x - sprite.x;
                if !(0..8).contains(&column) {
                    return None;
                }
                match self.sprite_color(sprite, column) {
                    0 => None,
                    color => Some((sprite, color)),
                }
            });
            let Some((sprite, color)) = hit else {
                continue;
            };
            if sprite.attributes & ATTR_BEHIND_BG != 0 && bg_colors[x as usize] != 0 {
                continue;
            }
            *shade = self.sprite_palette(sprite).shade(color);
        }
    }
}
