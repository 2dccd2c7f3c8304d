//! Video controller: mode timing, LCD registers, VRAM/OAM storage and the
//! scanline renderer.
//!
//! Timing is driven by `frame_cycle`, the T-state position inside the
//! current 70224-cycle frame. `advance` walks from one mode transition to
//! the next rather than cycle by cycle, so catching up a whole frame costs
//! a few hundred iterations.

mod registers;
mod render;

use registers::{
    Lcdc, Palette, STAT_COINCIDENCE, STAT_SELECT_HBLANK, STAT_SELECT_LYC, STAT_SELECT_MASK,
    STAT_SELECT_OAM, STAT_SELECT_VBLANK,
};

use super::interconnect::{BusRequest, MemoryMapped};
use super::interrupts::{Interrupt, InterruptController};
use crate::clock::{Clocked, SyncPoint, SystemClock};
use crate::{EmulationError, Result, CYCLES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH};

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;
pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFE9F;
pub const OAM_SIZE: usize = 0xA0;
pub const REGISTERS_START: u16 = 0xFF40;
pub const REGISTERS_END: u16 = 0xFF4B;

pub const LCDC: u16 = 0xFF40;
pub const STAT: u16 = 0xFF41;
pub const SCY: u16 = 0xFF42;
pub const SCX: u16 = 0xFF43;
pub const LY: u16 = 0xFF44;
pub const LYC: u16 = 0xFF45;
pub const DMA: u16 = 0xFF46;
pub const BGP: u16 = 0xFF47;
pub const OBP0: u16 = 0xFF48;
pub const OBP1: u16 = 0xFF49;
pub const WY: u16 = 0xFF4A;
pub const WX: u16 = 0xFF4B;

const VRAM_SIZE: usize = 0x2000;

pub const OAM_READ_CYCLES: u64 = 80;
pub const VRAM_READ_CYCLES: u64 = 172;
pub const HBLANK_CYCLES: u64 = 204;
pub const SCANLINE_CYCLES: u64 = OAM_READ_CYCLES + VRAM_READ_CYCLES + HBLANK_CYCLES;
pub const VISIBLE_LINES: u64 = SCREEN_HEIGHT as u64;
pub const VBLANK_LINES: u64 = 10;
/// First cycle of the vertical blank.
pub const VBLANK_START: u64 = VISIBLE_LINES * SCANLINE_CYCLES;

const HBLANK_START: u64 = OAM_READ_CYCLES + VRAM_READ_CYCLES;

/// STAT bits 0-1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamRead = 2,
    VramRead = 3,
}

/// One frame of palette-mapped shades, 0 (lightest) to 3 (darkest).
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Box<[u8]>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT].into_boxed_slice(),
        }
    }
}

impl FrameBuffer {
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * SCREEN_WIDTH + x]
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.pixels[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH]
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &SCREEN_WIDTH)
            .field("height", &SCREEN_HEIGHT)
            .finish()
    }
}

/// Receives each completed frame at the start of vertical blank.
pub trait FrameSink {
    fn frame_ready(&mut self, frame: &FrameBuffer);
}

impl<F: FnMut(&FrameBuffer)> FrameSink for F {
    fn frame_ready(&mut self, frame: &FrameBuffer) {
        self(frame)
    }
}

pub struct VideoController {
    sync: SyncPoint,
    interrupts: InterruptController,

    vram: Box<[u8]>,
    oam: [u8; OAM_SIZE],

    lcdc: Lcdc,
    stat_select: u8,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    coincidence: bool,
    dma: u8,
    bgp: Palette,
    obp0: Palette,
    obp1: Palette,
    wy: u8,
    wx: u8,

    mode: Mode,
    frame_cycle: u64,
    vblank_cycle: u64,
    /// Window rows drawn so far in this frame.
    window_line: u8,

    back_buffer: FrameBuffer,
    front_buffer: FrameBuffer,
    frames: u64,
    sink: Option<Box<dyn FrameSink>>,
    pending_dma: Option<u16>,
}

impl VideoController {
    pub fn new(clock: SystemClock, interrupts: InterruptController) -> Self {
        Self {
            sync: SyncPoint::new(clock),
            interrupts,
            vram: vec![0; VRAM_SIZE].into_boxed_slice(),
            oam: [0; OAM_SIZE],
            lcdc: Lcdc::default(),
            stat_select: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            coincidence: false,
            dma: 0xFF,
            bgp: Palette::default(),
            obp0: Palette::default(),
            obp1: Palette::default(),
            wy: 0,
            wx: 0,
            mode: Mode::HBlank,
            frame_cycle: 0,
            vblank_cycle: 0,
            window_line: 0,
            back_buffer: FrameBuffer::default(),
            front_buffer: FrameBuffer::default(),
            frames: 0,
            sink: None,
            pending_dma: None,
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.sink = Some(sink);
    }

    /// Mode as software observes it through STAT.
    pub fn mode(&self) -> Mode {
        if self.lcdc.display_enabled {
            self.mode
        } else {
            Mode::HBlank
        }
    }

    pub fn ly(&self) -> u8 {
        self.ly
    }

    pub fn frame_cycle(&self) -> u64 {
        self.frame_cycle
    }

    /// Most recently completed frame.
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.front_buffer
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames
    }

    fn stat(&self) -> u8 {
        let coincidence = if self.coincidence { STAT_COINCIDENCE } else { 0 };
        0x80 | self.stat_select | coincidence | self.mode() as u8
    }

    fn request_stat_if(&self, select: u8) {
        if self.stat_select & select != 0 {
            self.interrupts.request(Interrupt::LCD_STAT);
        }
    }

    /// Re-evaluate LY=LYC. The STAT interrupt fires on the rising edge.
    fn compare_line(&mut self) {
        let was = self.coincidence;
        self.coincidence = self.ly == self.lyc;
        if self.coincidence && !was {
            self.request_stat_if(STAT_SELECT_LYC);
        }
    }

    fn write_lcdc(&mut self, value: u8) {
        let was_enabled = self.lcdc.display_enabled;
        self.lcdc = Lcdc::decode(value);
        match (was_enabled, self.lcdc.display_enabled) {
            (true, false) => {
                log::debug!("LCD off");
                self.ly = 0;
                self.frame_cycle = 0;
                self.vblank_cycle = 0;
                self.window_line = 0;
                self.mode = Mode::HBlank;
                self.compare_line();
            }
            (false, true) => {
                log::debug!("LCD on");
                self.frame_cycle = 0;
                self.mode = Mode::OamRead;
                self.compare_line();
            }
            _ => {}
        }
    }

    /// T-states until the next mode or scanline transition.
    fn cycles_to_transition(&self) -> u64 {
        if self.frame_cycle >= VBLANK_START {
            return SCANLINE_CYCLES - self.vblank_cycle % SCANLINE_CYCLES;
        }
        let line_cycle = self.frame_cycle % SCANLINE_CYCLES;
        if line_cycle < OAM_READ_CYCLES {
            OAM_READ_CYCLES - line_cycle
        } else if line_cycle < HBLANK_START {
            HBLANK_START - line_cycle
        } else {
            SCANLINE_CYCLES - line_cycle
        }
    }

    fn transition(&mut self) {
        if self.frame_cycle > VBLANK_START {
            self.vblank_line_done();
            return;
        }
        if self.frame_cycle == VBLANK_START {
            self.enter_vblank();
            return;
        }
        match self.frame_cycle % SCANLINE_CYCLES {
            OAM_READ_CYCLES => self.mode = Mode::VramRead,
            HBLANK_START => self.enter_hblank(),
            _ => self.enter_oam_read(),
        }
    }

    fn enter_oam_read(&mut self) {
        self.mode = Mode::OamRead;
        self.ly += 1;
        self.compare_line();
        self.request_stat_if(STAT_SELECT_OAM);
    }

    fn enter_hblank(&mut self) {
        self.mode = Mode::HBlank;
        self.render_scanline();
        self.request_stat_if(STAT_SELECT_HBLANK);
    }

    fn enter_vblank(&mut self) {
        log::debug!("VBlank, frame {}", self.frames);
        self.mode = Mode::VBlank;
        self.vblank_cycle = 0;
        self.ly = VISIBLE_LINES as u8;
        self.compare_line();
        self.interrupts.request(Interrupt::VBLANK);
        self.request_stat_if(STAT_SELECT_VBLANK);
        self.finish_frame();
    }

    fn vblank_line_done(&mut self) {
        if self.frame_cycle == CYCLES_PER_FRAME {
            self.frame_cycle = 0;
            self.vblank_cycle = 0;
            self.window_line = 0;
            self.mode = Mode::OamRead;
            self.ly = 0;
            self.compare_line();
            self.request_stat_if(STAT_SELECT_OAM);
        } else {
            self.ly += 1;
            self.compare_line();
        }
    }

    fn finish_frame(&mut self) {
        std::mem::swap(&mut self.front_buffer, &mut self.back_buffer);
        self.frames += 1;
        if let Some(sink) = self.sink.as_mut() {
            sink.frame_ready(&self.front_buffer);
        }
    }

    fn read_register(&self, address: u16) -> Result<u8> {
        Ok(match address {
            LCDC => self.lcdc.raw,
            STAT => self.stat(),
            SCY => self.scy,
            SCX => self.scx,
            LY => self.ly,
            LYC => self.lyc,
            DMA => self.dma,
            BGP => self.bgp.raw(),
            OBP0 => self.obp0.raw(),
            OBP1 => self.obp1.raw(),
            WY => self.wy,
            WX => self.wx,
            _ => return Err(self.unhandled(address)),
        })
    }

    fn write_register(&mut self, address: u16, value: u8) -> Result<()> {
        match address {
            LCDC => self.write_lcdc(value),
            STAT => self.stat_select = value & STAT_SELECT_MASK,
            SCY => self.scy = value,
            SCX => self.scx = value,
            LY => log::warn!("Ignored write of 0x{value:02X} to read-only LY"),
            LYC => {
                self.lyc = value;
                if self.lcdc.display_enabled {
                    self.compare_line();
                }
            }
            DMA => {
                self.dma = value;
                self.pending_dma = Some((value as u16) << 8);
            }
            BGP => self.bgp = Palette::new(value),
            OBP0 => self.obp0 = Palette::new(value),
            OBP1 => self.obp1 = Palette::new(value),
            WY => self.wy = value,
            WX => self.wx = value,
            _ => return Err(self.unhandled(address)),
        }
        Ok(())
    }

    fn unhandled(&self, address: u16) -> EmulationError {
        EmulationError::UnhandledRegister {
            component: "video",
            address,
        }
    }
}

impl Clocked for VideoController {
    fn sync_point(&mut self) -> &mut SyncPoint {
        &mut self.sync
    }

    fn advance(&mut self, cycles: u64) {
        if !self.lcdc.display_enabled {
            return;
        }
        let mut remaining = cycles;
        while remaining > 0 {
            let until = self.cycles_to_transition();
            let step = until.min(remaining);
            self.frame_cycle += step;
            if self.frame_cycle > VBLANK_START {
                self.vblank_cycle += step;
            }
            remaining -= step;
            if step == until {
                self.transition();
            }
        }
    }
}

impl MemoryMapped for VideoController {
    fn read(&mut self, address: u16) -> Result<u8> {
        self.synchronize();
        match address {
            VRAM_START..=VRAM_END => Ok(self.vram[(address - VRAM_START) as usize]),
            OAM_START..=OAM_END => Ok(self.oam[(address - OAM_START) as usize]),
            REGISTERS_START..=REGISTERS_END => self.read_register(address),
            _ => Err(self.unhandled(address)),
        }
    }

    fn write(&mut self, address: u16, value: u8) -> Result<()> {
        self.synchronize();
        match address {
            VRAM_START..=VRAM_END => self.vram[(address - VRAM_START) as usize] = value,
            OAM_START..=OAM_END => self.oam[(address - OAM_START) as usize] = value,
            REGISTERS_START..=REGISTERS_END => self.write_register(address, value)?,
            _ => return Err(self.unhandled(address)),
        }
        Ok(())
    }

    fn take_bus_request(&mut self) -> Option<BusRequest> {
        self.pending_dma
            .take()
            .map(|source| BusRequest::OamDma { source })
    }
}
