use std::cell::{Ref, RefCell};
use std::rc::Rc;

use super::cartridge::{self, Cartridge, CartridgeHeader};
use super::interconnect::{Handler, Interconnect, MemoryMapped, Remap, Trigger, TriggeredMapping};
use super::interrupts::{InterruptController, IE_ADDRESS, IF_ADDRESS};
use super::joypad::{InputSource, Joypad, JOYP};
use super::memory::{BootRom, Ram, SoundStub, Unusable, BOOT_ROM_SIZE, SOUND_END, SOUND_START};
use super::profiler::{ProfileReport, Profiler};
use super::serial::{Serial, SerialSink, SB, SC};
use super::timer::{Timer, DIV, POST_BOOT_COUNTER, TAC};
use super::video::{self, FrameBuffer, FrameSink, VideoController};
use crate::clock::{Clocked, SystemClock};
use crate::config::EmulatorConfig;
use crate::cpu::{Cpu, Execution};
use crate::{EmulationError, Result, CYCLES_PER_FRAME};

const WRAM_START: u16 = 0xC000;
const WRAM_END: u16 = 0xDFFF;
const ECHO_START: u16 = 0xE000;
const ECHO_END: u16 = 0xFDFF;
const UNUSABLE_START: u16 = 0xFEA0;
const UNUSABLE_END: u16 = 0xFEFF;
const HRAM_START: u16 = 0xFF80;
const HRAM_END: u16 = 0xFFFE;
const BOOT_LOCKOUT: u16 = 0xFF50;

const POST_BOOT_LCDC: u8 = 0x91;
const POST_BOOT_BGP: u8 = 0xFC;
const POST_BOOT_IF: u8 = 0xE1;

/// A complete DMG: CPU, bus, and every peripheral, sharing one clock.
pub struct GameBoy {
    clock: SystemClock,
    interrupts: InterruptController,
    interconnect: Interconnect,
    cpu: Cpu,
    cartridge: Rc<RefCell<Cartridge>>,
    timer: Rc<RefCell<Timer>>,
    serial: Rc<RefCell<Serial>>,
    video: Rc<RefCell<VideoController>>,
    joypad: Rc<RefCell<Joypad>>,
    /// Frames the video controller had completed at the last sync.
    frames_seen: u64,
    profiler: Option<Profiler>,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge, config: EmulatorConfig) -> Result<Self> {
        let clock = SystemClock::new();
        let interrupts = InterruptController::new();
        let boot_rom = config
            .boot_rom
            .map(|image| {
                <[u8; BOOT_ROM_SIZE]>::try_from(image.as_slice())
                    .map_err(|_| EmulationError::InvalidBootRom { len: image.len() })
            })
            .transpose()?;

        let cartridge = Rc::new(RefCell::new(cartridge));
        let timer = Rc::new(RefCell::new(Timer::new(clock.clone(), interrupts.clone())));
        let serial = Rc::new(RefCell::new(Serial::new(clock.clone(), interrupts.clone())));
        let video = Rc::new(RefCell::new(VideoController::new(
            clock.clone(),
            interrupts.clone(),
        )));
        let joypad = Rc::new(RefCell::new(Joypad::new(interrupts.clone())));
        let sound = if boot_rom.is_some() {
            SoundStub::default()
        } else {
            SoundStub::post_boot()
        };

        let mut interconnect = Interconnect::new();
        interconnect.bind_range(cartridge::ROM_START, cartridge::ROM_END, cartridge.clone());
        interconnect.bind_range(cartridge::RAM_START, cartridge::RAM_END, cartridge.clone());
        interconnect.bind_range(video::VRAM_START, video::VRAM_END, video.clone());
        interconnect.bind_range(video::OAM_START, video::OAM_END, video.clone());
        interconnect.bind_range(video::REGISTERS_START, video::REGISTERS_END, video.clone());

        let work_ram: Handler = Rc::new(RefCell::new(Ram::new(WRAM_START, 0x2000)));
        interconnect.bind_range(WRAM_START, WRAM_END, work_ram.clone());
        interconnect.bind_range(ECHO_START, ECHO_END, work_ram);
        interconnect.bind_range(UNUSABLE_START, UNUSABLE_END, Rc::new(RefCell::new(Unusable)));
        let high_ram = Ram::new(HRAM_START, (HRAM_END - HRAM_START + 1) as usize);
        interconnect.bind_range(HRAM_START, HRAM_END, Rc::new(RefCell::new(high_ram)));

        interconnect.bind(JOYP, joypad.clone());
        interconnect.bind_range(SB, SC, serial.clone());
        interconnect.bind_range(DIV, TAC, timer.clone());
        let interrupt_registers: Handler = Rc::new(RefCell::new(interrupts.clone()));
        interconnect.bind(IF_ADDRESS, interrupt_registers.clone());
        interconnect.bind(IE_ADDRESS, interrupt_registers);
        interconnect.bind_range(SOUND_START, SOUND_END, Rc::new(RefCell::new(sound)));

        let mut cpu = Cpu::new(clock.clone(), interrupts.clone());

        match boot_rom {
            Some(image) => {
                log::info!("Starting from boot ROM");
                interconnect.bind_range(0x0000, 0x00FF, Rc::new(RefCell::new(BootRom::new(image))));
                let lockout = TriggeredMapping::new(
                    Trigger::Write,
                    vec![
                        Remap::CopyFrom {
                            from: 0x0000,
                            to: 0x00FF,
                            source: 0x0100,
                        },
                        Remap::Unbind {
                            from: BOOT_LOCKOUT,
                            to: BOOT_LOCKOUT,
                        },
                    ],
                );
                interconnect.bind(BOOT_LOCKOUT, Rc::new(RefCell::new(lockout)));
            }
            None => {
                cpu.apply_post_boot_state();
                timer.borrow_mut().set_counter(POST_BOOT_COUNTER);
                {
                    let mut video = video.borrow_mut();
                    video.write(video::LCDC, POST_BOOT_LCDC)?;
                    video.write(video::BGP, POST_BOOT_BGP)?;
                }
                interrupts.write_flag(POST_BOOT_IF);
            }
        }

        Ok(Self {
            clock,
            interrupts,
            interconnect,
            cpu,
            cartridge,
            timer,
            serial,
            video,
            joypad,
            frames_seen: 0,
            profiler: config.profile.then(Profiler::new),
        })
    }

    /// Parse `rom` and build a machine around it.
    pub fn from_rom(rom: &[u8], config: EmulatorConfig) -> Result<Self> {
        let cartridge = Cartridge::from_rom(rom.to_vec())?;
        Self::new(cartridge, config)
    }

    pub fn set_frame_sink<S: FrameSink + 'static>(&mut self, sink: S) {
        self.video.borrow_mut().set_sink(Box::new(sink));
    }

    pub fn set_serial_sink<S: SerialSink + 'static>(&mut self, sink: S) {
        self.serial.borrow_mut().set_sink(Box::new(sink));
    }

    pub fn set_input_source<S: InputSource + 'static>(&mut self, source: S) {
        self.joypad.borrow_mut().set_source(Box::new(source));
    }

    /// Service interrupts, run one instruction, then bring every
    /// peripheral up to the new timestamp.
    pub fn step(&mut self) -> Result<Execution> {
        if self.cpu.is_stopped() {
            if !self.joypad.borrow_mut().poll() {
                return Ok(Execution::Stopped);
            }
            self.cpu.resume();
        }

        if self.cpu.service_interrupts(&mut self.interconnect)?.is_some() {
            if let Some(profiler) = self.profiler.as_mut() {
                profiler.record_interrupt();
            }
        }

        let execution = self.cpu.execute(&mut self.interconnect)?;
        match execution {
            Execution::Instruction { opcode } => {
                if let Some(profiler) = self.profiler.as_mut() {
                    profiler.record_instruction(opcode);
                }
                if self.cpu.is_stopped() {
                    self.timer.borrow_mut().reset_divider();
                }
            }
            Execution::Halted => {
                if let Some(profiler) = self.profiler.as_mut() {
                    profiler.record_halted(1);
                }
            }
            Execution::Stopped => {}
        }

        self.synchronize_peripherals();
        Ok(execution)
    }

    fn synchronize_peripherals(&mut self) {
        self.timer.borrow_mut().synchronize();
        self.serial.borrow_mut().synchronize();
        let frames = {
            let mut video = self.video.borrow_mut();
            video.synchronize();
            video.frames_completed()
        };
        if frames != self.frames_seen {
            self.frames_seen = frames;
            self.joypad.borrow_mut().poll();
            if let Some(profiler) = self.profiler.as_mut() {
                profiler.record_frame();
            }
        }
    }

    /// Run until the clock reaches the next multiple of 70224 T-states.
    ///
    /// The last instruction may end past the boundary; the next call rounds
    /// from wherever it ended. Returns early if the CPU is in STOP.
    pub fn run_frame(&mut self) -> Result<()> {
        let target = (self.clock.timestamp() / CYCLES_PER_FRAME + 1) * CYCLES_PER_FRAME;
        while self.clock.timestamp() < target {
            if self.step()? == Execution::Stopped {
                break;
            }
        }
        Ok(())
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Elapsed T-states.
    pub fn timestamp(&self) -> u64 {
        self.clock.timestamp()
    }

    /// Read through the bus without charging cycles.
    pub fn peek(&mut self, address: u16) -> Result<u8> {
        self.interconnect.read(address)
    }

    pub fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    pub fn interconnect_mut(&mut self) -> &mut Interconnect {
        &mut self.interconnect
    }

    /// Last frame completed by the video controller.
    pub fn frame_buffer(&self) -> Ref<'_, FrameBuffer> {
        Ref::map(self.video.borrow(), |video| video.frame_buffer())
    }

    pub fn cartridge_header(&self) -> Ref<'_, CartridgeHeader> {
        Ref::map(self.cartridge.borrow(), |cartridge| cartridge.header())
    }

    pub fn profiler(&self) -> Option<&Profiler> {
        self.profiler.as_ref()
    }

    pub fn profile_report(&self) -> Option<ProfileReport> {
        self.profiler
            .as_ref()
            .map(|profiler| profiler.report(self.clock.timestamp()))
    }
}
