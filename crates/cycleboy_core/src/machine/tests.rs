use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::cpu::Execution;
use crate::{CartridgeError, EmulationError, EmulatorConfig, CYCLES_PER_FRAME};

const PROGRAM_START: usize = 0x0100;

/// 32 KiB ROM-only image with `program` at 0x0100 and a valid header checksum.
fn rom_with(program: &[u8]) -> Vec<u8> {
    rom_of_type(0x00, program)
}

fn rom_of_type(cartridge_type: u8, program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[PROGRAM_START..PROGRAM_START + program.len()].copy_from_slice(program);
    rom[0x134..0x13A].copy_from_slice(b"CYCLES");
    rom[0x147] = cartridge_type;
    rom[0x148] = 0x00;
    rom[0x149] = 0x00;
    rom[0x14D] = rom[0x134..=0x14C]
        .iter()
        .fold(0u8, |x, &b| x.wrapping_sub(b).wrapping_sub(1));
    rom
}

fn machine(program: &[u8]) -> GameBoy {
    GameBoy::from_rom(&rom_with(program), EmulatorConfig::default()).unwrap()
}

#[test]
fn post_boot_state_without_boot_rom() {
    let mut gb = machine(&[0x18, 0xFE]);
    assert_eq!(gb.cpu().regs.pc, 0x0100);
    assert_eq!(gb.cpu().regs.sp, 0xFFFE);
    assert_eq!(gb.cpu().regs.af(), 0x01B0);
    assert_eq!(gb.peek(0xFF04).unwrap(), 0xAB);
    assert_eq!(gb.peek(0xFF40).unwrap(), 0x91);
    assert_eq!(gb.peek(0xFF47).unwrap(), 0xFC);
    assert_eq!(gb.peek(0xFF0F).unwrap(), 0xE1);
    assert_eq!(gb.peek(0xFFFF).unwrap(), 0x00);
    assert_eq!(gb.cartridge_header().title, "CYCLES");
}

#[test]
fn tight_loop_runs_exactly_one_frame_per_call() {
    let mut gb = machine(&[0x18, 0xFE]);
    let frames = Rc::new(Cell::new(0));
    let seen = frames.clone();
    gb.set_frame_sink(move |_: &FrameBuffer| seen.set(seen.get() + 1));

    gb.run_frame().unwrap();
    assert_eq!(gb.timestamp(), CYCLES_PER_FRAME);
    assert_eq!(frames.get(), 1);
    assert_eq!(gb.cpu().regs.pc, 0x0100);

    gb.run_frame().unwrap();
    assert_eq!(gb.timestamp(), 2 * CYCLES_PER_FRAME);
    assert_eq!(frames.get(), 2);
}

#[test]
fn disable_interrupts_and_jump_back_runs_a_whole_frame() {
    // loop: DI; JR loop. 16 T-states per iteration divides the frame.
    let mut gb = machine(&[0xF3, 0x18, 0xFD]);
    let mut steps = 0;
    while gb.timestamp() < CYCLES_PER_FRAME {
        gb.step().unwrap();
        steps += 1;
        assert!(matches!(gb.cpu().regs.pc, 0x0100 | 0x0101));
    }
    assert_eq!(gb.timestamp(), CYCLES_PER_FRAME);
    assert_eq!(steps, 2 * 4389);
    assert_eq!(gb.cpu().regs.pc, 0x0100);

    gb.run_frame().unwrap();
    assert_eq!(gb.timestamp(), 2 * CYCLES_PER_FRAME);
}

#[test]
fn frame_overshoot_rounds_from_where_the_last_instruction_ended() {
    // DI; loop: JP loop. 4 T-states then 16 per iteration.
    let mut gb = machine(&[0xF3, 0xC3, 0x01, 0x01]);

    gb.run_frame().unwrap();
    assert_eq!(gb.timestamp(), 70_228);

    gb.run_frame().unwrap();
    assert_eq!(gb.timestamp(), 140_452);
}

#[test]
fn work_ram_is_echoed() {
    let mut gb = machine(&[0x18, 0xFE]);
    gb.interconnect_mut().write(0xC123, 0x5A).unwrap();
    assert_eq!(gb.peek(0xE123).unwrap(), 0x5A);
    gb.interconnect_mut().write(0xFDFF, 0x11).unwrap();
    assert_eq!(gb.peek(0xDDFF).unwrap(), 0x11);
    assert_eq!(gb.peek(0xFEA0).unwrap(), 0x00);
}

#[test]
fn serial_byte_reaches_the_sink() {
    // LD A,'H'; LDH (01),A; LD A,0x81; LDH (02),A; JR -2
    let mut gb = machine(&[0x3E, b'H', 0xE0, 0x01, 0x3E, 0x81, 0xE0, 0x02, 0x18, 0xFE]);
    let output = Rc::new(RefCell::new(Vec::new()));
    let sink = output.clone();
    gb.set_serial_sink(move |byte: u8| sink.borrow_mut().push(byte));

    gb.run_frame().unwrap();
    assert_eq!(*output.borrow(), b"H");
    assert_ne!(gb.peek(0xFF0F).unwrap() & Interrupt::SERIAL.bits(), 0);
    assert_eq!(gb.peek(0xFF02).unwrap() & 0x80, 0);
}

#[test]
fn oam_dma_copies_and_stalls() {
    // LD A,0xC0; LDH (46),A; JR -2
    let mut gb = machine(&[0x3E, 0xC0, 0xE0, 0x46, 0x18, 0xFE]);
    for offset in 0..0xA0u16 {
        gb.interconnect_mut()
            .write(0xC000 + offset, offset as u8 ^ 0x5A)
            .unwrap();
    }

    gb.step().unwrap();
    gb.step().unwrap();
    assert_eq!(gb.timestamp(), (2 + 3 + 160) * 4);
    for offset in 0..0xA0u16 {
        assert_eq!(gb.peek(0xFE00 + offset).unwrap(), offset as u8 ^ 0x5A);
    }
}

#[test]
fn timer_interrupt_wakes_halt_and_runs_the_handler() {
    // IE=TIMER; TAC=0x05; EI; HALT; JR -2. Handler at 0x50: INC B; RETI.
    let mut rom = rom_with(&[
        0x3E, 0x04, 0xE0, 0xFF, 0x3E, 0x05, 0xE0, 0x07, 0xFB, 0x76, 0x18, 0xFE,
    ]);
    rom[0x50] = 0x04;
    rom[0x51] = 0xD9;
    let mut gb = GameBoy::from_rom(&rom, EmulatorConfig::default()).unwrap();
    gb.cpu_mut().regs.b = 0;

    gb.run_frame().unwrap();
    assert!(gb.cpu().regs.b > 0);
    assert!(!gb.cpu().is_halted());
}

#[test]
fn joypad_reads_reflect_the_input_source() {
    // LD A,0x10; LDH (00),A; LDH A,(00); JR -2
    let mut gb = machine(&[0x3E, 0x10, 0xE0, 0x00, 0xF0, 0x00, 0x18, 0xFE]);
    gb.set_input_source(|| Buttons::START | Buttons::LEFT);
    for _ in 0..3 {
        gb.step().unwrap();
    }
    assert_eq!(gb.cpu().regs.a, 0xD7);
}

#[test]
fn stop_waits_for_a_button_press() {
    // STOP; JR -2
    let mut gb = machine(&[0x10, 0x00, 0x18, 0xFE]);
    let held = Rc::new(Cell::new(Buttons::empty()));
    let source = held.clone();
    gb.set_input_source(move || source.get());

    assert_eq!(gb.step().unwrap(), Execution::Instruction { opcode: 0x10 });
    assert!(gb.cpu().is_stopped());
    assert_eq!(gb.peek(0xFF04).unwrap(), 0x00);

    let stopped_at = gb.timestamp();
    assert_eq!(gb.step().unwrap(), Execution::Stopped);
    gb.run_frame().unwrap();
    assert_eq!(gb.timestamp(), stopped_at);

    held.set(Buttons::A);
    assert_eq!(gb.step().unwrap(), Execution::Instruction { opcode: 0x18 });
    assert!(!gb.cpu().is_stopped());
    assert_ne!(gb.peek(0xFF0F).unwrap() & Interrupt::JOYPAD.bits(), 0);
}

#[test]
fn boot_rom_is_replaced_by_the_cartridge_on_lockout() {
    let mut boot = vec![0x00; 0x100];
    // LD A,1; LDH (50),A
    boot[..4].copy_from_slice(&[0x3E, 0x01, 0xE0, 0x50]);
    let mut rom = rom_with(&[0x18, 0xFE]);
    rom[0x0000] = 0xC3;
    let config = EmulatorConfig::builder().boot_rom(boot).build();
    let mut gb = GameBoy::from_rom(&rom, config).unwrap();

    assert_eq!(gb.cpu().regs.pc, 0x0000);
    assert_eq!(gb.peek(0x0000).unwrap(), 0x3E);
    assert_eq!(gb.peek(0xFF50).unwrap(), TriggeredMapping::SENTINEL);

    gb.step().unwrap();
    gb.step().unwrap();
    assert_eq!(gb.cpu().regs.pc, 0x0004);
    assert_eq!(gb.peek(0x0000).unwrap(), 0xC3);
    assert_eq!(gb.peek(0x0100).unwrap(), 0x18);

    // The lockout register is gone after it fires.
    gb.interconnect_mut().write(0xFF50, 0x01).unwrap();
    assert_eq!(gb.peek(0x0000).unwrap(), 0xC3);
}

#[test]
fn boot_rom_must_be_256_bytes() {
    let config = EmulatorConfig::builder().boot_rom(vec![0; 100]).build();
    let result = GameBoy::from_rom(&rom_with(&[]), config);
    assert!(matches!(
        result.err(),
        Some(EmulationError::InvalidBootRom { len: 100 })
    ));
}

#[test]
fn unsupported_mappers_are_rejected() {
    let result = GameBoy::from_rom(&rom_of_type(0x05, &[]), EmulatorConfig::default());
    assert!(matches!(
        result.err(),
        Some(EmulationError::Cartridge(CartridgeError::UnsupportedMapper(0x05)))
    ));
}

#[test]
fn profiler_counts_instructions_and_frames() {
    let config = EmulatorConfig::builder().profile(true).build();
    let mut gb = GameBoy::from_rom(&rom_with(&[0x18, 0xFE]), config).unwrap();
    gb.run_frame().unwrap();

    let profiler = gb.profiler().unwrap();
    assert_eq!(profiler.instructions(), 5852);
    assert_eq!(profiler.opcode_count(0x18), 5852);

    let report = gb.profile_report().unwrap();
    assert_eq!(report.frames, 1);
    assert_eq!(report.hottest[0], (0x18, 5852));
}
