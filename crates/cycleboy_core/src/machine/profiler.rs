use std::time::{Duration, Instant};

use crate::clock::TSTATES_PER_MCYCLE;
use crate::CLOCK_HZ;

/// Execution statistics for one machine.
///
/// Owned by the `GameBoy` that feeds it; separate machines never share one.
#[derive(Debug)]
pub struct Profiler {
    started: Instant,
    instructions: u64,
    interrupts: u64,
    halted_cycles: u64,
    frames: u64,
    opcodes: Box<[u64; 256]>,
}

/// Snapshot produced by `Profiler::report`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileReport {
    pub instructions: u64,
    pub interrupts: u64,
    /// T-states spent halted.
    pub halted_cycles: u64,
    pub frames: u64,
    pub elapsed: Duration,
    /// Emulated time divided by wall time.
    pub speed: f64,
    /// Most executed opcodes, descending.
    pub hottest: Vec<(u8, u64)>,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            instructions: 0,
            interrupts: 0,
            halted_cycles: 0,
            frames: 0,
            opcodes: Box::new([0; 256]),
        }
    }

    pub fn record_instruction(&mut self, opcode: u8) {
        self.instructions += 1;
        self.opcodes[opcode as usize] += 1;
    }

    pub fn record_interrupt(&mut self) {
        self.interrupts += 1;
    }

    pub fn record_halted(&mut self, machine_cycles: u64) {
        self.halted_cycles += machine_cycles * TSTATES_PER_MCYCLE;
    }

    pub fn record_frame(&mut self) {
        self.frames += 1;
    }

    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    pub fn opcode_count(&self, opcode: u8) -> u64 {
        self.opcodes[opcode as usize]
    }

    /// Summarise and log. `timestamp` is the machine clock in T-states.
    pub fn report(&self, timestamp: u64) -> ProfileReport {
        let elapsed = self.started.elapsed();
        let emulated = timestamp as f64 / CLOCK_HZ as f64;
        let speed = if elapsed.is_zero() {
            0.0
        } else {
            emulated / elapsed.as_secs_f64()
        };

        let mut hottest: Vec<(u8, u64)> = self
            .opcodes
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(opcode, &count)| (opcode as u8, count))
            .collect();
        hottest.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        hottest.truncate(8);

        let report = ProfileReport {
            instructions: self.instructions,
            interrupts: self.interrupts,
            halted_cycles: self.halted_cycles,
            frames: self.frames,
            elapsed,
            speed,
            hottest,
        };
        log::info!(
            "Profile: {} instructions, {} interrupts, {} frames, {} halted T-states in {:.2?} ({:.2}x)",
            report.instructions,
            report.interrupts,
            report.frames,
            report.halted_cycles,
            report.elapsed,
            report.speed
        );
        report
    }
}
