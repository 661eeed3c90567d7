//! # clock
//!
//! Two fixed-rate schedules against the monotonic clock: instructions (700Hz
//! by default) and the timer interrupt (60Hz). Neither counts the other; each
//! keeps its own deadline and moves it on by exactly one period when it
//! fires, so jitter doesn't accumulate and a stall is caught up one tick per
//! loop iteration rather than skipped.
use crate::error::Result;
use crate::interpreter::Chip8Interpreter;
use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub const DEFAULT_INSTRUCTION_HZ: u32 = 700;
pub const DEFAULT_TIMER_HZ: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    pub instruction_hz: u32,
    pub timer_hz: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            instruction_hz: DEFAULT_INSTRUCTION_HZ,
            timer_hz: DEFAULT_TIMER_HZ,
        }
    }
}

/// a deadline that re-arms itself one period later each time it fires
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    period: Duration,
    next: Instant,
}

impl Schedule {
    /// first fires one period after `start`; a rate of 0 is treated as 1Hz
    pub fn new(hz: u32, start: Instant) -> Self {
        let period = Duration::from_secs(1) / hz.max(1);
        Schedule {
            period,
            next: start + period,
        }
    }

    /// has the deadline passed? fires at most once per call
    pub fn poll(&mut self, now: Instant) -> bool {
        if now >= self.next {
            self.next += self.period;
            true
        } else {
            false
        }
    }

    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// what fired on one pass of the driver loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ticks {
    pub timer: bool,
    pub instruction: bool,
}

pub struct ClockDriver {
    timers: Schedule,
    instructions: Schedule,
}

impl ClockDriver {
    pub fn new(config: ClockConfig, start: Instant) -> Self {
        ClockDriver {
            timers: Schedule::new(config.timer_hz, start),
            instructions: Schedule::new(config.instruction_hz, start),
        }
    }

    /// check both schedules against `now`, running whatever is due: the
    /// timer interrupt first, then one instruction
    pub fn step(&mut self, interpreter: &mut Chip8Interpreter, now: Instant) -> Result<Ticks> {
        let mut ticks = Ticks::default();
        if self.timers.poll(now) {
            interpreter.interrupt()?;
            ticks.timer = true;
        }
        if self.instructions.poll(now) {
            interpreter.cycle()?;
            ticks.instruction = true;
        }
        Ok(ticks)
    }

    /// the earliest moment anything is due
    pub fn next_deadline(&self) -> Instant {
        self.timers
            .next_deadline()
            .min(self.instructions.next_deadline())
    }

    /// Drive `interpreter` in real time until `stop` is raised or the machine
    /// hits a fatal error. `stop` is checked once per iteration, so a program
    /// spinning on FX0A can still be stopped.
    pub fn run(&mut self, interpreter: &mut Chip8Interpreter, stop: &AtomicBool) -> Result<()> {
        info!(
            "running; instructions every {:?}, timers every {:?}",
            self.instructions.period(),
            self.timers.period()
        );
        while !stop.load(Ordering::Relaxed) {
            let ticks = self.step(interpreter, Instant::now()).map_err(|e| {
                error!("stopping at {:#05x}: {}", interpreter.machine().pc, e);
                e
            })?;
            if ticks == Ticks::default() {
                let now = Instant::now();
                let deadline = self.next_deadline();
                if deadline > now {
                    spin_sleep::sleep(deadline - now);
                }
            }
        }
        info!("stop requested");
        Ok(())
    }
}
