//! # machine state
//!
//! Everything the interpreter can see or change: sixteen V registers, the
//! index register `I`, the program counter, a sixteen deep call stack, two
//! 60Hz countdown timers, the framebuffer, 4K of memory and a random number
//! source. Only the executor in [`crate::interpreter`] writes to it.
use crate::display::Framebuffer;
use crate::error::Result;
use crate::instruction::Reg;
use crate::memory::{Chip8MemoryMap, CHIP8_PROGRAM_ADDR};
use log::info;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::ops::{Index, IndexMut};

/// levels of subroutine nesting
pub const CHIP8_STACK_DEPTH: usize = 16;

/// index of VF, which carry, shift and draw instructions overwrite
pub const FLAG: usize = 0xf;

/// V0-VF. VF is an ordinary register that doubles as the flag output of
/// several instructions, so anything kept in it gets clobbered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registers([u8; 16]);

impl Registers {
    pub fn flag(&self) -> u8 {
        self.0[FLAG]
    }

    pub fn set_flag(&mut self, value: u8) {
        self.0[FLAG] = value;
    }

    /// V0 to `last` inclusive
    pub fn up_to(&self, last: Reg) -> &[u8] {
        &self.0[..=last.index()]
    }

    pub fn up_to_mut(&mut self, last: Reg) -> &mut [u8] {
        &mut self.0[..=last.index()]
    }
}

impl Index<Reg> for Registers {
    type Output = u8;

    fn index(&self, reg: Reg) -> &u8 {
        &self.0[reg.index()]
    }
}

impl IndexMut<Reg> for Registers {
    fn index_mut(&mut self, reg: Reg) -> &mut u8 {
        &mut self.0[reg.index()]
    }
}

pub struct Machine {
    pub memory: Chip8MemoryMap,
    pub registers: Registers,
    pub stack: [u16; CHIP8_STACK_DEPTH],
    pub sp: usize,
    pub pc: u16,
    pub i: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub display: Framebuffer,
    pub(crate) rng: Box<dyn RngCore>,
}

impl Machine {
    /// a fresh machine running `program`, with randomness seeded from the OS
    pub fn new(program: &[u8]) -> Result<Self> {
        Self::with_rng(program, Box::new(StdRng::from_entropy()))
    }

    /// as [`Machine::new`] with a caller supplied random source
    pub fn with_rng(program: &[u8], rng: Box<dyn RngCore>) -> Result<Self> {
        let mut memory = Chip8MemoryMap::new();
        memory.load_program(program)?;
        info!("loaded {} byte program at {:#05x}", program.len(), CHIP8_PROGRAM_ADDR);
        Ok(Machine {
            memory,
            registers: Registers::default(),
            stack: [0; CHIP8_STACK_DEPTH],
            sp: 0,
            pc: CHIP8_PROGRAM_ADDR,
            i: 0,
            delay_timer: 0,
            sound_timer: 0,
            display: Framebuffer::new(),
            rng,
        })
    }

    /// one 60Hz tick: both timers count down, stopping at zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// the return addresses currently on the stack, oldest first
    pub fn call_stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Chip8Error;
    use crate::memory::{MemoryMap, CHIP8_MAX_PROGRAM_BYTES};

    #[test]
    fn test_initial_state() -> Result<()> {
        let m = Machine::new(&[0x00, 0xe0, 0x12, 0x00])?;
        assert_eq!(m.pc, 0x200);
        assert_eq!(m.i, 0);
        assert_eq!(m.sp, 0);
        assert!(m.call_stack().is_empty());
        assert_eq!(m.registers, Registers::default());
        assert_eq!(m.delay_timer, 0);
        assert_eq!(m.sound_timer, 0);
        assert_eq!(m.display, Framebuffer::new());
        assert_eq!(m.memory.get_ro_slice(0x200, 4)?, &[0x00, 0xe0, 0x12, 0x00]);
        assert_eq!(m.memory.get_byte(0x050)?, 0xf0);
        Ok(())
    }

    #[test]
    fn test_oversized_program_rejected() {
        let program = vec![0; CHIP8_MAX_PROGRAM_BYTES + 1];
        assert!(matches!(
            Machine::new(&program),
            Err(Chip8Error::ProgramTooLarge { .. })
        ));
    }

    #[test]
    fn test_timers_stop_at_zero() -> Result<()> {
        let mut m = Machine::new(&[])?;
        m.delay_timer = 5;
        m.sound_timer = 2;
        m.tick_timers();
        assert_eq!(m.delay_timer, 4);
        assert_eq!(m.sound_timer, 1);
        for _ in 0..4 {
            m.tick_timers();
        }
        assert_eq!(m.delay_timer, 0);
        assert_eq!(m.sound_timer, 0);
        m.tick_timers();
        assert_eq!(m.delay_timer, 0);
        assert_eq!(m.sound_timer, 0);
        Ok(())
    }

    #[test]
    fn test_flag_is_vf() {
        let mut r = Registers::default();
        r.set_flag(1);
        assert_eq!(r[Reg::new(0xf)], 1);
        r[Reg::new(0xf)] = 0;
        assert_eq!(r.flag(), 0);
    }

    #[test]
    fn test_register_ranges() {
        let mut r = Registers::default();
        r.up_to_mut(Reg::new(2)).copy_from_slice(&[1, 2, 3]);
        assert_eq!(r.up_to(Reg::new(3)), &[1, 2, 3, 0]);
        assert_eq!(r.up_to(Reg::new(0xf)).len(), 16);
    }
}
