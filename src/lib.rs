//! # chip8vm
//!
//! A CHIP-8 virtual machine: 4K of memory, sixteen 8 bit registers, a sixteen
//! deep call stack, two 60Hz timers and a 64x32 monochrome screen.
//!
//! ## Design
//!
//! * one instruction set, with the dialect questions answered once (see
//!   [`interpreter`]) rather than switched at runtime
//! * [`machine::Machine`] is a plain value that owns all the state; it is
//!   handed to the interpreter, never held globally, so tests build one,
//!   poke it, and step it
//! * decoding produces a closed [`instruction::Instruction`] enum, executed
//!   by a single exhaustive match
//! * the screen, keyboard and beeper are traits, so a terminal frontend and
//!   test dummies plug in the same way
//! * [`clock::ClockDriver`] runs instructions and timers from two separate
//!   wall-clock deadlines; timers don't count instructions
//!
//! Model
//!
//! ```text
//! main
//!  |-- display, input, sound, program bytes
//!  |-- machine(program)
//!  |-- interpreter(machine, display, input, sound)
//!  `-- clock driver loop, until stop or a fatal error
//!       |-- timer deadline due?       -> interpreter.interrupt()
//!       |                                 (timers, beeper, draw frame)
//!       |-- instruction deadline due? -> interpreter.cycle()
//!       |                                 (fetch, decode, execute)
//!       `-- otherwise sleep until the nearest deadline
//! ```
pub mod bits;
pub mod clock;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod machine;
pub mod memory;
pub mod sound;

pub use error::{Chip8Error, Result};
