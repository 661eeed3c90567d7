use std::io;
use thiserror::Error;

/// Everything that can stop the machine. None of these are recoverable: the
/// driver bails out of its loop as soon as one is returned.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program is too large ({size} bytes), max size is {max_size} bytes")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("unknown opcode {opcode:#06x} at {addr:#05x}")]
    UnknownOpcode { opcode: u16, addr: u16 },

    #[error("stack overflow: call at {addr:#05x} nested deeper than 16 levels")]
    StackOverflow { addr: u16 },

    #[error("stack underflow: return at {addr:#05x} with an empty call stack")]
    StackUnderflow { addr: u16 },

    #[error("memory access out of bounds at {address:#06x}")]
    MemoryOutOfBounds { address: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
