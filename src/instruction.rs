//! # instruction set
//!
//! Every instruction is one big-endian 16 bit word. The top nibble picks the
//! family; families 0x0, 0x8, 0xE and 0xF are shared by several instructions
//! and need a second look at the low bits. Operand names follow the usual
//! CHIP-8 notation:
//!
//! * `X`, `Y` - register selectors (second and third nibbles)
//! * `N` - 4 bit count (fourth nibble)
//! * `NN` - 8 bit immediate (low byte)
//! * `NNN` - 12 bit address (low three nibbles)
use crate::bits::field;
use std::fmt;

/// one of the sixteen V registers, 0x0-0xf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(u8);

impl Reg {
    pub const V0: Reg = Reg(0);
    pub const VF: Reg = Reg(0xf);

    /// only the low nibble of `index` is used
    pub fn new(index: u8) -> Self {
        Reg(index & 0x0f)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipIfEqByte(Reg, u8),
    /// 4XNN
    SkipIfNotEqByte(Reg, u8),
    /// 5XY0
    SkipIfEqReg(Reg, Reg),
    /// 6XNN
    LoadByte(Reg, u8),
    /// 7XNN
    AddByte(Reg, u8),
    /// 8XY0
    LoadReg(Reg, Reg),
    /// 8XY1
    Or(Reg, Reg),
    /// 8XY2
    And(Reg, Reg),
    /// 8XY3
    Xor(Reg, Reg),
    /// 8XY4
    AddReg(Reg, Reg),
    /// 8XY5
    Sub(Reg, Reg),
    /// 8XY6
    ShiftRight(Reg, Reg),
    /// 8XY7
    SubReversed(Reg, Reg),
    /// 8XYE
    ShiftLeft(Reg, Reg),
    /// 9XY0
    SkipIfNotEqReg(Reg, Reg),
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random(Reg, u8),
    /// DXYN
    Draw(Reg, Reg, u8),
    /// EX9E
    SkipIfKeyDown(Reg),
    /// EXA1
    SkipIfKeyUp(Reg),
    /// FX07
    LoadDelay(Reg),
    /// FX0A
    WaitKey(Reg),
    /// FX15
    SetDelay(Reg),
    /// FX18
    SetSound(Reg),
    /// FX1E
    AddIndex(Reg),
    /// FX29
    LoadGlyph(Reg),
    /// FX33
    StoreBcd(Reg),
    /// FX55
    StoreRegs(Reg),
    /// FX65
    LoadRegs(Reg),
}

impl Instruction {
    /// Decode a raw instruction word. `None` means the word isn't a known
    /// instruction; 0NNN machine code calls included.
    pub fn decode(word: u16) -> Option<Instruction> {
        use Instruction::*;

        let op = field::<4, _>(word, 0);
        let x = Reg(field::<4, _>(word, 4) as u8);
        let y = Reg(field::<4, _>(word, 8) as u8);
        let n = field::<4, _>(word, 12) as u8;
        let nn = field::<8, _>(word, 8) as u8;
        let nnn = field::<12, _>(word, 4);

        let instr = match op {
            0x0 => match nnn {
                0x0e0 => ClearScreen,
                0x0ee => Return,
                _ => return None,
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipIfEqByte(x, nn),
            0x4 => SkipIfNotEqByte(x, nn),
            0x5 => SkipIfEqReg(x, y),
            0x6 => LoadByte(x, nn),
            0x7 => AddByte(x, nn),
            0x8 => match n {
                0x0 => LoadReg(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => AddReg(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x, y),
                0x7 => SubReversed(x, y),
                0xe => ShiftLeft(x, y),
                _ => return None,
            },
            0x9 => SkipIfNotEqReg(x, y),
            0xa => LoadIndex(nnn),
            0xb => JumpOffset(nnn),
            0xc => Random(x, nn),
            0xd => Draw(x, y, n),
            0xe => match nn {
                0x9e => SkipIfKeyDown(x),
                0xa1 => SkipIfKeyUp(x),
                _ => return None,
            },
            0xf => match nn {
                0x07 => LoadDelay(x),
                0x0a => WaitKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1e => AddIndex(x),
                0x29 => LoadGlyph(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegs(x),
                0x65 => LoadRegs(x),
                _ => return None,
            },
            _ => return None,
        };
        Some(instr)
    }
}

/// disassembly, for the trace log
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP {:#05x}", a),
            Call(a) => write!(f, "CALL {:#05x}", a),
            SkipIfEqByte(x, nn) => write!(f, "SE {}, {:#04x}", x, nn),
            SkipIfNotEqByte(x, nn) => write!(f, "SNE {}, {:#04x}", x, nn),
            SkipIfEqReg(x, y) => write!(f, "SE {}, {}", x, y),
            LoadByte(x, nn) => write!(f, "LD {}, {:#04x}", x, nn),
            AddByte(x, nn) => write!(f, "ADD {}, {:#04x}", x, nn),
            LoadReg(x, y) => write!(f, "LD {}, {}", x, y),
            Or(x, y) => write!(f, "OR {}, {}", x, y),
            And(x, y) => write!(f, "AND {}, {}", x, y),
            Xor(x, y) => write!(f, "XOR {}, {}", x, y),
            AddReg(x, y) => write!(f, "ADD {}, {}", x, y),
            Sub(x, y) => write!(f, "SUB {}, {}", x, y),
            ShiftRight(x, y) => write!(f, "SHR {}, {}", x, y),
            SubReversed(x, y) => write!(f, "SUBN {}, {}", x, y),
            ShiftLeft(x, y) => write!(f, "SHL {}, {}", x, y),
            SkipIfNotEqReg(x, y) => write!(f, "SNE {}, {}", x, y),
            LoadIndex(a) => write!(f, "LD I, {:#05x}", a),
            JumpOffset(a) => write!(f, "JP V0, {:#05x}", a),
            Random(x, nn) => write!(f, "RND {}, {:#04x}", x, nn),
            Draw(x, y, n) => write!(f, "DRW {}, {}, {}", x, y, n),
            SkipIfKeyDown(x) => write!(f, "SKP {}", x),
            SkipIfKeyUp(x) => write!(f, "SKNP {}", x),
            LoadDelay(x) => write!(f, "LD {}, DT", x),
            WaitKey(x) => write!(f, "LD {}, K", x),
            SetDelay(x) => write!(f, "LD DT, {}", x),
            SetSound(x) => write!(f, "LD ST, {}", x),
            AddIndex(x) => write!(f, "ADD I, {}", x),
            LoadGlyph(x) => write!(f, "LD F, {}", x),
            StoreBcd(x) => write!(f, "LD B, {}", x),
            StoreRegs(x) => write!(f, "LD [I], {}", x),
            LoadRegs(x) => write!(f, "LD {}, [I]", x),
        }
    }
}
