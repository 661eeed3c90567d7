//! # interpreter
//!
//! Fetch, decode and execute. `pc` moves past the instruction before it runs,
//! so jumps and calls overwrite the advanced value, skips add another 2, and
//! a return lands on the instruction after the call.
//!
//! Dialect choices, fixed rather than configurable:
//!  * 8XY6 / 8XYE shift a copy of VY into VX (COSMAC VIP behaviour)
//!  * 8XY4 and FX1E only ever write VF on overflow, never clear it
//!  * 8XY5 wraps and leaves VF alone; 8XY7 bottoms out at zero
//!  * FX55 / FX65 leave I unchanged
//!  * DXYN wraps the origin onto the screen and clips the sprite
use crate::display::{Display, Framebuffer};
use crate::error::{Chip8Error, Result};
use crate::input::Input;
use crate::instruction::{Instruction, Reg};
use crate::machine::{Machine, CHIP8_STACK_DEPTH};
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::sound::Sound;
use log::{trace, warn};
use rand::Rng;

impl Machine {
    /// fetch and decode the instruction at `pc`, then run it
    pub fn cycle(&mut self, input: &mut dyn Input) -> Result<Instruction> {
        let addr = self.pc;
        let word = self.memory.get_word(addr)?;
        let instr =
            Instruction::decode(word).ok_or(Chip8Error::UnknownOpcode { opcode: word, addr })?;
        trace!("{:#05x}: {:04x}  {}", addr, word, instr);

        self.pc = addr.wrapping_add(2);
        self.execute(instr, input)?;
        Ok(instr)
    }

    /// run one decoded instruction; `pc` should already point past it
    pub fn execute(&mut self, instr: Instruction, input: &mut dyn Input) -> Result<()> {
        use Instruction::*;

        let v = &mut self.registers;
        let mut skip = false;
        match instr {
            ClearScreen => self.display.clear(),
            Return => {
                if self.sp == 0 {
                    return Err(Chip8Error::StackUnderflow {
                        addr: self.pc.wrapping_sub(2),
                    });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp];
            }
            Jump(addr) => self.pc = addr,
            Call(addr) => {
                if self.sp == CHIP8_STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow {
                        addr: self.pc.wrapping_sub(2),
                    });
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = addr;
            }
            SkipIfEqByte(x, nn) => skip = v[x] == nn,
            SkipIfNotEqByte(x, nn) => skip = v[x] != nn,
            SkipIfEqReg(x, y) => skip = v[x] == v[y],
            LoadByte(x, nn) => v[x] = nn,
            AddByte(x, nn) => v[x] = v[x].wrapping_add(nn),
            LoadReg(x, y) => v[x] = v[y],
            Or(x, y) => v[x] |= v[y],
            And(x, y) => v[x] &= v[y],
            Xor(x, y) => v[x] ^= v[y],
            AddReg(x, y) => {
                let (sum, carry) = v[x].overflowing_add(v[y]);
                v[x] = sum;
                if carry {
                    v.set_flag(1);
                }
            }
            Sub(x, y) => v[x] = v[x].wrapping_sub(v[y]),
            ShiftRight(x, y) => {
                let before = v[y];
                v[x] = before >> 1;
                v.set_flag(before & 0x01);
            }
            SubReversed(x, y) => v[x] = v[y].checked_sub(v[x]).unwrap_or(0),
            ShiftLeft(x, y) => {
                let before = v[y];
                v[x] = before << 1;
                v.set_flag(before >> 7);
            }
            SkipIfNotEqReg(x, y) => skip = v[x] != v[y],
            LoadIndex(addr) => self.i = addr,
            JumpOffset(addr) => self.pc = addr + v[Reg::V0] as u16,
            Random(x, nn) => v[x] = self.rng.gen::<u8>() & nn,
            Draw(x, y, n) => {
                let (vx, vy) = (v[x], v[y]);
                let rows = Framebuffer::visible_rows(vy, n as usize);
                let sprite = self.memory.get_ro_slice(self.i, rows)?;
                let collided = self.display.draw_sprite(vx, vy, sprite);
                v.set_flag(collided as u8);
            }
            SkipIfKeyDown(x) => skip = input.is_key_down(v[x] & 0x0f)?,
            SkipIfKeyUp(x) => skip = !input.is_key_down(v[x] & 0x0f)?,
            LoadDelay(x) => v[x] = self.delay_timer,
            WaitKey(x) => match input.first_key_down()? {
                Some(key) => v[x] = key,
                // come back to this instruction next cycle
                None => self.pc = self.pc.wrapping_sub(2),
            },
            SetDelay(x) => self.delay_timer = v[x],
            SetSound(x) => self.sound_timer = v[x],
            AddIndex(x) => {
                let (sum, overflow) = self.i.overflowing_add(v[x] as u16);
                self.i = sum;
                if overflow {
                    v.set_flag(1);
                }
            }
            LoadGlyph(x) => self.i = Chip8MemoryMap::glyph_addr(v[x]),
            StoreBcd(x) => {
                let n = v[x];
                self.memory.write(&[n / 100, n / 10 % 10, n % 10], self.i)?;
            }
            StoreRegs(x) => self.memory.write(v.up_to(x), self.i)?,
            LoadRegs(x) => {
                let src = self.memory.get_ro_slice(self.i, x.index() + 1)?;
                v.up_to_mut(x).copy_from_slice(src);
            }
        }

        if skip {
            self.pc = self.pc.wrapping_add(2);
        }
        Ok(())
    }
}

/// Ties a [`Machine`] to the outside world: the keyboard it polls, the screen
/// it is shown on and the beeper driven by the sound timer.
pub struct Chip8Interpreter<'a> {
    machine: Machine,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    beeping: bool,
    sound_failed: bool,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        machine: Machine,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Chip8Interpreter<'a> {
        Chip8Interpreter {
            machine,
            display,
            input,
            sound,
            beeping: false,
            sound_failed: false,
        }
    }

    /// run one instruction
    pub fn cycle(&mut self) -> Result<Instruction> {
        self.machine.cycle(&mut *self.input)
    }

    /// timer interrupt: read the keyboard, count the timers down, start or
    /// stop the tone, and show the frame
    pub fn interrupt(&mut self) -> Result<()> {
        self.input.poll()?;
        self.machine.tick_timers();

        let should_beep = self.machine.sound_timer > 0;
        if should_beep != self.beeping {
            self.toggle_sound(should_beep);
            self.beeping = should_beep;
        }

        self.display.draw(&self.machine.display)?;
        Ok(())
    }

    /// a beeper that fails once is left alone for the rest of the run
    fn toggle_sound(&mut self, on: bool) {
        if self.sound_failed {
            return;
        }
        let toggled = if on {
            self.sound.beep()
        } else {
            self.sound.stop()
        };
        if let Err(e) = toggled {
            warn!("sound device failed, carrying on silently: {}", e);
            self.sound_failed = true;
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }
}
