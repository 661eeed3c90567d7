use crate::error::{Chip8Error, Result};

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the flat, byte addressable memory of the machine
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<()> {
        let bytes = self.get_rw_slice(addr, data.len())?;
        bytes.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    fn get_byte(&self, addr: u16) -> Result<u8> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// largest program that fits between the load address and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  unused
///   0x0050-0x009f  hex digit glyphs
///   0x00a0-0x01ff  unused
///   0x0200-0x0fff  program
///
/// the stack and display live outside of addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let range = checked_range(addr, len)?;
        Ok(&mut self.bytes[range])
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let range = checked_range(addr, len)?;
        Ok(&self.bytes[range])
    }
}

fn checked_range(addr: u16, len: usize) -> Result<std::ops::Range<usize>> {
    let a = addr as usize;
    let end = a + len;
    if end > CHIP8_RAM_SIZE_BYTES {
        // report the first byte that doesn't exist
        return Err(Chip8Error::MemoryOutOfBounds {
            address: a.max(CHIP8_RAM_SIZE_BYTES),
        });
    }
    Ok(a..end)
}

impl Chip8MemoryMap {
    /// zeroed memory with the glyph table baked in
    pub fn new() -> Self {
        let mut bytes = Box::new([0u8; CHIP8_RAM_SIZE_BYTES]);
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap { bytes }
    }

    /// load a CHIP-8 program at 0x200, refusing anything that would run off
    /// the top of RAM
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max_size: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write(program, CHIP8_PROGRAM_ADDR)
    }

    /// address of the glyph for a hex digit; only the low nibble counts
    pub fn glyph_addr(digit: u8) -> u16 {
        CHIP8_FONT_ADDR + (digit & 0x0f) as u16 * CHIP8_GLYPH_BYTES
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

pub const CHIP8_FONT_ADDR: u16 = 0x050;
const CHIP8_GLYPH_BYTES: u16 = 5;
const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed apart from the font
        assert_eq!(m.bytes[..0x50], [0; 0x50]);
        assert_eq!(m.bytes[0xa0..], [0; 0xf60]);
    }

    #[test]
    fn test_font_loaded() -> Result<()> {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(0x050, 5)?, &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        let f = Chip8MemoryMap::glyph_addr(0xf);
        assert_eq!(f, 0x09b);
        assert_eq!(m.get_ro_slice(f, 5)?, &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        Ok(())
    }

    #[test]
    fn test_glyph_addr_masks_high_nibble() {
        assert_eq!(Chip8MemoryMap::glyph_addr(0x1a), Chip8MemoryMap::glyph_addr(0xa));
    }

    #[test]
    fn test_write_slice_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 8)?;
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<()> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300)?;
        assert_eq!(m.get_word(0x304)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_read_past_top_of_ram() {
        let m = Chip8MemoryMap::new();
        assert!(m.get_word(0xffe).is_ok());
        assert!(matches!(
            m.get_word(0xfff),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(matches!(
            m.get_byte(0x1234),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1234 })
        ));
    }

    #[test]
    fn test_write_too_much_fails() {
        let mut dst = Chip8MemoryMap::new();
        assert!(dst.write(&[0; 8], 4089).is_err());
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0x00, 0xe0])?; // clear screen
        assert_eq!(dst.get_ro_slice(0x200, 2)?, &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_fills_memory_exactly() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_program(&[0xaa; CHIP8_MAX_PROGRAM_BYTES])?;
        assert_eq!(dst.get_byte(0xfff)?, 0xaa);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        match dst.load_program(&[0; CHIP8_MAX_PROGRAM_BYTES + 1]) {
            Err(Chip8Error::ProgramTooLarge { size, max_size }) => {
                assert_eq!(size, 0xe01);
                assert_eq!(max_size, 0xe00);
            }
            _ => panic!("oversized program was accepted"),
        }
    }
}
