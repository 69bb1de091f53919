//! The 4 KiB address space, with the font at the bottom and the program from 0x200.

use super::error::{LoadError, VmError};
use crate::util::bit_splitter::BitSplitter;

pub const MEM_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = MEM_SIZE - PROGRAM_START as usize;

/// Bytes per font glyph.
pub const GLYPH_SIZE: u16 = 5;

pub const FONT: [u8; 80] = [
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

/// Flat byte store. Every access is bounds checked and reported, never wrapped.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    /// Memory holding only the font.
    pub fn new() -> Memory {
        let mut bytes = [0; MEM_SIZE];
        bytes[..FONT.len()].copy_from_slice(&FONT);
        Memory { bytes }
    }

    pub(crate) fn from_bytes(bytes: [u8; MEM_SIZE]) -> Memory {
        Memory { bytes }
    }

    /// Copy a program into memory at 0x200.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::RomTooLarge {
                len: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.bytes[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    pub fn read(&self, addr: usize) -> Result<u8, VmError> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(VmError::AddressOutOfRange { addr })
    }

    /// The `len` bytes starting at `addr`.
    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8], VmError> {
        self.bytes.get(addr..addr + len).ok_or(VmError::AddressOutOfRange {
            addr: addr + len.saturating_sub(1),
        })
    }

    pub fn slice_mut(&mut self, addr: usize, len: usize) -> Result<&mut [u8], VmError> {
        self.bytes
            .get_mut(addr..addr + len)
            .ok_or(VmError::AddressOutOfRange {
                addr: addr + len.saturating_sub(1),
            })
    }

    /// Fetch the big-endian opcode at `pc`. Both bytes must be in range.
    pub fn opcode_at(&self, pc: u16) -> Result<u16, VmError> {
        let pair = self.slice(pc as usize, 2)?;
        Ok(BitSplitter::from_bytes(pair[0], pair[1]).value())
    }

    pub fn bytes(&self) -> &[u8; MEM_SIZE] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.bytes.iter().filter(|b| **b != 0).count();
        f.debug_struct("Memory").field("nonzero_bytes", &used).finish()
    }
}
