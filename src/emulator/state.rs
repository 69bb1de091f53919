//! The complete mutable state of the machine, as one owned value.

use super::display::Display;
use super::error::LoadError;
use super::keypad::Keypad;
use super::memory::{Memory, PROGRAM_START};
use super::stack::CallStack;
use super::variant::Variant;
use std::path::Path;

pub const NUM_REGISTERS: usize = 16;

/// Index of VF, the carry, borrow and collision flag.
pub const FLAG: usize = 0xF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; NUM_REGISTERS],
    pub i: u16,
    pub pc: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Registers {
            v: [0; NUM_REGISTERS],
            i: 0,
            pc: PROGRAM_START,
            delay_timer: 0,
            sound_timer: 0,
        }
    }
}

/// Whether the engine fetches instructions or is suspended in FX0A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Running,
    /// Waiting for any key to go down. The key will be stored in the register.
    AwaitingKeyPress(u8),
    /// `key` went down; waiting for it to come back up.
    AwaitingKeyRelease(u8, u8),
}

impl Default for ExecState {
    fn default() -> Self {
        ExecState::Running
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmState {
    pub memory: Memory,
    pub registers: Registers,
    pub stack: CallStack,
    pub display: Display,
    pub keypad: Keypad,
    pub exec: ExecState,
    pub variant: Variant,
}

impl VmState {
    /// A freshly reset machine with no program.
    pub fn new(variant: Variant) -> VmState {
        VmState {
            memory: Memory::new(),
            registers: Registers::default(),
            stack: CallStack::new(),
            display: Display::new(),
            keypad: Keypad::new(),
            exec: ExecState::Running,
            variant,
        }
    }

    /// Reset everything and place `rom` at 0x200.
    pub fn load(rom: &[u8], variant: Variant) -> Result<VmState, LoadError> {
        let mut state = VmState::new(variant);
        state.memory.load_rom(rom)?;
        log::debug!("Loaded {} byte rom as {}", rom.len(), variant);
        Ok(state)
    }

}

/// Read a rom, mapping failures to `LoadError::RomUnreadable`.
pub fn read_rom(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::RomUnreadable {
        path: path.to_path_buf(),
        source,
    })
}
