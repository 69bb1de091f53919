//! Versioned binary snapshots of the machine state.
//!
//! Version 1 layout, all multi-byte fields big-endian:
//!
//! | Offset | Size | Field |
//! |-------:|-----:|-------|
//! |      0 |    4 | magic `C8VM` |
//! |      4 |    2 | version |
//! |      6 | 4096 | memory |
//! |   4102 |  256 | display, 8 pixels per byte, row-major, leftmost pixel in the high bit |
//! |   4358 |   32 | call stack slots, 16 x u16, unused slots zero |
//! |   4390 |    1 | call stack depth |
//! |   4391 |   16 | V0 to VF |
//! |   4407 |    2 | I |
//! |   4409 |    2 | PC |
//! |   4411 |    1 | delay timer |
//! |   4412 |    1 | sound timer |
//! |   4413 |   16 | keypad, one byte per key, 0 or 1 |
//! |   4429 |    3 | execution state: tag, register, key |
//!
//! The execution state tag is 0 for running, 1 while waiting for a key press
//! and 2 while waiting for the key to be released. The variant is not saved:
//! it is configuration, and a restore keeps the one already running.

use super::display::{Display, SCREEN_SIZE};
use super::error::SnapshotError;
use super::keypad::{Keypad, NUM_KEYS};
use super::memory::{Memory, MEM_SIZE};
use super::stack::{CallStack, STACK_SIZE};
use super::state::{ExecState, Registers, VmState, NUM_REGISTERS};
use super::variant::Variant;
use std::path::Path;

pub const MAGIC: [u8; 4] = *b"C8VM";
pub const VERSION: u16 = 1;

const HEADER_SIZE: usize = 6;
const DISPLAY_BYTES: usize = SCREEN_SIZE / 8;
pub const SNAPSHOT_SIZE: usize = HEADER_SIZE
    + MEM_SIZE
    + DISPLAY_BYTES
    + STACK_SIZE * 2
    + 1
    + NUM_REGISTERS
    + 2
    + 2
    + 1
    + 1
    + NUM_KEYS
    + 3;

const TAG_RUNNING: u8 = 0;
const TAG_AWAITING_PRESS: u8 = 1;
const TAG_AWAITING_RELEASE: u8 = 2;

pub fn encode(state: &VmState) -> Vec<u8> {
    let mut out = Vec::with_capacity(SNAPSHOT_SIZE);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_be_bytes());

    out.extend_from_slice(state.memory.bytes());

    for chunk in state.display.pixels().chunks(8) {
        let packed = chunk
            .iter()
            .fold(0u8, |byte, lit| (byte << 1) | *lit as u8);
        out.push(packed);
    }

    for slot in state.stack.slots() {
        out.extend_from_slice(&slot.to_be_bytes());
    }
    out.push(state.stack.depth() as u8);

    let regs = &state.registers;
    out.extend_from_slice(&regs.v);
    out.extend_from_slice(&regs.i.to_be_bytes());
    out.extend_from_slice(&regs.pc.to_be_bytes());
    out.push(regs.delay_timer);
    out.push(regs.sound_timer);

    out.extend(state.keypad.keys().iter().map(|pressed| *pressed as u8));

    let (tag, register, key) = match state.exec {
        ExecState::Running => (TAG_RUNNING, 0, 0),
        ExecState::AwaitingKeyPress(x) => (TAG_AWAITING_PRESS, x, 0),
        ExecState::AwaitingKeyRelease(x, key) => (TAG_AWAITING_RELEASE, x, key),
    };
    out.extend_from_slice(&[tag, register, key]);

    debug_assert_eq!(out.len(), SNAPSHOT_SIZE);
    out
}

/// Cursor over a snapshot that reports running out of bytes as corruption.
struct Reader<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], SnapshotError> {
        let field = self
            .bytes
            .get(self.at..self.at + len)
            .ok_or_else(|| corrupt(format!("truncated in {}", what)))?;
        self.at += len;
        Ok(field)
    }

    fn u8(&mut self, what: &str) -> Result<u8, SnapshotError> {
        Ok(self.take(1, what)?[0])
    }

    fn u16(&mut self, what: &str) -> Result<u16, SnapshotError> {
        let pair = self.take(2, what)?;
        Ok(u16::from_be_bytes([pair[0], pair[1]]))
    }

    fn flag(&mut self, what: &str) -> Result<bool, SnapshotError> {
        match self.u8(what)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(corrupt(format!("{} byte is {}, expected 0 or 1", what, other))),
        }
    }
}

fn corrupt(reason: String) -> SnapshotError {
    SnapshotError::Corrupt(reason)
}

fn check_index(value: u8, limit: usize, what: &str) -> Result<u8, SnapshotError> {
    if (value as usize) < limit {
        Ok(value)
    } else {
        Err(corrupt(format!("{} {:#x} is out of range", what, value)))
    }
}

/// Rebuild a complete state from a snapshot. Nothing is applied unless all of it is valid.
pub fn decode(bytes: &[u8], variant: Variant) -> Result<VmState, SnapshotError> {
    let mut reader = Reader { bytes, at: 0 };

    if reader.take(4, "magic")? != MAGIC {
        return Err(corrupt("not a snapshot, magic is wrong".to_string()));
    }
    let version = reader.u16("version")?;
    if version != VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    if bytes.len() != SNAPSHOT_SIZE {
        return Err(corrupt(format!(
            "expected {} bytes, got {}",
            SNAPSHOT_SIZE,
            bytes.len()
        )));
    }

    let mut memory = [0; MEM_SIZE];
    memory.copy_from_slice(reader.take(MEM_SIZE, "memory")?);

    let mut pixels = [false; SCREEN_SIZE];
    let packed = reader.take(DISPLAY_BYTES, "display")?;
    for (n, pixel) in pixels.iter_mut().enumerate() {
        *pixel = packed[n / 8] & (0x80 >> (n % 8)) != 0;
    }

    let mut slots = [0; STACK_SIZE];
    for slot in slots.iter_mut() {
        *slot = reader.u16("call stack")?;
    }
    let depth = reader.u8("call stack depth")? as usize;
    let stack = CallStack::from_parts(slots, depth)
        .ok_or_else(|| corrupt(format!("call stack depth {} exceeds {}", depth, STACK_SIZE)))?;

    let mut v = [0; NUM_REGISTERS];
    v.copy_from_slice(reader.take(NUM_REGISTERS, "registers")?);
    let registers = Registers {
        v,
        i: reader.u16("I")?,
        pc: reader.u16("PC")?,
        delay_timer: reader.u8("delay timer")?,
        sound_timer: reader.u8("sound timer")?,
    };

    let mut keys = [false; NUM_KEYS];
    for key in keys.iter_mut() {
        *key = reader.flag("keypad")?;
    }

    let tag = reader.u8("execution state")?;
    let register = check_index(reader.u8("execution state")?, NUM_REGISTERS, "register")?;
    let key = check_index(reader.u8("execution state")?, NUM_KEYS, "key")?;
    let exec = match tag {
        TAG_RUNNING => ExecState::Running,
        TAG_AWAITING_PRESS => ExecState::AwaitingKeyPress(register),
        TAG_AWAITING_RELEASE => ExecState::AwaitingKeyRelease(register, key),
        other => return Err(corrupt(format!("unknown execution state {}", other))),
    };

    Ok(VmState {
        memory: Memory::from_bytes(memory),
        registers,
        stack,
        display: Display::from_pixels(pixels),
        keypad: Keypad::from_keys(keys),
        exec,
        variant,
    })
}

pub fn write_file(path: &Path, state: &VmState) -> Result<(), SnapshotError> {
    std::fs::write(path, encode(state))?;
    log::info!("Saved snapshot to {:?}", path);
    Ok(())
}

/// Read and decode a snapshot file. A missing or short file is an error, never a partial state.
pub fn read_file(path: &Path, variant: Variant) -> Result<VmState, SnapshotError> {
    let bytes = std::fs::read(path)?;
    let state = decode(&bytes, variant)?;
    log::info!("Restored snapshot from {:?}", path);
    Ok(state)
}
