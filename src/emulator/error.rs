//! Errors raised while loading, running and snapshotting the machine.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A ROM could not be placed into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("rom is {len} bytes, but at most {max} bytes fit in memory")]
    RomTooLarge { len: usize, max: usize },
    #[error("could not read rom {path:?}: {source}")]
    RomUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A fault that halts the machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("call stack overflow at {pc:#05x}")]
    StackOverflow { pc: u16 },
    #[error("return with an empty call stack at {pc:#05x}")]
    StackUnderflow { pc: u16 },
    #[error("memory address {addr:#06x} is out of range")]
    AddressOutOfRange { addr: usize },
    #[error("unknown opcode {opcode:#06x} at {pc:#05x}")]
    UnknownOpcode { opcode: u16, pc: u16 },
}

/// A snapshot could not be written or read back.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
    #[error("snapshot version {0} is not supported")]
    UnsupportedVersion(u16),
    #[error("snapshot io error: {0}")]
    Io(#[from] io::Error),
}

/// Anything that ends the driving loop.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Vm(#[from] VmError),
    #[error("frontend io error: {0}")]
    Io(#[from] io::Error),
}
