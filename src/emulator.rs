//! The CHIP-8 virtual machine as described at https://en.wikipedia.org/wiki/CHIP-8#Virtual_machine_description,
//! with the SUPER-CHIP behaviour differences selectable through [`Variant`].

pub mod config;
pub mod display;
pub mod emulator;
pub mod error;
pub mod input;
pub mod instruction;
pub mod keypad;
pub mod memory;
pub mod output;
pub mod runner;
pub mod snapshot;
pub mod stack;
pub mod state;
pub mod variant;

pub use self::config::{Config, Palette, Rgb};
pub use self::display::Display;
pub use self::emulator::{Emulator, Step};
pub use self::error::{LoadError, RunError, SnapshotError, VmError};
pub use self::keypad::Keypad;
pub use self::runner::Runner;
pub use self::state::{ExecState, VmState};
pub use self::variant::{SpriteOverflow, Variant};
