//! Runtime configuration handed to the emulator and its driving loop.

use super::variant::{SpriteOverflow, Variant};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const CLOCK_SPEED: u32 = 600;
const FRAME_RATE: u32 = 60;
const SNAPSHOT_PATH: &str = "save_state.bin";

/// A 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Parses `#RRGGBB` or `RRGGBB`.
impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a colour of the form #RRGGBB", s));
        }
        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).map_err(|e| e.to_string());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Colours the renderer maps lit and unlit pixels to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            foreground: Rgb(0xFF, 0xD7, 0x00),
            background: Rgb(0x00, 0x00, 0x80),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub variant: Variant,
    /// Instructions per second.
    pub clock_speed: u32,
    /// Frame ticks per second. Timers count down once per frame.
    pub frame_rate: u32,
    pub sprite_overflow: SpriteOverflow,
    /// Halt on opcodes that do not decode instead of skipping them.
    pub strict_opcodes: bool,
    pub palette: Palette,
    pub snapshot_path: PathBuf,
}

impl Config {
    /// How many instructions make up one frame's quota.
    pub fn instructions_per_frame(&self) -> u32 {
        (self.clock_speed / self.frame_rate.max(1)).max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            variant: Variant::default(),
            clock_speed: CLOCK_SPEED,
            frame_rate: FRAME_RATE,
            sprite_overflow: SpriteOverflow::default(),
            strict_opcodes: false,
            palette: Palette::default(),
            snapshot_path: PathBuf::from(SNAPSHOT_PATH),
        }
    }
}
