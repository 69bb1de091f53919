//! Command line options shared by the frontends.

use crate::emulator::config::{Config, Palette, Rgb};
use crate::emulator::variant::{SpriteOverflow, Variant};
use std::path::PathBuf;
use structopt::StructOpt;

/// The program options.
#[derive(StructOpt, Debug)]
pub struct VmOpt {
    /// The program to execute
    #[structopt(parse(from_os_str))]
    pub rom: PathBuf,

    /// Behaviour to emulate: chip8 (original) or schip (extended)
    #[structopt(long, default_value = "schip")]
    pub variant: Variant,

    /// Instructions executed per second
    #[structopt(long, default_value = "600")]
    pub clock_speed: u32,

    /// Frames per second; timers count down once per frame
    #[structopt(long, default_value = "60")]
    pub frame_rate: u32,

    /// Wrap sprites around the screen edges instead of clipping them
    #[structopt(long)]
    pub wrap_sprites: bool,

    /// Halt on unknown opcodes instead of skipping them
    #[structopt(long)]
    pub strict: bool,

    /// Where F5 saves and F9 restores the machine state
    #[structopt(long, parse(from_os_str), default_value = "save_state.bin")]
    pub snapshot: PathBuf,

    /// Colour of lit pixels
    #[structopt(long, default_value = "#FFD700")]
    pub foreground: Rgb,

    /// Colour of unlit pixels
    #[structopt(long, default_value = "#000080")]
    pub background: Rgb,
}

impl VmOpt {
    pub fn config(&self) -> Config {
        Config {
            variant: self.variant,
            clock_speed: self.clock_speed,
            frame_rate: self.frame_rate,
            sprite_overflow: if self.wrap_sprites {
                SpriteOverflow::Wrap
            } else {
                SpriteOverflow::Clip
            },
            strict_opcodes: self.strict,
            palette: Palette {
                foreground: self.foreground,
                background: self.background,
            },
            snapshot_path: self.snapshot.clone(),
        }
    }
}
