use super::display::Display;
use std::io;

/// Represents an output device: a screen and a single-tone beeper.
pub trait EmulatorOutput {
    /// Present the whole frame buffer. Only called when the program changed it.
    fn draw(&mut self, display: &Display) -> io::Result<()>;

    /// Called every frame with whether the tone should sound.
    fn set_tone(&mut self, on: bool) -> io::Result<()>;
}

/// A simple output device that remembers what it was asked to show.
#[derive(Debug, Default)]
pub struct DummyOutput {
    pub frames_drawn: usize,
    pub last_frame: Option<Display>,
    pub tone: bool,
    pub tone_changes: usize,
}

impl DummyOutput {
    pub fn new() -> DummyOutput {
        DummyOutput::default()
    }
}

impl EmulatorOutput for DummyOutput {
    fn draw(&mut self, display: &Display) -> io::Result<()> {
        self.frames_drawn += 1;
        self.last_frame = Some(display.clone());
        Ok(())
    }

    fn set_tone(&mut self, on: bool) -> io::Result<()> {
        if on != self.tone {
            self.tone = on;
            self.tone_changes += 1;
        }
        Ok(())
    }
}
