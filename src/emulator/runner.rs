//! The frame-paced loop that connects an emulator to its input and output devices.

use super::config::Config;
use super::emulator::Emulator;
use super::error::RunError;
use super::input::{Control, EmulatorInput};
use super::output::EmulatorOutput;
use std::time::{Duration, Instant};

pub struct Runner<I, O> {
    emulator: Emulator,
    rom: Vec<u8>,
    config: Config,
    input: I,
    output: O,
    paused: bool,
    quit: bool,
    frames: u64,
}

impl<I: EmulatorInput, O: EmulatorOutput> Runner<I, O> {
    /// `rom` must be the program `emulator` was booted with. It is kept for resets.
    pub fn new(emulator: Emulator, rom: Vec<u8>, config: Config, input: I, output: O) -> Self {
        Runner {
            emulator,
            rom,
            config,
            input,
            output,
            paused: false,
            quit: false,
            frames: 0,
        }
    }

    /// One frame tick.
    pub fn frame(&mut self) -> Result<(), RunError> {
        let controls = self.input.poll(self.emulator.keypad_mut())?;
        for control in controls {
            self.handle(control)?;
        }

        let tone = if self.paused {
            false
        } else {
            self.emulator.run(self.config.instructions_per_frame())?;
            self.emulator.tick_timers()
        };
        self.output.set_tone(tone)?;

        if self.emulator.display_mut().take_redraw() {
            self.output.draw(self.emulator.display())?;
        }

        self.frames += 1;
        Ok(())
    }

    fn handle(&mut self, control: Control) -> Result<(), RunError> {
        log::debug!("Handling {:?}", control);
        match control {
            Control::Quit => self.quit = true,
            Control::TogglePause => {
                self.paused = !self.paused;
                log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
            }
            Control::Reset => {
                self.emulator.load(&self.rom)?;
                self.emulator.display_mut().request_redraw();
                log::info!("Reset");
            }
            Control::SaveState => {
                if let Err(e) = self.emulator.save_to(&self.config.snapshot_path) {
                    log::warn!("Could not save snapshot: {}", e);
                }
            }
            Control::LoadState => {
                if let Err(e) = self.emulator.restore_from(&self.config.snapshot_path) {
                    log::warn!("Could not restore snapshot: {}", e);
                }
            }
        }
        Ok(())
    }

    /// Run frames paced to the frame rate until the user quits or the machine faults.
    pub fn run(&mut self) -> Result<(), RunError> {
        let frame_time = Duration::from_secs(1) / self.config.frame_rate.max(1);
        while !self.quit {
            let start = Instant::now();
            if let Err(e) = self.frame() {
                log::error!("Stopped after {} frames: {}", self.frames, e);
                return Err(e);
            }
            if let Some(left) = frame_time.checked_sub(start.elapsed()) {
                std::thread::sleep(left);
            }
        }
        log::debug!("Quit after {} frames", self.frames);
        Ok(())
    }

    /// Run up to `n` frames without pacing. Stops early on quit.
    pub fn run_frames(&mut self, n: u64) -> Result<(), RunError> {
        for _ in 0..n {
            if self.quit {
                break;
            }
            self.frame()?;
        }
        Ok(())
    }

    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_quit(&self) -> bool {
        self.quit
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
