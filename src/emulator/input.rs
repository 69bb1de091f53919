use super::keypad::Keypad;
use std::collections::VecDeque;
use std::io;

/// Requests from the user to the driving loop rather than to the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Quit,
    TogglePause,
    Reset,
    SaveState,
    LoadState,
}

/// Represents an input device that latches the keys 0x0..=0xF into the keypad.
///
/// It is polled once per frame. Besides updating the keypad it returns any
/// frontend controls that arrived since the last poll, in order.
pub trait EmulatorInput {
    fn poll(&mut self, keypad: &mut Keypad) -> io::Result<Vec<Control>>;
}

/// An input device that never provides any input
pub struct DummyInput;

impl EmulatorInput for DummyInput {
    fn poll(&mut self, _keypad: &mut Keypad) -> io::Result<Vec<Control>> {
        Ok(Vec::new())
    }
}

/// One frame worth of scripted input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub press: Vec<u8>,
    pub release: Vec<u8>,
    pub controls: Vec<Control>,
}

impl Frame {
    pub fn idle() -> Frame {
        Frame::default()
    }

    pub fn press(key: u8) -> Frame {
        Frame {
            press: vec![key],
            ..Frame::default()
        }
    }

    pub fn release(key: u8) -> Frame {
        Frame {
            release: vec![key],
            ..Frame::default()
        }
    }

    pub fn control(control: Control) -> Frame {
        Frame {
            controls: vec![control],
            ..Frame::default()
        }
    }
}

/// Replays a fixed sequence of frames, then stays idle.
/// Used to drive the emulator headless and in tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Frame>,
}

impl ScriptedInput {
    pub fn new<I: IntoIterator<Item = Frame>>(frames: I) -> ScriptedInput {
        ScriptedInput {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl EmulatorInput for ScriptedInput {
    fn poll(&mut self, keypad: &mut Keypad) -> io::Result<Vec<Control>> {
        let frame = match self.frames.pop_front() {
            Some(frame) => frame,
            None => return Ok(Vec::new()),
        };
        for key in frame.release {
            keypad.release(key);
        }
        for key in frame.press {
            keypad.press(key);
        }
        Ok(frame.controls)
    }
}
