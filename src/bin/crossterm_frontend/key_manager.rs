use chip8_vm::emulator::input::{Control, EmulatorInput};
use chip8_vm::emulator::keypad::{Keypad, NUM_KEYS};

use super::crossterm_io::to_io;

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use std::io;
use std::time::{Duration, Instant};

/// Terminals only report presses, so a key stays down this long after its last press event.
const TIMEOUT: Duration = Duration::from_millis(250);

/// Turns terminal key events into keypad state and frontend controls.
pub struct KeyManager {
    timeout: Duration,
    last_pressed: [Option<Instant>; NUM_KEYS],
}

impl KeyManager {
    pub fn new() -> KeyManager {
        KeyManager {
            timeout: TIMEOUT,
            last_pressed: [None; NUM_KEYS],
        }
    }

    fn is_held(&self, key: usize, now: Instant) -> bool {
        self.last_pressed[key].map_or(false, |at| now.duration_since(at) < self.timeout)
    }
}

impl EmulatorInput for KeyManager {
    fn poll(&mut self, keypad: &mut Keypad) -> io::Result<Vec<Control>> {
        let mut controls = Vec::new();
        while poll(Duration::from_secs(0)).map_err(to_io)? {
            let key_event = match read().map_err(to_io)? {
                Event::Key(key_event) => key_event,
                _ => continue,
            };
            log::trace!("Got key {:?}", key_event);
            if let Some(control) = control(key_event) {
                controls.push(control);
            } else if let Some(key) = key_index(key_event.code) {
                self.last_pressed[key as usize] = Some(Instant::now());
            }
        }

        let now = Instant::now();
        for key in 0..NUM_KEYS {
            keypad.set(key as u8, self.is_held(key, now));
        }
        Ok(controls)
    }
}

fn control(key_event: KeyEvent) -> Option<Control> {
    match key_event.code {
        KeyCode::Esc => Some(Control::Quit),
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Control::Quit)
        }
        KeyCode::Char(' ') => Some(Control::TogglePause),
        KeyCode::Char('=') => Some(Control::Reset),
        KeyCode::F(5) => Some(Control::SaveState),
        KeyCode::F(9) => Some(Control::LoadState),
        _ => None,
    }
}

/// Map the left hand block of a QWERTY keyboard onto the hex keypad:
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// q w e r      4 5 6 D
/// a s d f  ->  7 8 9 E
/// z x c v      A 0 B F
/// ```
fn key_index(code: KeyCode) -> Option<u8> {
    let c = match code {
        KeyCode::Char(c) => c.to_ascii_lowercase(),
        _ => return None,
    };
    let key = match c {
        '1' => 0x1,
        '2' => 0x2,
        '3' => 0x3,
        '4' => 0xC,
        'q' => 0x4,
        'w' => 0x5,
        'e' => 0x6,
        'r' => 0xD,
        'a' => 0x7,
        's' => 0x8,
        'd' => 0x9,
        'f' => 0xE,
        'z' => 0xA,
        'x' => 0x0,
        'c' => 0xB,
        'v' => 0xF,
        _ => return None,
    };
    Some(key)
}
