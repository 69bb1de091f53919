pub const NUM_KEYS: usize = 16;

/// The state of the 16 hex keys, 0x0 through 0xF.
///
/// Written by the input collaborator between instructions. The instruction
/// engine only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keypad {
    keys: [bool; NUM_KEYS],
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad::default()
    }

    pub(crate) fn from_keys(keys: [bool; NUM_KEYS]) -> Keypad {
        Keypad { keys }
    }

    /// Set the state of a key. Indices outside 0x0..=0xF are ignored.
    pub fn set(&mut self, key: u8, pressed: bool) {
        match self.keys.get_mut(key as usize) {
            Some(state) => *state = pressed,
            None => log::warn!("Ignoring state of nonexistent key {:#x}", key),
        }
    }

    pub fn press(&mut self, key: u8) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: u8) {
        self.set(key, false);
    }

    /// A key outside 0x0..=0xF is never pressed.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// The lowest key currently held down.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|pressed| *pressed).map(|key| key as u8)
    }

    pub fn keys(&self) -> &[bool; NUM_KEYS] {
        &self.keys
    }
}
