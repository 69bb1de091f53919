/// Splits a 16-bit opcode into the fields the instruction set is written in.
///
/// Reading the opcode `0xDXYN` nibble by nibble gives `(0xD, X, Y, N)`,
/// while the lower 12 and 8 bits give the `NNN` address and `NN` constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSplitter(u16);

impl BitSplitter {
    pub fn new(value: u16) -> BitSplitter {
        BitSplitter(value)
    }

    /// Join a big-endian byte pair, as opcodes are stored in memory.
    pub fn from_bytes(high: u8, low: u8) -> BitSplitter {
        BitSplitter(((high as u16) << 8) | low as u16)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// The four nibbles, most significant first.
    pub fn nibbles(&self) -> (u8, u8, u8, u8) {
        (
            (self.0 >> 12) as u8 & 0xF,
            (self.0 >> 8) as u8 & 0xF,
            (self.0 >> 4) as u8 & 0xF,
            self.0 as u8 & 0xF,
        )
    }

    /// `NNN`
    pub fn addr(&self) -> u16 {
        self.0 & 0x0FFF
    }

    /// `NN`
    pub fn byte(&self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    pub fn x(&self) -> u8 {
        ((self.0 >> 8) & 0xF) as u8
    }

    pub fn y(&self) -> u8 {
        ((self.0 >> 4) & 0xF) as u8
    }
}
