use super::error::VmError;

pub const STACK_SIZE: usize = 16;

/// Bounded store of return addresses.
///
/// The depth is tracked explicitly, so pushing onto a full stack or
/// popping an empty one is an error rather than a stray write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallStack {
    entries: [u16; STACK_SIZE],
    depth: usize,
}

impl CallStack {
    pub fn new() -> CallStack {
        CallStack::default()
    }

    /// Rebuild a stack from saved parts. Slots at or above `depth` are cleared.
    pub fn from_parts(mut entries: [u16; STACK_SIZE], depth: usize) -> Option<CallStack> {
        if depth > STACK_SIZE {
            return None;
        }
        for slot in entries[depth..].iter_mut() {
            *slot = 0;
        }
        Some(CallStack { entries, depth })
    }

    /// `pc` is only used to describe a fault.
    pub fn push(&mut self, return_addr: u16, pc: u16) -> Result<(), VmError> {
        if self.depth == STACK_SIZE {
            return Err(VmError::StackOverflow { pc });
        }
        self.entries[self.depth] = return_addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self, pc: u16) -> Result<u16, VmError> {
        if self.depth == 0 {
            return Err(VmError::StackUnderflow { pc });
        }
        self.depth -= 1;
        let addr = self.entries[self.depth];
        self.entries[self.depth] = 0;
        Ok(addr)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Live return addresses, oldest first.
    pub fn entries(&self) -> &[u16] {
        &self.entries[..self.depth]
    }

    /// Every slot, including unused ones.
    pub fn slots(&self) -> &[u16; STACK_SIZE] {
        &self.entries
    }
}
