//! The instruction engine: fetch, decode and execute against the machine state.

use super::config::Config;
use super::display::{Display, SCREEN_HEIGHT, SCREEN_WIDTH};
use super::error::{LoadError, SnapshotError, VmError};
use super::instruction::*;
use super::keypad::Keypad;
use super::memory::{Memory, GLYPH_SIZE};
use super::snapshot;
use super::stack::CallStack;
use super::state::{ExecState, Registers, VmState, FLAG};
use super::variant::{SpriteOverflow, Variant};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::Path;

/// What a call to `Emulator::step` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed(Instruction),
    /// The engine is suspended in FX0A and fetched nothing.
    AwaitingKey,
    /// The awaited key was released and stored. The next step fetches again.
    KeyLatched(u8),
}

pub struct Emulator {
    state: VmState,
    sprite_overflow: SpriteOverflow,
    strict_opcodes: bool,
    rng: StdRng,
}

impl Emulator {
    /// Create an emulator with no program loaded and default quirks for `variant`.
    pub fn new(variant: Variant) -> Emulator {
        Emulator {
            state: VmState::new(variant),
            sprite_overflow: SpriteOverflow::default(),
            strict_opcodes: false,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_config(config: &Config) -> Emulator {
        Emulator {
            sprite_overflow: config.sprite_overflow,
            strict_opcodes: config.strict_opcodes,
            ..Emulator::new(config.variant)
        }
    }

    /// Create an emulator from `config` and load `rom` into it.
    pub fn boot(rom: &[u8], config: &Config) -> Result<Emulator, LoadError> {
        let mut emulator = Emulator::with_config(config);
        emulator.load(rom)?;
        Ok(emulator)
    }

    /// Make `CXNN` deterministic.
    pub fn seeded(mut self, seed: u64) -> Emulator {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Reset the machine and copy a program into memory at 0x200.
    /// The variant stays what it was.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.state = VmState::load(rom, self.state.variant)?;
        Ok(())
    }

    /// Perform a single step: fetch the instruction at PC, advance PC and execute it.
    /// While suspended in FX0A this only watches the keypad.
    pub fn step(&mut self) -> Result<Step, VmError> {
        match self.state.exec {
            ExecState::Running => {}
            ExecState::AwaitingKeyPress(x) => {
                if let Some(key) = self.state.keypad.first_pressed() {
                    log::debug!("Key {:#x} pressed, waiting for release", key);
                    self.state.exec = ExecState::AwaitingKeyRelease(x, key);
                }
                return Ok(Step::AwaitingKey);
            }
            ExecState::AwaitingKeyRelease(x, key) => {
                if !self.state.keypad.is_pressed(key) {
                    log::debug!("Key {:#x} released, storing in V{:X}", key, x);
                    self.state.registers.v[x as usize] = key;
                    self.state.exec = ExecState::Running;
                    return Ok(Step::KeyLatched(key));
                }
                return Ok(Step::AwaitingKey);
            }
        }

        let at = self.state.registers.pc;
        let opcode = self.state.memory.opcode_at(at)?;
        let instruction = Instruction::decode(opcode);

        log::trace!("{:#05x}: {:?}", at, instruction);

        self.state.registers.pc += 2;
        self.execute_at(instruction, at)?;
        Ok(Step::Executed(instruction))
    }

    /// Step until `quota` instructions have executed, the engine suspends in
    /// FX0A, or, for the original variant, the next instruction is a draw.
    /// Returns the number of instructions executed.
    pub fn run(&mut self, quota: u32) -> Result<u32, VmError> {
        let mut executed = 0;
        while executed < quota {
            match self.step()? {
                Step::AwaitingKey => break,
                Step::KeyLatched(_) => {}
                Step::Executed(_) => {
                    executed += 1;
                    if self.state.variant.waits_for_display() && self.next_is_draw() {
                        break;
                    }
                }
            }
        }
        Ok(executed)
    }

    /// Count both timers down once. Returns whether the tone should sound.
    pub fn tick_timers(&mut self) -> bool {
        let regs = &mut self.state.registers;
        regs.delay_timer = regs.delay_timer.saturating_sub(1);
        if regs.sound_timer > 0 {
            regs.sound_timer -= 1;
            true
        } else {
            false
        }
    }

    /// Execute a single instruction without fetching it.
    pub fn execute_single(&mut self, instruction: Instruction) -> Result<(), VmError> {
        let at = self.state.registers.pc;
        self.execute_at(instruction, at)
    }

    pub fn execute_many(&mut self, instructions: &[Instruction]) -> Result<(), VmError> {
        for instruction in instructions {
            self.execute_single(*instruction)?;
        }
        Ok(())
    }

    /// `at` is the address the instruction was fetched from, used to describe faults.
    fn execute_at(&mut self, instruction: Instruction, at: u16) -> Result<(), VmError> {
        let VmState {
            memory,
            registers: regs,
            stack,
            display,
            keypad,
            exec,
            variant,
        } = &mut self.state;
        let variant = *variant;

        match instruction {
            Instruction::MachineRoutine(Addr(addr)) => {
                log::debug!("Ignoring machine code routine {:#05x} at {:#05x}", addr, at);
            }

            Instruction::ClearScreen => display.clear(),

            // Return to the previous call site via the stack.
            Instruction::Return => {
                regs.pc = stack.pop(at)?;
            }

            Instruction::Goto(Addr(addr)) => {
                regs.pc = addr;
            }

            // Store the return address on the stack, then jump
            Instruction::Call(Addr(addr)) => {
                stack.push(regs.pc, at)?;
                regs.pc = addr;
            }

            Instruction::IfRegEqConst(Reg(x), Const(n)) => {
                if regs.v[x as usize] == n {
                    regs.pc += 2;
                }
            }

            Instruction::IfRegNeqConst(Reg(x), Const(n)) => {
                if regs.v[x as usize] != n {
                    regs.pc += 2;
                }
            }

            Instruction::IfRegEqReg(Reg(x), Reg(y)) => {
                if regs.v[x as usize] == regs.v[y as usize] {
                    regs.pc += 2;
                }
            }

            Instruction::SetRegToConst(Reg(x), Const(n)) => {
                regs.v[x as usize] = n;
            }

            // Wraps, and leaves VF alone
            Instruction::IncRegByConst(Reg(x), Const(n)) => {
                regs.v[x as usize] = regs.v[x as usize].wrapping_add(n);
            }

            Instruction::SetRegToReg(Reg(x), Reg(y)) => {
                regs.v[x as usize] = regs.v[y as usize];
            }

            Instruction::BitwiseOr(Reg(x), Reg(y)) => {
                regs.v[x as usize] |= regs.v[y as usize];
                reset_flag_for_logic(regs, variant);
            }

            Instruction::BitwiseAnd(Reg(x), Reg(y)) => {
                regs.v[x as usize] &= regs.v[y as usize];
                reset_flag_for_logic(regs, variant);
            }

            Instruction::BitwiseXor(Reg(x), Reg(y)) => {
                regs.v[x as usize] ^= regs.v[y as usize];
                reset_flag_for_logic(regs, variant);
            }

            // The flag is written last, so it wins when X is F
            Instruction::IncRegByReg(Reg(x), Reg(y)) => {
                let (sum, carry) = regs.v[x as usize].overflowing_add(regs.v[y as usize]);
                regs.v[x as usize] = sum;
                regs.v[FLAG] = carry as u8;
            }

            Instruction::DecRegByReg(Reg(x), Reg(y)) => {
                let (vx, vy) = (regs.v[x as usize], regs.v[y as usize]);
                regs.v[x as usize] = vx.wrapping_sub(vy);
                regs.v[FLAG] = (vx >= vy) as u8;
            }

            Instruction::BitshiftRight(Reg(x), Reg(y)) => {
                let source = shift_source(regs, variant, x, y);
                regs.v[x as usize] = source >> 1;
                regs.v[FLAG] = source & 1;
            }

            Instruction::SetVxVyMinusVx(Reg(x), Reg(y)) => {
                let (vx, vy) = (regs.v[x as usize], regs.v[y as usize]);
                regs.v[x as usize] = vy.wrapping_sub(vx);
                regs.v[FLAG] = (vy >= vx) as u8;
            }

            Instruction::BitshiftLeft(Reg(x), Reg(y)) => {
                let source = shift_source(regs, variant, x, y);
                regs.v[x as usize] = source << 1;
                regs.v[FLAG] = source >> 7;
            }

            Instruction::IfRegNeqReg(Reg(x), Reg(y)) => {
                if regs.v[x as usize] != regs.v[y as usize] {
                    regs.pc += 2;
                }
            }

            Instruction::SetI(Addr(addr)) => {
                regs.i = addr;
            }

            Instruction::SetPcToV0PlusAddr(Addr(addr)) => {
                regs.pc = addr + regs.v[0] as u16;
            }

            Instruction::SetVxRand(Reg(x), Const(n)) => {
                regs.v[x as usize] = self.rng.gen::<u8>() & n;
            }

            Instruction::Draw(Reg(x), Reg(y), Const(height)) => {
                draw_sprite(memory, display, regs, (x, y, height), self.sprite_overflow)?;
            }

            Instruction::IfKeyEqVx(Reg(x)) => {
                if keypad.is_pressed(regs.v[x as usize]) {
                    regs.pc += 2;
                }
            }

            Instruction::IfKeyNeqVx(Reg(x)) => {
                if !keypad.is_pressed(regs.v[x as usize]) {
                    regs.pc += 2;
                }
            }

            Instruction::SetRegToDelayTimer(Reg(x)) => {
                regs.v[x as usize] = regs.delay_timer;
            }

            // Suspend until a key goes down and back up. `step` drives the rest.
            Instruction::SetRegToGetKey(Reg(x)) => {
                log::debug!("Waiting for a key for V{:X}", x);
                *exec = ExecState::AwaitingKeyPress(x);
            }

            Instruction::SetDelayTimerToReg(Reg(x)) => {
                regs.delay_timer = regs.v[x as usize];
            }

            Instruction::SetSoundTimerToReg(Reg(x)) => {
                regs.sound_timer = regs.v[x as usize];
            }

            Instruction::AddRegToI(Reg(x)) => {
                regs.i = regs.i.wrapping_add(regs.v[x as usize] as u16);
            }

            Instruction::SetIToSpriteAddrVx(Reg(x)) => {
                regs.i = regs.v[x as usize] as u16 * GLYPH_SIZE;
            }

            Instruction::SetIToBcdOfReg(Reg(x)) => {
                let value = regs.v[x as usize];
                let digits = memory.slice_mut(regs.i as usize, 3)?;
                digits[0] = value / 100;
                digits[1] = value / 10 % 10;
                digits[2] = value % 10;
            }

            // Dump V0 through VX starting at I
            Instruction::RegDump(Reg(x)) => {
                let count = x as usize + 1;
                memory
                    .slice_mut(regs.i as usize, count)?
                    .copy_from_slice(&regs.v[..count]);
                if variant.load_store_advances_i() {
                    regs.i += count as u16;
                }
            }

            // Load V0 through VX starting at I
            Instruction::RegLoad(Reg(x)) => {
                let count = x as usize + 1;
                regs.v[..count].copy_from_slice(memory.slice(regs.i as usize, count)?);
                if variant.load_store_advances_i() {
                    regs.i += count as u16;
                }
            }

            Instruction::Unknown(opcode) => {
                if self.strict_opcodes {
                    log::error!("Unknown opcode {:#06x} at {:#05x}", opcode, at);
                    return Err(VmError::UnknownOpcode { opcode, pc: at });
                }
                log::warn!("Skipping unknown opcode {:#06x} at {:#05x}", opcode, at);
            }
        };

        Ok(())
    }

    fn next_is_draw(&self) -> bool {
        !self.is_awaiting_key()
            && self
                .state
                .memory
                .opcode_at(self.state.registers.pc)
                .map(|opcode| Instruction::decode(opcode).is_draw())
                .unwrap_or(false)
    }

    /// Serialize the complete machine state.
    pub fn save(&self) -> Vec<u8> {
        snapshot::encode(&self.state)
    }

    /// Replace the machine state with a saved one. On error nothing changes.
    pub fn restore(&mut self, blob: &[u8]) -> Result<(), SnapshotError> {
        self.state = snapshot::decode(blob, self.state.variant)?;
        Ok(())
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        snapshot::write_file(path.as_ref(), &self.state)
    }

    pub fn restore_from<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SnapshotError> {
        self.state = snapshot::read_file(path.as_ref(), self.state.variant)?;
        Ok(())
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn variant(&self) -> Variant {
        self.state.variant
    }

    pub fn registers(&self) -> &Registers {
        &self.state.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.state.memory
    }

    pub fn stack(&self) -> &CallStack {
        &self.state.stack
    }

    pub fn display(&self) -> &Display {
        &self.state.display
    }

    pub fn display_mut(&mut self) -> &mut Display {
        &mut self.state.display
    }

    pub fn keypad(&self) -> &Keypad {
        &self.state.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.state.keypad
    }

    pub fn exec_state(&self) -> ExecState {
        self.state.exec
    }

    pub fn is_awaiting_key(&self) -> bool {
        self.state.exec != ExecState::Running
    }
}

fn reset_flag_for_logic(regs: &mut Registers, variant: Variant) {
    if variant.logic_resets_flag() {
        regs.v[FLAG] = 0;
    }
}

fn shift_source(regs: &Registers, variant: Variant, x: u8, y: u8) -> u8 {
    if variant.shift_reads_vy() {
        regs.v[y as usize]
    } else {
        regs.v[x as usize]
    }
}

/// Screen coordinate for `pos`, or `None` if the sprite is clipped there.
fn place(pos: usize, size: usize, overflow: SpriteOverflow) -> Option<usize> {
    match overflow {
        _ if pos < size => Some(pos),
        SpriteOverflow::Clip => None,
        SpriteOverflow::Wrap => Some(pos % size),
    }
}

/// XOR an 8-pixel wide sprite of `height` rows read from I onto the screen.
/// VF ends up 1 exactly when a lit pixel was switched off.
fn draw_sprite(
    memory: &Memory,
    display: &mut Display,
    regs: &mut Registers,
    (x, y, height): (u8, u8, u8),
    overflow: SpriteOverflow,
) -> Result<(), VmError> {
    let origin_x = regs.v[x as usize] as usize % SCREEN_WIDTH;
    let origin_y = regs.v[y as usize] as usize % SCREEN_HEIGHT;
    let visible_rows = match overflow {
        SpriteOverflow::Clip => (height as usize).min(SCREEN_HEIGHT - origin_y),
        SpriteOverflow::Wrap => height as usize,
    };
    // A fault must leave the screen untouched.
    let sprite = memory.slice(regs.i as usize, visible_rows)?;
    regs.v[FLAG] = 0;

    let mut collided = false;
    for (row, bits) in sprite.iter().enumerate() {
        let screen_y = match place(origin_y + row, SCREEN_HEIGHT, overflow) {
            Some(screen_y) => screen_y,
            None => break,
        };
        for col in 0..8 {
            let screen_x = match place(origin_x + col, SCREEN_WIDTH, overflow) {
                Some(screen_x) => screen_x,
                None => break,
            };
            if bits & (0x80 >> col) != 0 {
                collided |= display.flip(screen_x, screen_y);
            }
        }
    }

    if collided {
        regs.v[FLAG] = 1;
    }
    display.request_redraw();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::memory::{MEM_SIZE, PROGRAM_START};
    use crate::emulator::stack::STACK_SIZE;
    use proptest::prelude::*;
    use test_case::test_case;

    fn blank(variant: Variant) -> Emulator {
        Emulator::new(variant).seeded(0x5EED)
    }

    /// Load opcodes as a program.
    fn program(variant: Variant, opcodes: &[u16]) -> Emulator {
        let rom: Vec<u8> = opcodes.iter().flat_map(|op| op.to_be_bytes().to_vec()).collect();
        let mut emulator = blank(variant);
        emulator.load(&rom).unwrap();
        emulator
    }

    fn steps(emulator: &mut Emulator, n: usize) {
        for _ in 0..n {
            emulator.step().unwrap();
        }
    }

    fn set_v(emulator: &mut Emulator, x: usize, value: u8) {
        emulator.state.registers.v[x] = value;
    }

    fn v(emulator: &Emulator, x: usize) -> u8 {
        emulator.registers().v[x]
    }

    #[test]
    fn goto_goes_to() {
        let mut emulator = blank(Variant::Extended);
        emulator.execute_single(Instruction::Goto(Addr(0x250))).unwrap();
        assert_eq!(emulator.registers().pc, 0x250);
    }

    #[test]
    fn return_after_call_is_neutral() {
        let mut emulator = program(Variant::Extended, &[0x2206, 0x0000, 0x0000, 0x00EE]);
        assert_eq!(emulator.registers().pc, 0x200);

        emulator.step().unwrap(); // Call 0x206
        assert_eq!(emulator.registers().pc, 0x206);
        assert_eq!(emulator.stack().entries(), &[0x202]);
        emulator.step().unwrap(); // Return to 0x202
        assert_eq!(emulator.registers().pc, 0x202);
        assert_eq!(emulator.stack().depth(), 0);
    }

    #[test]
    fn return_with_empty_stack_faults() {
        let mut emulator = program(Variant::Extended, &[0x00EE]);
        assert_eq!(emulator.step(), Err(VmError::StackUnderflow { pc: 0x200 }));
    }

    #[test]
    fn unbounded_recursion_faults() {
        // 0x200: call 0x200
        let mut emulator = program(Variant::Extended, &[0x2200]);
        steps(&mut emulator, STACK_SIZE);
        assert_eq!(emulator.step(), Err(VmError::StackOverflow { pc: 0x200 }));
        assert_eq!(emulator.stack().depth(), STACK_SIZE);
    }

    #[test]
    fn scenario_set_register_set_i_and_draw_glyph() {
        let mut emulator = program(Variant::Extended, &[0x6A05, 0xA200, 0xD005]);

        emulator.step().unwrap();
        assert_eq!(v(&emulator, 0xA), 5);
        assert_eq!(emulator.registers().pc, 0x202);

        emulator.step().unwrap();
        assert_eq!(emulator.registers().i, 0x200);

        // Point I at the glyph for 0 instead of the program itself
        emulator.execute_single(Instruction::SetI(Addr(0))).unwrap();
        emulator.step().unwrap();
        assert_eq!(v(&emulator, 0xF), 0);
        let rows = [0xF0u8, 0x90, 0x90, 0x90, 0xF0];
        for (y, row) in rows.iter().enumerate() {
            for x in 0..8 {
                assert_eq!(emulator.display().get(x, y), row & (0x80 >> x) != 0, "({}, {})", x, y);
            }
        }
        assert!(emulator.display().needs_redraw());
    }

    #[test]
    fn clear_screen_clears_screen() {
        let mut emulator = program(Variant::Extended, &[0xD015, 0x00E0]);
        emulator.step().unwrap();
        assert!(emulator.display().pixels().iter().any(|lit| *lit));
        emulator.display_mut().take_redraw();

        emulator.step().unwrap();
        assert!(emulator.display().pixels().iter().all(|lit| !lit));
        assert!(emulator.display().needs_redraw());
    }

    #[test_case(0x3A05, 5 => 0x204 ; "3XNN skips when equal")]
    #[test_case(0x3A06, 5 => 0x202 ; "3XNN falls through when different")]
    #[test_case(0x4A06, 5 => 0x204 ; "4XNN skips when different")]
    #[test_case(0x4A05, 5 => 0x202 ; "4XNN falls through when equal")]
    fn skip_on_constant(opcode: u16, va: u8) -> u16 {
        let mut emulator = program(Variant::Extended, &[opcode]);
        set_v(&mut emulator, 0xA, va);
        emulator.step().unwrap();
        emulator.registers().pc
    }

    #[test_case(0x5AB0, 7, 7 => 0x204 ; "5XY0 skips when equal")]
    #[test_case(0x5AB0, 7, 8 => 0x202 ; "5XY0 falls through when different")]
    #[test_case(0x9AB0, 7, 8 => 0x204 ; "9XY0 skips when different")]
    #[test_case(0x9AB0, 7, 7 => 0x202 ; "9XY0 falls through when equal")]
    #[test_case(0x5AB1, 7, 7 => 0x202 ; "5XY1 is a no-op")]
    fn skip_on_register(opcode: u16, va: u8, vb: u8) -> u16 {
        let mut emulator = program(Variant::Extended, &[opcode]);
        set_v(&mut emulator, 0xA, va);
        set_v(&mut emulator, 0xB, vb);
        emulator.step().unwrap();
        emulator.registers().pc
    }

    #[test]
    fn add_constant_wraps_without_touching_flag() {
        let mut emulator = program(Variant::Extended, &[0x7AFF]);
        set_v(&mut emulator, 0xA, 2);
        set_v(&mut emulator, 0xF, 0x42);
        emulator.step().unwrap();
        assert_eq!(v(&emulator, 0xA), 1);
        assert_eq!(v(&emulator, 0xF), 0x42);
    }

    #[test_case(Variant::Original, 0x8AB1 => (0b1110, 0) ; "original or resets flag")]
    #[test_case(Variant::Original, 0x8AB2 => (0b1000, 0) ; "original and resets flag")]
    #[test_case(Variant::Original, 0x8AB3 => (0b0110, 0) ; "original xor resets flag")]
    #[test_case(Variant::Extended, 0x8AB1 => (0b1110, 0x42) ; "extended or keeps flag")]
    #[test_case(Variant::Extended, 0x8AB2 => (0b1000, 0x42) ; "extended and keeps flag")]
    #[test_case(Variant::Extended, 0x8AB3 => (0b0110, 0x42) ; "extended xor keeps flag")]
    fn logic_ops(variant: Variant, opcode: u16) -> (u8, u8) {
        let mut emulator = program(variant, &[opcode]);
        set_v(&mut emulator, 0xA, 0b1100);
        set_v(&mut emulator, 0xB, 0b1010);
        set_v(&mut emulator, 0xF, 0x42);
        emulator.step().unwrap();
        (v(&emulator, 0xA), v(&emulator, 0xF))
    }

    #[test_case(Variant::Original, 0x8AB6 => (0b0000_0010, 1) ; "original shift right reads vy")]
    #[test_case(Variant::Extended, 0x8AB6 => (0b0100_0000, 0) ; "extended shift right reads vx")]
    #[test_case(Variant::Original, 0x8ABE => (0b0000_1010, 0) ; "original shift left reads vy")]
    #[test_case(Variant::Extended, 0x8ABE => (0b0000_0000, 1) ; "extended shift left reads vx")]
    fn shifts(variant: Variant, opcode: u16) -> (u8, u8) {
        let mut emulator = program(variant, &[opcode]);
        set_v(&mut emulator, 0xA, 0b1000_0000);
        set_v(&mut emulator, 0xB, 0b0000_0101);
        emulator.step().unwrap();
        (v(&emulator, 0xA), v(&emulator, 0xF))
    }

    #[test]
    fn flag_wins_when_destination_is_vf() {
        let mut emulator = program(Variant::Extended, &[0x8F04]);
        set_v(&mut emulator, 0xF, 0xFF);
        set_v(&mut emulator, 0x0, 0x01);
        emulator.step().unwrap();
        assert_eq!(v(&emulator, 0xF), 1);
    }

    #[test]
    fn reverse_subtract() {
        let mut emulator = program(Variant::Extended, &[0x8AB7, 0x8AB7]);
        set_v(&mut emulator, 0xA, 3);
        set_v(&mut emulator, 0xB, 10);
        emulator.step().unwrap();
        assert_eq!((v(&emulator, 0xA), v(&emulator, 0xF)), (7, 1));

        set_v(&mut emulator, 0xB, 2);
        emulator.step().unwrap();
        assert_eq!((v(&emulator, 0xA), v(&emulator, 0xF)), (251, 0));
    }

    #[test]
    fn jump_with_offset() {
        let mut emulator = program(Variant::Extended, &[0xB300]);
        set_v(&mut emulator, 0x0, 0x10);
        emulator.step().unwrap();
        assert_eq!(emulator.registers().pc, 0x310);
    }

    #[test]
    fn random_is_masked() {
        let mut emulator = program(Variant::Extended, &[0xCA0F, 0xCB00]);
        set_v(&mut emulator, 0xB, 0xFF);
        steps(&mut emulator, 2);
        assert_eq!(v(&emulator, 0xA) & 0xF0, 0);
        assert_eq!(v(&emulator, 0xB), 0);
    }

    #[test]
    fn font_glyph_address() {
        let mut emulator = program(Variant::Extended, &[0xFA29]);
        set_v(&mut emulator, 0xA, 0xB);
        emulator.step().unwrap();
        assert_eq!(emulator.registers().i, 55);
    }

    #[test]
    fn add_to_i_has_no_flag() {
        let mut emulator = program(Variant::Extended, &[0xAFFF, 0xFA1E]);
        set_v(&mut emulator, 0xA, 0x02);
        set_v(&mut emulator, 0xF, 0x42);
        steps(&mut emulator, 2);
        assert_eq!(emulator.registers().i, 0x1001);
        assert_eq!(v(&emulator, 0xF), 0x42);
    }

    #[test_case(254 => [2, 5, 4] ; "three digits")]
    #[test_case(42 => [0, 4, 2] ; "two digits")]
    #[test_case(7 => [0, 0, 7] ; "one digit")]
    fn binary_coded_decimal(value: u8) -> [u8; 3] {
        let mut emulator = program(Variant::Extended, &[0xA300, 0xF533]);
        set_v(&mut emulator, 0x5, value);
        steps(&mut emulator, 2);
        let mut digits = [0; 3];
        digits.copy_from_slice(emulator.memory().slice(0x300, 3).unwrap());
        digits
    }

    #[test]
    fn bcd_past_end_of_memory_faults() {
        let mut emulator = program(Variant::Extended, &[0xAFFE, 0xF533]);
        emulator.step().unwrap();
        assert_eq!(
            emulator.step(),
            Err(VmError::AddressOutOfRange { addr: MEM_SIZE })
        );
    }

    #[test_case(Variant::Original => 0x306 ; "original advances i")]
    #[test_case(Variant::Extended => 0x300 ; "extended keeps i")]
    fn register_dump_twice(variant: Variant) -> u16 {
        let mut emulator = program(variant, &[0xA300, 0xF255, 0xF255]);
        set_v(&mut emulator, 0, 1);
        set_v(&mut emulator, 1, 2);
        set_v(&mut emulator, 2, 3);
        steps(&mut emulator, 3);
        assert_eq!(emulator.memory().slice(0x300, 3).unwrap(), &[1, 2, 3]);
        emulator.registers().i
    }

    #[test_case(Variant::Original => (0x306, [9, 8, 7]) ; "original advances i")]
    #[test_case(Variant::Extended => (0x300, [9, 8, 7]) ; "extended keeps i")]
    fn register_load_twice(variant: Variant) -> (u16, [u8; 3]) {
        let mut emulator = program(variant, &[0xA300, 0xF265, 0xF265]);
        emulator.state.memory.slice_mut(0x300, 6).unwrap().copy_from_slice(&[9, 8, 7, 9, 8, 7]);
        steps(&mut emulator, 3);
        let mut loaded = [0; 3];
        loaded.copy_from_slice(&emulator.registers().v[..3]);
        (emulator.registers().i, loaded)
    }

    #[test]
    fn timers_move_between_registers() {
        let mut emulator = program(Variant::Extended, &[0xF315, 0xF418, 0xF507]);
        set_v(&mut emulator, 3, 30);
        set_v(&mut emulator, 4, 40);
        steps(&mut emulator, 3);
        assert_eq!(emulator.registers().delay_timer, 30);
        assert_eq!(emulator.registers().sound_timer, 40);
        assert_eq!(v(&emulator, 5), 30);
    }

    #[test]
    fn timers_count_down_and_stop_at_zero() {
        let mut emulator = blank(Variant::Extended);
        emulator.state.registers.delay_timer = 2;
        emulator.state.registers.sound_timer = 1;

        assert!(emulator.tick_timers());
        assert_eq!(emulator.registers().delay_timer, 1);
        assert_eq!(emulator.registers().sound_timer, 0);

        assert!(!emulator.tick_timers());
        assert!(!emulator.tick_timers());
        assert_eq!(emulator.registers().delay_timer, 0);
        assert_eq!(emulator.registers().sound_timer, 0);
    }

    #[test]
    fn timers_do_not_depend_on_instruction_count() {
        // 0x200: add 1 to V0, jump back
        let mut emulator = program(Variant::Extended, &[0x7001, 0x1200]);
        emulator.state.registers.delay_timer = 10;
        emulator.run(100).unwrap();
        assert_eq!(emulator.registers().delay_timer, 10);
        emulator.tick_timers();
        assert_eq!(emulator.registers().delay_timer, 9);
    }

    #[test_case(0xEA9E, true => 0x204 ; "EX9E skips when pressed")]
    #[test_case(0xEA9E, false => 0x202 ; "EX9E falls through when released")]
    #[test_case(0xEAA1, false => 0x204 ; "EXA1 skips when released")]
    #[test_case(0xEAA1, true => 0x202 ; "EXA1 falls through when pressed")]
    fn skip_on_key(opcode: u16, pressed: bool) -> u16 {
        let mut emulator = program(Variant::Extended, &[opcode]);
        set_v(&mut emulator, 0xA, 0x7);
        emulator.keypad_mut().set(0x7, pressed);
        emulator.step().unwrap();
        emulator.registers().pc
    }

    #[test]
    fn wait_for_key_needs_press_and_release() {
        let mut emulator = program(Variant::Extended, &[0xF30A, 0x6001]);

        assert_eq!(
            emulator.step(),
            Ok(Step::Executed(Instruction::SetRegToGetKey(Reg(3))))
        );
        assert_eq!(emulator.exec_state(), ExecState::AwaitingKeyPress(3));

        // Nothing pressed, nothing happens
        assert_eq!(emulator.step(), Ok(Step::AwaitingKey));
        assert_eq!(emulator.registers().pc, 0x202);

        emulator.keypad_mut().press(0xB);
        emulator.step().unwrap();
        assert_eq!(emulator.exec_state(), ExecState::AwaitingKeyRelease(3, 0xB));

        // Still held
        emulator.step().unwrap();
        assert!(emulator.is_awaiting_key());
        assert_eq!(v(&emulator, 3), 0);

        emulator.keypad_mut().release(0xB);
        assert_eq!(emulator.step(), Ok(Step::KeyLatched(0xB)));
        assert_eq!(emulator.exec_state(), ExecState::Running);
        assert_eq!(v(&emulator, 3), 0xB);

        // Normal fetching resumes after the FX0A
        emulator.step().unwrap();
        assert_eq!(v(&emulator, 0), 1);
    }

    #[test]
    fn run_stops_while_waiting_for_key() {
        let mut emulator = program(Variant::Extended, &[0x6001, 0xF30A, 0x6002]);
        assert_eq!(emulator.run(10), Ok(2));
        assert_eq!(emulator.run(10), Ok(0));
        assert_eq!(v(&emulator, 0), 1);
    }

    #[test]
    fn run_continues_after_the_key_is_latched() {
        let mut emulator = program(Variant::Extended, &[0xF30A, 0x6001, 0x6102]);
        assert_eq!(emulator.run(10), Ok(1));
        emulator.keypad_mut().press(0x4);
        assert_eq!(emulator.run(10), Ok(0));
        emulator.keypad_mut().release(0x4);
        assert_eq!(emulator.run(2), Ok(2));
        assert_eq!((v(&emulator, 3), v(&emulator, 0), v(&emulator, 1)), (4, 1, 2));
    }

    #[test]
    fn original_waits_for_display_before_drawing() {
        let opcodes = [0x6001, 0xD015, 0x6002, 0xD015, 0x1208];
        let mut original = program(Variant::Original, &opcodes);
        assert_eq!(original.run(10), Ok(1));
        assert_eq!(original.run(10), Ok(2));
        assert_eq!(original.run(10), Ok(10));

        let mut extended = program(Variant::Extended, &opcodes);
        assert_eq!(extended.run(10), Ok(10));
    }

    #[test]
    fn unknown_opcodes_are_skipped_by_default() {
        let mut emulator = program(Variant::Extended, &[0xFA99, 0x6005]);
        steps(&mut emulator, 2);
        assert_eq!(v(&emulator, 0), 5);
    }

    #[test]
    fn strict_mode_faults_on_unknown_opcodes() {
        let config = Config {
            strict_opcodes: true,
            ..Config::default()
        };
        let mut emulator = Emulator::boot(&[0x60, 0x05, 0xFA, 0x99], &config).unwrap();
        emulator.step().unwrap();
        assert_eq!(
            emulator.step(),
            Err(VmError::UnknownOpcode { opcode: 0xFA99, pc: 0x202 })
        );
    }

    #[test]
    fn fetch_past_end_of_memory_faults() {
        let mut emulator = program(Variant::Extended, &[0x1FFF]);
        emulator.step().unwrap();
        assert_eq!(
            emulator.step(),
            Err(VmError::AddressOutOfRange { addr: MEM_SIZE })
        );
    }

    #[test]
    fn drawing_twice_erases_and_collides() {
        let mut emulator = program(Variant::Extended, &[0xD015, 0xD015]);
        emulator.step().unwrap();
        assert_eq!(v(&emulator, 0xF), 0);
        emulator.step().unwrap();
        assert_eq!(v(&emulator, 0xF), 1);
        assert!(emulator.display().pixels().iter().all(|lit| !lit));
    }

    #[test]
    fn draw_resets_stale_flag() {
        let mut emulator = program(Variant::Extended, &[0xD015]);
        set_v(&mut emulator, 0xF, 1);
        set_v(&mut emulator, 0x0, 10);
        set_v(&mut emulator, 0x1, 10);
        emulator.step().unwrap();
        assert_eq!(v(&emulator, 0xF), 0);
    }

    #[test]
    fn draw_origin_wraps_but_sprite_clips() {
        // I = 0 is the glyph for 0, which is 4 pixels wide and 5 tall
        let mut emulator = program(Variant::Extended, &[0xD015]);
        set_v(&mut emulator, 0x0, 64 + 62);
        set_v(&mut emulator, 0x1, 32 + 30);
        emulator.step().unwrap();

        let display = emulator.display();
        assert!(display.get(62, 30));
        assert!(display.get(63, 30));
        assert!(display.get(62, 31));
        let lit = display.pixels().iter().filter(|lit| **lit).count();
        assert_eq!(lit, 3);
    }

    #[test]
    fn draw_past_end_of_memory_faults_without_drawing() {
        let mut emulator = program(Variant::Extended, &[0xAFFE, 0xD014]);
        steps(&mut emulator, 1);
        assert_eq!(
            emulator.step(),
            Err(VmError::AddressOutOfRange { addr: 0x1001 })
        );
        assert!(emulator.display().pixels().iter().all(|lit| !lit));
    }

    #[test]
    fn clipped_rows_are_not_read() {
        // Only the last two bytes of memory are visible above the bottom edge
        let mut emulator = program(Variant::Extended, &[0xAFFE, 0xD014]);
        set_v(&mut emulator, 0x1, 30);
        steps(&mut emulator, 2);
        assert_eq!(emulator.registers().pc, 0x204);
    }

    #[test]
    fn draw_wraps_when_configured() {
        let config = Config {
            sprite_overflow: SpriteOverflow::Wrap,
            ..Config::default()
        };
        let mut emulator = Emulator::boot(&[0xD0, 0x15], &config).unwrap();
        emulator.state.registers.v[0] = 62;
        emulator.state.registers.v[1] = 30;
        emulator.step().unwrap();

        let display = emulator.display();
        // Top row of the 0 glyph is 0xF0: columns 62, 63, 0, 1
        assert!(display.get(62, 30));
        assert!(display.get(63, 30));
        assert!(display.get(0, 30));
        assert!(display.get(1, 30));
        // Rows 3 and 4 of the glyph land at the top
        assert!(display.get(62, 0));
        assert!(display.get(1, 1));
    }

    #[test]
    fn load_resets_but_keeps_variant() {
        let mut emulator = program(Variant::Original, &[0x2300]);
        emulator.step().unwrap();
        emulator.load(&[0x00, 0xE0]).unwrap();
        assert_eq!(emulator.variant(), Variant::Original);
        assert_eq!(emulator.registers().pc, PROGRAM_START);
        assert_eq!(emulator.stack().depth(), 0);
    }

    #[test]
    fn restore_of_save_is_identical() {
        let mut emulator = program(Variant::Extended, &[0x6A12, 0x2206, 0x0000, 0xA000, 0xD125, 0xF30A]);
        emulator.state.registers.delay_timer = 9;
        emulator.state.registers.sound_timer = 4;
        steps(&mut emulator, 5);
        emulator.keypad_mut().press(0x4);
        let before = emulator.state().clone();

        let blob = emulator.save();
        let mut other = blank(Variant::Extended);
        other.restore(&blob).unwrap();
        assert_eq!(other.state(), &before);
    }

    #[test]
    fn corrupt_restore_leaves_state_alone() {
        let mut emulator = program(Variant::Extended, &[0x6A12]);
        emulator.step().unwrap();
        let before = emulator.state().clone();

        let mut blob = emulator.save();
        blob.truncate(100);
        assert!(emulator.restore(&blob).is_err());
        assert_eq!(emulator.state(), &before);
    }

    proptest! {
        #[test]
        fn add_sets_carry_iff_sum_overflows(a in any::<u8>(), b in any::<u8>()) {
            let mut emulator = program(Variant::Extended, &[0x8AB4]);
            set_v(&mut emulator, 0xA, a);
            set_v(&mut emulator, 0xB, b);
            emulator.step().unwrap();
            prop_assert_eq!(v(&emulator, 0xA), a.wrapping_add(b));
            prop_assert_eq!(v(&emulator, 0xF) == 1, a as u16 + b as u16 > 255);
        }

        #[test]
        fn subtract_sets_flag_iff_no_borrow(a in any::<u8>(), b in any::<u8>()) {
            let mut emulator = program(Variant::Extended, &[0x8AB5]);
            set_v(&mut emulator, 0xA, a);
            set_v(&mut emulator, 0xB, b);
            emulator.step().unwrap();
            prop_assert_eq!(v(&emulator, 0xA), a.wrapping_sub(b));
            prop_assert_eq!(v(&emulator, 0xF) == 1, a >= b);
        }

        #[test]
        fn draw_flag_reports_collision(
            first in any::<[u8; 4]>(),
            second in any::<[u8; 4]>(),
            x in 0u8..64,
            y in 0u8..32,
            stale_flag in 0u8..2,
        ) {
            let mut emulator = program(Variant::Extended, &[0xD014]);
            emulator.state.registers.i = 0x300;
            emulator.state.memory.slice_mut(0x300, 4).unwrap().copy_from_slice(&second);
            set_v(&mut emulator, 0, x);
            set_v(&mut emulator, 1, y);
            set_v(&mut emulator, 0xF, stale_flag);

            // Draw `first` by hand, so the expected collision can be computed alongside
            let mut expected = false;
            for (row, (a, b)) in first.iter().zip(second.iter()).enumerate() {
                let screen_y = y as usize + row;
                if screen_y >= SCREEN_HEIGHT {
                    break;
                }
                for col in 0..8 {
                    let screen_x = x as usize + col;
                    if screen_x >= SCREEN_WIDTH {
                        break;
                    }
                    if a & (0x80 >> col) != 0 {
                        emulator.display_mut().flip(screen_x, screen_y);
                        if b & (0x80 >> col) != 0 {
                            expected = true;
                        }
                    }
                }
            }

            emulator.step().unwrap();
            prop_assert_eq!(v(&emulator, 0xF), expected as u8);
        }
    }
}
