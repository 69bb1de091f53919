/*!

A CHIP-8 virtual machine, as specified at https://en.wikipedia.org/wiki/CHIP-8,
with the behaviour of both the original interpreter and SUPER-CHIP.

# Crossterm Frontend

If you want to try the emulator on some programs, there is a ready-to-use implementation
you can run by using `cargo run --release --bin crossterm_frontend -- <program>`.
The keypad is mapped to the block `1234/qwer/asdf/zxcv`. Space pauses, `=` resets,
F5 saves the machine state, F9 restores it and Escape quits.
Pass `--variant chip8` for programs written for the original interpreter.

# Library

The main way of running a program is to load it as bytes and step through it.

```rust
use chip8_vm::emulator::{Emulator, Step, Variant};
use chip8_vm::emulator::instruction::Instruction;

let mut emulator = Emulator::new(Variant::Extended);

// Load a program at address 0x200.
let clear_display = [0x00, 0xE0];
emulator.load(&clear_display)?;
assert_eq!(emulator.step()?, Step::Executed(Instruction::ClearScreen));
# Ok::<(), Box<dyn std::error::Error>>(())
```

Alternatively, you can experiment by executing instructions manually.

```rust
use chip8_vm::emulator::{Emulator, Variant};
use chip8_vm::emulator::instruction::{Instruction, Reg, Const, Addr};

let mut emulator = Emulator::new(Variant::Extended);

// Execute instructions manually
emulator.execute_single(Instruction::ClearScreen)?;

// Or many sequentially
emulator.execute_many(&[
    Instruction::Goto(Addr(0x250)),
    Instruction::SetRegToConst(Reg(0xA), Const(35)),
    Instruction::SetRegToReg(Reg(0xB), Reg(0xA))
])?;
assert_eq!(emulator.registers().v[0xB], 35);
# Ok::<(), chip8_vm::emulator::VmError>(())
```

The whole machine can be saved and restored.

```rust
use chip8_vm::emulator::{Emulator, Variant};

let mut emulator = Emulator::new(Variant::Original);
emulator.load(&[0x6A, 0x2A])?;
let saved = emulator.save();
emulator.step()?;
emulator.restore(&saved)?;
assert_eq!(emulator.registers().v[0xA], 0);
# Ok::<(), Box<dyn std::error::Error>>(())
```

## Custom input and output

A frontend implements `EmulatorInput` and `EmulatorOutput`, which represent somewhere to get
keyboard input from and a screen with a beeper respectively.
Take a look at `src/emulator/input.rs` and `src/emulator/output.rs` to see how to implement this,
then hand them to a `Runner`, which drives the machine one frame at a time.

```rust
use chip8_vm::emulator::{Config, Emulator, Runner};
use chip8_vm::emulator::{input::DummyInput, output::DummyOutput};

let rom = vec![0x00, 0xE0, 0x12, 0x02];
let config = Config::default();
let emulator = Emulator::boot(&rom, &config)?;
let mut runner = Runner::new(emulator, rom, config, DummyInput, DummyOutput::new());
runner.run_frames(2)?;
assert_eq!(runner.output().frames_drawn, 1);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

pub mod cli;
pub mod emulator;
pub mod util;
