use structopt::StructOpt;

use chip8_vm::cli::VmOpt;
use chip8_vm::emulator::state::read_rom;
use chip8_vm::emulator::{Emulator, Runner};

mod crossterm_io;
mod key_manager;
use crossterm_io::CrosstermOutput;
use key_manager::KeyManager;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Get configuration and read input file
    let opt = VmOpt::from_args();
    let config = opt.config();
    log::info!("Executing {:?} as {}", &opt.rom, config.variant);
    let rom = read_rom(&opt.rom)?;

    // Fail on a bad rom before taking over the terminal
    let emulator = Emulator::boot(&rom, &config)?;
    let output = CrosstermOutput::new(config.palette)?;

    // Start execution
    let mut runner = Runner::new(emulator, rom, config, KeyManager::new(), output);
    runner.run()?;
    Ok(())
}
