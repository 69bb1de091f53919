use structopt::StructOpt;

use chip8_vm::cli::VmOpt;
use chip8_vm::emulator::state::read_rom;
use chip8_vm::emulator::{input::DummyInput, output::DummyOutput};
use chip8_vm::emulator::{Emulator, Runner};

/// Run a program without a screen or keyboard and print what it drew.
#[derive(StructOpt)]
struct Opt {
    #[structopt(flatten)]
    vm: VmOpt,

    /// Number of frames to run
    #[structopt(long, default_value = "600")]
    frames: u64,

    /// Run as fast as possible instead of at the frame rate
    #[structopt(long)]
    unpaced: bool,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    // Get configuration and read input file
    let opt = Opt::from_args();
    let config = opt.vm.config();
    log::info!("Executing {:?} for {} frames", &opt.vm.rom, opt.frames);
    let rom = read_rom(&opt.vm.rom)?;

    let frame_time = std::time::Duration::from_secs(1) / config.frame_rate.max(1);
    let emulator = Emulator::boot(&rom, &config)?;
    let mut runner = Runner::new(emulator, rom, config, DummyInput, DummyOutput::new());

    // Start execution
    for _ in 0..opt.frames {
        runner.frame()?;
        if !opt.unpaced {
            std::thread::sleep(frame_time);
        }
    }

    print!("{}", runner.emulator().display());
    log::info!(
        "Drew {} frames, pc is {:#05x}",
        runner.output().frames_drawn,
        runner.emulator().registers().pc
    );
    Ok(())
}
