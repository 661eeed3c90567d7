use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use chip8vm::clock::{ClockConfig, ClockDriver, DEFAULT_INSTRUCTION_HZ};
use chip8vm::display::MonoTermDisplay;
use chip8vm::input::TermInput;
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::machine::Machine;
use chip8vm::sound::{Mute, SimpleBeep, Sound};

/// Run a CHIP-8 program in the terminal. Esc quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// program to load at 0x200
    rom: PathBuf,

    /// instructions per second
    #[arg(long, default_value_t = DEFAULT_INSTRUCTION_HZ)]
    hz: u32,

    /// don't beep
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    // load the program before touching the terminal, so errors are readable
    let program = fs::read(&args.rom)?;
    let machine = Machine::new(&program)?;

    // initialise
    let stop = Arc::new(AtomicBool::new(false));
    let mut display = MonoTermDisplay::new()?;
    let mut input = TermInput::new(Arc::clone(&stop))?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let mut interpreter =
        Chip8Interpreter::new(machine, &mut display, &mut input, sound.as_mut());

    let config = ClockConfig {
        instruction_hz: args.hz,
        ..ClockConfig::default()
    };
    let result = ClockDriver::new(config, Instant::now()).run(&mut interpreter, &stop);

    // leave raw mode, then keep the prompt clear of the last frame
    drop(interpreter);
    drop(input);
    println!();
    result?;
    Ok(())
}
