//! LS-8 CLI - Run `.ls8` programs from the command line.
//!
//! Usage:
//!   ls8 <program.ls8> [--trace] [--max-steps N] [--disassemble]
//!
//! Examples:
//!   ls8 print8.ls8                  # Run and print output to stdout
//!   ls8 call.ls8 --trace            # Log a trace line before every instruction
//!   ls8 stack.ls8 --disassemble     # Print a listing instead of running

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{bail, Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ls8::disassembler::{disassemble, format_listing};
use ls8::{loader, CpuState, FlatMemory, StdoutOutput, CPU, LOAD_ADDRESS};

/// LS-8 emulator
#[derive(Parser, Debug)]
#[command(name = "ls8")]
#[command(about = "Run LS-8 programs")]
struct Args {
    /// Program file (.ls8: one binary byte per line, # comments)
    program: PathBuf,

    /// Log CPU state before each instruction
    #[arg(short, long)]
    trace: bool,

    /// Stop with an error after this many instructions
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Print a disassembly listing instead of running
    #[arg(short, long)]
    disassemble: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let level = if args.trace {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    SimpleLogger::new().with_level(level).init()?;

    let program = loader::load_file(&args.program)
        .wrap_err_with(|| format!("failed to load {}", args.program.display()))?;

    if args.disassemble {
        print!("{}", format_listing(&disassemble(&program, LOAD_ADDRESS)));
        return Ok(());
    }

    let mut cpu = CPU::new(FlatMemory::new(), StdoutOutput::stdout());
    cpu.load_program(LOAD_ADDRESS, &program)?;

    loop {
        if let Some(limit) = args.max_steps {
            if cpu.instructions_executed() >= limit {
                bail!("no HLT after {} instructions", limit);
            }
        }
        if args.trace {
            log::debug!("{}", cpu.trace());
        }
        if cpu.step()? == CpuState::Halted {
            break;
        }
    }

    log::debug!("executed {} instructions", cpu.instructions_executed());
    let failed = cpu.output().write_errors();
    if failed > 0 {
        bail!("{} prints failed to reach stdout", failed);
    }
    Ok(())
}
