use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use cortex_vm::bytecode::assemble_program;
use cortex_vm::{EngineConfig, HaltMode, InstructionRegister, JumpMode, OperatingSystem};

#[derive(Parser, Debug)]
#[command(name = "cortex-vm")]
#[command(about = "Runs and assembles programs for the cortex virtual machine", long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Load a program file and run it until it halts
  Run {
    /// Program file, one memory cell per line
    program: PathBuf,

    /// Treat HLT as a no-op
    #[arg(long)]
    legacy_halt: bool,

    /// Jump to the address field itself instead of the word stored there
    #[arg(long)]
    direct_jumps: bool,

    /// Keep fetched instructions out of register 2
    #[arg(long)]
    dedicated_ir: bool,

    /// Stop with an error after this many cycles
    #[arg(long)]
    max_cycles: Option<u64>,
  },

  /// Assemble mnemonic source into program file lines
  Assemble {
    /// Assembly source
    source: PathBuf,
  },
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
  match cli.command {

    Command::Run { program, legacy_halt, direct_jumps, dedicated_ir, max_cycles } => {
      let config = EngineConfig {
        halt: if legacy_halt { HaltMode::Legacy } else { HaltMode::Terminate },
        jumps: if direct_jumps { JumpMode::Direct } else { JumpMode::Indirect },
        instruction_register: if dedicated_ir {
          InstructionRegister::Dedicated
        } else {
          InstructionRegister::General
        },
        cycle_budget: max_cycles,
      };

      #[cfg(feature = "trace_computation")]
      println!("Computation Tracing ENABLED");

      let mut os = OperatingSystem::boot(config, &program)?;
      let outcome = os.run();
      println!("{}", os);
      let summary = outcome?;
      println!("Halted after {} cycles.", summary.cycles);
    }

    Command::Assemble { source } => {
      let text = fs::read_to_string(&source)?;
      for line in assemble_program(&text)? {
        println!("{}", line);
      }
    }

  }
  Ok(())
}

fn main() {
  if let Err(error) = run(Cli::parse()) {
    eprintln!("error: {}", error);
    process::exit(1);
  }
}
