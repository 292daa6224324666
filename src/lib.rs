/*!
  A minimal virtual machine: a fixed-width 32 bit instruction set executed against a flat memory
  of text cells by a fetch-decode-execute loop, wrapped in a single-process operating system that
  loads a program file, schedules it and drives the CPU until the program halts.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod cell;
pub mod config;
pub mod cpu;
pub mod display;
pub mod error;
pub mod memory;
pub mod os;
pub mod process;
pub mod registers;

pub use crate::config::{EngineConfig, HaltMode, InstructionRegister, JumpMode};
pub use crate::cpu::{Cpu, Cycle, Effect};
pub use crate::error::{AssemblyError, MachineError};
pub use crate::memory::MemoryStore;
pub use crate::os::{OperatingSystem, RunSummary};
pub use crate::process::{ProcessControlBlock, ProcessState};
pub use crate::registers::RegisterFile;
