//! Everything that can stop the machine. Undefined opcodes are deliberately absent: they
//! execute as no-ops.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bytecode::{InstructionType, Operation};

/// Fatal conditions of a load or of a single machine cycle. None of them are retried; the
/// driver loop stops at the first one and hands it to its caller.
#[derive(Debug, Error)]
pub enum MachineError {
  /// The program file is missing or unreadable.
  #[error("cannot load program `{}`: {source}", path.display())]
  Load {
    path: PathBuf,
    #[source]
    source: io::Error
  },

  /// The fetched cell is not an integer or does not fit in a 32 bit word.
  #[error("cell {index} does not hold an instruction word: {text:?}")]
  Decode {
    index: usize,
    text: String
  },

  /// A data cell used as an operand or jump target is not an integer word.
  #[error("cell {index} does not hold a data word: {text:?}")]
  MalformedData {
    index: usize,
    text: String
  },

  /// An effective address or jump target lies outside the memory store.
  #[error("memory fault: address {index} is outside a store of {size} cells")]
  MemoryFault {
    index: i64,
    size: usize
  },

  /// Arithmetic fault raised by `DIV` and `DIVI`.
  #[error("division by zero")]
  DivisionByZero,

  /// The instruction's type has no field in the position the operation reads.
  #[error("{operation} needs operand `{operand}`, which a {kind} instruction does not carry")]
  MissingOperand {
    operation: Operation,
    operand: &'static str,
    kind: InstructionType
  },

  /// The driver was asked to run before the schedulers built a process.
  #[error("no process has been scheduled")]
  NotScheduled,

  /// The optional cycle budget ran out before the program halted.
  #[error("cycle budget of {0} cycles exhausted before the program halted")]
  CycleBudgetExhausted(u64),
}

/// Errors reported while assembling mnemonic text into instruction words.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
  #[error("error on line {line}: {name} is not an operation")]
  NotAnOperation {
    line: usize,
    name: String
  },

  #[error("error on line {line}: {name} as a {kind} instruction takes {expected} arguments but was given {given}")]
  WrongArity {
    line: usize,
    name: String,
    kind: InstructionType,
    expected: usize,
    given: usize
  },

  #[error("error on line {line}: {value} does not fit in the {bits} bit `{field}` field")]
  FieldOverflow {
    line: usize,
    field: &'static str,
    bits: u32,
    value: u32
  },

  #[error("error on line {line}: {text:?} is not an instruction or data word")]
  Syntax {
    line: usize,
    text: String
  },
}
