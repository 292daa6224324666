//! The register file: sixteen signed general purpose registers plus the instruction-holding
//! register the fetch stage loads.

use std::fmt::{Display, Formatter};

use crate::bytecode::{DataWord, Word};
use crate::config::InstructionRegister;

pub const REGISTER_COUNT: usize = 16;
/// The general register the fetch stage loads when the instruction register is shared.
pub const INSTRUCTION_REGISTER: usize = 2;

/// A register number as it appears in a 4 bit instruction field.
pub type RegisterIndex = u8;

/**
  Register 2 doubles as the instruction register by default. Every fetch overwrites it, so a
  program that stores a value in register 2 will lose it at the next cycle. With
  `InstructionRegister::Dedicated` the fetched word goes to a separate slot and register 2
  behaves like any other register.
*/
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RegisterFile {
  registers : [DataWord; REGISTER_COUNT],
  /// Only used with `InstructionRegister::Dedicated`.
  dedicated : Word,
  policy    : InstructionRegister,
}

impl RegisterFile {
  pub fn new(policy: InstructionRegister) -> RegisterFile {
    RegisterFile {
      registers : [0; REGISTER_COUNT],
      dedicated : 0,
      policy,
    }
  }

  pub fn reset(&mut self) {
    self.registers = [0; REGISTER_COUNT];
    self.dedicated = 0;
  }

  /// Register fields are four bits wide, so the index is always in range.
  pub fn get(&self, index: RegisterIndex) -> DataWord {
    self.registers[index as usize % REGISTER_COUNT]
  }

  pub fn set(&mut self, index: RegisterIndex, value: DataWord) {
    self.registers[index as usize % REGISTER_COUNT] = value;
  }

  pub fn values(&self) -> &[DataWord] {
    &self.registers
  }

  pub fn policy(&self) -> InstructionRegister {
    self.policy
  }

  /// Loads a fetched instruction word. In the shared policy the word is kept as the two's
  /// complement bit pattern in register 2.
  pub fn load_instruction(&mut self, word: Word) {
    match self.policy {
      InstructionRegister::General   => self.registers[INSTRUCTION_REGISTER] = word as DataWord,
      InstructionRegister::Dedicated => self.dedicated = word
    }
  }

  /// The word the decode stage works on: whatever the instruction register holds now.
  pub fn instruction(&self) -> Word {
    match self.policy {
      InstructionRegister::General   => self.registers[INSTRUCTION_REGISTER] as Word,
      InstructionRegister::Dedicated => self.dedicated
    }
  }
}

impl Default for RegisterFile {
  fn default() -> RegisterFile {
    RegisterFile::new(InstructionRegister::default())
  }
}

impl Display for RegisterFile {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let values: Vec<String> =
      self.registers
          .iter()
          .enumerate()
          .map(|(i, value)| format!("R{}={}", i, value))
          .collect();
    write!(f, "{}", values.join(" "))
  }
}
