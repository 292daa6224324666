//! Run-time switches of the engine. The defaults give the canonical behavior; the other
//! variants reproduce older revisions of the instruction set or ease testing.

use strum_macros::{Display as StrumDisplay, EnumString};

/// What `HLT` does.
#[derive(StrumDisplay, EnumString, Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum HaltMode {
  /// Move the program counter to the instruction/data boundary, ending the run.
  Terminate,
  /// Do nothing; the run ends when the program counter walks into the boundary.
  Legacy,
}

/// Where jumps and branches take their target from.
#[derive(StrumDisplay, EnumString, Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum JumpMode {
  /// The target is the data word stored at the effective address.
  Indirect,
  /// The target is the address field itself.
  Direct,
}

/// Which slot the fetch stage loads.
#[derive(StrumDisplay, EnumString, Clone, Copy, Eq, PartialEq, Debug, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum InstructionRegister {
  /// General register 2.
  General,
  /// A slot outside the addressable register file.
  Dedicated,
}

impl Default for HaltMode {
  fn default() -> HaltMode { HaltMode::Terminate }
}

impl Default for JumpMode {
  fn default() -> JumpMode { JumpMode::Indirect }
}

impl Default for InstructionRegister {
  fn default() -> InstructionRegister { InstructionRegister::General }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct EngineConfig {
  pub halt                 : HaltMode,
  pub jumps                : JumpMode,
  pub instruction_register : InstructionRegister,
  /// Maximum number of cycles the driver loop runs. `None` lets a runaway program loop
  /// forever.
  pub cycle_budget         : Option<u64>,
}

impl EngineConfig {
  /// The behavior of the earliest revisions: `HLT` is a no-op and jumps are direct.
  pub fn legacy() -> EngineConfig {
    EngineConfig {
      halt  : HaltMode::Legacy,
      jumps : JumpMode::Direct,
      ..EngineConfig::default()
    }
  }

  pub fn with_cycle_budget(mut self, budget: u64) -> EngineConfig {
    self.cycle_budget = Some(budget);
    self
  }
}
