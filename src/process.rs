//! The process control block of the single loaded program.

use std::fmt::{Display, Formatter};

use strum_macros::Display as StrumDisplay;

#[derive(StrumDisplay, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum ProcessState {
  /// Built by the long-term scheduler, not yet dispatched.
  New,
  /// Dispatched by the short-term scheduler.
  Ready,
  /// The driver loop is executing cycles.
  Running,
  /// The program counter reached the instruction/data boundary.
  Terminated,
}

/**
  Holds the program counter and the two load-time constants of the process: the number of
  instructions, which is also the index of the first data cell and the halt target, and the
  data offset added to every data address. The two constants are equal for every program
  the long-term scheduler builds, but the engine never assumes so.
*/
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ProcessControlBlock {
  program_counter   : usize,
  instruction_count : usize,
  data_offset       : usize,
  state             : ProcessState,
}

impl ProcessControlBlock {
  pub fn new(instruction_count: usize, data_offset: usize) -> ProcessControlBlock {
    ProcessControlBlock {
      program_counter: 0,
      instruction_count,
      data_offset,
      state: ProcessState::New,
    }
  }

  pub fn program_counter(&self) -> usize {
    self.program_counter
  }

  pub fn set_program_counter(&mut self, program_counter: usize) {
    self.program_counter = program_counter;
  }

  pub fn instruction_count(&self) -> usize {
    self.instruction_count
  }

  pub fn data_offset(&self) -> usize {
    self.data_offset
  }

  pub fn state(&self) -> ProcessState {
    self.state
  }

  pub fn set_state(&mut self, state: ProcessState) {
    self.state = state;
  }

  /// The driver loop runs while this is false.
  pub fn is_halted(&self) -> bool {
    self.program_counter >= self.instruction_count
  }

  /// Moves the program counter to the boundary, which ends the run.
  pub fn halt(&mut self) {
    self.program_counter = self.instruction_count;
  }
}

impl Display for ProcessControlBlock {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "PC={} instructions={} data offset={} state={}",
      self.program_counter, self.instruction_count, self.data_offset, self.state
    )
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn halting_moves_to_the_boundary() {
    let mut pcb = ProcessControlBlock::new(3, 3);
    assert!(!pcb.is_halted());
    pcb.set_program_counter(1);
    pcb.halt();
    assert_eq!(pcb.program_counter(), 3);
    assert!(pcb.is_halted());
  }

  #[test]
  fn past_the_boundary_is_halted() {
    let mut pcb = ProcessControlBlock::new(3, 3);
    pcb.set_program_counter(4);
    assert!(pcb.is_halted());
    assert_eq!(ProcessControlBlock::new(0, 0).is_halted(), true);
  }
}
