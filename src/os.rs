/*!
  The single-process operating system around the CPU: a loader that reads a program file into
  memory, a long-term scheduler that finds the instruction/data boundary and builds the process
  control block, a short-term scheduler that dispatches it, and the driver loop that runs
  cycles until the program counter reaches the boundary.

  A program file holds one memory cell per line. An optional first line containing `job` is
  dropped. Every line containing `data` is replaced by the literal text `data`, and the last
  of them marks the boundary. An `end` cell is appended after loading.
*/

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use crate::cell::{Cell, DATA_MARKER, END_MARKER};
use crate::config::{EngineConfig, InstructionRegister};
use crate::cpu::{Cpu, Cycle};
use crate::display::{make_memory_table, make_register_table, TABLE_DISPLAY_FORMAT};
use crate::error::MachineError;
use crate::memory::MemoryStore;
use crate::process::{ProcessControlBlock, ProcessState};
use crate::registers::INSTRUCTION_REGISTER;

/// The optional header line the long-term scheduler strips.
pub const JOB_MARKER: &str = "job";

/// What a completed run looked like.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct RunSummary {
  pub cycles          : u64,
  pub program_counter : usize,
  pub state           : ProcessState,
}

#[derive(Clone, Debug)]
pub struct OperatingSystem {
  memory : MemoryStore,
  pcb    : Option<ProcessControlBlock>,
  cpu    : Cpu,
}

impl OperatingSystem {

  // region Accessors

  pub fn new(config: EngineConfig) -> OperatingSystem {
    OperatingSystem {
      memory : MemoryStore::new(),
      pcb    : None,
      cpu    : Cpu::new(config),
    }
  }

  /// Loads, schedules and dispatches the program at `path`, ready for `run`.
  pub fn boot<P: AsRef<Path>>(config: EngineConfig, path: P) -> Result<OperatingSystem, MachineError> {
    let mut os = OperatingSystem::new(config);
    os.loader(path)?;
    os.long_term_scheduler()?;
    os.short_term_scheduler()?;
    Ok(os)
  }

  pub fn memory(&self) -> &MemoryStore {
    &self.memory
  }

  pub fn memory_mut(&mut self) -> &mut MemoryStore {
    &mut self.memory
  }

  pub fn cpu(&self) -> &Cpu {
    &self.cpu
  }

  pub fn cpu_mut(&mut self) -> &mut Cpu {
    &mut self.cpu
  }

  pub fn process(&self) -> Option<&ProcessControlBlock> {
    self.pcb.as_ref()
  }

  pub fn program_counter(&self) -> Result<usize, MachineError> {
    self.pcb.as_ref().map(|pcb| pcb.program_counter()).ok_or(MachineError::NotScheduled)
  }

  pub fn set_program_counter(&mut self, program_counter: usize) -> Result<(), MachineError> {
    let pcb = self.pcb.as_mut().ok_or(MachineError::NotScheduled)?;
    pcb.set_program_counter(program_counter);
    Ok(())
  }

  /// True once the program counter reaches the boundary. A machine with no process has
  /// nothing to run and counts as halted.
  pub fn is_halted(&self) -> bool {
    self.pcb.as_ref().map_or(true, |pcb| pcb.is_halted())
  }

  // endregion

  // region Loading and scheduling

  /// Appends every line of the file at `path` to memory. Returns the number of lines read.
  pub fn loader<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, MachineError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MachineError::Load {
      path: path.to_path_buf(),
      source
    })?;

    let before = self.memory.size();
    self.load_lines(text.lines());

    #[cfg(feature = "trace_computation")]
    println!("Loaded {} lines from {}", self.memory.size() - before, path.display());

    Ok(self.memory.size() - before)
  }

  /// Appends lines to memory as the loader would.
  pub fn load_lines<I, S>(&mut self, lines: I)
    where I: IntoIterator<Item = S>,
          S: Into<String>
  {
    for line in lines {
      self.memory.add_memory(Cell::new(line));
    }
  }

  /**
    Splits loaded memory into instructions and data, appends the `end` cell and builds a
    fresh process control block in the `New` state. Every line containing `data` is replaced
    by the marker and the last of them sets the boundary. Without a `data` line every loaded
    cell is an instruction.
  */
  pub fn long_term_scheduler(&mut self) -> Result<&ProcessControlBlock, MachineError> {
    let has_job_header = self
      .memory
      .cells()
      .first()
      .map_or(false, |cell| cell.contains_ignore_case(JOB_MARKER));
    if has_job_header {
      self.memory.remove(0)?;
    }

    let markers: Vec<usize> = self
      .memory
      .cells()
      .iter()
      .enumerate()
      .filter(|(_, cell)| cell.contains_ignore_case(DATA_MARKER))
      .map(|(index, _)| index)
      .collect();
    for index in &markers {
      self.memory.overwrite(*index, Cell::new(DATA_MARKER))?;
    }
    let boundary = markers.last().copied().unwrap_or_else(|| self.memory.size());
    self.memory.add_memory(END_MARKER);

    #[cfg(feature = "trace_computation")]
    println!("Long-term scheduler: {} instruction cells, {} cells in all", boundary, self.memory.size());

    Ok(&*self.pcb.insert(ProcessControlBlock::new(boundary, boundary)))
  }

  /// Clears the registers, moves the program counter to 0 and marks the process ready.
  pub fn short_term_scheduler(&mut self) -> Result<(), MachineError> {
    let pcb = self.pcb.as_mut().ok_or(MachineError::NotScheduled)?;
    self.cpu.reset();
    pcb.set_program_counter(0);
    pcb.set_state(ProcessState::Ready);

    #[cfg(feature = "trace_computation")]
    println!("Short-term scheduler: dispatched {}", pcb);

    Ok(())
  }

  // endregion

  // region Driver

  fn dispatched(&mut self) -> Result<&mut ProcessControlBlock, MachineError> {
    match self.pcb.as_mut() {
      Some(pcb) if pcb.state() != ProcessState::New => Ok(pcb),
      _ => Err(MachineError::NotScheduled)
    }
  }

  /// Runs one cycle unless the process has halted, in which case nothing executes and the
  /// result is `None`.
  pub fn run_cycle(&mut self) -> Result<Option<Cycle>, MachineError> {
    let pcb = match self.pcb.as_mut() {
      Some(pcb) if pcb.state() != ProcessState::New => pcb,
      _ => return Err(MachineError::NotScheduled)
    };
    if pcb.is_halted() {
      pcb.set_state(ProcessState::Terminated);
      return Ok(None);
    }
    pcb.set_state(ProcessState::Running);
    let cycle = self.cpu.run_cycle(pcb, &mut self.memory)?;
    if pcb.is_halted() {
      pcb.set_state(ProcessState::Terminated);
    }
    Ok(Some(cycle))
  }

  /**
    Runs cycles while the program counter is below the boundary. The first failing cycle stops
    the run and its error is returned. With a cycle budget configured, a program still running
    after that many cycles stops with `CycleBudgetExhausted`.
  */
  pub fn run(&mut self) -> Result<RunSummary, MachineError> {
    let budget = self.cpu.config().cycle_budget;
    let start = self.cpu.cycles();
    self.dispatched()?;

    while !self.is_halted() {
      if let Some(budget) = budget {
        if self.cpu.cycles() - start >= budget {
          return Err(MachineError::CycleBudgetExhausted(budget));
        }
      }
      self.run_cycle()?;
    }

    let cycles = self.cpu.cycles() - start;
    let pcb = self.dispatched()?;
    pcb.set_state(ProcessState::Terminated);
    let summary = RunSummary {
      cycles,
      program_counter : pcb.program_counter(),
      state           : pcb.state(),
    };

    #[cfg(feature = "trace_computation")]
    println!("Halted after {} cycles at PC={}", summary.cycles, summary.program_counter);

    Ok(summary)
  }

  // endregion

}

impl Display for OperatingSystem {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let registers = self.cpu.registers();
    let highlight = match registers.policy() {
      InstructionRegister::General   => Some(INSTRUCTION_REGISTER),
      InstructionRegister::Dedicated => None
    };
    let memory_table   = make_memory_table(&self.memory, self.pcb.as_ref());
    let register_table = make_register_table('R', registers.values(), highlight);

    let mut combined_table = table!([memory_table, register_table]);

    combined_table.set_titles(row![ub->"Memory", ub->"Registers"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let process = match &self.pcb {
      Some(pcb) => pcb.to_string(),
      None      => "No process scheduled.".to_string()
    };

    write!(f, "{}\tcycles={}\n{}", process, self.cpu.cycles(), combined_table)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::{assemble_program, DataWord};

  fn scheduled(lines: &[&str], config: EngineConfig) -> OperatingSystem {
    let mut os = OperatingSystem::new(config);
    os.load_lines(lines.iter().cloned());
    os.long_term_scheduler().unwrap();
    os.short_term_scheduler().unwrap();
    os
  }

  #[test]
  fn long_term_scheduler_finds_the_boundary() {
    let mut os = OperatingSystem::new(EngineConfig::default());
    os.load_lines(vec!["// JOB 1 17 2", "0x4B010001", "0x92000000", "// Data 14 C C", "5"]);
    let pcb = os.long_term_scheduler().unwrap().clone();

    assert_eq!(pcb.instruction_count(), 2);
    assert_eq!(pcb.data_offset(), 2);
    assert_eq!(pcb.state(), ProcessState::New);
    let texts: Vec<&str> = os.memory().cells().iter().map(|cell| cell.text()).collect();
    assert_eq!(texts, vec!["0x4B010001", "0x92000000", "data", "5", "end"]);
  }

  #[test]
  fn without_a_data_line_everything_is_code() {
    let mut os = OperatingSystem::new(EngineConfig::default());
    os.load_lines(vec!["0x93000000", "0x93000000"]);
    assert_eq!(os.long_term_scheduler().unwrap().instruction_count(), 2);
    assert_eq!(os.memory().size(), 3);
  }

  #[test]
  fn last_data_line_sets_the_boundary() {
    let mut os = OperatingSystem::new(EngineConfig::default());
    os.load_lines(vec!["0x93000000", "// data 1", "0x93000000", "// DATA 2", "5"]);
    let pcb = os.long_term_scheduler().unwrap().clone();

    assert_eq!(pcb.instruction_count(), 3);
    assert_eq!(pcb.data_offset(), 3);
    let texts: Vec<&str> = os.memory().cells().iter().map(|cell| cell.text()).collect();
    assert_eq!(texts, vec!["0x93000000", "data", "0x93000000", "data", "5", "end"]);
  }

  #[test]
  fn job_line_alone_leaves_an_empty_program() {
    let mut os = OperatingSystem::new(EngineConfig::default());
    os.load_lines(vec!["// JOB 7"]);
    assert_eq!(os.long_term_scheduler().unwrap().instruction_count(), 0);
    let texts: Vec<&str> = os.memory().cells().iter().map(|cell| cell.text()).collect();
    assert_eq!(texts, vec!["end"]);
  }

  #[test]
  fn empty_programs_halt_immediately() {
    let mut os = scheduled(&[], EngineConfig::default());
    assert!(os.is_halted());
    let summary = os.run().unwrap();
    assert_eq!(summary.cycles, 0);
    assert_eq!(summary.state, ProcessState::Terminated);
  }

  #[test]
  fn running_before_scheduling_fails() {
    let mut os = OperatingSystem::new(EngineConfig::default());
    assert!(matches!(os.run(), Err(MachineError::NotScheduled)));
    assert!(matches!(os.short_term_scheduler(), Err(MachineError::NotScheduled)));
    assert!(matches!(os.program_counter(), Err(MachineError::NotScheduled)));

    os.load_lines(vec!["0x93000000"]);
    os.long_term_scheduler().unwrap();
    assert!(matches!(os.run_cycle(), Err(MachineError::NotScheduled)));
  }

  #[test]
  fn short_term_scheduler_resets_the_machine() {
    let mut os = scheduled(&["0x93000000", "0x93000000"], EngineConfig::default());
    os.cpu_mut().registers_mut().set(7, 3);
    os.set_program_counter(1).unwrap();
    os.short_term_scheduler().unwrap();
    assert_eq!(os.program_counter().unwrap(), 0);
    assert_eq!(os.cpu().registers().get(7), 0);
    assert_eq!(os.process().map(|pcb| pcb.state()), Some(ProcessState::Ready));
  }

  #[test]
  fn runs_a_program_to_completion() {
    // Sums data words 1 and 2 into data word 3.
    let lines = assemble_program(
      "MOVI(0, 1, 1)
       ADDI(0, 1, 2)
       ST(1, 0, 3)
       data
       40
       2
       0"
    ).unwrap();
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut os = scheduled(&line_refs, EngineConfig::default());

    let summary = os.run().unwrap();
    assert_eq!(summary, RunSummary { cycles: 3, program_counter: 3, state: ProcessState::Terminated });
    assert_eq!(os.memory().read_word(6).unwrap(), 42 as DataWord);
    assert!(os.run_cycle().unwrap().is_none());
  }

  #[test]
  fn cycle_budget_stops_runaway_programs() {
    // Jumps back to itself through data word 1.
    let lines = ["0x94000001", "data", "0"];
    let mut os = scheduled(&lines, EngineConfig::default().with_cycle_budget(25));
    assert!(matches!(os.run(), Err(MachineError::CycleBudgetExhausted(25))));
    assert_eq!(os.cpu().cycles(), 25);
    assert_eq!(os.process().map(|pcb| pcb.state()), Some(ProcessState::Running));
  }

  #[test]
  fn errors_stop_the_run() {
    let lines = ["0x93000000", "not an instruction", "0x93000000", "data"];
    let mut os = scheduled(&lines, EngineConfig::default());
    match os.run() {
      Err(MachineError::Decode { index: 1, .. }) => {}
      other => panic!("expected a decode error, got {:?}", other)
    }
    assert_eq!(os.program_counter().unwrap(), 1);
  }

  #[test]
  fn displays_memory_and_registers() {
    let os = scheduled(&["0x92000000", "data", "7"], EngineConfig::default());
    let rendered = os.to_string();
    assert!(rendered.contains("* --> M[0] ="));
    assert!(rendered.contains("* --> R[2] ="));
    assert!(rendered.contains("HLT"));
    assert!(rendered.contains("state=Ready"));
  }
}
