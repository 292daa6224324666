use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tempfile::{tempdir, TempDir};

use cortex_vm::bytecode::assemble_program;
use cortex_vm::{EngineConfig, MachineError, OperatingSystem, ProcessState};

/// Writes `lines` to a program file in a fresh directory. The directory lives as long as the
/// returned guard.
fn program_file(lines: &[&str]) -> (TempDir, PathBuf) {
  let dir = tempdir().unwrap();
  let path = dir.path().join("program.txt");
  let mut file = fs::File::create(&path).unwrap();
  for line in lines {
    writeln!(file, "{}", line).unwrap();
  }
  (dir, path)
}

fn assembled_file(source: &str) -> (TempDir, PathBuf) {
  let lines = assemble_program(source).unwrap();
  let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
  program_file(&refs)
}

const COUNTDOWN: &str = "
  MOVI(0, 1, 1)     % R1 <- 3
  ADDI(0, 3, 5)     % R3 <- R3 + 1
  ADDI(0, 1, 2)     % R1 <- R1 - 1
  BNZ(1, 0, 3)      % back to 1 while R1 is not zero
  ST(3, 0, 4)       % store the number of passes
  HLT
  NOP
data
  3
  -1
  1
  0
  1
";

#[test]
fn three_instructions_and_one_data_word() {
  let (_dir, path) = program_file(&["0x4B010001", "0x93000000", "0x93000000", "data", "7"]);
  let mut os = OperatingSystem::new(EngineConfig::default());

  assert_eq!(os.loader(&path).unwrap(), 5);
  assert_eq!(os.memory().size(), 5);

  let pcb = os.long_term_scheduler().unwrap().clone();
  assert_eq!(pcb.instruction_count(), 3);
  assert_eq!(pcb.data_offset(), 3);
  assert_eq!(os.memory().size(), 6);
  assert_eq!(os.memory().read(5).unwrap().text(), "end");

  os.short_term_scheduler().unwrap();
  let mut visited = vec![];
  while let Some(cycle) = os.run_cycle().unwrap() {
    visited.push(cycle.address);
  }
  assert_eq!(visited, vec![0, 1, 2]);
  assert_eq!(os.program_counter().unwrap(), 3);
  assert_eq!(os.cpu().registers().get(1), 7);
  assert_eq!(os.memory().read(4).unwrap().text(), "7");
}

#[test]
fn countdown_loop() {
  let (_dir, path) = assembled_file(COUNTDOWN);
  let mut os = OperatingSystem::boot(EngineConfig::default(), &path).unwrap();
  let summary = os.run().unwrap();

  assert_eq!(summary.cycles, 12);
  assert_eq!(summary.program_counter, 7);
  assert_eq!(summary.state, ProcessState::Terminated);
  assert_eq!(os.memory().read_word(11).unwrap(), 3);
  assert_eq!(os.cpu().registers().get(1), 0);
}

#[test]
fn machine_state_renders_after_a_run() {
  let (_dir, path) = assembled_file(COUNTDOWN);
  let mut os = OperatingSystem::boot(EngineConfig::default(), &path).unwrap();
  os.run().unwrap();

  let rendered = os.to_string();
  assert!(rendered.contains("state=Terminated"));
  assert!(rendered.contains("M[11] ="));
  assert!(rendered.contains("BNZ(1, 0, 3)"));
}

#[test]
fn legacy_configuration() {
  // Direct jumps go to instruction 1 itself, and HLT falls through to the NOP.
  let source = COUNTDOWN.replace("BNZ(1, 0, 3)", "BNZ(1, 0, 1)");
  let (_dir, path) = assembled_file(&source);
  let mut os = OperatingSystem::boot(EngineConfig::legacy(), &path).unwrap();
  let summary = os.run().unwrap();

  assert_eq!(summary.cycles, 13);
  assert_eq!(summary.program_counter, 7);
  assert_eq!(os.memory().read_word(11).unwrap(), 3);
}

#[test]
fn job_header_is_stripped() {
  let (_dir, path) = program_file(&["// JOB 1 2 1", "0x92000000", "0x93000000", "// Data 1", "9"]);
  let mut os = OperatingSystem::boot(EngineConfig::default(), &path).unwrap();
  assert_eq!(os.process().map(|pcb| pcb.instruction_count()), Some(2));
  assert_eq!(os.memory().read(2).unwrap().text(), "data");

  let summary = os.run().unwrap();
  assert_eq!(summary.cycles, 1);
  assert_eq!(summary.program_counter, 2);
}

#[test]
fn missing_program_file() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("absent.txt");
  match OperatingSystem::boot(EngineConfig::default(), &path) {
    Err(MachineError::Load { path: reported, .. }) => assert_eq!(reported, path),
    other => panic!("expected a load error, got {:?}", other.map(|os| os.to_string()))
  }
}

#[test]
fn runaway_program_with_budget() {
  let (_dir, path) = program_file(&["0x94000001", "data", "0"]);
  let mut os = OperatingSystem::boot(EngineConfig::default().with_cycle_budget(100), &path).unwrap();
  assert!(matches!(os.run(), Err(MachineError::CycleBudgetExhausted(100))));
  assert!(!os.is_halted());
}
