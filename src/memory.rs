//! The memory store: a flat, growable vector of textual cells holding both the instructions
//! and the data of the loaded program. There is one address space; the boundary between
//! instructions and data is a position recorded in the process descriptor.

use crate::bytecode::DataWord;
use crate::cell::Cell;
use crate::error::MachineError;

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct MemoryStore {
  cells: Vec<Cell>,
}

impl MemoryStore {
  pub fn new() -> MemoryStore {
    MemoryStore { cells: vec![] }
  }

  pub fn from_lines<I, S>(lines: I) -> MemoryStore
    where I: IntoIterator<Item = S>, S: Into<String>
  {
    MemoryStore { cells: lines.into_iter().map(|line| Cell::new(line)).collect() }
  }

  pub fn size(&self) -> usize {
    self.cells.len()
  }

  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }

  /// Fails with `MemoryFault` unless `index` names an existing cell.
  pub fn check(&self, index: usize) -> Result<(), MachineError> {
    match index < self.cells.len() {
      true  => Ok(()),
      false => Err(self.fault(index as i64))
    }
  }

  pub fn fault(&self, index: i64) -> MachineError {
    MachineError::MemoryFault { index, size: self.cells.len() }
  }

  pub fn read(&self, index: usize) -> Result<&Cell, MachineError> {
    self.cells.get(index).ok_or_else(|| self.fault(index as i64))
  }

  /// Reads the cell at `index` as a data word.
  pub fn read_word(&self, index: usize) -> Result<DataWord, MachineError> {
    let cell = self.read(index)?;
    cell.data_word().ok_or_else(|| MachineError::MalformedData {
      index,
      text: cell.text().to_string()
    })
  }

  /// Stores a data word, in decimal, into an existing cell.
  pub fn write(&mut self, index: usize, word: DataWord) -> Result<(), MachineError> {
    self.overwrite(index, Cell::from_word(word))
  }

  /// Replaces the raw contents of an existing cell.
  pub fn overwrite(&mut self, index: usize, cell: Cell) -> Result<(), MachineError> {
    self.check(index)?;
    self.cells[index] = cell;
    Ok(())
  }

  /// Appends a cell after the current end of the store.
  pub fn add_memory<C: Into<Cell>>(&mut self, cell: C) {
    self.cells.push(cell.into());
  }

  /// Removes the cell at `index`, shifting every later cell down by one.
  pub fn remove(&mut self, index: usize) -> Result<Cell, MachineError> {
    self.check(index)?;
    Ok(self.cells.remove(index))
  }
}
