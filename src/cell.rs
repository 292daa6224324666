use std::fmt::{Display, Formatter};

use crate::bytecode::{parse_data_word, parse_instruction_word, DataWord, Word};

/// Marker text the long-term scheduler writes over the instruction/data boundary line.
pub const DATA_MARKER: &str = "data";
/// Sentinel appended after the program image.
pub const END_MARKER: &str = "end";

/**
  One addressable unit of the memory store. Cells are kept as text, exactly as they were
  loaded: an instruction line, a data word, or one of the boundary markers. Data words
  written back by the machine are stored in decimal.
*/
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Cell(String);

impl Cell {
  pub fn new<S: Into<String>>(text: S) -> Cell {
    Cell(text.into())
  }

  /// A data word in its canonical decimal form.
  pub fn from_word(word: DataWord) -> Cell {
    Cell(word.to_string())
  }

  pub fn text(&self) -> &str {
    &self.0
  }

  /// Case-insensitive substring test used by the schedulers to find the job header and the
  /// data boundary.
  pub fn contains_ignore_case(&self, needle: &str) -> bool {
    self.0.to_lowercase().contains(&needle.to_lowercase())
  }

  /// Interprets the cell as a 32 bit instruction word.
  pub fn instruction_word(&self) -> Option<Word> {
    parse_instruction_word(&self.0)
  }

  /// Interprets the cell as a signed data word.
  pub fn data_word(&self) -> Option<DataWord> {
    parse_data_word(&self.0)
  }
}

impl Display for Cell {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for Cell {
  fn from(text: &str) -> Cell {
    Cell::new(text)
  }
}

impl From<String> for Cell {
  fn from(text: String) -> Cell {
    Cell(text)
  }
}
