//! Tabular rendering of machine state for tracing and for the command line.

use std::fmt::Display;

use prettytable::{format as TableFormat, Table};

use crate::bytecode::decode_instruction;
use crate::memory::MemoryStore;
use crate::process::ProcessControlBlock;

lazy_static! {
  pub static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

/// One row per value, named `name[i]`. The row at `highlight`, if any, gets an arrow.
pub fn make_register_table<T>(name: char, values: &[T], highlight: Option<usize>) -> Table
  where T: Display
{
  let mut table = Table::new();

  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Register", ubl->"Contents"]);

  for (i, value) in values.iter().enumerate() {
    match highlight == Some(i) {

      true  => {
        table.add_row(row![r->format!("* --> {}[{}] =", name, i), format!("{}", value)]);
      }

      false => {
        table.add_row(row![r->format!("{}[{}] =", name, i), format!("{}", value)]);
      }

    }
  }
  table
}

/**
  One row per memory cell. Cells below the boundary are shown with their disassembly, and the
  cell at the program counter gets an arrow. Without a process every cell is shown as text.
*/
pub fn make_memory_table(memory: &MemoryStore, pcb: Option<&ProcessControlBlock>) -> Table {
  let mut table = Table::new();

  table.set_format(*TABLE_DISPLAY_FORMAT);
  table.set_titles(row![ubr->"Address", ubl->"Contents", ubl->"Decoded"]);

  let program_counter = pcb.map(|pcb| pcb.program_counter());
  let boundary = pcb.map_or(0, |pcb| pcb.instruction_count());

  for (i, cell) in memory.cells().iter().enumerate() {
    let label = match program_counter == Some(i) {
      true  => format!("* --> M[{}] =", i),
      false => format!("M[{}] =", i)
    };
    let decoded = match (i < boundary, cell.instruction_word()) {
      (true, Some(word)) => decode_instruction(word).to_string(),
      _                  => String::new()
    };
    table.add_row(row![r->label, cell.text(), decoded]);
  }
  table
}
