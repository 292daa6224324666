/*!
  The human readable textual form of bytecode is called assembly. This module leverages the
  `strum` derives of `Operation` to serialize and deserialize instructions to assembly.

  One statement per line:

    ADD(1, 2, 3, 0)      % R3 <- R1 + R2
    MOVI(0, 4, 1)        % canonical type 1
    ADD.t1(1, 2, 5)      % the same opcode forced into a type 1 layout
    OP40.t2(7)           % an undefined opcode
    HLT                  % no argument list: every field is zero

  Arguments are unsigned integers in decimal or `0x` hexadecimal, registers first, address
  last, in the order of the instruction type's fields. Text after `%` is a comment. The
  syntax is exactly what `Display for Instruction` prints, so disassembled code reassembles.
*/

use std::convert::TryFrom;
use std::str::FromStr;

use nom::{
  IResult,
  branch::alt,
  bytes::complete::tag_no_case,
  character::complete::{alphanumeric1, char as one_char, digit1, hex_digit1, space0},
  combinator::{all_consuming, map_res, opt},
  multi::separated_list,
  sequence::{delimited, pair, preceded, tuple},
};

use super::{encode_instruction, format_instruction_word, parse_data_word, DataWord, Instruction,
            InstructionType, OpcodeNumber, Operation, Word};
use crate::cell::DATA_MARKER;
use crate::error::AssemblyError;

/// Field names and widths of each instruction type, in writing order.
fn field_layout(kind: InstructionType) -> &'static [(&'static str, u32)] {
  match kind {
    InstructionType::Arithmetic =>
      &[("reg1", 4), ("reg2", 4), ("reg3", 4), ("address", 4)],
    | InstructionType::ConditionalImmediate
    | InstructionType::InputOutput =>
      &[("reg1", 4), ("reg2", 4), ("address", 16)],
    InstructionType::UnconditionalJump =>
      &[("address", 24)],
  }
}

// region Parsers

fn unsigned(input: &str) -> IResult<&str, u32> {
  alt((
    map_res(preceded(tag_no_case("0x"), hex_digit1), |digits: &str| u32::from_str_radix(digits, 16)),
    map_res(digit1, |digits: &str| digits.parse::<u32>())
  ))(input)
}

fn type_suffix(input: &str) -> IResult<&str, u8> {
  preceded(tag_no_case(".t"), map_res(digit1, |digits: &str| digits.parse::<u8>()))(input)
}

fn argument_list(input: &str) -> IResult<&str, Vec<u32>> {
  delimited(
    pair(one_char('('), space0),
    separated_list(delimited(space0, one_char(','), space0), unsigned),
    pair(space0, one_char(')'))
  )(input)
}

/// `MNEMONIC[.tN][(args)]`, with surrounding whitespace.
fn statement(input: &str) -> IResult<&str, (&str, Option<u8>, Option<Vec<u32>>)> {
  all_consuming(
    delimited(
      space0,
      tuple((alphanumeric1, opt(type_suffix), preceded(space0, opt(argument_list)))),
      space0
    )
  )(input)
}

// endregion

/// Strips a `%` comment.
fn code_of(line: &str) -> &str {
  match line.find('%') {
    Some(position) => &line[..position],
    None           => line
  }
}

/// Resolves a mnemonic, either a defined operation or `OP<n>` for a raw opcode.
fn resolve_mnemonic(name: &str) -> Option<OpcodeNumber> {
  let upper = name.to_uppercase();
  if let Ok(operation) = Operation::from_str(&upper) {
    return Some(operation.code());
  }
  if upper.starts_with("OP") {
    return match upper[2..].parse::<OpcodeNumber>() {
      Ok(code) if code < 64 => Some(code),
      _ => None
    };
  }
  None
}

/// Assembles a single statement. `line` is only used for error reporting.
fn assemble_statement(text: &str, line: usize) -> Result<Instruction, AssemblyError> {
  let syntax_error = || AssemblyError::Syntax { line, text: text.trim().to_string() };

  let (name, suffix, arguments) = match statement(text) {
    Ok((_rest, parsed)) => parsed,
    Err(_e)             => return Err(syntax_error())
  };

  let opcode = resolve_mnemonic(name).ok_or_else(|| AssemblyError::NotAnOperation {
    line,
    name: name.to_string()
  })?;

  let kind = match suffix {
    Some(code) => InstructionType::try_from(code).map_err(|_e| syntax_error())?,
    None => match Operation::from_code(opcode) {
      Some(operation) => operation.canonical_type(),
      None            => InstructionType::Arithmetic
    }
  };

  // `HLT` and `HLT()` both mean every field is zero.
  let arguments = match arguments {
    Some(arguments) if !arguments.is_empty() => arguments,
    _ => vec![0; kind.arity()]
  };
  if arguments.len() != kind.arity() {
    return Err(AssemblyError::WrongArity {
      line,
      name: name.to_uppercase(),
      kind,
      expected: kind.arity(),
      given: arguments.len()
    });
  }

  for (value, (field, bits)) in arguments.iter().zip(field_layout(kind).iter()) {
    if u64::from(*value) >= (1u64 << *bits) {
      return Err(AssemblyError::FieldOverflow { line, field: *field, bits: *bits, value: *value });
    }
  }

  Ok(Instruction::from_operands(kind, opcode, &arguments))
}

/// Parses assembly text into instructions. Blank and comment-only lines are skipped.
pub fn parse_assembly(text: &str) -> Result<Vec<Instruction>, AssemblyError> {
  let mut instructions = vec![];
  for (i, line) in text.lines().enumerate() {
    let code = code_of(line);
    if code.trim().is_empty() {
      continue;
    }
    instructions.push(assemble_statement(code, i + 1)?);
  }
  Ok(instructions)
}

/// Assembles text directly to instruction words.
pub fn assemble(text: &str) -> Result<Vec<Word>, AssemblyError> {
  Ok(parse_assembly(text)?.iter().map(encode_instruction).collect())
}

/**
  Assembles a whole program into the lines of a program file: instruction words in
  hexadecimal, then, if the text has a line reading `data`, a `// DATA` boundary line
  followed by the data words in decimal.
*/
pub fn assemble_program(text: &str) -> Result<Vec<String>, AssemblyError> {
  let mut lines: Vec<String> = vec![];
  let mut in_data = false;

  for (i, line) in text.lines().enumerate() {
    let code = code_of(line).trim();
    if code.is_empty() {
      continue;
    }

    if !in_data && code.eq_ignore_ascii_case(DATA_MARKER) {
      in_data = true;
      lines.push("// DATA".to_string());
      continue;
    }

    match in_data {

      true => {
        let word: DataWord = parse_data_word(code).ok_or_else(|| AssemblyError::Syntax {
          line: i + 1,
          text: code.to_string()
        })?;
        lines.push(word.to_string());
      }

      false => {
        let instruction = assemble_statement(code, i + 1)?;
        lines.push(format_instruction_word(encode_instruction(&instruction)));
      }

    }
  }

  Ok(lines)
}
