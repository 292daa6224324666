/*!
  This module is responsible for the encoding and decoding of binary instructions.

  Fields are addressed from the most significant bit, matching the way the instruction set
  is documented: bit 0 is the top bit of the word. Decoding works on the whole 32 bit value,
  so a small instruction word such as `0x0000_0005` still has its leading zero bits and its
  fields stay aligned.
*/
use std::convert::TryFrom;

use super::{Instruction, InstructionType, OpcodeNumber, Word};
use crate::registers::RegisterIndex;

/// Extracts `width` bits starting `start` bits from the top of the word.
pub fn field_bits(word: Word, start: u32, width: u32) -> u32 {
  debug_assert!(start + width <= 32 && width > 0);
  let shifted = word >> (32 - start - width);
  match width {
    32 => shifted,
    _  => shifted & ((1u32 << width) - 1)
  }
}

/// Places the low `width` bits of `value` at `start` bits from the top of the word. Bits of
/// `value` that do not fit are discarded.
fn place_bits(value: u32, start: u32, width: u32) -> Word {
  let masked = match width {
    32 => value,
    _  => value & ((1u32 << width) - 1)
  };
  masked << (32 - start - width)
}

/// Decodes an instruction word. Decoding is total: every 32 bit value is some instruction,
/// possibly one whose opcode the execution unit does not define.
pub fn decode_instruction(word: Word) -> Instruction {
  let kind = field_bits(word, 0, 2) as u8;
  let opcode = field_bits(word, 2, 6) as OpcodeNumber;
  let register = |start: u32| field_bits(word, start, 4) as RegisterIndex;

  // A two bit field can only hold a defined type.
  let kind = InstructionType::try_from(kind).unwrap_or(InstructionType::Arithmetic);

  let operands: Vec<u32> = match kind {

    // [Reg:4][Reg:4][Reg:4][Address:4][Unused:8]
    InstructionType::Arithmetic => vec![
      u32::from(register(8)),
      u32::from(register(12)),
      u32::from(register(16)),
      field_bits(word, 20, 4),
    ],

    // [Reg:4][Reg:4][Address:16]
    | InstructionType::ConditionalImmediate
    | InstructionType::InputOutput => vec![
      u32::from(register(8)),
      u32::from(register(12)),
      field_bits(word, 16, 16),
    ],

    // [Address:24]
    InstructionType::UnconditionalJump => vec![field_bits(word, 8, 24)],

  };

  Instruction::from_operands(kind, opcode, &operands)
}

/**
  Encodes the instruction into a word. Each field is truncated to its width, so an
  `Instruction` built with out-of-range operands encodes to the same word as one whose
  operands were masked first.
*/
pub fn encode_instruction(instruction: &Instruction) -> Word {
  let header =
    place_bits(u32::from(instruction.kind().code()), 0, 2) |
    place_bits(u32::from(instruction.opcode()), 2, 6);

  let body = match *instruction {

    Instruction::Arithmetic { reg1, reg2, reg3, address, .. } => {
      place_bits(u32::from(reg1), 8, 4)  |
      place_bits(u32::from(reg2), 12, 4) |
      place_bits(u32::from(reg3), 16, 4) |
      place_bits(address.field(), 20, 4)
    }

    | Instruction::ConditionalImmediate { reg1, reg2, address, .. }
    | Instruction::InputOutput { reg1, reg2, address, .. } => {
      place_bits(u32::from(reg1), 8, 4)  |
      place_bits(u32::from(reg2), 12, 4) |
      place_bits(address.field(), 16, 16)
    }

    Instruction::UnconditionalJump { address, .. } => {
      place_bits(address.field(), 8, 24)
    }

  };

  header | body
}
