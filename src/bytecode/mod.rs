/*!

  The VM uses a 32 bit word for instructions and a signed 32 bit word for data. Every
  instruction is a single word, written most significant bit first as

    [Type:2][Opcode:6][Operands:24]

  The two bit type selects how the 24 operand bits are divided:

    Type 0, arithmetic:             [Reg:4][Reg:4][Reg:4][Address:4][Unused:8]
    Type 1, conditional/immediate:  [Reg:4][Reg:4][Address:16]
    Type 2, unconditional jump:     [Address:24]
    Type 3, input/output:           [Reg:4][Reg:4][Address:16]

  The opcode field has room for 64 operations, of which 27 are defined. An undefined opcode
  still decodes; the execution unit treats it as a no-op.

  Instructions and data live in memory as text, one word per cell. Instruction words are
  written in hexadecimal with a `0x` prefix (decimal is accepted too), data words in decimal.
  The `text` module converts between the two representations, and the `assembly` module
  provides a human readable mnemonic form.

*/

mod binary;
mod instruction;
mod text;
pub mod assembly;

pub use binary::{decode_instruction, encode_instruction, field_bits};
pub use instruction::{Instruction, InstructionType, Operation, OpcodeNumber, MAX_DEFINED_OPCODE};
pub use text::{format_instruction_word, parse_data_word, parse_instruction_word};
pub use assembly::{assemble, assemble_program, parse_assembly};

// If you change this you must also change `encode_instruction` and `decode_instruction`.
pub type Word = u32;
/// The contents of a data cell or a general register.
pub type DataWord = i32;
