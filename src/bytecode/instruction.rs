use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::address::Address;
use crate::registers::RegisterIndex;

/// The raw six bit opcode field. Values above `MAX_DEFINED_OPCODE` are legal and mean "no-op".
pub type OpcodeNumber = u8;

pub const MAX_DEFINED_OPCODE: OpcodeNumber = 26u8;

/**
  Operations of the virtual machine, numbered by their opcode.

  Order-dependencies: the discriminants are the opcode values of the instruction set, so the
  variants must stay in this order.
*/
#[derive(
StrumDisplay, EnumString, EnumIter,  TryFromPrimitive, IntoPrimitive,
Clone,        Copy,       Eq,        PartialEq,        Debug,          Hash
)]
#[strum(serialize_all = "shouty_snake_case")]
#[repr(u8)]
pub enum Operation {
  // Move family //
  Rd,     // 0x00  read a word into a register
  Wr,     // 0x01  write a register out
  St,     // 0x02  store a register into memory
  Lw,     // 0x03  load a register from memory

  // Register ALU family //
  Mov,    // 0x04
  Add,    // 0x05
  Sub,    // 0x06
  Mul,    // 0x07
  Div,    // 0x08
  And,    // 0x09  equality test, not bitwise
  Or,     // 0x0A  "either is 1" test, not bitwise

  // Immediate family, always through memory //
  Movi,   // 0x0B
  Addi,   // 0x0C
  Muli,   // 0x0D
  Divi,   // 0x0E
  Ldi,    // 0x0F  same as MOVI

  // Comparisons //
  Slt,    // 0x10
  Slti,   // 0x11

  // Control family //
  Hlt,    // 0x12
  Nop,    // 0x13
  Jmp,    // 0x14
  Beq,    // 0x15
  Bne,    // 0x16
  Bez,    // 0x17
  Bnz,    // 0x18
  Bgz,    // 0x19
  Blz,    // 0x1A
}

impl Operation {
  pub fn code(&self) -> OpcodeNumber {
    Into::<OpcodeNumber>::into(*self)
  }

  pub fn from_code(code: OpcodeNumber) -> Option<Operation> {
    Operation::try_from(code).ok()
  }

  /// The instruction type an assembler uses for this operation when none is given.
  pub fn canonical_type(&self) -> InstructionType {
    match self {
      | Operation::Mov | Operation::Add | Operation::Sub | Operation::Mul | Operation::Div
      | Operation::And | Operation::Or  | Operation::Slt => InstructionType::Arithmetic,

      | Operation::Hlt | Operation::Nop | Operation::Jmp => InstructionType::UnconditionalJump,

      | Operation::Rd  | Operation::Wr => InstructionType::InputOutput,

      _ => InstructionType::ConditionalImmediate
    }
  }
}

/// The two bit field that selects the operand layout.
#[derive(
StrumDisplay, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,     Eq,               PartialEq,     Debug, Hash
)]
#[repr(u8)]
pub enum InstructionType {
  #[strum(to_string = "arithmetic")]
  Arithmetic,
  #[strum(to_string = "conditional/immediate")]
  ConditionalImmediate,
  #[strum(to_string = "unconditional jump")]
  UnconditionalJump,
  #[strum(to_string = "input/output")]
  InputOutput,
}

impl InstructionType {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Number of operand fields, not counting the opcode.
  pub fn arity(&self) -> usize {
    match self {
      InstructionType::Arithmetic        => 4,
      InstructionType::UnconditionalJump => 1,
      _                                  => 3
    }
  }
}

/// Holds the unencoded components of an instruction. As such, it enumerates the possible
/// operand layouts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [Type:2][OpCode:6][Reg:4][Reg:4][Reg:4][Address:4][Unused:8]
  Arithmetic {
    opcode  : OpcodeNumber,
    reg1    : RegisterIndex,
    reg2    : RegisterIndex,
    reg3    : RegisterIndex,
    address : Address
  },
  /// [Type:2][OpCode:6][Reg:4][Reg:4][Address:16]
  ConditionalImmediate {
    opcode  : OpcodeNumber,
    reg1    : RegisterIndex,
    reg2    : RegisterIndex,
    address : Address
  },
  /// [Type:2][OpCode:6][Address:24]
  UnconditionalJump {
    opcode  : OpcodeNumber,
    address : Address
  },
  /// [Type:2][OpCode:6][Reg:4][Reg:4][Address:16]
  InputOutput {
    opcode  : OpcodeNumber,
    reg1    : RegisterIndex,
    reg2    : RegisterIndex,
    address : Address
  },
}

impl Instruction {
  /**
    Builds an instruction of the given type from an operand list in the order it is written:
    registers first, address last. It is the caller's responsibility to pass as many
    operands as `kind.arity()`; missing operands are taken as zero.
  */
  pub fn from_operands(kind: InstructionType, opcode: OpcodeNumber, operands: &[u32]) -> Instruction {
    let operand  = |i: usize| operands.get(i).copied().unwrap_or(0);
    let register = |i: usize| operand(i) as RegisterIndex;
    match kind {

      InstructionType::Arithmetic => Instruction::Arithmetic {
        opcode,
        reg1    : register(0),
        reg2    : register(1),
        reg3    : register(2),
        address : Address::from_field(operand(3))
      },

      InstructionType::ConditionalImmediate => Instruction::ConditionalImmediate {
        opcode,
        reg1    : register(0),
        reg2    : register(1),
        address : Address::from_field(operand(2))
      },

      InstructionType::UnconditionalJump => Instruction::UnconditionalJump {
        opcode,
        address : Address::from_field(operand(0))
      },

      InstructionType::InputOutput => Instruction::InputOutput {
        opcode,
        reg1    : register(0),
        reg2    : register(1),
        address : Address::from_field(operand(2))
      },

    }
  }

  pub fn kind(&self) -> InstructionType {
    match self {
      Instruction::Arithmetic { .. }           => InstructionType::Arithmetic,
      Instruction::ConditionalImmediate { .. } => InstructionType::ConditionalImmediate,
      Instruction::UnconditionalJump { .. }    => InstructionType::UnconditionalJump,
      Instruction::InputOutput { .. }          => InstructionType::InputOutput,
    }
  }

  pub fn opcode(&self) -> OpcodeNumber {
    match self {
      | Instruction::Arithmetic { opcode, .. }
      | Instruction::ConditionalImmediate { opcode, .. }
      | Instruction::UnconditionalJump { opcode, .. }
      | Instruction::InputOutput { opcode, .. } => *opcode
    }
  }

  /// `None` for opcodes outside the instruction set.
  pub fn operation(&self) -> Option<Operation> {
    Operation::from_code(self.opcode())
  }

  pub fn reg1(&self) -> Option<RegisterIndex> {
    match self {
      | Instruction::Arithmetic { reg1, .. }
      | Instruction::ConditionalImmediate { reg1, .. }
      | Instruction::InputOutput { reg1, .. } => Some(*reg1),
      Instruction::UnconditionalJump { .. }   => None
    }
  }

  pub fn reg2(&self) -> Option<RegisterIndex> {
    match self {
      | Instruction::Arithmetic { reg2, .. }
      | Instruction::ConditionalImmediate { reg2, .. }
      | Instruction::InputOutput { reg2, .. } => Some(*reg2),
      Instruction::UnconditionalJump { .. }   => None
    }
  }

  pub fn reg3(&self) -> Option<RegisterIndex> {
    match self {
      Instruction::Arithmetic { reg3, .. } => Some(*reg3),
      _                                    => None
    }
  }

  pub fn address(&self) -> Address {
    match self {
      | Instruction::Arithmetic { address, .. }
      | Instruction::ConditionalImmediate { address, .. }
      | Instruction::UnconditionalJump { address, .. }
      | Instruction::InputOutput { address, .. } => *address
    }
  }

  /// The operand fields in encoding order, without the opcode.
  pub fn fields(&self) -> Vec<u32> {
    let mut fields: Vec<u32> =
      [self.reg1(), self.reg2(), self.reg3()]
        .iter()
        .filter_map(|register| register.map(u32::from))
        .collect();
    fields.push(self.address().field());
    fields
  }

  /// The flat operand list `[opcode, operand1, operand2, ...]`. Its length depends on the
  /// instruction type.
  pub fn operands(&self) -> Vec<u32> {
    let mut operands = vec![u32::from(self.opcode())];
    operands.extend(self.fields());
    operands
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operation() {

      Some(operation) => {
        write!(f, "{}", operation)?;
        if operation.canonical_type() != self.kind() {
          write!(f, ".t{}", self.kind().code())?;
        }
      }

      None => {
        write!(f, "OP{}.t{}", self.opcode(), self.kind().code())?;
      }

    }

    let fields: Vec<String> = self.fields().iter().map(u32::to_string).collect();
    write!(f, "({})", fields.join(", "))
  }
}
