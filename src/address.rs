//! An `Either` type that says whether the address field of an instruction names a register
//! operand or a memory operand, with some convenience functions.
//!
//! The instruction format has no separate addressing-mode bit. Instead an address field of
//! zero means "use the register operand", so zero cannot name the first cell of the data
//! segment. The ambiguity is decoded once, here, instead of being re-tested by every opcode.

use std::fmt::{Display, Formatter};

// `AddressNumberType` is `u32`, the widest address field any instruction type carries.
pub type AddressNumberType = u32;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Address {
  /// The field was zero: the move family uses its alternate register operand.
  Register,
  /// An offset into the data segment. Never zero.
  Memory(AddressNumberType)
}

impl Address {
  /// Classifies a raw address field.
  pub fn from_field(field: AddressNumberType) -> Address {
    match field {
      0 => Address::Register,
      offset => Address::Memory(offset)
    }
  }

  /// The raw field value, the inverse of `from_field`.
  pub fn field(&self) -> AddressNumberType {
    match self {
      Address::Register       => 0,
      Address::Memory(offset) => *offset
    }
  }

  /// The index into the memory store this field names when it is used as a data address.
  /// Opcodes outside the move family use this even for `Address::Register`, which then
  /// resolves to the first cell of the data segment.
  pub fn effective(&self, data_offset: usize) -> usize {
    data_offset + self.field() as usize
  }

  pub fn is_register(&self) -> bool {
    match self {
      Address::Register => true,
      _ => false
    }
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.field())
  }
}
