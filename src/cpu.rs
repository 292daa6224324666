/*!
  The execution engine: fetch, decode and execute, one cycle at a time.

  The CPU owns the register file. The process control block and the memory store belong to
  the caller and are borrowed for the length of a cycle. A cycle is

    fetch   → copy the cell at the program counter into the instruction register
    decode  → split whatever the instruction register now holds into fields
    plan    → read every operand and check every address, producing one `Effect`
    commit  → apply the effect and move the program counter

  Only `commit` mutates, so a cycle that fails leaves registers, memory and the program
  counter as they were. The one exception is the instruction register, which a successful
  fetch has already loaded.

  Operand roles, with `ea` the effective address (address field + data offset) and `M[x]`
  the data word stored at `x`:

    RD           reg1 ← M[ea], or reg2 when the address field is 0
    WR, ST       M[ea] ← reg1, or reg2 ← reg1 when the address field is 0
    LW           reg2 ← M[ea], or reg2 ← reg1 when the address field is 0
    MOV          reg3 ← reg1
    ADD SUB MUL  reg3 ← reg1 ∘ reg2 (wrapping)
    DIV          reg3 ← reg1 / reg2 (truncating)
    AND          reg3 ← 1 if reg1 = reg2, else 0
    OR           reg3 ← 1 if reg1 = 1 or reg2 = 1, else 0
    MOVI, LDI    reg2 ← M[ea]
    ADDI MULI    reg2 ← reg2 ∘ M[ea] (wrapping)
    DIVI         reg2 ← reg2 / M[ea]
    SLT          reg3 ← 1 if reg1 < reg2, else 0
    SLTI         reg2 ← 1 if reg1 < M[ea], else 0
    HLT          PC ← instruction count
    JMP          PC ← M[ea]
    BEQ BNE      PC ← M[ea] if reg1 = reg2 (≠ for BNE)
    BEZ BNZ      PC ← M[ea] if reg1 = 0 (≠ 0 for BNZ)
    BGZ BLZ      PC ← M[ea] if reg1 > 0 (< 0 for BLZ)

  `AND` and `OR` are boolean tests, not bitwise operations. Only the move family treats an
  address field of 0 as "use the register operand"; every other opcode resolves it to the
  first cell of the data segment.
*/

use std::fmt::{Display, Formatter};

use crate::address::Address;
use crate::bytecode::{decode_instruction, DataWord, Instruction, Operation, Word};
#[cfg(feature = "trace_computation")]
use crate::bytecode::format_instruction_word;
use crate::config::{EngineConfig, HaltMode, JumpMode};
use crate::error::MachineError;
use crate::memory::MemoryStore;
use crate::process::ProcessControlBlock;
use crate::registers::{RegisterFile, RegisterIndex};

/// The single change an instruction makes. Everything besides `Jump` and `Halt` also
/// advances the program counter by one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Effect {
  None,
  SetRegister { register: RegisterIndex, value: DataWord },
  Store { index: usize, value: DataWord },
  Jump(usize),
  Halt,
}

impl Display for Effect {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Effect::None                         => write!(f, "-"),
      Effect::SetRegister { register, value } => write!(f, "R{} <- {}", register, value),
      Effect::Store { index, value }       => write!(f, "M[{}] <- {}", index, value),
      Effect::Jump(target)                 => write!(f, "PC <- {}", target),
      Effect::Halt                         => write!(f, "halt"),
    }
  }
}

/// A record of one completed cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cycle {
  /// Where the instruction was fetched from.
  pub address     : usize,
  pub word        : Word,
  pub instruction : Instruction,
  pub effect      : Effect,
}

/// Looks up operands by role, failing when the instruction's type has no such field.
struct Operands<'a> {
  instruction : &'a Instruction,
  operation   : Operation,
}

impl<'a> Operands<'a> {
  fn require(&self, field: Option<RegisterIndex>, operand: &'static str)
    -> Result<RegisterIndex, MachineError>
  {
    field.ok_or_else(|| MachineError::MissingOperand {
      operation: self.operation,
      operand,
      kind: self.instruction.kind()
    })
  }

  fn reg1(&self) -> Result<RegisterIndex, MachineError> {
    self.require(self.instruction.reg1(), "reg1")
  }

  fn reg2(&self) -> Result<RegisterIndex, MachineError> {
    self.require(self.instruction.reg2(), "reg2")
  }

  fn reg3(&self) -> Result<RegisterIndex, MachineError> {
    self.require(self.instruction.reg3(), "reg3")
  }
}

fn flag(condition: bool) -> DataWord {
  match condition {
    true  => 1,
    false => 0
  }
}

fn divide(dividend: DataWord, divisor: DataWord) -> Result<DataWord, MachineError> {
  match divisor {
    0 => Err(MachineError::DivisionByZero),
    _ => Ok(dividend.wrapping_div(divisor))
  }
}

#[derive(Clone, Debug)]
pub struct Cpu {
  registers : RegisterFile,
  config    : EngineConfig,
  cycles    : u64,
}

impl Cpu {

  // region Accessors

  pub fn new(config: EngineConfig) -> Cpu {
    Cpu {
      registers : RegisterFile::new(config.instruction_register),
      config,
      cycles    : 0,
    }
  }

  pub fn registers(&self) -> &RegisterFile {
    &self.registers
  }

  pub fn registers_mut(&mut self) -> &mut RegisterFile {
    &mut self.registers
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Number of cycles completed since the last reset.
  pub fn cycles(&self) -> u64 {
    self.cycles
  }

  /// Clears the registers and the cycle count, as the short-term scheduler does before
  /// dispatching a process.
  pub fn reset(&mut self) {
    self.registers.reset();
    self.cycles = 0;
  }

  // endregion

  // region Fetch / decode

  /// Copies the cell at the program counter into the instruction register.
  pub fn fetch(&mut self, pcb: &ProcessControlBlock, memory: &MemoryStore) -> Result<Word, MachineError> {
    let index = pcb.program_counter();
    let cell = memory.read(index)?;
    let word = cell.instruction_word().ok_or_else(|| MachineError::Decode {
      index,
      text: cell.text().to_string()
    })?;
    self.registers.load_instruction(word);
    Ok(word)
  }

  /// Decodes whatever the instruction register currently holds.
  pub fn decode(&self) -> Instruction {
    decode_instruction(self.registers.instruction())
  }

  // endregion

  // region Execute

  /// Resolves the target of a jump or taken branch.
  fn jump_target(&self, address: Address, pcb: &ProcessControlBlock, memory: &MemoryStore)
    -> Result<usize, MachineError>
  {
    let target: i64 = match self.config.jumps {
      JumpMode::Indirect => i64::from(memory.read_word(address.effective(pcb.data_offset()))?),
      JumpMode::Direct   => i64::from(address.field())
    };
    if target < 0 || target as usize >= memory.size() {
      return Err(memory.fault(target));
    }
    Ok(target as usize)
  }

  fn branch(&self, taken: bool, address: Address, pcb: &ProcessControlBlock, memory: &MemoryStore)
    -> Result<Effect, MachineError>
  {
    match taken {
      true  => Ok(Effect::Jump(self.jump_target(address, pcb, memory)?)),
      false => Ok(Effect::None)
    }
  }

  /**
    Reads the operands of `instruction` and works out its effect without changing anything.
    Undefined opcodes plan to `Effect::None`.
  */
  pub fn plan(&self, instruction: &Instruction, pcb: &ProcessControlBlock, memory: &MemoryStore)
    -> Result<Effect, MachineError>
  {
    let operation = match instruction.operation() {
      Some(operation) => operation,
      None            => return Ok(Effect::None)
    };

    let operands = Operands { instruction, operation };
    let r = |register: RegisterIndex| self.registers.get(register);
    let address = instruction.address();
    let effective = address.effective(pcb.data_offset());
    let set = |register: RegisterIndex, value: DataWord| Effect::SetRegister { register, value };

    let effect = match operation {

      // Move family //

      Operation::Rd => {
        let destination = operands.reg1()?;
        let value = match address {
          Address::Register  => r(operands.reg2()?),
          Address::Memory(_) => memory.read_word(effective)?
        };
        set(destination, value)
      }

      Operation::Wr | Operation::St => {
        let value = r(operands.reg1()?);
        match address {
          Address::Register  => set(operands.reg2()?, value),
          Address::Memory(_) => {
            memory.check(effective)?;
            Effect::Store { index: effective, value }
          }
        }
      }

      Operation::Lw => {
        let destination = operands.reg2()?;
        let value = match address {
          Address::Register  => r(operands.reg1()?),
          Address::Memory(_) => memory.read_word(effective)?
        };
        set(destination, value)
      }

      // Register ALU family //

      Operation::Mov => set(operands.reg3()?, r(operands.reg1()?)),

      Operation::Add => set(operands.reg3()?, r(operands.reg1()?).wrapping_add(r(operands.reg2()?))),

      Operation::Sub => set(operands.reg3()?, r(operands.reg1()?).wrapping_sub(r(operands.reg2()?))),

      Operation::Mul => set(operands.reg3()?, r(operands.reg1()?).wrapping_mul(r(operands.reg2()?))),

      Operation::Div => set(operands.reg3()?, divide(r(operands.reg1()?), r(operands.reg2()?))?),

      Operation::And => set(operands.reg3()?, flag(r(operands.reg1()?) == r(operands.reg2()?))),

      Operation::Or => {
        let (a, b) = (r(operands.reg1()?), r(operands.reg2()?));
        set(operands.reg3()?, flag(a == 1 || b == 1))
      }

      Operation::Slt => set(operands.reg3()?, flag(r(operands.reg1()?) < r(operands.reg2()?))),

      // Immediate family, always through memory //

      Operation::Movi | Operation::Ldi => set(operands.reg2()?, memory.read_word(effective)?),

      Operation::Addi => {
        let destination = operands.reg2()?;
        set(destination, r(destination).wrapping_add(memory.read_word(effective)?))
      }

      Operation::Muli => {
        let destination = operands.reg2()?;
        set(destination, r(destination).wrapping_mul(memory.read_word(effective)?))
      }

      Operation::Divi => {
        let destination = operands.reg2()?;
        set(destination, divide(r(destination), memory.read_word(effective)?)?)
      }

      Operation::Slti => {
        let destination = operands.reg2()?;
        set(destination, flag(r(operands.reg1()?) < memory.read_word(effective)?))
      }

      // Control family //

      Operation::Hlt => match self.config.halt {
        HaltMode::Terminate => Effect::Halt,
        HaltMode::Legacy    => Effect::None
      },

      Operation::Nop => Effect::None,

      Operation::Jmp => Effect::Jump(self.jump_target(address, pcb, memory)?),

      Operation::Beq => self.branch(r(operands.reg1()?) == r(operands.reg2()?), address, pcb, memory)?,

      Operation::Bne => self.branch(r(operands.reg1()?) != r(operands.reg2()?), address, pcb, memory)?,

      Operation::Bez => self.branch(r(operands.reg1()?) == 0, address, pcb, memory)?,

      Operation::Bnz => self.branch(r(operands.reg1()?) != 0, address, pcb, memory)?,

      Operation::Bgz => self.branch(r(operands.reg1()?) > 0, address, pcb, memory)?,

      Operation::Blz => self.branch(r(operands.reg1()?) < 0, address, pcb, memory)?,

    };

    Ok(effect)
  }

  /// Applies a planned effect. `fetched_from` is the address of the instruction, so the
  /// program counter can move past it.
  fn commit(
    &mut self,
    effect: Effect,
    fetched_from: usize,
    pcb: &mut ProcessControlBlock,
    memory: &mut MemoryStore
  ) -> Result<(), MachineError> {
    match effect {
      Effect::Jump(target) => pcb.set_program_counter(target),
      Effect::Halt         => pcb.halt(),
      Effect::None         => pcb.set_program_counter(fetched_from + 1),
      Effect::SetRegister { register, value } => {
        self.registers.set(register, value);
        pcb.set_program_counter(fetched_from + 1);
      }
      Effect::Store { index, value } => {
        memory.write(index, value)?;
        pcb.set_program_counter(fetched_from + 1);
      }
    }
    Ok(())
  }

  /// Executes an already decoded instruction as if it had been fetched from the current
  /// program counter.
  pub fn execute(
    &mut self,
    instruction: &Instruction,
    pcb: &mut ProcessControlBlock,
    memory: &mut MemoryStore
  ) -> Result<Effect, MachineError> {
    let effect = self.plan(instruction, pcb, memory)?;
    let fetched_from = pcb.program_counter();
    self.commit(effect, fetched_from, pcb, memory)?;
    Ok(effect)
  }

  /// Runs one fetch-decode-execute cycle at the current program counter.
  pub fn run_cycle(&mut self, pcb: &mut ProcessControlBlock, memory: &mut MemoryStore)
    -> Result<Cycle, MachineError>
  {
    let address = pcb.program_counter();
    let word = self.fetch(pcb, memory)?;
    let instruction = self.decode();
    let effect = self.execute(&instruction, pcb, memory)?;
    self.cycles += 1;

    #[cfg(feature = "trace_computation")]
    println!(
      "[{:>4}] {}  {:<24} {}",
      address, format_instruction_word(word), instruction.to_string(), effect
    );

    Ok(Cycle { address, word, instruction, effect })
  }

  // endregion

}
