use std::fmt;

use crate::runtime::{AluOp, BranchOp, ExecutionError, Memory, Opcode, Register};

/// Instruction set of the LS-8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
  Hlt,                             // Halt
  Ret,                             // Return from subroutine
  Push(Register),                  // Push register onto the stack
  Pop(Register),                   // Pop stack top into register
  Prn(Register),                   // Print register as decimal
  Branch(BranchOp, Register),      // CALL, JMP, JEQ, JNE to address in register
  Ldi(Register, u8),               // Load immediate
  Alu(AluOp, Register, Register), // ADD, MUL, CMP, AND, OR, XOR
}

impl Instruction {
  pub fn opcode(&self) -> Opcode {
    match self {
      Instruction::Hlt => Opcode::Hlt,
      Instruction::Ret => Opcode::Ret,
      Instruction::Push(_) => Opcode::Push,
      Instruction::Pop(_) => Opcode::Pop,
      Instruction::Prn(_) => Opcode::Prn,
      Instruction::Branch(op, _) => op.opcode(),
      Instruction::Ldi(..) => Opcode::Ldi,
      Instruction::Alu(op, ..) => op.opcode(),
    }
  }

  /// Size of the encoded instruction in bytes.
  pub fn width(&self) -> u8 {
    self.opcode().width()
  }

  /// Encode the instruction into its memory representation.
  pub fn encode(&self) -> Vec<u8> {
    let mut bytes = vec![self.opcode() as u8];
    match *self {
      Instruction::Hlt | Instruction::Ret => {}
      Instruction::Push(r)
      | Instruction::Pop(r)
      | Instruction::Prn(r)
      | Instruction::Branch(_, r) => bytes.push(r as u8),
      Instruction::Ldi(r, imm) => bytes.extend([r as u8, imm]),
      Instruction::Alu(_, a, b) => bytes.extend([a as u8, b as u8]),
    }
    bytes
  }
}

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Instruction::Hlt | Instruction::Ret => write!(f, "{}", self.opcode()),
      Instruction::Push(r) | Instruction::Pop(r) | Instruction::Prn(r) => {
        write!(f, "{} {r}", self.opcode())
      }
      Instruction::Branch(op, r) => write!(f, "{op} {r}"),
      Instruction::Ldi(r, imm) => write!(f, "LDI {r},{imm}"),
      Instruction::Alu(op, a, b) => write!(f, "{op} {a},{b}"),
    }
  }
}

/// Decode the instruction stored at `pc`.
///
/// Operands are fetched from the cells following the opcode; the opcode's operand count decides
/// how many. Fetching past the end of memory is an error rather than wrapping around.
pub fn decode(memory: &Memory, pc: u8) -> Result<Instruction, ExecutionError> {
  let byte = memory.byte(pc);
  let opcode =
    Opcode::try_from(byte).map_err(|opcode| ExecutionError::UnknownOpcode { pc, opcode })?;

  let operand = |offset: usize| -> Result<u8, ExecutionError> {
    let addr = pc as usize + offset;
    memory
      .read(addr)
      .map_err(|err| ExecutionError::InvalidMemoryAccess { pc, addr, err })
  };
  let register = |offset: usize| -> Result<Register, ExecutionError> {
    let index = operand(offset)?;
    Register::try_from(index).map_err(|_| ExecutionError::InvalidRegister { pc, index })
  };

  let instruction = match opcode {
    Opcode::Hlt => Instruction::Hlt,
    Opcode::Ret => Instruction::Ret,
    Opcode::Push => Instruction::Push(register(1)?),
    Opcode::Pop => Instruction::Pop(register(1)?),
    Opcode::Prn => Instruction::Prn(register(1)?),
    Opcode::Ldi => Instruction::Ldi(register(1)?, operand(2)?),
    op if op.is_alu() => Instruction::Alu(AluOp::try_from(byte)?, register(1)?, register(2)?),
    _ => Instruction::Branch(BranchOp::try_from(byte)?, register(1)?),
  };
  debug_assert_eq!(opcode.width(), instruction.width());
  Ok(instruction)
}
