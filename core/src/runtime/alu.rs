use strum_macros::{Display, EnumIter};

use super::{ExecutionError, Flags, Opcode};

/// Two-operand operations carried out by the ALU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum AluOp {
  Add,
  Mul,
  Cmp,
  And,
  Or,
  Xor,
}

impl AluOp {
  pub const fn opcode(self) -> Opcode {
    match self {
      AluOp::Add => Opcode::Add,
      AluOp::Mul => Opcode::Mul,
      AluOp::Cmp => Opcode::Cmp,
      AluOp::And => Opcode::And,
      AluOp::Or => Opcode::Or,
      AluOp::Xor => Opcode::Xor,
    }
  }
}

impl TryFrom<u8> for AluOp {
  type Error = ExecutionError;

  fn try_from(tag: u8) -> Result<Self, Self::Error> {
    match Opcode::try_from(tag) {
      Ok(Opcode::Add) => Ok(AluOp::Add),
      Ok(Opcode::Mul) => Ok(AluOp::Mul),
      Ok(Opcode::Cmp) => Ok(AluOp::Cmp),
      Ok(Opcode::And) => Ok(AluOp::And),
      Ok(Opcode::Or) => Ok(AluOp::Or),
      Ok(Opcode::Xor) => Ok(AluOp::Xor),
      _ => Err(ExecutionError::UnsupportedOperation(tag)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
  /// New value of the first operand register.
  pub value: u8,
  /// New flags, if the operation sets them.
  pub flags: Option<Flags>,
}

/// Apply `op` to `a` and `b`. Arithmetic wraps modulo 256.
pub fn apply(op: AluOp, a: u8, b: u8) -> AluResult {
  let value = match op {
    AluOp::Add => a.wrapping_add(b),
    AluOp::Mul => a.wrapping_mul(b),
    AluOp::And => a & b,
    AluOp::Or => a | b,
    AluOp::Xor => a ^ b,
    AluOp::Cmp => {
      return AluResult {
        value: a,
        flags: Some(Flags::compare(a, b)),
      }
    }
  };
  AluResult { value, flags: None }
}
