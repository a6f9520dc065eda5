use strum_macros::{Display, EnumIter};

use super::{ExecutionError, Flags, Opcode, Register, Runtime};

/// Instructions that redirect the program counter to the address held in a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum BranchOp {
  Call,
  Jmp,
  Jeq,
  Jne,
}

impl BranchOp {
  pub const fn opcode(self) -> Opcode {
    match self {
      BranchOp::Call => Opcode::Call,
      BranchOp::Jmp => Opcode::Jmp,
      BranchOp::Jeq => Opcode::Jeq,
      BranchOp::Jne => Opcode::Jne,
    }
  }
}

impl TryFrom<u8> for BranchOp {
  type Error = ExecutionError;

  fn try_from(tag: u8) -> Result<Self, Self::Error> {
    match Opcode::try_from(tag) {
      Ok(Opcode::Call) => Ok(BranchOp::Call),
      Ok(Opcode::Jmp) => Ok(BranchOp::Jmp),
      Ok(Opcode::Jeq) => Ok(BranchOp::Jeq),
      Ok(Opcode::Jne) => Ok(BranchOp::Jne),
      _ => Err(ExecutionError::UnsupportedRegisterOperation(tag)),
    }
  }
}

impl Runtime<'_> {
  fn decrement_sp(&mut self) -> Result<u8, ExecutionError> {
    let pc = self.state.pc;
    let sp = self
      .rr(Register::SP)
      .checked_sub(1)
      .ok_or(ExecutionError::StackOverflow { pc })?;
    self.rw(Register::SP, sp);
    Ok(sp)
  }

  fn increment_sp(&mut self) -> Result<(), ExecutionError> {
    let pc = self.state.pc;
    let sp = self
      .rr(Register::SP)
      .checked_add(1)
      .ok_or(ExecutionError::StackUnderflow { pc })?;
    self.rw(Register::SP, sp);
    Ok(())
  }

  /// Push `value` onto the stack. The stack grows downward from [`super::STACK_TOP`].
  pub(crate) fn push_value(&mut self, value: u8) -> Result<(), ExecutionError> {
    let sp = self.decrement_sp()?;
    self.mw(sp as usize, value)
  }

  /// Push the content of `register`. The register is read after SP is decremented, so
  /// `PUSH R7` stores the new stack pointer.
  pub(crate) fn push_register(&mut self, register: Register) -> Result<(), ExecutionError> {
    let sp = self.decrement_sp()?;
    let value = self.rr(register);
    self.mw(sp as usize, value)
  }

  /// Pop the value on top of the stack.
  pub(crate) fn pop(&mut self) -> Result<u8, ExecutionError> {
    let value = self.mr(self.rr(Register::SP) as usize)?;
    self.increment_sp()?;
    Ok(value)
  }

  /// Pop the top of the stack into `register`. The register is written before SP is
  /// incremented, so `POP R7` leaves SP one past the popped value.
  pub(crate) fn pop_register(&mut self, register: Register) -> Result<(), ExecutionError> {
    let value = self.mr(self.rr(Register::SP) as usize)?;
    self.rw(register, value);
    self.increment_sp()
  }

  /// Execute a branch, returning the new PC. `next_pc` is the address of the following
  /// instruction, used when the branch is not taken and as the return address of a call.
  pub(crate) fn branch(
    &mut self,
    op: BranchOp,
    target: Register,
    next_pc: u8,
  ) -> Result<u8, ExecutionError> {
    let address = self.rr(target);
    let taken = match op {
      BranchOp::Call => {
        self.push_value(next_pc)?;
        true
      }
      BranchOp::Jmp => true,
      BranchOp::Jeq => self.state.flags.contains(Flags::EQ),
      BranchOp::Jne => !self.state.flags.contains(Flags::EQ),
    };
    tracing::debug!(pc = self.state.pc, %op, address, taken, "branch");
    Ok(if taken { address } else { next_pc })
  }
}
