use super::{Flags, Memory, Program, Registers};

/// Holds data describing the current state of a program's execution.
#[derive(Debug, Clone)]
pub struct ExecutionState {
  /// The global clock keeps track of how many instructions have been executed.
  pub global_clk: u64,

  /// The program counter.
  pub pc: u8,

  /// The memory which instructions operate over.
  pub memory: Memory,

  pub(crate) regs: Registers,

  /// Result of the last compare.
  pub flags: Flags,

  /// Set once a HLT instruction has executed.
  pub halted: bool,
}

impl ExecutionState {
  pub fn new(program: &Program) -> Self {
    Self {
      global_clk: 0,
      pc: 0,
      memory: Memory::with_image(program),
      regs: Registers::new(),
      flags: Flags::default(),
      halted: false,
    }
  }
}
