pub mod alu;
mod control;
mod memory;
mod opcode;
mod program;
mod register;
mod state;

pub use alu::{AluOp, AluResult};
pub use control::BranchOp;
pub use memory::*;
pub use opcode::*;
pub use program::*;
pub use register::*;
pub use state::*;

use std::io::Write;

use thiserror::Error;

use crate::instruction::{decode, Instruction};
use crate::utils::Ls8CoreOpts;

/// Notice written to the output when a HLT instruction executes.
pub const HALT_MESSAGE: &str = "System exiting...";

/// An implementation of a runtime for the LS-8 VM.
///
/// The runtime owns the whole machine state and executes a program loaded at address 0 until it
/// halts or faults.
pub struct Runtime<'out> {
  /// The state of the execution.
  pub state: ExecutionState,

  /// Sink for PRN and the halt notice. Standard output when `None`.
  output: Option<&'out mut dyn Write>,

  /// Print a trace line to stderr before every instruction.
  trace: bool,

  /// Fail with [`ExecutionError::OutOfCycles`] after this many instructions.
  max_cycles: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
  Halted,
}

/// A completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halt {
  /// Number of executed instructions, HLT included.
  pub cycles: u64,
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
  #[error("unsupported ALU operation {0}")]
  UnsupportedOperation(u8),
  #[error("unsupported register operation {0}")]
  UnsupportedRegisterOperation(u8),
  #[error("unknown instruction {opcode} at address {pc}")]
  UnknownOpcode { pc: u8, opcode: u8 },
  #[error("invalid register {index} for instruction at address {pc}")]
  InvalidRegister { pc: u8, index: u8 },
  #[error("invalid memory access ({err}) at address {addr} for instruction at address {pc}")]
  InvalidMemoryAccess { pc: u8, addr: usize, err: MemoryErr },
  #[error("stack overflow at address {pc}")]
  StackOverflow { pc: u8 },
  #[error("stack underflow at address {pc}")]
  StackUnderflow { pc: u8 },
  #[error("failed to write output: {0}")]
  Output(std::io::ErrorKind),
  #[error("cycle limit of {0} reached")]
  OutOfCycles(u64),
}

impl<'out> Runtime<'out> {
  /// Create a new runtime with `program` loaded into memory.
  pub fn new(program: &Program, opts: Ls8CoreOpts, output: Option<&'out mut dyn Write>) -> Self {
    Self {
      state: ExecutionState::new(program),
      output,
      trace: opts.trace(),
      max_cycles: opts.max_cycles(),
    }
  }

  pub fn registers(&self) -> &[u8] {
    self.state.regs.all()
  }

  /// Get the current value of a register.
  pub fn register(&self, register: Register) -> u8 {
    self.rr(register)
  }

  /// Get the current value of a byte.
  pub fn byte(&self, addr: u8) -> u8 {
    self.state.memory.byte(addr)
  }

  /// Read a byte from memory.
  pub fn mr(&self, addr: usize) -> Result<u8, ExecutionError> {
    self
      .state
      .memory
      .read(addr)
      .map_err(|err| ExecutionError::InvalidMemoryAccess {
        pc: self.state.pc,
        addr,
        err,
      })
  }

  /// Write a byte to memory.
  pub fn mw(&mut self, addr: usize, value: u8) -> Result<(), ExecutionError> {
    let pc = self.state.pc;
    self
      .state
      .memory
      .write(addr, value)
      .map_err(|err| ExecutionError::InvalidMemoryAccess { pc, addr, err })
  }

  /// Read from a register.
  pub fn rr(&self, register: Register) -> u8 {
    self.state.regs.read(register)
  }

  /// Write to a register.
  pub fn rw(&mut self, register: Register, value: u8) {
    self.state.regs.write(register, value)
  }

  fn write_line(&mut self, line: std::fmt::Arguments) -> Result<(), ExecutionError> {
    let result = match self.output.as_deref_mut() {
      Some(out) => writeln!(out, "{line}"),
      None => writeln!(std::io::stdout().lock(), "{line}"),
    };
    result.map_err(|e| ExecutionError::Output(e.kind()))
  }

  /// Execute the instruction and move the PC past it, unless the instruction redirected it.
  fn execute_instruction(&mut self, instruction: Instruction) -> Result<Option<Event>, ExecutionError> {
    self.trace_execution(instruction);

    let mut next_pc = self.state.pc.wrapping_add(instruction.width());

    match instruction {
      Instruction::Hlt => {
        tracing::debug!(pc = self.state.pc, "HALT");
        self.write_line(format_args!("{HALT_MESSAGE}"))?;
        self.state.halted = true;
        self.state.global_clk += 1;
        return Ok(Some(Event::Halted));
      }

      Instruction::Ldi(rd, imm) => {
        self.rw(rd, imm);
      }

      Instruction::Prn(rs) => {
        let value = self.rr(rs);
        self.write_line(format_args!("{value}"))?;
      }

      Instruction::Push(rs) => {
        self.push_register(rs)?;
      }

      Instruction::Pop(rd) => {
        self.pop_register(rd)?;
      }

      Instruction::Alu(op, ra, rb) => {
        let result = alu::apply(op, self.rr(ra), self.rr(rb));
        self.rw(ra, result.value);
        if let Some(flags) = result.flags {
          self.state.flags = flags;
        }
      }

      Instruction::Branch(op, target) => {
        next_pc = self.branch(op, target, next_pc)?;
      }

      Instruction::Ret => {
        next_pc = self.pop()?;
      }
    }
    self.state.pc = next_pc;
    self.state.global_clk += 1;

    Ok(None)
  }

  /// Fetch, decode and execute a single instruction.
  pub fn execute_cycle(&mut self) -> Result<Option<Event>, ExecutionError> {
    if self.state.halted {
      return Ok(Some(Event::Halted));
    }

    // Checked before fetching, so a limit of n runs at most n instructions.
    if let Some(max_cycles) = self.max_cycles {
      if self.state.global_clk >= max_cycles {
        return Err(ExecutionError::OutOfCycles(max_cycles));
      }
    }

    let instruction = decode(&self.state.memory, self.state.pc)?;
    self.execute_instruction(instruction)
  }

  /// Execute the program until it halts or faults.
  pub fn execute(&mut self) -> Result<Halt, ExecutionError> {
    tracing::info!("starting execution");
    // Loop until program finishes execution or until an error occurs, whichever comes first
    loop {
      match self.execute_cycle() {
        Ok(Some(Event::Halted)) => break,
        Ok(None) => {}
        Err(err) => {
          tracing::error!(pc = self.state.pc, %err, "execution fault");
          return Err(err);
        }
      }
    }
    tracing::info!(
      global_clk = self.state.global_clk,
      pc = self.state.pc,
      "execution finished"
    );

    Ok(Halt {
      cycles: self.state.global_clk,
    })
  }

  /// Current PC, the three bytes at PC and all registers, in hex.
  pub fn trace_line(&self) -> String {
    let pc = self.state.pc;
    let registers: String = self
      .registers()
      .iter()
      .map(|value| format!(" {value:02X}"))
      .collect();
    format!(
      "TRACE: {:02X} | {:02X} {:02X} {:02X} |{}",
      pc,
      self.byte(pc),
      self.byte(pc.wrapping_add(1)),
      self.byte(pc.wrapping_add(2)),
      registers
    )
  }

  fn trace_execution(&self, instruction: Instruction) {
    if self.trace {
      eprintln!("{}", self.trace_line());
    }

    tracing::trace!(
      global_clk = self.state.global_clk,
      pc = format_args!("0x{:02x}", self.state.pc),
      %instruction,
      registers = ?self.registers(),
      flags = self.state.flags.bits(),
    );
  }
}

#[cfg(test)]
pub mod tests {
  use super::*;
  use crate::utils::{with_max_cycles, with_trace};

  pub(crate) fn setup_logger() {
    let _ = tracing_subscriber::fmt()
      .with_test_writer()
      .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
      .try_init();
  }

  fn assemble(instructions: &[Instruction]) -> Vec<u8> {
    instructions.iter().flat_map(Instruction::encode).collect()
  }

  fn run_with(
    image: Vec<u8>,
    opts: Ls8CoreOpts,
  ) -> (Result<Halt, ExecutionError>, ExecutionState, String) {
    let program = Program::new(image).unwrap();
    let mut out = Vec::new();
    let mut runtime = Runtime::new(&program, opts, Some(&mut out));
    let result = runtime.execute();
    let state = runtime.state.clone();
    (result, state, String::from_utf8(out).unwrap())
  }

  fn run(image: Vec<u8>) -> (Result<Halt, ExecutionError>, ExecutionState, String) {
    run_with(image, Ls8CoreOpts::default())
  }

  fn simple_op_test(op: AluOp, expected: u8, a: u8, b: u8) {
    let image = assemble(&[
      Instruction::Ldi(Register::R0, a),
      Instruction::Ldi(Register::R1, b),
      Instruction::Alu(op, Register::R0, Register::R1),
      Instruction::Hlt,
    ]);
    let (result, state, _) = run(image);
    result.unwrap();
    assert_eq!(expected, state.regs.read(Register::R0), "{op} {a} {b}");
    assert_eq!(b, state.regs.read(Register::R1));
  }

  #[test]
  fn test_print_sum() {
    setup_logger();
    let image = vec![130, 0, 8, 130, 1, 9, 160, 0, 1, 71, 0, 1];
    let (result, state, output) = run(image);
    assert_eq!(Ok(Halt { cycles: 5 }), result);
    assert_eq!("17\nSystem exiting...\n", output);
    assert!(state.halted);
    assert_eq!(11, state.pc);
  }

  #[test]
  fn test_ldi() {
    let (result, state, _) = run(vec![130, 3, 200, 1]);
    result.unwrap();
    assert_eq!(200, state.regs.read(Register::R3));
  }

  #[test]
  fn alu_tests() {
    simple_op_test(AluOp::Add, 17, 8, 9);
    simple_op_test(AluOp::Add, 4, 250, 10);
    simple_op_test(AluOp::Mul, 72, 8, 9);
    simple_op_test(AluOp::Mul, 0, 128, 2);
    simple_op_test(AluOp::And, 0b0100, 0b0110, 0b1100);
    simple_op_test(AluOp::Or, 0b1110, 0b0110, 0b1100);
    simple_op_test(AluOp::Xor, 0b1010, 0b0110, 0b1100);
    simple_op_test(AluOp::Cmp, 5, 5, 5);
  }

  #[test]
  fn alu_instructions_advance_pc_by_three() {
    for op in [AluOp::Add, AluOp::Mul, AluOp::Cmp, AluOp::And, AluOp::Or, AluOp::Xor] {
      let program = Program::new(assemble(&[Instruction::Alu(op, Register::R2, Register::R3)])).unwrap();
      let mut runtime = Runtime::new(&program, Ls8CoreOpts::default(), None);
      runtime.rw(Register::R2, 250);
      runtime.rw(Register::R3, 10);
      assert_eq!(Ok(None), runtime.execute_cycle());
      assert_eq!(3, runtime.state.pc, "{op}");
    }
  }

  #[test]
  fn cmp_sets_flags() {
    for (a, b, expected) in [(5, 5, 1), (7, 3, 2), (2, 9, 4)] {
      let image = assemble(&[
        Instruction::Ldi(Register::R0, a),
        Instruction::Ldi(Register::R1, b),
        Instruction::Alu(AluOp::Cmp, Register::R0, Register::R1),
        Instruction::Hlt,
      ]);
      let (_, state, _) = run(image);
      assert_eq!(expected, state.flags.bits());
      assert_eq!(a, state.regs.read(Register::R0));
    }
  }

  #[test]
  fn jeq_without_compare_falls_through() {
    // 0: LDI R0,7 / 3: JEQ R0 / 5: PRN R1 / 7: HLT
    let image = assemble(&[
      Instruction::Ldi(Register::R0, 7),
      Instruction::Branch(BranchOp::Jeq, Register::R0),
      Instruction::Prn(Register::R1),
      Instruction::Hlt,
    ]);
    let (result, _, output) = run(image);
    result.unwrap();
    assert_eq!("0\nSystem exiting...\n", output);
  }

  #[test]
  fn jne_without_compare_jumps() {
    // 0: LDI R0,7 / 3: JNE R0 / 5: PRN R1 / 7: HLT
    let image = assemble(&[
      Instruction::Ldi(Register::R0, 7),
      Instruction::Branch(BranchOp::Jne, Register::R0),
      Instruction::Prn(Register::R1),
      Instruction::Hlt,
    ]);
    let (result, _, output) = run(image);
    result.unwrap();
    assert_eq!("System exiting...\n", output);
  }

  #[test]
  fn push_pop_round_trip() {
    let image = assemble(&[
      Instruction::Ldi(Register::R2, 42),
      Instruction::Push(Register::R2),
      Instruction::Pop(Register::R3),
      Instruction::Hlt,
    ]);
    let (result, state, _) = run(image);
    result.unwrap();
    assert_eq!(42, state.regs.read(Register::R3));
    assert_eq!(STACK_TOP, state.regs.read(Register::SP));
  }

  #[test]
  fn call_ret_round_trip() {
    // 0: LDI R0,6 / 3: CALL R0 / 5: HLT / 6: LDI R1,1 / 9: RET
    let image = assemble(&[
      Instruction::Ldi(Register::R0, 6),
      Instruction::Branch(BranchOp::Call, Register::R0),
      Instruction::Hlt,
      Instruction::Ldi(Register::R1, 1),
      Instruction::Ret,
    ]);
    let program = Program::new(image).unwrap();
    let mut runtime = Runtime::new(&program, Ls8CoreOpts::default(), None);

    runtime.execute_cycle().unwrap();
    runtime.execute_cycle().unwrap();
    assert_eq!(6, runtime.state.pc);
    assert_eq!(STACK_TOP - 1, runtime.register(Register::SP));
    assert_eq!(5, runtime.byte(STACK_TOP - 1));

    runtime.execute_cycle().unwrap();
    runtime.execute_cycle().unwrap();
    assert_eq!(5, runtime.state.pc);
    assert_eq!(STACK_TOP, runtime.register(Register::SP));
    assert_eq!(1, runtime.register(Register::R1));
  }

  #[test]
  fn unknown_opcode_stops_immediately() {
    let (result, state, output) = run(vec![255, 71, 0, 1]);
    assert_eq!(
      Err(ExecutionError::UnknownOpcode { pc: 0, opcode: 255 }),
      result
    );
    assert_eq!(
      "unknown instruction 255 at address 0",
      result.unwrap_err().to_string()
    );
    assert_eq!("", output);
    assert_eq!(0, state.global_clk);
  }

  #[test]
  fn unknown_opcode_after_output() {
    // PRN R0 then a stray byte: the output before the fault is kept, nothing after runs
    let (result, state, output) = run(vec![71, 0, 0x99, 1]);
    assert_eq!(
      Err(ExecutionError::UnknownOpcode { pc: 2, opcode: 0x99 }),
      result
    );
    assert_eq!("0\n", output);
    assert_eq!(1, state.global_clk);
  }

  #[test]
  fn pc_wraps_at_end_of_memory() {
    let mut image = vec![0; 256];
    image[0] = 1; // HLT
    image[254] = 71; // PRN R0
    let program = Program::new(image).unwrap();
    let mut out = Vec::new();
    let mut runtime = Runtime::new(&program, Ls8CoreOpts::default(), Some(&mut out));
    runtime.state.pc = 254;
    runtime.rw(Register::R0, 3);
    runtime.execute().unwrap();
    assert_eq!(0, runtime.state.pc);
    assert_eq!("3\nSystem exiting...\n", String::from_utf8(out).unwrap());
  }

  #[test]
  fn stack_overflow_faults() {
    // LDI R7,0 / PUSH R0
    let image = assemble(&[
      Instruction::Ldi(Register::SP, 0),
      Instruction::Push(Register::R0),
    ]);
    let (result, _, _) = run(image);
    assert_eq!(Err(ExecutionError::StackOverflow { pc: 3 }), result);
  }

  #[test]
  fn ret_underflow_faults() {
    let image = assemble(&[Instruction::Ldi(Register::SP, 255), Instruction::Ret]);
    let (result, _, _) = run(image);
    assert_eq!(Err(ExecutionError::StackUnderflow { pc: 3 }), result);
  }

  #[test]
  fn infinite_loop_runs_until_cycle_limit() {
    // 0: LDI R0,3 / 3: JMP R0
    let image = assemble(&[
      Instruction::Ldi(Register::R0, 3),
      Instruction::Branch(BranchOp::Jmp, Register::R0),
    ]);
    let opts = Ls8CoreOpts::default().with_options(vec![with_max_cycles(10_000)]);
    let (result, state, _) = run_with(image, opts);
    assert_eq!(Err(ExecutionError::OutOfCycles(10_000)), result);
    assert_eq!(3, state.pc);
  }

  #[test]
  fn halt_within_cycle_limit() {
    let opts = Ls8CoreOpts::default().with_options(vec![with_max_cycles(1)]);
    let (result, _, _) = run_with(vec![1], opts);
    assert_eq!(Ok(Halt { cycles: 1 }), result);
  }

  #[test]
  fn zero_cycle_limit_executes_nothing() {
    let opts = Ls8CoreOpts::default().with_options([with_max_cycles(0)]);
    let (result, state, output) = run_with(vec![71, 0, 1], opts);
    assert_eq!(Err(ExecutionError::OutOfCycles(0)), result);
    assert_eq!("", output);
    assert_eq!(0, state.global_clk);
    assert_eq!(0, state.pc);
  }

  #[test]
  fn cycle_limit_bounds_executed_instructions() {
    // 0: LDI R0,3 / 3: JMP R0
    let image = assemble(&[
      Instruction::Ldi(Register::R0, 3),
      Instruction::Branch(BranchOp::Jmp, Register::R0),
    ]);
    let opts = Ls8CoreOpts::default().with_options([with_max_cycles(5)]);
    let (result, state, _) = run_with(image, opts);
    assert_eq!(Err(ExecutionError::OutOfCycles(5)), result);
    assert_eq!(5, state.global_clk);
  }

  #[test]
  fn push_pop_stack_pointer() {
    // PUSH R7 stores the decremented SP, POP R7 then increments the popped value
    let image = assemble(&[
      Instruction::Push(Register::SP),
      Instruction::Pop(Register::SP),
      Instruction::Hlt,
    ]);
    let (result, state, _) = run(image);
    result.unwrap();
    assert_eq!(STACK_TOP - 1, state.memory.byte(STACK_TOP - 1));
    assert_eq!(STACK_TOP, state.regs.read(Register::SP));

    let image = assemble(&[
      Instruction::Ldi(Register::R0, 100),
      Instruction::Push(Register::R0),
      Instruction::Pop(Register::SP),
      Instruction::Hlt,
    ]);
    let (result, state, _) = run(image);
    result.unwrap();
    assert_eq!(101, state.regs.read(Register::SP));
  }

  struct BrokenPipe;

  impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
      Err(std::io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn output_failure_faults() {
    let program = Program::new(vec![71, 0, 1]).unwrap();
    let mut sink = BrokenPipe;
    let mut runtime = Runtime::new(&program, Ls8CoreOpts::default(), Some(&mut sink));
    assert_eq!(
      Err(ExecutionError::Output(std::io::ErrorKind::BrokenPipe)),
      runtime.execute()
    );
    assert!(!runtime.state.halted);
  }

  #[test]
  fn traced_run_keeps_output_clean() {
    setup_logger();
    let opts = Ls8CoreOpts::default().with_options([with_trace(true)]);
    let (result, _, output) = run_with(vec![130, 0, 8, 71, 0, 1], opts);
    assert_eq!(Ok(Halt { cycles: 3 }), result);
    assert_eq!("8\nSystem exiting...\n", output);
  }

  #[test]
  fn halted_runtime_stays_halted() {
    let program = Program::new(vec![1]).unwrap();
    let mut out = Vec::new();
    let mut runtime = Runtime::new(&program, Ls8CoreOpts::default(), Some(&mut out));
    runtime.execute().unwrap();
    assert_eq!(Ok(Some(Event::Halted)), runtime.execute_cycle());
    assert_eq!(Ok(Halt { cycles: 1 }), runtime.execute());
    assert_eq!(format!("{HALT_MESSAGE}\n"), String::from_utf8(out).unwrap());
  }

  #[test]
  fn test_trace_line() {
    let program = Program::new(vec![130, 0, 8, 1]).unwrap();
    let mut runtime = Runtime::new(&program, Ls8CoreOpts::default(), None);
    assert_eq!(
      "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4",
      runtime.trace_line()
    );
    runtime.execute_cycle().unwrap();
    assert_eq!(
      "TRACE: 03 | 01 00 00 | 08 00 00 00 00 00 00 F4",
      runtime.trace_line()
    );
  }
}
