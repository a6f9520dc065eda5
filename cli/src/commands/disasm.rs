use anyhow::{Context, Result};
use clap::Parser;
use ls8_core::disassembler::disassemble;
use ls8_core::runtime::Program;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "disasm", about = "List the instructions of an LS-8 program")]
pub struct DisasmCmd {
  /// Program in the `.ls8` text format
  program: PathBuf,
}

impl DisasmCmd {
  pub fn run(&self) -> Result<u8> {
    let program = Program::from_file(&self.program)
      .with_context(|| format!("failed to load {}", self.program.display()))?;

    let mut stdout = std::io::stdout().lock();
    for (addr, decoded) in disassemble(&program) {
      writeln!(stdout, "{addr:02X}: {decoded}")?;
    }
    Ok(0)
  }
}
