pub mod commands;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{disasm::DisasmCmd, run::RunCmd};

/// Exit status after a HLT instruction. Halting is the machine's stop signal and is reported as
/// a non-zero status.
pub const HALT_EXIT_CODE: u8 = 1;

/// Exit status after a fault or a failure to load the program.
pub const FAULT_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(
  name = "ls8",
  version,
  about = "Run and inspect LS-8 programs",
  long_about = None,
  args_conflicts_with_subcommands = true,
  subcommand_negates_reqs = true
)]
pub struct Ls8Cli {
  #[clap(subcommand)]
  pub command: Option<Ls8CliCommands>,

  #[clap(flatten)]
  pub run: RunCmd,
}

#[derive(Subcommand)]
pub enum Ls8CliCommands {
  Run(RunCmd),
  Disasm(DisasmCmd),
}

impl Ls8Cli {
  /// Execute the selected command and return the process exit status.
  pub fn run(self) -> Result<u8> {
    let command = self.command.unwrap_or(Ls8CliCommands::Run(self.run));
    match command {
      Ls8CliCommands::Run(cmd) => cmd.run(),
      Ls8CliCommands::Disasm(cmd) => cmd.run(),
    }
  }
}
