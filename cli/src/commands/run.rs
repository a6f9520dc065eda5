use anstyle::*;
use anyhow::{Context, Result};
use clap::Parser;
use ls8_core::runtime::{Program, Runtime};
use ls8_core::utils::{setup_logger, with_max_cycles, with_trace, Ls8CoreOpts};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

use crate::{
  util::{elapsed, write_status},
  HALT_EXIT_CODE,
};

#[derive(Parser)]
#[command(name = "run", about = "(default) Load and execute an LS-8 program")]
pub struct RunCmd {
  /// Program in the `.ls8` text format
  #[clap(value_parser, required = true)]
  program: Option<PathBuf>,

  /// Print the PC, upcoming bytes and registers before every instruction
  #[clap(long, action)]
  trace: bool,

  /// Stop with an error after executing this many instructions
  #[clap(long, env = "LS8_MAX_CYCLES")]
  max_cycles: Option<u64>,

  #[clap(long, action)]
  verbose: bool,
}

impl RunCmd {
  pub fn run(&self) -> Result<u8> {
    if self.verbose && env::var("RUST_LOG").is_err() {
      env::set_var("RUST_LOG", "debug");
    }
    setup_logger();

    let path = self.program.as_ref().context("no program given")?;
    let program = Program::from_file(path)
      .with_context(|| format!("failed to load {}", path.display()))?;
    let opts = Ls8CoreOpts::default()
      .with_options(self.max_cycles.map(with_max_cycles))
      .with_options([with_trace(self.trace)]);

    let start_time = Instant::now();
    let mut runtime = Runtime::new(&program, opts, None);
    let halt = runtime
      .execute()
      .with_context(|| format!("failed to execute {}", path.display()))?;
    tracing::info!(cycles = halt.cycles, "program halted");

    if self.verbose {
      let green = AnsiColor::Green.on_default().effects(Effects::BOLD);
      write_status(
        &green,
        "Finished",
        format!(
          "{} instructions in {}",
          halt.cycles,
          elapsed(start_time.elapsed())
        )
        .as_str(),
      );
    }

    Ok(HALT_EXIT_CODE)
  }
}
