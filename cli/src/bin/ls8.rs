use clap::Parser;
use ls8_cli::{Ls8Cli, FAULT_EXIT_CODE};
use std::process::ExitCode;

fn main() -> ExitCode {
  match Ls8Cli::parse().run() {
    Ok(code) => ExitCode::from(code),
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::from(FAULT_EXIT_CODE)
    }
  }
}
