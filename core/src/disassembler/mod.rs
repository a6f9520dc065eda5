mod listing;
mod text;

pub use listing::*;

use std::{fs, path::Path};

use crate::runtime::{Program, ProgramError};

impl Program {
  /// Parse a program in the `.ls8` text format: one byte per line written as 8 binary digits.
  ///
  /// Lines that do not start with a binary digit (comments, blank lines) are skipped. Anything
  /// after the first 8 characters of a line is ignored.
  pub fn from_text(text: &str) -> Result<Self, ProgramError> {
    Program::new(text::parse_image(text)?)
  }

  /// Load a `.ls8` program from a file path.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
    let text = fs::read_to_string(path)?;
    Program::from_text(&text)
  }
}
