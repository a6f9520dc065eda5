use thiserror::Error;

use super::MEMORY_SIZE;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProgramError {
  #[error("program is {0} bytes long, memory holds {MEMORY_SIZE}")]
  TooLarge(usize),
  #[error("line {line}: not a binary byte: {text:?}")]
  InvalidByte { line: usize, text: String },
  #[error("failed to read program")]
  Io(#[from] std::io::Error),
}

/// A program that can be executed by the VM.
///
/// The image is copied into memory starting at address 0, so it is never longer than the memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
  image: Vec<u8>,
}

impl Program {
  pub fn new(image: Vec<u8>) -> Result<Self, ProgramError> {
    if image.len() > MEMORY_SIZE {
      return Err(ProgramError::TooLarge(image.len()));
    }
    Ok(Self { image })
  }

  /// The initial memory image.
  pub fn image(&self) -> &[u8] {
    &self.image
  }
}
