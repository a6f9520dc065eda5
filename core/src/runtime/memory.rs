use thiserror::Error;

use super::Program;

/// Number of addressable memory cells.
pub const MEMORY_SIZE: usize = 256;

#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryErr {
  #[error("memory access out of bounds")]
  OutOfBounds,
}

/// Flat, zero-initialized byte memory addressed by an 8-bit index.
#[derive(Clone)]
pub struct Memory {
  data: [u8; MEMORY_SIZE],
}

impl Memory {
  pub fn new() -> Self {
    Self {
      data: [0; MEMORY_SIZE],
    }
  }

  /// Memory with the program image loaded at address 0.
  pub fn with_image(program: &Program) -> Self {
    let mut memory = Self::new();
    let image = program.image();
    memory.data[..image.len()].copy_from_slice(image);
    memory
  }

  /// Read the byte at `addr`.
  pub fn read(&self, addr: usize) -> Result<u8, MemoryErr> {
    self.data.get(addr).copied().ok_or(MemoryErr::OutOfBounds)
  }

  /// Write `value` at `addr`.
  pub fn write(&mut self, addr: usize, value: u8) -> Result<(), MemoryErr> {
    let cell = self.data.get_mut(addr).ok_or(MemoryErr::OutOfBounds)?;
    *cell = value;
    Ok(())
  }

  /// Get the byte at an 8-bit address, which is always in range.
  pub fn byte(&self, addr: u8) -> u8 {
    self.data[addr as usize]
  }
}

impl std::fmt::Debug for Memory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // Only the non-zero cells are interesting.
    f.debug_map()
      .entries(self.data.iter().enumerate().filter(|(_, v)| **v != 0))
      .finish()
  }
}
