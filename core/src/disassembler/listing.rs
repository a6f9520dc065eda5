use std::fmt;

use crate::instruction::{decode, Instruction};
use crate::runtime::{Memory, Program};

/// One entry of a program listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
  Instruction(Instruction),
  /// A byte that does not start a valid instruction.
  Byte(u8),
}

impl fmt::Display for Decoded {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Decoded::Instruction(instruction) => write!(f, "{instruction}"),
      Decoded::Byte(byte) => write!(f, ".byte {byte}"),
    }
  }
}

/// Disassemble the program image, returning each entry with its address.
///
/// The walk advances by the width of each decoded instruction. Undecodable bytes are listed
/// as [`Decoded::Byte`] and the walk resumes at the next address.
pub fn disassemble(program: &Program) -> Vec<(u8, Decoded)> {
  let memory = Memory::with_image(program);
  let mut listing = Vec::new();
  let mut addr = 0usize;
  while addr < program.image().len() {
    let pc = addr as u8;
    match decode(&memory, pc) {
      Ok(instruction) => {
        listing.push((pc, Decoded::Instruction(instruction)));
        addr += instruction.width() as usize;
      }
      Err(err) => {
        tracing::trace!(pc, %err, "listing raw byte");
        listing.push((pc, Decoded::Byte(memory.byte(pc))));
        addr += 1;
      }
    }
  }
  listing
}
