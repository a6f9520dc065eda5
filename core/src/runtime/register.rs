use std::fmt;

/// Address the stack pointer starts at. Memory from here up to the end is reserved.
pub const STACK_TOP: u8 = 0xF4;

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// A register stores an 8-bit value used by operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
  R0 = 0,
  R1 = 1,
  R2 = 2,
  R3 = 3,
  R4 = 4,
  R5 = 5,
  R6 = 6,
  R7 = 7,
}

impl Register {
  /// R7 holds the stack pointer.
  pub const SP: Register = Register::R7;
}

impl TryFrom<u8> for Register {
  type Error = &'static str;
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Register::R0),
      1 => Ok(Register::R1),
      2 => Ok(Register::R2),
      3 => Ok(Register::R3),
      4 => Ok(Register::R4),
      5 => Ok(Register::R5),
      6 => Ok(Register::R6),
      7 => Ok(Register::R7),
      _ => Err("register out of bounds"),
    }
  }
}

impl fmt::Display for Register {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "R{}", *self as u8)
  }
}

#[derive(Debug, Clone)]
pub(crate) struct Registers {
  register_space: [u8; REGISTER_COUNT],
}

impl Registers {
  pub(crate) fn new() -> Self {
    let mut register_space = [0; REGISTER_COUNT];
    register_space[Register::SP as usize] = STACK_TOP;
    Self { register_space }
  }

  pub(crate) fn write(&mut self, reg: Register, value: u8) {
    self.register_space[reg as usize] = value;
  }

  pub(crate) fn read(&self, reg: Register) -> u8 {
    self.register_space[reg as usize]
  }

  pub(crate) fn all(&self) -> &[u8] {
    &self.register_space
  }
}

/// Result bits of the most recent compare.
///
/// After a compare exactly one of [`Flags::EQ`], [`Flags::GT`] and [`Flags::LT`] is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u8);

impl Flags {
  pub const EQ: Flags = Flags(0b001);
  pub const GT: Flags = Flags(0b010);
  pub const LT: Flags = Flags(0b100);

  pub fn compare(a: u8, b: u8) -> Self {
    match a.cmp(&b) {
      std::cmp::Ordering::Equal => Flags::EQ,
      std::cmp::Ordering::Greater => Flags::GT,
      std::cmp::Ordering::Less => Flags::LT,
    }
  }

  pub const fn bits(self) -> u8 {
    self.0
  }

  pub const fn contains(self, other: Flags) -> bool {
    self.0 & other.0 == other.0
  }
}
