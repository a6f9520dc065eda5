use strum_macros::{Display, EnumIter};

/// An LS-8 opcode.
///
/// The opcode byte is laid out as `AABCDDDD`:
/// - `AA` is the number of operands following the opcode (0-2),
/// - `B` is set for instructions handled by the ALU,
/// - `C` is set for instructions that set the PC themselves,
/// - `DDDD` identifies the instruction within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum Opcode {
  Hlt = 0b0000_0001,
  Ret = 0b0001_0001,
  Push = 0b0100_0101,
  Pop = 0b0100_0110,
  Prn = 0b0100_0111,
  Call = 0b0101_0000,
  Jmp = 0b0101_0100,
  Jeq = 0b0101_0101,
  Jne = 0b0101_0110,
  Ldi = 0b1000_0010,
  Add = 0b1010_0000,
  Mul = 0b1010_0010,
  Cmp = 0b1010_0111,
  And = 0b1010_1000,
  Or = 0b1010_1010,
  Xor = 0b1010_1011,
}

const ALU_BIT: u8 = 0b0010_0000;
const SETS_PC_BIT: u8 = 0b0001_0000;

impl Opcode {
  /// Number of operand bytes following the opcode.
  pub const fn operand_count(self) -> u8 {
    self as u8 >> 6
  }

  /// Size of the whole instruction in bytes.
  pub const fn width(self) -> u8 {
    1 + self.operand_count()
  }

  pub const fn is_alu(self) -> bool {
    self as u8 & ALU_BIT != 0
  }

  pub const fn sets_pc(self) -> bool {
    self as u8 & SETS_PC_BIT != 0
  }
}

impl From<Opcode> for u8 {
  fn from(opcode: Opcode) -> u8 {
    opcode as u8
  }
}

impl TryFrom<u8> for Opcode {
  /// The unrecognized byte.
  type Error = u8;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0x01 => Ok(Opcode::Hlt),
      0x11 => Ok(Opcode::Ret),
      0x45 => Ok(Opcode::Push),
      0x46 => Ok(Opcode::Pop),
      0x47 => Ok(Opcode::Prn),
      0x50 => Ok(Opcode::Call),
      0x54 => Ok(Opcode::Jmp),
      0x55 => Ok(Opcode::Jeq),
      0x56 => Ok(Opcode::Jne),
      0x82 => Ok(Opcode::Ldi),
      0xA0 => Ok(Opcode::Add),
      0xA2 => Ok(Opcode::Mul),
      0xA7 => Ok(Opcode::Cmp),
      0xA8 => Ok(Opcode::And),
      0xAA => Ok(Opcode::Or),
      0xAB => Ok(Opcode::Xor),
      other => Err(other),
    }
  }
}
