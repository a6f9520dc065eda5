//! An emulator for the LS-8, an 8-bit computer with 256 bytes of memory, eight registers and a
//! downward-growing stack.
//!
//! Programs are loaded at address 0 and executed by [`runtime::Runtime`] until a `HLT`
//! instruction or a fault.
#![allow(clippy::new_without_default)]
#![warn(unused_extern_crates)]

pub mod disassembler;
pub mod instruction;
pub mod runtime;
pub mod utils;
