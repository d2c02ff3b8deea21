//! A toolchain for a small 8-bit-opcode register machine, featuring:
//! - a two-pass assembler for the `.vasm` source language
//! - a bytecode virtual machine with x86-like condition flags
//! - a disassembler

pub mod assembler;
pub mod diagnostics;
pub mod disasm;
pub mod dump;
pub mod isa;
pub mod logging;
pub mod vm;

pub use assembler::{Assembly, assemble, assemble_from_file};
