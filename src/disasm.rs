//! Turns an assembled program back into text.
//!
//! Two renderers share one decoder: [listing] produces the human-oriented
//! view behind the `-v` flag (addresses, raw bytes, label lines), while
//! [to_source] produces plain assembly that re-assembles to the identical
//! byte image.

use std::fmt::Write as _;

use colored::Colorize;

use crate::assembler::Assembly;
use crate::isa::{Opcode, OperandShape};

/// One decoded instruction, or an undecodable byte.
enum Entry {
    Instr {
        addr: usize,
        opcode: Opcode,
        operands: Vec<u8>,
    },
    Unknown {
        addr: usize,
        byte: u8,
    },
}

/// Walk the code section. Unknown bytes become one-byte [Entry::Unknown]
/// entries; a truncated final instruction is padded with zero bytes.
fn decode(code: &[u8]) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let addr = pc;
        let byte = code[pc];
        pc += 1;
        match Opcode::from_byte(byte) {
            Some(opcode) => {
                let count = opcode.shape().operand_bytes();
                let mut operands = Vec::with_capacity(count);
                for i in 0..count {
                    operands.push(code.get(pc + i).copied().unwrap_or(0));
                }
                pc += count;
                entries.push(Entry::Instr { addr, opcode, operands });
            }
            None => entries.push(Entry::Unknown { addr, byte }),
        }
    }
    entries
}

/// Render the operand list of a decoded instruction, substituting code
/// label names for branch targets where one exists.
fn operand_text(assembly: &Assembly, opcode: Opcode, operands: &[u8]) -> String {
    match opcode.shape() {
        OperandShape::None => String::new(),
        OperandShape::Reg => format!("R{}", operands[0]),
        OperandShape::RegReg => format!("R{}, R{}", operands[0], operands[1]),
        OperandShape::RegRegReg => {
            format!("R{}, R{}, R{}", operands[0], operands[1], operands[2])
        }
        OperandShape::RegImm => format!("R{}, {}", operands[0], operands[1] as i8),
        OperandShape::RegRegImm => {
            format!("R{}, R{}, {}", operands[0], operands[1], operands[2] as i8)
        }
        OperandShape::Addr => {
            let target = u16::from(operands[0]) << 8 | u16::from(operands[1]);
            match assembly.labels.code_label_at(target) {
                Some(name) => name.to_string(),
                None => format!("0x{target:04X}"),
            }
        }
        OperandShape::RegAddr => {
            let addr = u16::from(operands[1]) << 8 | u16::from(operands[2]);
            match assembly.labels.code_label_at(addr) {
                Some(name) => format!("R{}, {}", operands[0], name),
                None => format!("R{}, 0x{:02X}, 0x{:02X}", operands[0], operands[1], operands[2]),
            }
        }
        OperandShape::AddrImm => format!("0x{:02X}, {}", operands[0], operands[1]),
    }
}

/// Human-oriented disassembly listing with addresses and raw bytes.
pub fn listing(assembly: &Assembly) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!("Disassembly ({} bytes):", assembly.code.len()).cyan()
    );
    let _ = writeln!(out, "----------------------------------------------");

    for entry in decode(&assembly.code) {
        match entry {
            Entry::Instr { addr, opcode, operands } => {
                if let Some(name) = assembly.labels.code_label_at(addr as u16) {
                    let _ = writeln!(out, "{}", format!("{name}:").yellow());
                }
                let mut raw = format!("{:02X} ", opcode as u8);
                for byte in &operands {
                    let _ = write!(raw, "{byte:02X} ");
                }
                let _ = writeln!(
                    out,
                    "  {:04X} | {:<12}| {:<8} {}",
                    addr,
                    raw,
                    opcode.mnemonic(),
                    operand_text(assembly, opcode, &operands)
                );
            }
            Entry::Unknown { addr, byte } => {
                let _ = writeln!(
                    out,
                    "  {:04X} | {:02X}          | {}",
                    addr,
                    byte,
                    format!("??? (0x{byte:02X})").red()
                );
            }
        }
    }

    let _ = writeln!(out, "----------------------------------------------");
    out
}

/// Plain assembly source that re-assembles to the identical image. The
/// data section is reconstructed as numeric byte lists under its labels.
pub fn to_source(assembly: &Assembly) -> String {
    let mut out = String::new();

    for entry in decode(&assembly.code) {
        match entry {
            Entry::Instr { addr, opcode, operands } => {
                if let Some(name) = assembly.labels.code_label_at(addr as u16) {
                    let _ = writeln!(out, "{name}:");
                }
                let text = operand_text(assembly, opcode, &operands);
                if text.is_empty() {
                    let _ = writeln!(out, "    {}", opcode.mnemonic());
                } else {
                    let _ = writeln!(out, "    {} {}", opcode.mnemonic(), text);
                }
            }
            Entry::Unknown { addr, byte } => {
                let _ = writeln!(out, "    ; undecodable byte 0x{byte:02X} at 0x{addr:04X}");
            }
        }
    }

    // a label may sit just past the last instruction
    if let Some(name) = assembly.labels.code_label_at(assembly.code.len() as u16) {
        let _ = writeln!(out, "{name}:");
    }

    if !assembly.data.is_empty() {
        let _ = writeln!(out, ".data");
        let code_len = assembly.code.len() as u16;
        let data_labels: Vec<_> = assembly.labels.iter().filter(|label| label.is_data).collect();
        for (index, label) in data_labels.iter().enumerate() {
            let start = (label.address - code_len) as usize;
            let end = data_labels
                .get(index + 1)
                .map(|next| (next.address - code_len) as usize)
                .unwrap_or(assembly.data.len());
            let bytes: Vec<String> = assembly.data[start..end]
                .iter()
                .map(|byte| format!("0x{byte:02X}"))
                .collect();
            let _ = writeln!(out, "{}: {}", label.name, bytes.join(", "));
        }
    }

    out
}
