//! Per-instruction operand validation and byte emission.
//!
//! Both passes run through [encode_line]; the operand shape of the opcode
//! decides how many bytes the instruction occupies, so pass 1 can advance
//! the position counter without validating anything. Operand errors are
//! reported from pass 2 only, where every label is already known.

use crate::assembler::statement::{self, Statement};
use crate::assembler::{Assembler, Pass};
use crate::diagnostics::ErrorCode;
use crate::isa::{MAX_BYTECODE, Opcode, OperandShape};

/// Encode one code line (possibly carrying a label prefix).
pub fn encode_line(asm: &mut Assembler, line: &str, pass: Pass) {
    if line.is_empty() {
        return;
    }

    let (label, rest) = statement::split_label(line);
    if let Some(name) = label {
        if pass == Pass::First {
            asm.add_code_label(name);
        }
        if rest.is_empty() {
            return;
        }
    }

    let Some(stmt) = Statement::lex(rest, asm.current_line) else {
        return;
    };

    let Some(opcode) = Opcode::from_mnemonic(stmt.mnemonic()) else {
        if pass == Pass::Second {
            asm.error(
                ErrorCode::UnknownInstruction,
                format!("unknown instruction '{}'", stmt.mnemonic()),
            );
        }
        return;
    };

    if opcode == Opcode::Nop && pass == Pass::Second {
        if asm.last_nop_line > 0 && asm.last_nop_line == asm.current_line - 1 {
            asm.warning(
                ErrorCode::NopSequence,
                format!(
                    "consecutive NOP instructions (lines {}-{}) - intentional?",
                    asm.last_nop_line, asm.current_line
                ),
            );
        }
        asm.last_nop_line = asm.current_line;
    }

    let shape = opcode.shape();

    if pass == Pass::Second && stmt.operand_count() > shape.max_operands() {
        asm.error(
            ErrorCode::WrongOperandCount,
            format!(
                "'{}' takes at most {} operand(s), found {}",
                stmt.mnemonic(),
                shape.max_operands(),
                stmt.operand_count()
            ),
        );
        return;
    }

    asm.emit_or_skip(pass, opcode as u8);

    match shape {
        OperandShape::None => {}
        OperandShape::Reg => encode_reg(asm, &stmt, pass),
        OperandShape::RegReg => encode_reg_reg(asm, &stmt, opcode, pass),
        OperandShape::RegRegReg => encode_reg_reg_reg(asm, &stmt, pass),
        OperandShape::RegImm => encode_reg_imm(asm, &stmt, pass),
        OperandShape::RegRegImm => encode_reg_reg_imm(asm, &stmt, pass),
        OperandShape::Addr => encode_addr(asm, &stmt, pass),
        OperandShape::RegAddr => encode_reg_addr(asm, &stmt, pass),
        OperandShape::AddrImm => encode_addr_imm(asm, &stmt, pass),
    }
}

/// Resolve an address operand: label first, then numeric literal.
fn resolve_address(asm: &Assembler, token: &str) -> Option<i32> {
    asm.labels
        .find(token)
        .map(i32::from)
        .or_else(|| statement::parse_number(token))
}

/// Report an 8-bit immediate that falls outside `[-128, 255]`. The byte
/// is still emitted; the error alone prevents output.
fn check_immediate(asm: &mut Assembler, value: i32, operand: &str) {
    if !(-128..=255).contains(&value) {
        asm.error(
            ErrorCode::ImmediateOverflow,
            format!("immediate value {value} out of 8-bit range [-128..255] (operand: '{operand}')"),
        );
    }
}

fn encode_reg(asm: &mut Assembler, stmt: &Statement, pass: Pass) {
    match statement::parse_register(stmt.operand(0)) {
        Some(reg) => asm.emit_or_skip(pass, reg),
        None if pass == Pass::Second => asm.error(
            ErrorCode::InvalidRegister,
            format!("invalid register '{}'", stmt.operand(0)),
        ),
        None => {}
    }
}

fn encode_reg_reg(asm: &mut Assembler, stmt: &Statement, opcode: Opcode, pass: Pass) {
    let r1 = statement::parse_register(stmt.operand(0));
    let r2 = statement::parse_register(stmt.operand(1));
    match (r1, r2) {
        (Some(a), Some(b)) => asm.emit_group(pass, &[a, b]),
        _ if pass == Pass::Second => {
            let message = if opcode == Opcode::Ldb {
                "LDB requires two registers: LDB Rdest, Raddr".to_string()
            } else {
                format!("invalid registers '{}', '{}'", stmt.operand(0), stmt.operand(1))
            };
            asm.error(ErrorCode::InvalidRegister, message);
        }
        _ => {}
    }
}

fn encode_reg_reg_reg(asm: &mut Assembler, stmt: &Statement, pass: Pass) {
    let r1 = statement::parse_register(stmt.operand(0));
    let r2 = statement::parse_register(stmt.operand(1));
    let r3 = statement::parse_register(stmt.operand(2));
    match (r1, r2, r3) {
        (Some(a), Some(b), Some(c)) => asm.emit_group(pass, &[a, b, c]),
        _ if pass == Pass::Second => asm.error(
            ErrorCode::InvalidRegister,
            format!(
                "invalid registers '{}', '{}', '{}'",
                stmt.operand(0),
                stmt.operand(1),
                stmt.operand(2)
            ),
        ),
        _ => {}
    }
}

fn encode_reg_imm(asm: &mut Assembler, stmt: &Statement, pass: Pass) {
    let reg = statement::parse_register(stmt.operand(0));
    let token = stmt.operand(1).to_string();

    if pass == Pass::Second && token.is_empty() {
        asm.error(
            ErrorCode::OperandMissing,
            format!("'{}' requires two operands: register and immediate/label", stmt.mnemonic()),
        );
        return;
    }

    let label_addr = asm.labels.find(&token);
    let value = match label_addr {
        Some(addr) => Some(i32::from(addr)),
        None => statement::parse_number(&token),
    };

    if pass == Pass::Second {
        match value {
            None => {
                asm.error(ErrorCode::InvalidOperand, format!("invalid operand '{token}'"));
                return;
            }
            Some(v) if label_addr.is_none() => check_immediate(asm, v, &token),
            Some(_) => {}
        }
    }

    match reg {
        Some(r) => asm.emit_group(pass, &[r, (value.unwrap_or(0) & 0xFF) as u8]),
        None if pass == Pass::Second => asm.error(
            ErrorCode::InvalidRegister,
            format!("invalid register '{}'", stmt.operand(0)),
        ),
        None => {}
    }
}

fn encode_reg_reg_imm(asm: &mut Assembler, stmt: &Statement, pass: Pass) {
    let r1 = statement::parse_register(stmt.operand(0));
    let r2 = statement::parse_register(stmt.operand(1));
    let token = stmt.operand(2).to_string();

    if pass == Pass::Second && token.is_empty() {
        asm.error(
            ErrorCode::OperandMissing,
            format!("'{}' requires three operands: Rdest, Rsrc, immediate", stmt.mnemonic()),
        );
        return;
    }

    let value = statement::parse_number(&token);
    if pass == Pass::Second {
        match value {
            None => {
                asm.error(ErrorCode::InvalidOperand, format!("invalid operand '{token}'"));
                return;
            }
            Some(v) => check_immediate(asm, v, &token),
        }
    }

    match (r1, r2) {
        (Some(a), Some(b)) => asm.emit_group(pass, &[a, b, (value.unwrap_or(0) & 0xFF) as u8]),
        _ if pass == Pass::Second => asm.error(
            ErrorCode::InvalidRegister,
            format!("invalid registers '{}', '{}'", stmt.operand(0), stmt.operand(1)),
        ),
        _ => {}
    }
}

fn encode_addr(asm: &mut Assembler, stmt: &Statement, pass: Pass) {
    let token = stmt.operand(0).to_string();
    let addr = resolve_address(asm, &token);

    if pass == Pass::First {
        asm.bytecode_pos += 2;
        return;
    }

    if token.is_empty() {
        asm.error(
            ErrorCode::OperandMissing,
            format!("'{}' requires a label or address operand", stmt.mnemonic()),
        );
        return;
    }
    let Some(addr) = addr else {
        asm.error(
            ErrorCode::LabelNotFound,
            format!("'{token}' is neither a known label nor an address"),
        );
        return;
    };
    if !(0..MAX_BYTECODE as i32).contains(&addr) {
        asm.error(
            ErrorCode::JumpOutOfRange,
            format!(
                "jump target 0x{:04X} is out of valid range [0x0000..0x{:04X}]",
                addr,
                MAX_BYTECODE - 1
            ),
        );
        return;
    }
    if addr == asm.bytecode_pos as i32 + 2 {
        asm.warning(
            ErrorCode::JumpToNext,
            format!("jump target is the next instruction (0x{addr:04X}) - has no effect"),
        );
    }
    asm.emit_byte(((addr >> 8) & 0xFF) as u8);
    asm.emit_byte((addr & 0xFF) as u8);
}

fn encode_reg_addr(asm: &mut Assembler, stmt: &Statement, pass: Pass) {
    let reg = statement::parse_register(stmt.operand(0));

    let (high, low) = match asm.labels.find(stmt.operand(1)) {
        Some(addr) => (((addr >> 8) & 0xFF) as u8, (addr & 0xFF) as u8),
        None => (
            (statement::parse_number(stmt.operand(1)).unwrap_or(0) & 0xFF) as u8,
            (statement::parse_number(stmt.operand(2)).unwrap_or(0) & 0xFF) as u8,
        ),
    };

    match reg {
        Some(r) => asm.emit_group(pass, &[r, high, low]),
        None if pass == Pass::Second => asm.error(
            ErrorCode::InvalidRegister,
            format!("invalid register '{}'", stmt.operand(0)),
        ),
        None => {}
    }
}

fn encode_addr_imm(asm: &mut Assembler, stmt: &Statement, pass: Pass) {
    let addr = statement::parse_number(stmt.operand(0));
    let max_len = statement::parse_number(stmt.operand(1));

    if pass == Pass::Second && (addr.is_none() || max_len.is_none()) {
        asm.error(
            ErrorCode::InvalidOperand,
            format!("'{}' requires an address and a maximum length", stmt.mnemonic()),
        );
        return;
    }

    asm.emit_group(
        pass,
        &[
            (addr.unwrap_or(0) & 0xFF) as u8,
            (max_len.unwrap_or(0) & 0xFF) as u8,
        ],
    );
}
