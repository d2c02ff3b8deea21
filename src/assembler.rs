//! Converts vasm assembly code into bytecode in a two-pass manner
//!
//! The first pass sizes every instruction, collects labels and builds the
//! data section; the second pass validates operands and emits the code
//! bytes with all labels resolved.
//!
//! Comments start with a semicolon (`;`) and continue to the end of the
//! line. Labels are case-sensitive, mnemonics are not. A label is defined
//! with a colon and may share its line with an instruction:
//!
//! ```ignore
//! ; count down from 5
//!         LOAD R1, 0x00, 0x01
//!         LOAD R0, 0x00, 0x05
//! loop:   CMPI R0, 0
//!         JE done
//!         SUB R0, R0, R1
//!         JMP loop
//! done:   HALT
//! ```
//!
//! The `.data` directive switches to the data section, `.text` switches
//! back. A data definition binds a label to either a quoted string (NUL
//! terminated, with `\n \t \r \0 \\ \"` escapes) or a comma-separated
//! byte list:
//!
//! ```ignore
//! .data
//! greeting: "Hi there\n"
//! palette:  0x00, 0x3F, 127, 0b1010
//! .text
//!         LOAD R0, greeting
//!         PRINTS R0
//!         HALT
//! ```
//!
//! Numeric literals are decimal, `0x` hexadecimal or `0b` binary.
//! Immediates must fit the 8-bit range `[-128, 255]`; branch targets must
//! lie inside the 1024-byte image.

pub mod data;
pub mod encoder;
pub mod labels;
pub mod statement;

use std::fs;

use crate::diagnostics::{DiagnosticSink, ErrorCode, Severity};
use crate::isa::{DATA_START_PROVISIONAL, MAX_BYTECODE, MAX_DATA_SECTION};
use labels::LabelTable;

/// Which of the two source walks is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Size instructions and collect labels; no bytes, no operand errors.
    First,
    /// Emit bytes and validate operands against the resolved labels.
    Second,
}

/// Mutable state shared by the lexer, encoder and data builder while a
/// compilation is in flight.
pub struct Assembler {
    bytecode: Vec<u8>,
    bytecode_pos: usize,
    data_section: Vec<u8>,
    labels: LabelTable,
    in_data_section: bool,
    data_start_addr: u16,
    current_line: usize,
    current_source: String,
    last_nop_line: usize,
    sink: DiagnosticSink,
}

/// A successfully assembled program: the two image sections, the resolved
/// label table and any warnings collected on the way.
#[derive(Debug)]
pub struct Assembly {
    pub code: Vec<u8>,
    pub data: Vec<u8>,
    pub labels: LabelTable,
    pub warnings: DiagnosticSink,
}

impl Assembly {
    /// The final byte image: code immediately followed by data.
    pub fn image(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(self.code.len() + self.data.len());
        image.extend_from_slice(&self.code);
        image.extend_from_slice(&self.data);
        image
    }
}

/// Assemble a source file into a byte image.
pub fn assemble_from_file(path: &str) -> Result<Assembly, DiagnosticSink> {
    match fs::read_to_string(path) {
        Ok(source) => assemble(&source),
        Err(err) => {
            let mut sink = DiagnosticSink::new();
            sink.push(
                ErrorCode::FileOpen,
                Severity::Fatal,
                0,
                0,
                "",
                format!("could not open file '{path}': {err}"),
            );
            Err(sink)
        }
    }
}

/// Assemble source text into a byte image. On failure the full diagnostic
/// sink is returned; on success any warnings ride along in the
/// [Assembly].
pub fn assemble(source: &str) -> Result<Assembly, DiagnosticSink> {
    let mut asm = Assembler::new();

    // pass 1: size instructions, collect labels, build the data section
    for (index, raw) in source.lines().enumerate() {
        asm.current_line = index + 1;
        let line = statement::trim_line(raw).to_string();
        asm.current_source.clone_from(&line);

        if line.starts_with(".data") || line.starts_with(".text") || asm.in_data_section {
            data::parse_data_line(&mut asm, &line);
        } else {
            encoder::encode_line(&mut asm, &line, Pass::First);
        }
        if asm.sink.has_fatal() {
            return Err(asm.sink);
        }
    }

    let pass1_size = asm.bytecode_pos;

    // data labels carried provisional addresses until now
    asm.data_start_addr = asm.bytecode_pos as u16;
    asm.labels.relocate_data(asm.data_start_addr);

    // pass 2: emit code with resolved labels
    asm.bytecode_pos = 0;
    asm.in_data_section = false;
    asm.current_line = 0;
    asm.last_nop_line = 0;
    for (index, raw) in source.lines().enumerate() {
        asm.current_line = index + 1;
        let line = statement::trim_line(raw).to_string();
        asm.current_source.clone_from(&line);

        if line.starts_with(".data") || line.starts_with(".text") {
            asm.in_data_section = line.starts_with(".data");
            continue;
        }
        if asm.in_data_section {
            continue;
        }
        encoder::encode_line(&mut asm, &line, Pass::Second);
        if asm.sink.has_fatal() {
            return Err(asm.sink);
        }
    }

    if asm.sink.has_errors() {
        return Err(asm.sink);
    }

    debug_assert_eq!(pass1_size, asm.bytecode_pos);

    Ok(Assembly {
        code: asm.bytecode,
        data: asm.data_section,
        labels: asm.labels,
        warnings: asm.sink,
    })
}

impl Assembler {
    fn new() -> Assembler {
        Assembler {
            bytecode: Vec::new(),
            bytecode_pos: 0,
            data_section: Vec::new(),
            labels: LabelTable::new(),
            in_data_section: false,
            data_start_addr: DATA_START_PROVISIONAL,
            current_line: 0,
            current_source: String::new(),
            last_nop_line: 0,
            sink: DiagnosticSink::new(),
        }
    }

    /// Append one code byte (pass 2); overflowing the code section is
    /// fatal.
    fn emit_byte(&mut self, byte: u8) {
        if self.bytecode_pos >= MAX_BYTECODE {
            self.diag(ErrorCode::BytecodeOverflow, Severity::Fatal, "bytecode buffer overflow".to_string());
            return;
        }
        self.bytecode.push(byte);
        self.bytecode_pos += 1;
    }

    /// Emit a byte in pass 2, or just account for it in pass 1.
    fn emit_or_skip(&mut self, pass: Pass, byte: u8) {
        if pass == Pass::Second {
            self.emit_byte(byte);
        } else {
            self.bytecode_pos += 1;
        }
    }

    fn emit_group(&mut self, pass: Pass, bytes: &[u8]) {
        for &byte in bytes {
            self.emit_or_skip(pass, byte);
        }
    }

    /// Append one data byte; overflowing the data section is fatal.
    fn emit_data_byte(&mut self, byte: u8) {
        if self.data_section.len() >= MAX_DATA_SECTION {
            self.diag(ErrorCode::DataOverflow, Severity::Fatal, "data section overflow".to_string());
            return;
        }
        self.data_section.push(byte);
    }

    fn add_code_label(&mut self, name: &str) {
        self.labels.add(
            &mut self.sink,
            self.current_line,
            &self.current_source,
            name,
            self.bytecode_pos as u16,
            false,
        );
    }

    fn add_data_label(&mut self, name: &str) {
        self.labels.add(
            &mut self.sink,
            self.current_line,
            &self.current_source,
            name,
            self.data_start_addr + self.data_section.len() as u16,
            true,
        );
    }

    /// Record a diagnostic against the line currently being processed.
    fn diag(&mut self, code: ErrorCode, severity: Severity, message: String) {
        self.sink.push(code, severity, self.current_line, 0, &self.current_source, message);
    }

    fn error(&mut self, code: ErrorCode, message: String) {
        self.diag(code, Severity::Error, message);
    }

    fn warning(&mut self, code: ErrorCode, message: String) {
        self.diag(code, Severity::Warning, message);
    }
}
