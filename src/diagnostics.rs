//! Diagnostic collection and rendering.
//!
//! The assembler never prints or exits by itself: everything it has to say
//! is pushed into a [DiagnosticSink] and handed back to the caller, which
//! decides whether to render it and with what exit code. A fatal
//! diagnostic marks the sink so the two-pass driver can stop early.

use std::fmt;

use colored::Colorize;

/// Most diagnostics kept per compilation; further pushes are dropped.
pub const MAX_DIAGNOSTICS: usize = 64;

/// What a diagnostic means for the compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Stylistic or suspicious, never prevents output.
    Warning,
    /// Prevents output, compilation continues to collect more.
    Error,
    /// Compilation cannot continue at all.
    Fatal,
}

/// Machine-readable diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    UnknownInstruction,
    InvalidRegister,
    InvalidOperand,
    WrongOperandCount,
    OperandMissing,
    ImmediateOverflow,
    JumpOutOfRange,
    EscapeUnknown,
    LabelTooMany,
    LabelDuplicate,
    LabelNotFound,
    LabelEmpty,
    BytecodeOverflow,
    DataOverflow,
    FileOpen,
    FileWrite,
    NopSequence,
    JumpToNext,
}

/// One collected diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub source_line: String,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Warning => "WARN ",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        };
        if self.line > 0 {
            write!(f, "[{}] line {:<4} : {}", tag, self.line, self.message)
        } else {
            write!(f, "[{}] : {}", tag, self.message)
        }
    }
}

/// Bounded, append-only diagnostic collector.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    warning_count: usize,
    error_count: usize,
    has_fatal: bool,
}

impl DiagnosticSink {
    pub fn new() -> DiagnosticSink {
        DiagnosticSink::default()
    }

    /// Record one diagnostic. Nothing is recorded once a fatal has been
    /// seen, and the sink silently stops at [MAX_DIAGNOSTICS] entries.
    pub fn push(
        &mut self,
        code: ErrorCode,
        severity: Severity,
        line: usize,
        col: usize,
        source_line: &str,
        message: String,
    ) {
        if self.has_fatal {
            return;
        }
        if self.diagnostics.len() >= MAX_DIAGNOSTICS {
            eprintln!("too many diagnostics (max {MAX_DIAGNOSTICS}), dropping further ones");
            return;
        }
        match severity {
            Severity::Warning => self.warning_count += 1,
            Severity::Error => self.error_count += 1,
            Severity::Fatal => self.has_fatal = true,
        }
        self.diagnostics.push(Diagnostic {
            code,
            severity,
            message,
            source_line: source_line.to_string(),
            line,
            col,
        });
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_fatal(&self) -> bool {
        self.has_fatal
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Pretty-print every collected diagnostic to stderr: a summary line,
    /// then per diagnostic its severity tag, message, offending source
    /// line and column caret when known.
    pub fn render(&self) {
        if self.diagnostics.is_empty() {
            return;
        }

        eprintln!(
            "{}",
            format!(
                "\nCompilation result: {} error(s), {} warning(s)",
                self.error_count, self.warning_count
            )
            .red()
        );

        for diag in &self.diagnostics {
            let tag = match diag.severity {
                Severity::Warning => "[WARN ]".yellow(),
                Severity::Error => "[ERROR]".red(),
                Severity::Fatal => "[FATAL]".red(),
            };
            if diag.line > 0 {
                eprintln!("{} line {:<4} : {}", tag, diag.line, diag.message);
            } else {
                eprintln!("{} : {}", tag, diag.message);
            }
            if !diag.source_line.is_empty() {
                eprintln!("{}{}", format!("  {:4} | ", diag.line).cyan(), diag.source_line);
                if diag.col > 0 {
                    eprintln!("       | {}{}", " ".repeat(diag.col - 1), "^".red());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_severities() {
        let mut sink = DiagnosticSink::new();
        sink.push(ErrorCode::NopSequence, Severity::Warning, 1, 0, "NOP", "w".into());
        sink.push(ErrorCode::InvalidRegister, Severity::Error, 2, 0, "PUSH X", "e".into());
        sink.push(ErrorCode::InvalidRegister, Severity::Error, 3, 0, "POP X", "e".into());
        assert_eq!(sink.warning_count(), 1);
        assert_eq!(sink.error_count(), 2);
        assert!(sink.has_errors());
        assert!(!sink.has_fatal());
    }

    #[test]
    fn fatal_stops_further_recording() {
        let mut sink = DiagnosticSink::new();
        sink.push(ErrorCode::BytecodeOverflow, Severity::Fatal, 9, 0, "NOP", "full".into());
        sink.push(ErrorCode::InvalidRegister, Severity::Error, 10, 0, "PUSH X", "e".into());
        assert!(sink.has_fatal());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn sink_is_bounded() {
        let mut sink = DiagnosticSink::new();
        for i in 0..(MAX_DIAGNOSTICS + 10) {
            sink.push(ErrorCode::InvalidOperand, Severity::Error, i, 0, "", "e".into());
        }
        assert_eq!(sink.len(), MAX_DIAGNOSTICS);
    }

    #[test]
    fn display_includes_line_and_tag() {
        let diag = Diagnostic {
            code: ErrorCode::UnknownInstruction,
            severity: Severity::Error,
            message: "unknown instruction 'FOO'".into(),
            source_line: "FOO R1".into(),
            line: 3,
            col: 0,
        };
        let text = diag.to_string();
        assert!(text.contains("[ERROR]"));
        assert!(text.contains("line 3"));
        assert!(text.contains("FOO"));
    }
}
