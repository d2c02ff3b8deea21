//! [Statement] struct and line-level lexing utilities

use regex::Regex;

use crate::isa::REG_COUNT;

/// Strip the comment (`;` to end of line) and trailing whitespace from a
/// raw source line.
pub fn trim_line(raw: &str) -> &str {
    raw.splitn(2, ';').next().unwrap_or("").trim_end()
}

/// Split a `label: rest` line on its first colon. The label name is
/// trimmed; the remainder keeps everything after the colon.
pub fn split_label(line: &str) -> (Option<&str>, &str) {
    match line.find(':') {
        Some(colon) => (Some(line[..colon].trim()), line[colon + 1..].trim_start()),
        None => (None, line),
    }
}

/// An instruction lexed from one source line: the uppercased mnemonic and
/// its comma-separated operands with all whitespace squeezed out
#[derive(Debug, Clone)]
pub struct Statement {
    mnemonic: String,
    operands: Vec<String>,
    line_number: usize,
}

impl Statement {
    /// Lex a code line (with any label prefix already removed). Returns
    /// `None` for a blank line.
    pub fn lex(line: &str, line_number: usize) -> Option<Statement> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let (mnemonic, rest) = match trimmed.find(char::is_whitespace) {
            Some(end) => (&trimmed[..end], trimmed[end..].trim_start()),
            None => (trimmed, ""),
        };

        let mut operands: Vec<String> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',')
                .map(|operand| operand.chars().filter(|c| !c.is_whitespace()).collect())
                .collect()
        };
        // a trailing comma is not an extra operand
        while operands.last().is_some_and(|operand| operand.is_empty()) {
            operands.pop();
        }

        Some(Statement {
            mnemonic: mnemonic.to_uppercase(),
            operands,
            line_number,
        })
    }

    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Operand at the given index, or `""` when the line has fewer.
    pub fn operand(&self, index: usize) -> &str {
        self.operands.get(index).map_or("", String::as_str)
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Parse a register token: `R` or `r` followed by a decimal index in
/// `[0, 7]`.
pub fn parse_register(token: &str) -> Option<u8> {
    let re = Regex::new(r"^[Rr]([0-9]+)$").unwrap();
    let caps = re.captures(token)?;
    let index: u32 = caps[1].parse().ok()?;
    if (index as usize) < REG_COUNT {
        Some(index as u8)
    } else {
        None
    }
}

/// Parse a numeric literal: `0x…` hex, `0b…` binary, otherwise decimal
/// (which may be negative).
pub fn parse_number(token: &str) -> Option<i32> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok().map(|value| value as i32)
    } else if let Some(bin) = token.strip_prefix("0b").or_else(|| token.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2).ok().map(|value| value as i32)
    } else {
        token.parse::<i32>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_trailing_whitespace_are_stripped() {
        assert_eq!(trim_line("ADD R1, R2, R3 ; sum"), "ADD R1, R2, R3");
        assert_eq!(trim_line("; whole line comment"), "");
        assert_eq!(trim_line("HALT   "), "HALT");
        assert_eq!(trim_line(""), "");
    }

    #[test]
    fn label_prefix_is_split_off() {
        assert_eq!(split_label("loop: ADD R1, R1, R2"), (Some("loop"), "ADD R1, R1, R2"));
        assert_eq!(split_label("end:"), (Some("end"), ""));
        assert_eq!(split_label("HALT"), (None, "HALT"));
    }

    #[test]
    fn mnemonic_is_uppercased_and_operands_squeezed() {
        let stmt = Statement::lex("mov R1 , r2", 7).unwrap();
        assert_eq!(stmt.mnemonic(), "MOV");
        assert_eq!(stmt.operand_count(), 2);
        assert_eq!(stmt.operand(0), "R1");
        assert_eq!(stmt.operand(1), "r2");
        assert_eq!(stmt.operand(2), "");
        assert_eq!(stmt.line_number(), 7);
    }

    #[test]
    fn blank_lines_lex_to_nothing() {
        assert!(Statement::lex("", 1).is_none());
        assert!(Statement::lex("   ", 1).is_none());
    }

    #[test]
    fn trailing_comma_is_ignored() {
        let stmt = Statement::lex("PUSH R1,", 1).unwrap();
        assert_eq!(stmt.operand_count(), 1);
    }

    #[test]
    fn registers_parse_within_range() {
        assert_eq!(parse_register("R0"), Some(0));
        assert_eq!(parse_register("r7"), Some(7));
        assert_eq!(parse_register("R8"), None);
        assert_eq!(parse_register("Rx"), None);
        assert_eq!(parse_register("7"), None);
        assert_eq!(parse_register(""), None);
    }

    #[test]
    fn numbers_parse_in_all_three_bases() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("-128"), Some(-128));
        assert_eq!(parse_number("0x2A"), Some(42));
        assert_eq!(parse_number("0b101010"), Some(42));
        assert_eq!(parse_number("0X2a"), Some(42));
        assert_eq!(parse_number("banana"), None);
        assert_eq!(parse_number(""), None);
    }
}
