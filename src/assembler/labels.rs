//! The label table: symbolic names bound to absolute image addresses.

use crate::diagnostics::{DiagnosticSink, ErrorCode, Severity};
use crate::isa::{DATA_START_PROVISIONAL, MAX_LABELS, MAX_LABEL_NAME};

/// One label definition.
#[derive(Debug, Clone)]
pub struct Label {
    pub name: String,
    pub address: u16,
    pub is_data: bool,
}

/// Append-only table of labels in definition order. The first definition
/// of a name wins; redefinitions warn and are discarded.
#[derive(Debug, Default)]
pub struct LabelTable {
    labels: Vec<Label>,
}

impl LabelTable {
    pub fn new() -> LabelTable {
        LabelTable::default()
    }

    /// Address of the first label with this exact name.
    pub fn find(&self, name: &str) -> Option<u16> {
        self.labels
            .iter()
            .find(|label| label.name == name)
            .map(|label| label.address)
    }

    /// Name of the first code label at the given address, if any.
    pub fn code_label_at(&self, address: u16) -> Option<&str> {
        self.labels
            .iter()
            .find(|label| !label.is_data && label.address == address)
            .map(|label| label.name.as_str())
    }

    /// Register a label. Duplicates warn and keep the first definition;
    /// the 257th label is fatal. Names are truncated to
    /// [MAX_LABEL_NAME] characters.
    pub fn add(
        &mut self,
        sink: &mut DiagnosticSink,
        line: usize,
        source_line: &str,
        name: &str,
        address: u16,
        is_data: bool,
    ) {
        if self.labels.len() >= MAX_LABELS {
            sink.push(
                ErrorCode::LabelTooMany,
                Severity::Fatal,
                line,
                0,
                source_line,
                format!("too many labels (max {MAX_LABELS})"),
            );
            return;
        }

        let name: String = name.chars().take(MAX_LABEL_NAME).collect();
        if self.labels.iter().any(|label| label.name == name) {
            sink.push(
                ErrorCode::LabelDuplicate,
                Severity::Warning,
                line,
                0,
                source_line,
                format!("duplicate label '{name}'"),
            );
            return;
        }

        self.labels.push(Label { name, address, is_data });
    }

    /// Rewrite every data label from its provisional pass-1 address to the
    /// final one, now that the code size is known.
    pub fn relocate_data(&mut self, data_start: u16) {
        for label in &mut self.labels {
            if label.is_data {
                let offset = label.address - DATA_START_PROVISIONAL;
                label.address = data_start + offset;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
