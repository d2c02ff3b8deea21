//! Post-assembly dumps behind the `-l`, `-d` and `-D` flags.

use colored::Colorize;

use crate::assembler::Assembly;

/// Print the label table: name, final address, section.
pub fn dump_labels(assembly: &Assembly) {
    println!("{}", format!("\nLabels ({}):", assembly.labels.len()).cyan());
    for label in assembly.labels.iter() {
        let kind = if label.is_data { "data" } else { "code" };
        println!("  0x{:04X} [{}] {}", label.address, kind, label.name);
    }
}

/// Hex-dump the code section, 16 bytes per row.
pub fn debug_hex(assembly: &Assembly) {
    println!("{}", format!("\nCode ({} bytes):", assembly.code.len()).cyan());
    for (row, chunk) in assembly.code.chunks(16).enumerate() {
        let bytes: Vec<String> = chunk.iter().map(|byte| format!("{byte:02X}")).collect();
        println!("  {:04X} | {}", row * 16, bytes.join(" "));
    }
}

/// Hex-dump the data section with a printable-character column.
pub fn dump_data_section(assembly: &Assembly) {
    println!("{}", format!("\nData ({} bytes):", assembly.data.len()).cyan());
    for (row, chunk) in assembly.data.chunks(16).enumerate() {
        let bytes: Vec<String> = chunk.iter().map(|byte| format!("{byte:02X}")).collect();
        let text: String = chunk
            .iter()
            .map(|&byte| {
                if byte.is_ascii_graphic() || byte == b' ' {
                    byte as char
                } else {
                    '.'
                }
            })
            .collect();
        println!("  {:04X} | {:<47} | {}", row * 16, bytes.join(" "), text);
    }
}
