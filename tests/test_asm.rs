//! End-to-end assembler tests: source text in, byte image out.

use vasm::assemble;
use vasm::diagnostics::ErrorCode;

#[test]
fn addi_halt_assembles_to_the_documented_bytes() {
    let assembly = assemble("ADDI R1, R1, 1\nHALT").unwrap();
    assert_eq!(assembly.image(), vec![0x02, 0x01, 0x01, 0x01, 0x00]);
}

#[test]
fn data_program_lays_out_code_then_data() {
    let source = ".data\nmsg: \"Hi\"\n.text\nLOAD R0, msg\nPRINTS R0\nHALT";
    let assembly = assemble(source).unwrap();

    // LOAD R0, high, low + PRINTS R0 + HALT
    assert_eq!(assembly.code, vec![0x0E, 0x00, 0x00, 0x07, 0x23, 0x00, 0x00]);
    assert_eq!(assembly.data, vec![0x48, 0x69, 0x00]);
    assert_eq!(assembly.image().len(), 10);
    assert_eq!(assembly.labels.find("msg"), Some(7));
}

#[test]
fn comments_and_blank_lines_change_nothing() {
    let bare = assemble("ADDI R1, R1, 1\nHALT").unwrap();
    let noisy = assemble("; counter\n\nADDI R1, R1, 1  ; bump\n\n   \nHALT ; done\n").unwrap();
    assert_eq!(bare.image(), noisy.image());
}

#[test]
fn every_code_label_resolves_to_its_pass1_address() {
    let source = "\
first:  NOP
second: ADDI R1, R1, 1
        JMP first
third:  HALT";
    let assembly = assemble(source).unwrap();
    assert_eq!(assembly.labels.find("first"), Some(0));
    assert_eq!(assembly.labels.find("second"), Some(1));
    assert_eq!(assembly.labels.find("third"), Some(8));
    // JMP encodes the resolved address of `first`
    assert_eq!(&assembly.code[5..8], &[0x08, 0x00, 0x00]);
}

#[test]
fn data_label_addresses_equal_code_size_plus_offset() {
    let source = ".data\na: 1, 2, 3\nb: \"x\"\nc: 9\n.text\nNOP\nHALT";
    let assembly = assemble(source).unwrap();
    let code_size = assembly.code.len() as u16;
    assert_eq!(assembly.labels.find("a"), Some(code_size));
    assert_eq!(assembly.labels.find("b"), Some(code_size + 3));
    assert_eq!(assembly.labels.find("c"), Some(code_size + 5));
}

#[test]
fn exactly_256_labels_are_accepted() {
    let mut source = String::new();
    for i in 0..256 {
        source.push_str(&format!("l{i}: RET\n"));
    }
    source.push_str("HALT");
    assert!(assemble(&source).is_ok());
}

#[test]
fn the_257th_label_is_fatal() {
    let mut source = String::new();
    for i in 0..257 {
        source.push_str(&format!("l{i}: RET\n"));
    }
    source.push_str("HALT");
    let sink = assemble(&source).unwrap_err();
    assert!(sink.has_fatal());
    assert!(sink.iter().any(|d| d.code == ErrorCode::LabelTooMany));
}

#[test]
fn duplicate_labels_warn_and_keep_the_first() {
    let assembly = assemble("x: NOP\nx: NOP\nJMP x\nHALT").unwrap();
    assert!(
        assembly
            .warnings
            .iter()
            .any(|d| d.code == ErrorCode::LabelDuplicate)
    );
    // the jump goes to the first definition
    assert_eq!(&assembly.code[2..5], &[0x08, 0x00, 0x00]);
}

#[test]
fn errors_carry_the_offending_line() {
    let sink = assemble("NOP\nPUSH R9\nHALT").unwrap_err();
    let diag = sink.iter().next().unwrap();
    assert_eq!(diag.line, 2);
    assert_eq!(diag.source_line, "PUSH R9");
}

#[test]
fn warnings_alone_still_produce_an_image() {
    let assembly = assemble("NOP\nNOP\nHALT").unwrap();
    assert!(assembly.warnings.warning_count() > 0);
    assert_eq!(assembly.image(), vec![0x60, 0x60, 0x00]);
}
