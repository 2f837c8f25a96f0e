//! Assembly to binary word tests.
use tack::asm::{assemble, to_binary_text};

#[test]
fn test_assemble_add_program() {
    let source = "\
        // Adds 2 and 3, stores the result in R0.\n\
        @2\n\
        D=A\n\
        @3\n\
        D=D+A\n\
        @0\n\
        M=D\n";

    let words = assemble(source).unwrap();
    assert_eq!(
        words,
        vec![
            0b0000000000000010,
            0b1110110000010000,
            0b0000000000000011,
            0b1110000010010000,
            0b0000000000000000,
            0b1110001100001000,
        ]
    );
}

#[test]
fn test_labels_resolve_to_instruction_addresses() {
    let source = "\
        @0\n\
        D=M\n\
        (LOOP)\n\
        @LOOP\n\
        0;JMP\n";

    let words = assemble(source).unwrap();
    // The label binds to the instruction after it, and declarations
    // themselves occupy no address.
    assert_eq!(words.len(), 4);
    assert_eq!(words[2], 2);
    assert_eq!(words[3], 0b1110101010000111);
}

#[test]
fn test_forward_references() {
    let source = "\
        @END\n\
        0;JMP\n\
        D=A\n\
        (END)\n\
        @END\n\
        0;JMP\n";

    let words = assemble(source).unwrap();
    assert_eq!(words[0], 3);
    assert_eq!(words[3], 3);
}

#[test]
fn test_variables_allocate_from_16() {
    let source = "\
        @counter\n\
        M=M+1\n\
        @sum\n\
        M=D\n\
        @counter\n\
        D=M\n";

    let words = assemble(source).unwrap();
    assert_eq!(words[0], 16);
    assert_eq!(words[2], 17);
    assert_eq!(words[4], 16, "second reference reuses the cell");
    assert_eq!(words[1], 0b1111110111001000);
}

#[test]
fn test_predefined_symbols() {
    let words = assemble("@SP\n@R13\n@SCREEN\n@KBD\n").unwrap();
    assert_eq!(words, vec![0, 13, 16384, 24576]);
}

#[test]
fn test_jump_only_and_dest_only_instructions() {
    let words = assemble("D;JNE\nMD=M-1\n").unwrap();
    assert_eq!(words[0], 0b1110001100000101);
    assert_eq!(words[1], 0b1111110010011000);
}

#[test]
fn test_address_out_of_range() {
    assert!(assemble("@32767\n").is_ok());
    let err = assemble("@32768\n").unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn test_unknown_mnemonic_reports_line() {
    let err = assemble("@2\nD=Q\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line 2"), "got: {}", message);
    assert!(message.contains("'Q'"), "got: {}", message);
}

#[test]
fn test_binary_text_rendering() {
    assert_eq!(
        to_binary_text(&[2, 0b1110110000010000]),
        "0000000000000010\n1110110000010000\n"
    );
}

#[test]
fn test_translated_output_assembles() {
    let asm = tack::vm::translate_program(&[(
        "Main",
        "function Main.main 1\npush constant 5\npop local 0\npush constant 0\nreturn\n",
    )])
    .unwrap();

    let words = assemble(&asm).unwrap();
    assert!(!words.is_empty());
    // Bootstrap loads 256 first.
    assert_eq!(words[0], 256);
}
