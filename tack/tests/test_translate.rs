//! Stack machine to assembly translation tests.
use tack::vm::{translate, translate_program};

/// Translated assembly with the interleaved `//` comments removed.
fn asm_lines(unit: &str, source: &str) -> Vec<String> {
    translate(unit, source)
        .expect("translation failed")
        .lines()
        .filter(|line| !line.starts_with("//"))
        .map(|line| line.to_string())
        .collect()
}

#[test]
fn test_push_constant() {
    assert_eq!(
        asm_lines("Main", "push constant 7"),
        vec!["@7", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]
    );
}

#[test]
fn test_push_indirect_segment() {
    assert_eq!(
        asm_lines("Main", "push local 2"),
        vec!["@LCL", "D=M", "@2", "A=D+A", "D=M", "@SP", "AM=M+1", "A=A-1", "M=D"]
    );
    assert_eq!(asm_lines("Main", "push argument 0")[0], "@ARG");
    assert_eq!(asm_lines("Main", "push this 1")[0], "@THIS");
    assert_eq!(asm_lines("Main", "push that 3")[0], "@THAT");
}

#[test]
fn test_pop_indirect_goes_through_r13() {
    assert_eq!(
        asm_lines("Main", "pop argument 1"),
        vec![
            "@ARG", "D=M", "@1", "D=D+A", "@R13", "M=D", "@SP", "AM=M-1", "D=M", "@R13", "A=M",
            "M=D",
        ]
    );
}

#[test]
fn test_temp_is_offset_from_5() {
    assert_eq!(
        asm_lines("Main", "push temp 2"),
        vec!["@7", "D=M", "@SP", "AM=M+1", "A=A-1", "M=D"]
    );
    assert_eq!(
        asm_lines("Main", "pop temp 0"),
        vec!["@SP", "AM=M-1", "D=M", "@5", "M=D"]
    );
}

#[test]
fn test_static_is_scoped_to_unit() {
    assert!(asm_lines("Main", "push static 3").contains(&"@Main.3".to_string()));
    assert!(asm_lines("Game", "pop static 0").contains(&"@Game.0".to_string()));
}

#[test]
fn test_pointer_aliases_this_and_that() {
    assert_eq!(
        asm_lines("Main", "push pointer 0"),
        vec!["@THIS", "D=M", "@SP", "AM=M+1", "A=A-1", "M=D"]
    );
    assert_eq!(
        asm_lines("Main", "pop pointer 1"),
        vec!["@SP", "AM=M-1", "D=M", "@THAT", "M=D"]
    );
}

#[test]
fn test_arithmetic() {
    assert_eq!(
        asm_lines("Main", "add"),
        vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=D+M"]
    );
    assert_eq!(
        asm_lines("Main", "sub"),
        vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=M-D"]
    );
    assert_eq!(asm_lines("Main", "neg"), vec!["@SP", "A=M-1", "M=-M"]);
    assert_eq!(asm_lines("Main", "not"), vec!["@SP", "A=M-1", "M=!M"]);
    assert_eq!(
        asm_lines("Main", "and"),
        vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=D&M"]
    );
}

#[test]
fn test_comparison_labels_are_unique() {
    let lines = asm_lines("Main", "lt\ngt");
    assert_eq!(
        lines[..11],
        [
            "@SP",
            "AM=M-1",
            "D=M",
            "A=A-1",
            "D=M-D",
            "M=-1",
            "@CONTINUE.Main.1",
            "D;JLT",
            "@SP",
            "A=M-1",
            "M=0",
        ]
    );
    assert!(lines.contains(&"(CONTINUE.Main.1)".to_string()));
    assert!(lines.contains(&"@CONTINUE.Main.2".to_string()));
    assert!(lines.contains(&"D;JGT".to_string()));
}

#[test]
fn test_flow_commands() {
    assert_eq!(asm_lines("Main", "label Main_0"), vec!["(Main_0)"]);
    assert_eq!(asm_lines("Main", "goto Main_0"), vec!["@Main_0", "0;JMP"]);
    assert_eq!(
        asm_lines("Main", "if-goto Main_0"),
        vec!["@SP", "AM=M-1", "D=M", "@Main_0", "D;JNE"]
    );
}

#[test]
fn test_function_zero_initializes_locals() {
    assert_eq!(
        asm_lines("Main", "function Main.main 2"),
        vec![
            "(Main.main)",
            "@SP",
            "A=M",
            "M=0",
            "A=A+1",
            "M=0",
            "D=A+1",
            "@SP",
            "M=D",
        ]
    );
    assert_eq!(
        asm_lines("Main", "function Main.halt 0"),
        vec!["(Main.halt)", "@SP"]
    );
}

#[test]
fn test_call_builds_frame() {
    let lines = asm_lines("Main", "function Main.main 0\ncall Sys.halt 2");

    // Return address is scoped to the calling function.
    assert!(lines.contains(&"@Main.main.1".to_string()));
    assert!(lines.contains(&"(Main.main.1)".to_string()));
    // ARG = SP - args - 5
    assert!(lines.contains(&"@7".to_string()));
    assert!(lines.contains(&"D=D-A".to_string()));
    // Transfer of control.
    assert!(lines.contains(&"@Sys.halt".to_string()));
    assert!(lines.contains(&"0;JMP".to_string()));
}

#[test]
fn test_return_restores_frame() {
    let lines = asm_lines("Main", "return");
    assert!(lines.contains(&"@FRAME".to_string()));
    assert!(lines.contains(&"@RET".to_string()));
    assert!(lines.contains(&"@THAT".to_string()));
    assert!(lines.contains(&"@LCL".to_string()));
    assert_eq!(lines.last().map(|s| s.as_str()), Some("0;JMP"));
    // The return address is read from *(FRAME - 5) before the return
    // value overwrites *ARG.
    let ret = lines.iter().position(|l| l == "@RET").unwrap();
    let arg = lines.iter().position(|l| l == "@ARG").unwrap();
    assert!(ret < arg);
}

#[test]
fn test_program_bootstrap() {
    let text = translate_program(&[("Main", "function Main.main 0\nreturn")]).unwrap();
    let lines: Vec<&str> = text.lines().filter(|l| !l.starts_with("//")).collect();
    assert_eq!(lines[..5], ["@256", "D=A", "@SP", "M=D", "@Bootstrap.1"]);
    assert!(lines.contains(&"@Sys.init"));
    assert!(lines.contains(&"(Main.main)"));
}

#[test]
fn test_comments_and_blank_lines_are_skipped() {
    let source = "// header\n\npush constant 1 // trailing\n";
    assert_eq!(
        asm_lines("Main", source),
        vec!["@1", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]
    );
}

#[test]
fn test_error_carries_line_number() {
    let err = translate("Main", "push constant 1\nfly away\n").unwrap_err();
    assert!(err.to_string().contains("line 2"));
}
