//! Stack machine to assembly translation.
use super::command::{Command, Segment};
use crate::error::TranslateError;

/// Base address of the temp segment.
const TEMP_ADDRESS: u16 = 5;

/// Translates stack machine source to two-operand assembly.
///
/// The translator is stateful across units: the label counter keeps
/// generated return addresses and comparison labels unique within one
/// output program, and the current function name scopes return
/// addresses to their call site.
pub struct Translator {
    /// Name of the unit being translated; prefixes static variables
    /// and comparison labels.
    unit: String,
    current_function: String,
    counter: u32,
    out: Vec<String>,
}

impl Translator {
    pub fn new(unit: impl Into<String>) -> Self {
        let unit = unit.into();
        Self {
            current_function: unit.clone(),
            unit,
            counter: 0,
            out: vec![],
        }
    }

    /// Point a following unit's statics and labels at a new name.
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = unit.into();
        self.current_function = self.unit.clone();
    }

    /// Emit startup code: place the stack and transfer control to the
    /// program entry point.
    pub fn emit_bootstrap(&mut self) {
        self.lines(&["// Set SP to 256", "@256", "D=A", "@SP", "M=D"]);
        self.call("Sys.init", 0);
    }

    /// Translate a whole source unit, appending to the output.
    ///
    /// Comment lines and blank lines are skipped; everything else must
    /// parse as a command.
    pub fn translate(&mut self, source: &str) -> Result<(), TranslateError> {
        for (index, raw) in source.lines().enumerate() {
            let text = match raw.split("//").next() {
                Some(text) => text.trim(),
                None => "",
            };
            if text.is_empty() {
                continue;
            }

            let command =
                Command::parse(text).map_err(|message| TranslateError::new(index + 1, message))?;
            self.line(format!("// {}", text));
            self.emit(command);
        }
        Ok(())
    }

    /// The translated program as assembly source text.
    pub fn finish(self) -> String {
        let mut text = self.out.join("\n");
        text.push('\n');
        text
    }

    fn emit(&mut self, command: Command) {
        match command {
            Command::Push(segment, index) => self.push(segment, index),
            Command::Pop(segment, index) => self.pop(segment, index),
            Command::Add => self.binary("M=D+M"),
            Command::Sub => self.binary("M=M-D"),
            Command::And => self.binary("M=D&M"),
            Command::Or => self.binary("M=D|M"),
            Command::Neg => self.unary("M=-M"),
            Command::Not => self.unary("M=!M"),
            Command::Eq => self.comparison("D;JEQ"),
            Command::Gt => self.comparison("D;JGT"),
            Command::Lt => self.comparison("D;JLT"),
            Command::Label(name) => self.line(format!("({})", name)),
            Command::Goto(name) => {
                self.line(format!("@{}", name));
                self.line("0;JMP");
            }
            Command::IfGoto(name) => {
                self.lines(&["@SP", "AM=M-1", "D=M"]);
                self.line(format!("@{}", name));
                self.line("D;JNE");
            }
            Command::Function { name, locals } => self.function(name, locals),
            Command::Call { name, args } => self.call(&name, args),
            Command::Return => self.emit_return(),
        }
    }

    fn push(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Constant => {
                self.line(format!("@{}", index));
                self.lines(&["D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]);
                return;
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                self.line(format!("@{}", base_register(segment)));
                self.line("D=M");
                self.line(format!("@{}", index));
                self.line("A=D+A");
            }
            Segment::Temp => self.line(format!("@{}", TEMP_ADDRESS + index)),
            Segment::Static => self.line(format!("@{}", self.static_name(index))),
            Segment::Pointer => self.line(format!("@{}", pointer_register(index))),
        }
        self.lines(&["D=M", "@SP", "AM=M+1", "A=A-1", "M=D"]);
    }

    fn pop(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                // Stash the target address in R13 while the stack is
                // popped.
                self.line(format!("@{}", base_register(segment)));
                self.line("D=M");
                self.line(format!("@{}", index));
                self.lines(&["D=D+A", "@R13", "M=D"]);
                self.lines(&["@SP", "AM=M-1", "D=M", "@R13", "A=M", "M=D"]);
            }
            Segment::Temp | Segment::Static | Segment::Pointer => {
                // Directly addressable; no indirection needed.
                let target = match segment {
                    Segment::Temp => (TEMP_ADDRESS + index).to_string(),
                    Segment::Static => self.static_name(index),
                    _ => pointer_register(index).to_string(),
                };
                self.lines(&["@SP", "AM=M-1", "D=M"]);
                self.line(format!("@{}", target));
                self.line("M=D");
            }
            Segment::Constant => {
                // Rejected by the command parser.
            }
        }
    }

    /// Top two stack values combined in place.
    fn binary(&mut self, op: &str) {
        self.lines(&["@SP", "AM=M-1", "D=M", "A=A-1"]);
        self.line(op);
    }

    /// Top stack value rewritten in place.
    fn unary(&mut self, op: &str) {
        self.lines(&["@SP", "A=M-1"]);
        self.line(op);
    }

    /// Comparisons assume true, then branch past the false case.
    fn comparison(&mut self, jump: &str) {
        let counter = self.next_counter();
        let label = format!("CONTINUE.{}.{}", self.unit, counter);
        self.lines(&["@SP", "AM=M-1", "D=M", "A=A-1", "D=M-D", "M=-1"]);
        self.line(format!("@{}", label));
        self.line(jump);
        self.lines(&["@SP", "A=M-1", "M=0"]);
        self.line(format!("({})", label));
    }

    fn function(&mut self, name: String, locals: u16) {
        self.line(format!("({})", name));
        self.current_function = name;

        self.line("@SP");
        if locals > 0 {
            // Zero-initialize the local segment and bump SP past it.
            self.lines(&["A=M", "M=0"]);
            for _ in 1..locals {
                self.lines(&["A=A+1", "M=0"]);
            }
            self.lines(&["D=A+1", "@SP", "M=D"]);
        }
    }

    fn call(&mut self, name: &str, args: u16) {
        let counter = self.next_counter();
        let return_address = format!("{}.{}", self.current_function, counter);

        // Push the return address, then the caller's frame pointers.
        self.line(format!("@{}", return_address));
        self.lines(&["D=A", "@SP", "AM=M+1", "A=A-1", "M=D"]);
        for register in &["@LCL", "@ARG", "@THIS", "@THAT"] {
            self.line(*register);
            self.lines(&["D=M", "@SP", "AM=M+1", "A=A-1", "M=D"]);
        }

        // ARG = SP - args - 5
        self.lines(&["@SP", "D=M"]);
        self.line(format!("@{}", u32::from(args) + 5));
        self.lines(&["D=D-A", "@ARG", "M=D"]);

        // LCL = SP
        self.lines(&["@SP", "D=M", "@LCL", "M=D"]);

        self.line(format!("@{}", name));
        self.line("0;JMP");
        self.line(format!("({})", return_address));
    }

    fn emit_return(&mut self) {
        // FRAME = LCL
        self.lines(&["@LCL", "D=M", "@FRAME", "M=D"]);
        // RET = *(FRAME - 5); saved before *ARG is overwritten, since
        // for a zero-argument call they are the same cell.
        self.lines(&["@FRAME", "D=M", "@5", "A=D-A", "D=M", "@RET", "M=D"]);
        // *ARG = pop()
        self.lines(&["@SP", "AM=M-1", "D=M", "@ARG", "A=M", "M=D"]);
        // SP = ARG + 1
        self.lines(&["@ARG", "D=M+1", "@SP", "M=D"]);
        // THAT = *(FRAME - 1)
        self.lines(&["@FRAME", "A=M-1", "D=M", "@THAT", "M=D"]);
        // THIS = *(FRAME - 2)
        self.lines(&["@FRAME", "D=M-1", "A=D-1", "D=M", "@THIS", "M=D"]);
        // ARG = *(FRAME - 3)
        self.lines(&["@FRAME", "D=M-1", "D=D-1", "A=D-1", "D=M", "@ARG", "M=D"]);
        // LCL = *(FRAME - 4)
        self.lines(&["@FRAME", "D=M", "@4", "A=D-A", "D=M", "@LCL", "M=D"]);
        // goto RET
        self.lines(&["@RET", "A=M", "0;JMP"]);
    }

    fn static_name(&self, index: u16) -> String {
        format!("{}.{}", self.unit, index)
    }

    fn next_counter(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }

    #[inline]
    fn line(&mut self, text: impl Into<String>) {
        self.out.push(text.into());
    }

    fn lines(&mut self, lines: &[&str]) {
        for text in lines {
            self.out.push((*text).to_string());
        }
    }
}

fn base_register(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        _ => "THAT",
    }
}

/// Pointer 0 aliases `this`, pointer 1 aliases `that`.
fn pointer_register(index: u16) -> &'static str {
    if index == 0 {
        "THIS"
    } else {
        "THAT"
    }
}
