//! Stack machine instruction buffer.
use smol_str::SmolStr;
use std::fmt;

/// Memory segments addressable by push and pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Static,
    This,
    That,
    Argument,
    Local,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Segment::Constant => "constant",
            Segment::Static   => "static",
            Segment::This     => "this",
            Segment::That     => "that",
            Segment::Argument => "argument",
            Segment::Local    => "local",
            Segment::Pointer  => "pointer",
            Segment::Temp     => "temp",
        };
        f.write_str(name)
    }
}

/// One stack machine instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmInstr {
    Push(Segment, u16),
    Pop(Segment, u16),
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    Label(SmolStr),
    Goto(SmolStr),
    IfGoto(SmolStr),
    Function { name: SmolStr, locals: u16 },
    Call { name: SmolStr, args: u16 },
    Return,
}

impl fmt::Display for VmInstr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use VmInstr as I;
        match self {
            I::Push(segment, index) => write!(f, "push {} {}", segment, index),
            I::Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            I::Add => f.write_str("add"),
            I::Sub => f.write_str("sub"),
            I::Neg => f.write_str("neg"),
            I::Eq => f.write_str("eq"),
            I::Gt => f.write_str("gt"),
            I::Lt => f.write_str("lt"),
            I::And => f.write_str("and"),
            I::Or => f.write_str("or"),
            I::Not => f.write_str("not"),
            I::Label(label) => write!(f, "label {}", label),
            I::Goto(label) => write!(f, "goto {}", label),
            I::IfGoto(label) => write!(f, "if-goto {}", label),
            I::Function { name, locals } => write!(f, "function {} {}", name, locals),
            I::Call { name, args } => write!(f, "call {} {}", name, args),
            I::Return => f.write_str("return"),
        }
    }
}

/// Handle to a `function` instruction whose local count is not yet
/// known. Returned by [`VmWriter::begin_function`] and redeemed by
/// [`VmWriter::set_locals`].
#[derive(Debug, Clone, Copy)]
pub struct FunctionSlot(usize);

/// Append-only instruction buffer with in-place patching of function
/// headers.
///
/// The local count of a subroutine is only known after its `var`
/// declarations have been compiled, but the `function` header precedes
/// the body in the output. The header is emitted with a placeholder
/// count and patched once declarations are done, keeping compilation
/// single-pass.
#[derive(Debug, Default)]
pub struct VmWriter {
    code: Vec<VmInstr>,
}

impl VmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn emit(&mut self, instr: VmInstr) {
        self.code.push(instr);
    }

    /// Emit a `function` header with a placeholder local count.
    pub fn begin_function(&mut self, name: impl Into<SmolStr>) -> FunctionSlot {
        let slot = FunctionSlot(self.code.len());
        self.code.push(VmInstr::Function {
            name: name.into(),
            locals: 0,
        });
        slot
    }

    /// Fill in the local count of a previously emitted header.
    pub fn set_locals(&mut self, slot: FunctionSlot, count: u16) {
        if let Some(VmInstr::Function { locals, .. }) = self.code.get_mut(slot.0) {
            *locals = count;
        }
    }

    #[inline]
    pub fn code(&self) -> &[VmInstr] {
        &self.code
    }

    pub fn into_code(self) -> Vec<VmInstr> {
        self.code
    }
}

/// Format instructions as source text, one instruction per line.
pub fn render(code: &[VmInstr]) -> String {
    let mut out = String::new();
    for instr in code {
        out.push_str(&instr.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_instruction_text() {
        assert_eq!(VmInstr::Push(Segment::Constant, 5).to_string(), "push constant 5");
        assert_eq!(VmInstr::Pop(Segment::Pointer, 0).to_string(), "pop pointer 0");
        assert_eq!(
            VmInstr::Function { name: "Main.main".into(), locals: 2 }.to_string(),
            "function Main.main 2"
        );
        assert_eq!(
            VmInstr::Call { name: "Math.multiply".into(), args: 2 }.to_string(),
            "call Math.multiply 2"
        );
        assert_eq!(VmInstr::IfGoto("Main_0".into()).to_string(), "if-goto Main_0");
    }

    #[test]
    fn test_patch_function_header() {
        let mut writer = VmWriter::new();
        let slot = writer.begin_function("Main.main");
        writer.emit(VmInstr::Push(Segment::Constant, 0));
        writer.set_locals(slot, 3);

        assert_eq!(
            writer.code()[0],
            VmInstr::Function {
                name: "Main.main".into(),
                locals: 3
            }
        );
    }

    #[test]
    fn test_render() {
        let code = vec![
            VmInstr::Push(Segment::Constant, 1),
            VmInstr::Push(Segment::Constant, 2),
            VmInstr::Add,
        ];
        assert_eq!(render(&code), "push constant 1\npush constant 2\nadd\n");
    }
}
