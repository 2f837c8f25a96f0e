//! Single-pass compilation engine.
//!
//! Walks the token stream once, writing stack machine code and the
//! tagged syntax tree echo as it goes. There is no intermediate tree;
//! grammar productions map directly onto `compile_*` methods.
use crate::{
    charmap,
    echo::SyntaxEcho,
    error::{CompileError, CompileResult},
    labels::LabelMaker,
    symbol::{Scope, SymbolTable, Var, VarKind},
    token_stream::TokenStream,
    tokens::{Keyword, Pos, Sym, Token, TokenKind},
    vm_writer::{render, Segment, VmInstr, VmWriter},
};

use smol_str::SmolStr;
use std::collections::BTreeSet;

/// Output of a compilation run.
#[derive(Debug)]
pub struct Compiled {
    /// Stack machine instructions for every class in the unit.
    pub code: Vec<VmInstr>,
    /// Tagged syntax tree mirroring the consumed tokens.
    pub tree: String,
}

impl Compiled {
    /// Instructions rendered as source text, one per line.
    pub fn vm_text(&self) -> String {
        render(&self.code)
    }
}

pub struct Compiler {
    stream: TokenStream,
    symbols: SymbolTable,
    labels: LabelMaker,
    vm: VmWriter,
    tree: SyntaxEcho,
    class_name: SmolStr,
    /// Names of methods declared by the class currently being
    /// compiled. Collected up front so bare calls to methods declared
    /// later in the class still receive the receiver push.
    method_names: BTreeSet<SmolStr>,
}

impl Compiler {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            symbols: SymbolTable::new(),
            labels: LabelMaker::new(),
            vm: VmWriter::new(),
            tree: SyntaxEcho::new(),
            class_name: SmolStr::default(),
            method_names: BTreeSet::new(),
        }
    }

    /// Compile every class in the token stream.
    pub fn compile(mut self) -> CompileResult<Compiled> {
        while !self.stream.is_at_end() {
            self.compile_class()?;
        }

        Ok(Compiled {
            code: self.vm.into_code(),
            tree: self.tree.finish(),
        })
    }

    // ------------------------------------------------------------------
    // Token plumbing

    fn eat_any(&mut self) -> CompileResult<Token> {
        let token = self.stream.advance()?;
        self.tree.token(&token);
        Ok(token)
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> CompileResult<Token> {
        let token = self.stream.expect_keyword(keyword)?;
        self.tree.token(&token);
        Ok(token)
    }

    fn eat_sym(&mut self, sym: Sym) -> CompileResult<Token> {
        let token = self.stream.expect_sym(sym)?;
        self.tree.token(&token);
        Ok(token)
    }

    fn eat_ident(&mut self) -> CompileResult<Token> {
        let token = self.stream.expect_ident()?;
        self.tree.token(&token);
        Ok(token)
    }

    /// A type is `int`, `char`, `boolean` or a class name.
    fn eat_type(&mut self) -> CompileResult<Token> {
        let is_type = matches!(
            self.stream.peek_keyword(),
            Some(Keyword::Int | Keyword::Char | Keyword::Boolean)
        ) || matches!(
            self.stream.peek(),
            Some(Token {
                kind: TokenKind::Ident,
                ..
            })
        );

        if is_type {
            self.eat_any()
        } else {
            Err(CompileError::syntax("a type", self.stream.peek().cloned()))
        }
    }

    // ------------------------------------------------------------------
    // Symbols

    fn declare(
        &mut self,
        scope: Scope,
        name: &str,
        ty: &str,
        kind: VarKind,
        pos: Pos,
    ) -> CompileResult<Var> {
        self.symbols
            .declare(scope, name, ty, kind)
            .map_err(|err| CompileError::DuplicateSymbol {
                name: err.name,
                pos,
            })
    }

    fn resolve_var(&self, token: &Token) -> CompileResult<Var> {
        self.symbols
            .resolve(&token.text)
            .cloned()
            .ok_or_else(|| CompileError::UnresolvedIdentifier {
                name: token.text.clone(),
                pos: token.pos,
            })
    }

    // ------------------------------------------------------------------
    // Declarations

    fn compile_class(&mut self) -> CompileResult<()> {
        self.tree.open("class");
        self.eat_keyword(Keyword::Class)?;

        let name = self.eat_ident()?;
        self.class_name = name.text.clone();
        self.symbols.reset(Scope::Class);
        self.labels.enter_class(self.class_name.clone());

        self.eat_sym(Sym::LBrace)?;
        self.scan_method_names();

        while matches!(
            self.stream.peek_keyword(),
            Some(Keyword::Static | Keyword::Field)
        ) {
            self.compile_class_var_dec()?;
        }

        while let Some(kind @ (Keyword::Constructor | Keyword::Function | Keyword::Method)) =
            self.stream.peek_keyword()
        {
            self.compile_subroutine(kind)?;
        }

        self.eat_sym(Sym::RBrace)?;
        self.tree.close("class");
        Ok(())
    }

    /// Collect the names of this class's methods before compiling its
    /// body. A bare call is only a method call on the current object
    /// when the callee is declared in the same class, possibly below
    /// the call site.
    fn scan_method_names(&mut self) {
        self.method_names.clear();

        // Depth 1 is the class body itself.
        let mut depth = 1u32;
        let tokens = self.stream.remaining();

        for (index, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::Sym(Sym::LBrace) => depth += 1,
                TokenKind::Sym(Sym::RBrace) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                // `method <type> <name>`
                TokenKind::Keyword(Keyword::Method) if depth == 1 => {
                    if let Some(name) = tokens.get(index + 2) {
                        if name.kind == TokenKind::Ident {
                            self.method_names.insert(name.text.clone());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn compile_class_var_dec(&mut self) -> CompileResult<()> {
        self.tree.open("classVarDec");

        let kind = match self.stream.peek_keyword() {
            Some(Keyword::Static) => VarKind::Static,
            _ => VarKind::This,
        };
        self.eat_any()?;

        let ty = self.eat_type()?;
        loop {
            let name = self.eat_ident()?;
            self.declare(Scope::Class, &name.text, &ty.text, kind, name.pos)?;

            if self.stream.peek_sym() == Some(Sym::Comma) {
                self.eat_sym(Sym::Comma)?;
            } else {
                break;
            }
        }
        self.eat_sym(Sym::Semi)?;

        self.tree.close("classVarDec");
        Ok(())
    }

    fn compile_subroutine(&mut self, kind: Keyword) -> CompileResult<()> {
        self.tree.open("subroutineDec");
        self.symbols.reset(Scope::Subroutine);

        self.eat_keyword(kind)?;
        if self.stream.peek_keyword() == Some(Keyword::Void) {
            self.eat_any()?;
        } else {
            self.eat_type()?;
        }
        let name = self.eat_ident()?;

        // The local count is patched in once `var` declarations are done.
        let header = self
            .vm
            .begin_function(format!("{}.{}", self.class_name, name.text));

        match kind {
            Keyword::Method => {
                // The receiver is the hidden argument 0.
                let class_name = self.class_name.clone();
                self.declare(
                    Scope::Subroutine,
                    "this",
                    &class_name,
                    VarKind::Argument,
                    name.pos,
                )?;
                self.vm.emit(VmInstr::Push(Segment::Argument, 0));
                self.vm.emit(VmInstr::Pop(Segment::Pointer, 0));
            }
            Keyword::Constructor => {
                let fields = self.symbols.count(Scope::Class, VarKind::This);
                self.vm.emit(VmInstr::Push(Segment::Constant, fields));
                self.vm.emit(VmInstr::Call {
                    name: "Memory.alloc".into(),
                    args: 1,
                });
                self.vm.emit(VmInstr::Pop(Segment::Pointer, 0));
            }
            _ => {}
        }

        self.eat_sym(Sym::LParen)?;
        self.compile_parameter_list()?;
        self.eat_sym(Sym::RParen)?;

        self.tree.open("subroutineBody");
        self.eat_sym(Sym::LBrace)?;
        while self.stream.peek_keyword() == Some(Keyword::Var) {
            self.compile_var_dec()?;
        }
        self.vm
            .set_locals(header, self.symbols.count(Scope::Subroutine, VarKind::Local));

        self.compile_statements()?;
        self.eat_sym(Sym::RBrace)?;
        self.tree.close("subroutineBody");

        self.tree.close("subroutineDec");
        Ok(())
    }

    /// Parameters continue the argument numbering; in a method the
    /// receiver already occupies argument 0.
    fn compile_parameter_list(&mut self) -> CompileResult<()> {
        self.tree.open("parameterList");

        if self.stream.peek_sym() != Some(Sym::RParen) {
            loop {
                let ty = self.eat_type()?;
                let name = self.eat_ident()?;
                self.declare(
                    Scope::Subroutine,
                    &name.text,
                    &ty.text,
                    VarKind::Argument,
                    name.pos,
                )?;

                if self.stream.peek_sym() == Some(Sym::Comma) {
                    self.eat_sym(Sym::Comma)?;
                } else {
                    break;
                }
            }
        }

        self.tree.close("parameterList");
        Ok(())
    }

    fn compile_var_dec(&mut self) -> CompileResult<()> {
        self.tree.open("varDec");
        self.eat_keyword(Keyword::Var)?;

        let ty = self.eat_type()?;
        loop {
            let name = self.eat_ident()?;
            self.declare(
                Scope::Subroutine,
                &name.text,
                &ty.text,
                VarKind::Local,
                name.pos,
            )?;

            if self.stream.peek_sym() == Some(Sym::Comma) {
                self.eat_sym(Sym::Comma)?;
            } else {
                break;
            }
        }
        self.eat_sym(Sym::Semi)?;

        self.tree.close("varDec");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements

    fn compile_statements(&mut self) -> CompileResult<()> {
        self.tree.open("statements");

        loop {
            match self.stream.peek_keyword() {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => break,
            }
        }

        self.tree.close("statements");
        Ok(())
    }

    fn compile_let(&mut self) -> CompileResult<()> {
        self.tree.open("letStatement");
        self.eat_keyword(Keyword::Let)?;

        let name = self.eat_ident()?;
        let var = self.resolve_var(&name)?;

        if self.stream.peek_sym() == Some(Sym::LBracket) {
            // Element address is index plus base.
            self.eat_sym(Sym::LBracket)?;
            self.compile_expression()?;
            self.eat_sym(Sym::RBracket)?;
            self.vm.emit(VmInstr::Push(var.kind.segment(), var.index));
            self.vm.emit(VmInstr::Add);

            self.eat_sym(Sym::Eq)?;
            self.compile_expression()?;
            self.eat_sym(Sym::Semi)?;

            // Park the value in temp 0 while `that` is re-aimed at the
            // element address.
            self.vm.emit(VmInstr::Pop(Segment::Temp, 0));
            self.vm.emit(VmInstr::Pop(Segment::Pointer, 1));
            self.vm.emit(VmInstr::Push(Segment::Temp, 0));
            self.vm.emit(VmInstr::Pop(Segment::That, 0));
        } else {
            self.eat_sym(Sym::Eq)?;
            self.compile_expression()?;
            self.eat_sym(Sym::Semi)?;
            self.vm.emit(VmInstr::Pop(var.kind.segment(), var.index));
        }

        self.tree.close("letStatement");
        Ok(())
    }

    fn compile_if(&mut self) -> CompileResult<()> {
        self.tree.open("ifStatement");
        self.eat_keyword(Keyword::If)?;

        self.eat_sym(Sym::LParen)?;
        self.compile_expression()?;
        self.eat_sym(Sym::RParen)?;

        let else_label = self.labels.fresh();
        let end_label = self.labels.fresh();

        // Inverted test so the then-branch falls through.
        self.vm.emit(VmInstr::Not);
        self.vm.emit(VmInstr::IfGoto(else_label.clone()));

        self.eat_sym(Sym::LBrace)?;
        self.compile_statements()?;
        self.eat_sym(Sym::RBrace)?;

        self.vm.emit(VmInstr::Goto(end_label.clone()));
        self.vm.emit(VmInstr::Label(else_label));

        if self.stream.peek_keyword() == Some(Keyword::Else) {
            self.eat_keyword(Keyword::Else)?;
            self.eat_sym(Sym::LBrace)?;
            self.compile_statements()?;
            self.eat_sym(Sym::RBrace)?;
        }
        self.vm.emit(VmInstr::Label(end_label));

        self.tree.close("ifStatement");
        Ok(())
    }

    fn compile_while(&mut self) -> CompileResult<()> {
        self.tree.open("whileStatement");
        self.eat_keyword(Keyword::While)?;

        let top_label = self.labels.fresh();
        let exit_label = self.labels.fresh();
        self.vm.emit(VmInstr::Label(top_label.clone()));

        self.eat_sym(Sym::LParen)?;
        self.compile_expression()?;
        self.eat_sym(Sym::RParen)?;

        self.vm.emit(VmInstr::Not);
        self.vm.emit(VmInstr::IfGoto(exit_label.clone()));

        self.eat_sym(Sym::LBrace)?;
        self.compile_statements()?;
        self.eat_sym(Sym::RBrace)?;

        self.vm.emit(VmInstr::Goto(top_label));
        self.vm.emit(VmInstr::Label(exit_label));

        self.tree.close("whileStatement");
        Ok(())
    }

    fn compile_do(&mut self) -> CompileResult<()> {
        self.tree.open("doStatement");
        self.eat_keyword(Keyword::Do)?;

        let name = self.eat_ident()?;
        self.compile_call(name)?;
        self.eat_sym(Sym::Semi)?;

        // The call's return value is unused; discard it.
        self.vm.emit(VmInstr::Pop(Segment::Temp, 0));

        self.tree.close("doStatement");
        Ok(())
    }

    fn compile_return(&mut self) -> CompileResult<()> {
        self.tree.open("returnStatement");
        self.eat_keyword(Keyword::Return)?;

        if self.stream.peek_sym() == Some(Sym::Semi) {
            // Every subroutine returns a value; void returns zero.
            self.vm.emit(VmInstr::Push(Segment::Constant, 0));
        } else {
            self.compile_expression()?;
        }
        self.eat_sym(Sym::Semi)?;
        self.vm.emit(VmInstr::Return);

        self.tree.close("returnStatement");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Expressions

    /// Operators are applied strictly left to right; there is no
    /// precedence between them.
    fn compile_expression(&mut self) -> CompileResult<()> {
        self.tree.open("expression");

        self.compile_term()?;
        while let Some(op) = self.stream.peek_sym().filter(|sym| sym.is_binary_op()) {
            self.eat_sym(op)?;
            self.compile_term()?;
            self.emit_binary(op);
        }

        self.tree.close("expression");
        Ok(())
    }

    fn emit_binary(&mut self, op: Sym) {
        let instr = match op {
            Sym::Plus => VmInstr::Add,
            Sym::Minus => VmInstr::Sub,
            Sym::Amp => VmInstr::And,
            Sym::Pipe => VmInstr::Or,
            Sym::Lt => VmInstr::Lt,
            Sym::Gt => VmInstr::Gt,
            Sym::Eq => VmInstr::Eq,
            // Multiplication and division are runtime calls.
            Sym::Star => VmInstr::Call {
                name: "Math.multiply".into(),
                args: 2,
            },
            Sym::Slash => VmInstr::Call {
                name: "Math.divide".into(),
                args: 2,
            },
            // Callers filter on `is_binary_op`.
            _ => return,
        };
        self.vm.emit(instr);
    }

    fn compile_term(&mut self) -> CompileResult<()> {
        self.tree.open("term");

        match self.stream.peek().map(|token| token.kind) {
            Some(TokenKind::IntConst) => {
                let token = self.eat_any()?;
                match token.text.parse::<u16>().ok().filter(|n| *n <= 32767) {
                    Some(value) => self.vm.emit(VmInstr::Push(Segment::Constant, value)),
                    None => {
                        return Err(CompileError::syntax(
                            "an integer constant no greater than 32767",
                            Some(token),
                        ))
                    }
                }
            }
            Some(TokenKind::StrConst) => {
                let token = self.eat_any()?;
                self.compile_string(&token)?;
            }
            Some(TokenKind::Keyword(Keyword::True)) => {
                self.eat_any()?;
                self.vm.emit(VmInstr::Push(Segment::Constant, 1));
                self.vm.emit(VmInstr::Neg);
            }
            Some(TokenKind::Keyword(Keyword::False | Keyword::Null)) => {
                self.eat_any()?;
                self.vm.emit(VmInstr::Push(Segment::Constant, 0));
            }
            Some(TokenKind::Keyword(Keyword::This)) => {
                self.eat_any()?;
                self.vm.emit(VmInstr::Push(Segment::Pointer, 0));
            }
            Some(TokenKind::Sym(Sym::LParen)) => {
                self.eat_sym(Sym::LParen)?;
                self.compile_expression()?;
                self.eat_sym(Sym::RParen)?;
            }
            Some(TokenKind::Sym(Sym::Minus)) => {
                self.eat_sym(Sym::Minus)?;
                self.compile_term()?;
                self.vm.emit(VmInstr::Neg);
            }
            Some(TokenKind::Sym(Sym::Tilde)) => {
                self.eat_sym(Sym::Tilde)?;
                self.compile_term()?;
                self.vm.emit(VmInstr::Not);
            }
            Some(TokenKind::Ident) => {
                let next_sym = match self.stream.peek_at(1) {
                    Some(Token {
                        kind: TokenKind::Sym(sym),
                        ..
                    }) => Some(*sym),
                    _ => None,
                };

                match next_sym {
                    Some(Sym::LBracket) => {
                        let name = self.eat_ident()?;
                        let var = self.resolve_var(&name)?;

                        self.eat_sym(Sym::LBracket)?;
                        self.compile_expression()?;
                        self.eat_sym(Sym::RBracket)?;

                        self.vm.emit(VmInstr::Push(var.kind.segment(), var.index));
                        self.vm.emit(VmInstr::Add);
                        self.vm.emit(VmInstr::Pop(Segment::Pointer, 1));
                        self.vm.emit(VmInstr::Push(Segment::That, 0));
                    }
                    Some(Sym::LParen | Sym::Dot) => {
                        let name = self.eat_ident()?;
                        self.compile_call(name)?;
                    }
                    _ => {
                        let name = self.eat_ident()?;
                        let var = self.resolve_var(&name)?;
                        self.vm.emit(VmInstr::Push(var.kind.segment(), var.index));
                    }
                }
            }
            _ => return Err(CompileError::syntax("a term", self.stream.peek().cloned())),
        }

        self.tree.close("term");
        Ok(())
    }

    /// A string constant builds a runtime string object character by
    /// character.
    fn compile_string(&mut self, token: &Token) -> CompileResult<()> {
        let length = token.text.chars().count() as u16;
        self.vm.emit(VmInstr::Push(Segment::Constant, length));
        self.vm.emit(VmInstr::Call {
            name: "String.new".into(),
            args: 1,
        });

        for c in token.text.chars() {
            match charmap::char_code(c) {
                Some(code) => {
                    self.vm.emit(VmInstr::Push(Segment::Constant, code));
                    self.vm.emit(VmInstr::Call {
                        name: "String.appendChar".into(),
                        args: 2,
                    });
                }
                None => {
                    return Err(CompileError::MalformedCharacter {
                        ch: c,
                        pos: token.pos,
                    })
                }
            }
        }
        Ok(())
    }

    /// Compile a subroutine call. `name` is the first identifier of the
    /// callee, already consumed.
    ///
    /// Resolution order for `name.member(...)`: if `name` is a visible
    /// variable this is a method call on that object, dispatched on the
    /// variable's declared type with the object as hidden argument 0.
    /// Otherwise `name` is taken as a class name. A bare `name(...)` is
    /// a method call on the current object when the class declares a
    /// method of that name, else a function call on `name` as a class.
    fn compile_call(&mut self, name: Token) -> CompileResult<()> {
        let mut implicit_args = 0u16;

        let target: SmolStr = if self.stream.peek_sym() == Some(Sym::Dot) {
            self.eat_sym(Sym::Dot)?;
            let member = self.eat_ident()?;

            match self.symbols.resolve(&name.text).cloned() {
                Some(var) => {
                    self.vm.emit(VmInstr::Push(var.kind.segment(), var.index));
                    implicit_args = 1;
                    format!("{}.{}", var.ty, member.text).into()
                }
                None => format!("{}.{}", capitalized(&name.text), member.text).into(),
            }
        } else if self.method_names.contains(name.text.as_str()) {
            self.vm.emit(VmInstr::Push(Segment::Pointer, 0));
            implicit_args = 1;
            format!("{}.{}", self.class_name, name.text).into()
        } else {
            capitalized(&name.text).into()
        };

        self.eat_sym(Sym::LParen)?;
        let args = self.compile_expression_list()?;
        self.eat_sym(Sym::RParen)?;

        self.vm.emit(VmInstr::Call {
            name: target,
            args: args + implicit_args,
        });
        Ok(())
    }

    fn compile_expression_list(&mut self) -> CompileResult<u16> {
        self.tree.open("expressionList");

        let mut count = 0u16;
        if self.stream.peek_sym() != Some(Sym::RParen) {
            loop {
                self.compile_expression()?;
                count += 1;

                if self.stream.peek_sym() == Some(Sym::Comma) {
                    self.eat_sym(Sym::Comma)?;
                } else {
                    break;
                }
            }
        }

        self.tree.close("expressionList");
        Ok(count)
    }
}

/// Upper-case the first character of a presumed class name.
///
/// Names that already start with an upper-case letter (or anything
/// that is not a lower-case ASCII letter) pass through unchanged.
fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            let mut out = String::with_capacity(name.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::tokenize;

    fn compile_source(source: &str) -> CompileResult<Compiled> {
        Compiler::new(tokenize(source).unwrap()).compile()
    }

    #[test]
    fn test_capitalized() {
        assert_eq!(capitalized("output"), "Output");
        assert_eq!(capitalized("Output"), "Output");
        assert_eq!(capitalized("x2"), "X2");
        assert_eq!(capitalized(""), "");
    }

    #[test]
    fn test_method_scan_ignores_nested_braces() {
        let source = r#"
            class Widget {
                function void helper() {
                    if (true) { return; }
                    return;
                }
                method void poke() { return; }
                function void main() {
                    do poke();
                    return;
                }
            }
        "#;
        let compiled = compile_source(source).unwrap();
        let text = compiled.vm_text();
        assert!(text.contains("push pointer 0\ncall Widget.poke 1"));
    }

    #[test]
    fn test_empty_token_stream_compiles_to_nothing() {
        let compiled = compile_source("").unwrap();
        assert!(compiled.code.is_empty());
        assert!(compiled.tree.is_empty());
    }
}
