// tarn-vm - Expression to bytecode compiler
// Copyright (c) 2026 The tarn developers. MIT licensed.

//! Lowers expression trees to bytecode blobs.
//!
//! A single recursive-descent pass. Every expression compiles to a sequence
//! with a net stack effect of +1; `if` emits placeholder jumps that are
//! patched once the branch lengths are known. Compilation cannot fail:
//! operands ride in the instructions themselves, so there is no constant
//! pool to overflow.

use std::rc::Rc;

use tarn_core::{Expression, Symbol};

use crate::blob::{Blob, Op};

/// Compile an expression tree into a blob.
pub fn compile(expr: &Expression) -> Blob {
    Compiler::new(Vec::new()).compile(expr)
}

/// The bytecode compiler. One instance per blob; nested lambdas spawn a
/// fresh compiler for their body.
pub struct Compiler {
    blob: Blob,
}

impl Compiler {
    /// Create a compiler for a blob with the given parameter list.
    pub fn new(params: Vec<Symbol>) -> Self {
        Compiler {
            blob: Blob::new(params),
        }
    }

    /// Compile `expr` and return the finished blob.
    pub fn compile(mut self, expr: &Expression) -> Blob {
        self.compile_expr(expr);
        self.blob
    }

    fn compile_expr(&mut self, expr: &Expression) {
        match expr {
            Expression::Nil => self.emit(Op::PushNil),

            Expression::Integer(i) => self.emit(Op::PushInteger(*i)),

            Expression::Variable(name) => self.emit(Op::PushVariable(name.clone())),

            Expression::Lambda { params, body } => {
                let inner = Compiler::new(params.clone()).compile(body);
                self.emit(Op::PushFunction(Rc::new(inner)));
            }

            Expression::Declare { name, init } => {
                self.compile_expr(init);
                // DeclareVariable leaves the initializer on the stack: a
                // declaration is an expression and evaluates to its value.
                self.emit(Op::DeclareVariable(name.clone()));
            }

            Expression::Call { callee, args } => self.compile_call(callee, args),

            Expression::If { cond, then, else_ } => self.compile_if(cond, then, else_),

            Expression::Block(children) => self.compile_block(children),

            Expression::DebugPrint(inner) => {
                self.compile_expr(inner);
                self.emit(Op::DebugPrint);
            }
        }
    }

    /// Arguments are compiled left to right, the callee last, so the
    /// callable sits on top of the stack when `Call` dispatches.
    fn compile_call(&mut self, callee: &Expression, args: &[Expression]) {
        for arg in args {
            self.compile_expr(arg);
        }
        self.compile_expr(callee);
        self.emit(Op::Call(args.len()));
    }

    fn compile_if(&mut self, cond: &Expression, then: &Expression, else_: &Expression) {
        self.compile_expr(cond);
        let if_at = self.emit_jump(Op::If(0));
        self.compile_expr(then);
        let else_at = self.emit_jump(Op::Else(0));
        self.compile_expr(else_);
        // The false branch lands just past the Else placeholder; the taken
        // branch jumps over the entire else body.
        self.patch_jump(if_at, else_at + 1);
        let end = self.blob.code.len();
        self.patch_jump(else_at, end);
    }

    fn compile_block(&mut self, children: &[Expression]) {
        if children.is_empty() {
            self.emit(Op::PushNil);
            return;
        }

        self.emit(Op::BlockStart);

        // Discard every child's value except the last: the block evaluates
        // to its final sub-expression.
        for child in &children[..children.len() - 1] {
            self.compile_expr(child);
            self.emit(Op::Pop);
        }
        self.compile_expr(&children[children.len() - 1]);

        self.emit(Op::BlockEnd);
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn emit(&mut self, op: Op) {
        self.blob.code.push(op);
    }

    /// Emit a jump placeholder and return its offset for later patching.
    fn emit_jump(&mut self, op: Op) -> usize {
        let offset = self.blob.code.len();
        self.emit(op);
        offset
    }

    /// Point the jump at `offset` to the absolute index `target`.
    fn patch_jump(&mut self, offset: usize, target: usize) {
        match &mut self.blob.code[offset] {
            Op::If(t) | Op::Else(t) => *t = target,
            other => debug_assert!(false, "patch_jump called on non-jump: {:?}", other),
        }
    }
}
