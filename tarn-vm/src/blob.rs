// tarn-vm - Compiled blobs and bytecode instructions
// Copyright (c) 2026 The tarn developers. MIT licensed.

//! Bytecode instruction definitions and compiled blobs.
//!
//! Instructions operate on the VM's value stack. Each opcode carries at most
//! one operand, typed by the opcode: an integer, a symbol, or a nested blob.
//! Jump targets are absolute indices within the enclosing blob.

use std::fmt;
use std::rc::Rc;

use tarn_core::Symbol;

/// Bytecode instructions for the tarn VM.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Push nil.
    PushNil,

    /// Push an integer constant.
    PushInteger(i64),

    /// Push the value bound to a name, searching the environment chain.
    PushVariable(Symbol),

    /// Push a closure over the current environment and the given blob.
    PushFunction(Rc<Blob>),

    /// Bind the top of the stack to a name in the innermost environment.
    /// Does not pop: a declaration evaluates to its initializer.
    DeclareVariable(Symbol),

    /// Push a fresh environment onto the environment stack.
    BlockStart,

    /// Pop the environment stack.
    BlockEnd,

    /// Drop the top of the value stack.
    Pop,

    /// Pop the condition; fall through when truthy, else jump to the
    /// absolute index (the start of the else branch).
    If(usize),

    /// Unconditional jump to the absolute index (the end of the else
    /// branch).
    Else(usize),

    /// Call the function on top of the stack with n arguments beneath it.
    Call(usize),

    /// Reserved for tail-call elimination. Executing it is an error; it must
    /// never be silently treated as `Call`.
    TailCall(usize),

    /// Print the top of the stack without popping it.
    DebugPrint,

    /// Never emitted by the compiler. Executing it is an error.
    Invalid,
}

impl Op {
    /// The opcode's mnemonic, as used in disassembly.
    pub fn name(&self) -> &'static str {
        match self {
            Op::PushNil => "PUSH_NIL",
            Op::PushInteger(_) => "PUSH_INTEGER",
            Op::PushVariable(_) => "PUSH_VARIABLE",
            Op::PushFunction(_) => "PUSH_FUNCTION",
            Op::DeclareVariable(_) => "DECLARE_VARIABLE",
            Op::BlockStart => "BLOCK_START",
            Op::BlockEnd => "BLOCK_END",
            Op::Pop => "POP",
            Op::If(_) => "IF",
            Op::Else(_) => "ELSE",
            Op::Call(_) => "CALL",
            Op::TailCall(_) => "TAILCALL",
            Op::DebugPrint => "DEBUG_PRINT",
            Op::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operand = match self {
            Op::PushInteger(i) => Some(i.to_string()),
            Op::If(t) | Op::Else(t) | Op::Call(t) | Op::TailCall(t) => Some(t.to_string()),
            Op::PushVariable(name) | Op::DeclareVariable(name) => Some(name.to_string()),
            Op::PushFunction(blob) => {
                let mut s = String::from(":");
                for arg in &blob.args {
                    s.push(' ');
                    s.push_str(arg.name());
                }
                Some(s)
            }
            _ => None,
        };
        match operand {
            Some(operand) => write!(f, "{:<18}{}", self.name(), operand),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// A compiled unit: a parameter list plus a linear instruction sequence.
///
/// Blobs are immutable after compilation and shared via `Rc`; nested
/// lambdas produce fresh blobs referenced by `PushFunction` instructions.
/// Blobs are owned by the compiled program, never by the garbage collector.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    /// Parameter names, bound in order at call time.
    pub args: Vec<Symbol>,

    /// The instruction sequence.
    pub code: Vec<Op>,
}

impl Blob {
    /// Create an empty blob with the given parameter list.
    pub fn new(args: Vec<Symbol>) -> Self {
        Blob {
            args,
            code: Vec::new(),
        }
    }

    /// The disassembly header line: `nargs = N name1 name2 …`.
    pub fn headers(&self) -> String {
        let mut s = format!("nargs = {}", self.args.len());
        for arg in &self.args {
            s.push(' ');
            s.push_str(arg.name());
        }
        s
    }
}

impl fmt::Display for Blob {
    /// Render the blob's textual form: the header line followed by one line
    /// per instruction. Debugging aid only, not a wire format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headers())?;
        for (index, op) in self.code.iter().enumerate() {
            writeln!(f, "{:<7}{}", index, op)?;
        }
        Ok(())
    }
}
