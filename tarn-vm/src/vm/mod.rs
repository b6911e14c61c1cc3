// tarn-vm - Stack-based virtual machine for tarn bytecode
// Copyright (c) 2026 The tarn developers. MIT licensed.

//! Stack-based virtual machine for executing tarn bytecode.
//!
//! The VM runs a single dispatch loop over three stacks: the value stack,
//! the return stack (saved program counters) and the environment stack
//! (whose top is the current lexical scope). A garbage-collection step runs
//! between bytecode steps, never inside a handler.

pub mod error;
pub mod gc;
pub mod stack;

use std::io::{self, Write};
use std::rc::Rc;

use log::trace;

use crate::blob::{Blob, Op};
use crate::heap::{Heap, ObjRef};
use crate::value::Value;

pub use error::{Result, RuntimeError};
pub use gc::GcMode;
pub use stack::ValueStack;

use gc::GC_INITIAL_THRESHOLD;

/// Execution position: a blob and an index into its instruction list.
#[derive(Debug, Clone)]
pub struct ProgramCounter {
    blob: Rc<Blob>,
    index: usize,
}

impl ProgramCounter {
    /// Point at the first instruction of `blob`.
    pub fn new(blob: Rc<Blob>) -> Self {
        ProgramCounter { blob, index: 0 }
    }

    /// True once every instruction in the blob has executed.
    pub fn done(&self) -> bool {
        self.index >= self.blob.code.len()
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn fetch(&self) -> Result<Op> {
        self.blob
            .code
            .get(self.index)
            .cloned()
            .ok_or(RuntimeError::InvalidInstruction(
                "instruction index out of range",
            ))
    }
}

/// The tarn virtual machine.
pub struct VirtualMachine {
    /// Value stack.
    evalstack: ValueStack,

    /// Return stack: program counters saved by calls.
    retstack: Vec<ProgramCounter>,

    /// Environment stack; the top is the current environment.
    envstack: Vec<ObjRef>,

    /// The instruction about to execute.
    pc: ProgramCounter,

    /// Managed objects created by this VM.
    heap: Heap,

    /// Managed-object count that triggers the next threshold collection.
    threshold: usize,

    /// Collection cadence.
    gc_mode: GcMode,

    /// Sink for `DebugPrint` output.
    output: Box<dyn Write>,
}

impl VirtualMachine {
    /// Create a VM that starts executing at `pc`, with the compile-time
    /// default GC mode. The root environment is created internally.
    pub fn new(pc: ProgramCounter) -> Self {
        Self::with_gc_mode(pc, GcMode::default())
    }

    /// Create a VM with an explicit GC mode.
    pub fn with_gc_mode(pc: ProgramCounter, gc_mode: GcMode) -> Self {
        let mut heap = Heap::new();
        let root = heap.alloc_env(None);
        VirtualMachine {
            evalstack: ValueStack::new(),
            retstack: Vec::new(),
            envstack: vec![root],
            pc,
            heap,
            threshold: GC_INITIAL_THRESHOLD,
            gc_mode,
            output: Box::new(io::stdout()),
        }
    }

    /// Redirect `DebugPrint` output, e.g. into a buffer for tests.
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    /// Execute until the outermost blob completes. The program's result is
    /// the top of the value stack afterwards (see [`top`](Self::top)).
    pub fn run(&mut self) -> Result<()> {
        while !(self.retstack.is_empty() && self.pc.done()) {
            self.gc_step();

            if self.pc.done() {
                // Return: restore the caller's position and drop the
                // callee's environment. The callee's final value stays on
                // the stack as the call's result.
                self.pc = self.retstack.pop().expect("return with empty return stack");
                self.envstack.pop();
                continue;
            }

            let op = self.pc.fetch()?;
            trace!(
                "{:p} {:<7}{}",
                Rc::as_ptr(&self.pc.blob),
                self.pc.index,
                op
            );
            self.execute(op)?;
        }
        Ok(())
    }

    fn execute(&mut self, op: Op) -> Result<()> {
        match op {
            Op::PushNil => {
                self.evalstack.push(Value::Nil);
                self.pc.advance();
            }

            Op::PushInteger(i) => {
                self.evalstack.push(Value::Integer(i));
                self.pc.advance();
            }

            Op::PushVariable(name) => {
                let value = self.heap.get_var(self.current_env(), &name)?;
                self.evalstack.push(value);
                self.pc.advance();
            }

            Op::PushFunction(blob) => {
                let closure = self.heap.alloc_closure(self.current_env(), blob);
                self.evalstack.push(Value::Function(closure));
                self.pc.advance();
            }

            Op::DeclareVariable(name) => {
                // The declared value stays on the stack: declarations are
                // expressions.
                let value = self.evalstack.peek(0)?;
                self.heap.declare_var(self.current_env(), name, value)?;
                self.pc.advance();
            }

            Op::BlockStart => {
                let env = self.heap.alloc_env(Some(self.current_env()));
                self.envstack.push(env);
                self.pc.advance();
            }

            Op::BlockEnd => {
                if self.envstack.len() <= 1 {
                    return Err(RuntimeError::InvalidInstruction(
                        "environment stack underflow",
                    ));
                }
                self.envstack.pop();
                self.pc.advance();
            }

            Op::Pop => {
                self.evalstack.pop()?;
                self.pc.advance();
            }

            Op::If(target) => {
                let cond = self.evalstack.pop()?;
                if cond.truthy() {
                    self.pc.advance();
                } else {
                    self.jump(target)?;
                }
            }

            Op::Else(target) => {
                self.jump(target)?;
            }

            Op::Call(argc) => {
                self.call(argc)?;
            }

            Op::DebugPrint => {
                let value = self.evalstack.peek(0)?;
                match value {
                    Value::Integer(i) => {
                        let _ = writeln!(self.output, "INTEGER({})", i);
                    }
                    other => {
                        let _ = writeln!(self.output, "{}", other.type_name());
                    }
                }
                self.pc.advance();
            }

            Op::TailCall(_) => {
                return Err(RuntimeError::InvalidInstruction("TAILCALL is reserved"));
            }

            Op::Invalid => {
                return Err(RuntimeError::InvalidInstruction("INVALID opcode"));
            }
        }
        Ok(())
    }

    /// Call the function on top of the stack with `argc` arguments beneath
    /// it, in source order (argument 0 is the deepest).
    fn call(&mut self, argc: usize) -> Result<()> {
        let callee = self.evalstack.peek(0)?;
        let Value::Function(function) = callee else {
            return Err(RuntimeError::NotCallable(callee.type_name()));
        };

        // The return address is the instruction after the call.
        self.pc.advance();
        self.retstack.push(self.pc.clone());
        self.evalstack.pop()?;

        let closure = self.heap.closure(function)?;
        let captured = closure.env;
        let blob = Rc::clone(&closure.blob);

        // A fresh environment chained to the *captured* environment, not the
        // caller's: lexical scope, not dynamic.
        let env = self.heap.alloc_env(Some(captured));
        self.envstack.push(env);

        if argc != blob.args.len() {
            return Err(RuntimeError::Arity {
                expected: blob.args.len(),
                got: argc,
            });
        }

        let base = self
            .evalstack
            .len()
            .checked_sub(argc)
            .ok_or(RuntimeError::StackUnderflow)?;
        for (j, param) in blob.args.iter().enumerate() {
            let value = self.evalstack.get(base + j)?;
            // declare, not insert: duplicate parameter names fail here.
            self.heap.declare_var(env, param.clone(), value)?;
        }
        self.evalstack.truncate(base);

        self.pc = ProgramCounter::new(blob);
        Ok(())
    }

    fn jump(&mut self, target: usize) -> Result<()> {
        // Jumping to code.len() is a jump to the end of the blob; anything
        // past that is malformed bytecode.
        if target > self.pc.blob.code.len() {
            return Err(RuntimeError::InvalidInstruction("jump target out of range"));
        }
        self.pc.index = target;
        Ok(())
    }

    fn current_env(&self) -> ObjRef {
        *self
            .envstack
            .last()
            .expect("environment stack is never empty")
    }

    // =========================================================================
    // Observability (for tests and embedders)
    // =========================================================================

    /// Current value-stack depth.
    pub fn stack_depth(&self) -> usize {
        self.evalstack.len()
    }

    /// The top of the value stack, which after a completed run is the
    /// program's result.
    pub fn top(&self) -> Option<Value> {
        self.evalstack.peek(0).ok()
    }

    /// Current environment-stack depth (1 = just the root environment).
    pub fn env_depth(&self) -> usize {
        self.envstack.len()
    }

    /// Number of live managed objects.
    pub fn object_count(&self) -> usize {
        self.heap.len()
    }
}
