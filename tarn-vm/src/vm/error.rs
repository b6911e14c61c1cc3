// tarn-vm - Runtime errors for the VM
// Copyright (c) 2026 The tarn developers. MIT licensed.

//! Runtime errors for the VM.

use tarn_core::Symbol;

/// Runtime error during VM execution. Every variant is fatal to the current
/// `run`; the VM makes no attempt at recovery.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// Stack underflow.
    StackUnderflow,
    /// Name lookup failed on the whole environment chain.
    NoSuchName(Symbol),
    /// Name already bound in the innermost environment.
    AlreadyDeclared(Symbol),
    /// Called a value that is not a function.
    NotCallable(&'static str),
    /// Wrong number of arguments.
    Arity { expected: usize, got: usize },
    /// Reserved or malformed bytecode reached the dispatch loop.
    InvalidInstruction(&'static str),
    /// Internal error.
    Internal(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::StackUnderflow => write!(f, "Stack underflow"),
            RuntimeError::NoSuchName(name) => write!(f, "No such name {}", name),
            RuntimeError::AlreadyDeclared(name) => {
                write!(f, "Already declared name {}", name)
            }
            RuntimeError::NotCallable(type_name) => {
                write!(f, "Not callable: {}", type_name)
            }
            RuntimeError::Arity { expected, got } => {
                write!(f, "Expected {} args but got {}", expected, got)
            }
            RuntimeError::InvalidInstruction(what) => {
                write!(f, "Invalid instruction: {}", what)
            }
            RuntimeError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for VM operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
