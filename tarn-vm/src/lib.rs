// tarn-vm - Bytecode compiler, virtual machine and garbage collector
// Copyright (c) 2026 The tarn developers. MIT licensed.

//! Bytecode compiler and stack-based virtual machine for tarn.
//!
//! Expression trees from `tarn-core` are lowered to blobs of bytecode and
//! executed by a VM whose environments and closures live on a heap reclaimed
//! by a tracing mark-and-sweep collector.

pub mod blob;
pub mod compiler;
pub mod heap;
pub mod value;
pub mod vm;

pub use blob::{Blob, Op};
pub use compiler::{Compiler, compile};
pub use heap::{Closure, Environment, Heap, ObjRef};
pub use value::Value;
pub use vm::{GcMode, ProgramCounter, Result, RuntimeError, ValueStack, VirtualMachine};
