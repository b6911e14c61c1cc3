// tarn-vm - Common test utilities
// Copyright (c) 2026 The tarn developers. MIT licensed.

//! Shared helpers for tarn-vm integration tests.
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use tarn_core::Expression;
use tarn_vm::{GcMode, ProgramCounter, RuntimeError, VirtualMachine, compile};

/// An output sink that can be read back after the VM has consumed it.
#[derive(Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything the VM has written so far.
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("output is valid utf-8")
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compile `expr` and run it under `mode`, capturing `DEBUG_PRINT` output.
/// Returns the VM (for its observability accessors), the captured output
/// and the run result.
#[allow(dead_code)]
pub fn run_program(
    expr: &Expression,
    mode: GcMode,
) -> (VirtualMachine, SharedOutput, Result<(), RuntimeError>) {
    let blob = Rc::new(compile(expr));
    let out = SharedOutput::new();
    let mut vm = VirtualMachine::with_gc_mode(ProgramCounter::new(blob), mode)
        .with_output(Box::new(out.clone()));
    let result = vm.run();
    (vm, out, result)
}

/// Run under `mode` and return the captured output, or the error message.
#[allow(dead_code)]
pub fn compile_and_run(expr: &Expression, mode: GcMode) -> Result<String, String> {
    let (_vm, out, result) = run_program(expr, mode);
    match result {
        Ok(()) => Ok(out.contents()),
        Err(e) => Err(e.to_string()),
    }
}

/// Assert that the program prints exactly `expected`, under both GC
/// cadences: collection timing must never be observable.
#[allow(dead_code)]
pub fn expect_output(expr: &Expression, expected: &str) {
    for mode in [GcMode::EveryStep, GcMode::Threshold] {
        let output = compile_and_run(expr, mode)
            .unwrap_or_else(|e| panic!("run failed under {:?}: {}", mode, e));
        assert_eq!(output, expected, "output mismatch under {:?}", mode);
    }
}
