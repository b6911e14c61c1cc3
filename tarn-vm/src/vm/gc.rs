// tarn-vm - Mark-and-sweep garbage collection
// Copyright (c) 2026 The tarn developers. MIT licensed.

//! Mark-and-sweep collection over the VM's heap.
//!
//! Roots are discovered here, next to the stacks that hold them: every
//! heap-tagged value on the value stack and every environment on the
//! environment stack. The return stack references only blobs, which are not
//! managed, so it contributes no roots. Tracing uses an explicit grey
//! worklist and makes no acyclicity assumption about the object graph.

use crate::heap::Color;

use super::VirtualMachine;

/// When the collector runs, relative to the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcMode {
    /// Full collection before every bytecode step. Surfaces collector bugs
    /// that a threshold cadence would hide.
    EveryStep,
    /// Full collection only once the managed-object count reaches the
    /// current threshold.
    Threshold,
}

impl Default for GcMode {
    fn default() -> Self {
        if cfg!(feature = "debug-gc") {
            GcMode::EveryStep
        } else {
            GcMode::Threshold
        }
    }
}

/// Threshold before the first collection in [`GcMode::Threshold`].
pub(crate) const GC_INITIAL_THRESHOLD: usize = 1000;

/// Constant term of the adaptive threshold: after a collection that visited
/// `w` objects, the next one runs at `3 * w + GC_THRESHOLD_BASE` objects.
const GC_THRESHOLD_BASE: usize = 1000;

impl VirtualMachine {
    /// One collection decision, taken between bytecode steps.
    pub(super) fn gc_step(&mut self) {
        match self.gc_mode {
            GcMode::EveryStep => self.mark_and_sweep(),
            GcMode::Threshold => {
                if self.heap.len() >= self.threshold {
                    self.mark_and_sweep();
                }
            }
        }
    }

    /// Run a full mark-and-sweep collection and adapt the threshold to the
    /// work performed.
    pub fn mark_and_sweep(&mut self) {
        let mut work = 0usize;
        let mut grey = Vec::new();

        // Mark roots.
        for value in self.evalstack.iter() {
            if let Some(root) = value.object() {
                work += 1;
                if self.heap.color(root) == Color::White {
                    self.heap.set_color(root, Color::Black);
                    grey.push(root);
                }
            }
        }
        for &root in &self.envstack {
            work += 1;
            if self.heap.color(root) == Color::White {
                self.heap.set_color(root, Color::Black);
                grey.push(root);
            }
        }

        // Trace.
        let mut children = Vec::new();
        while let Some(object) = grey.pop() {
            children.clear();
            self.heap.gather_children(object, &mut children);
            for &child in &children {
                work += 1;
                if self.heap.color(child) == Color::White {
                    self.heap.set_color(child, Color::Black);
                    grey.push(child);
                }
            }
        }

        // Sweep, then amortize the next collection over the work just done.
        work += self.heap.sweep();
        self.threshold = 3 * work + GC_THRESHOLD_BASE;
    }
}
