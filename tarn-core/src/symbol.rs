// tarn-core - Symbol type with interning
// Copyright (c) 2026 The tarn developers. MIT licensed.

//! Symbols are interned identifiers.
//!
//! # Interning
//!
//! Symbols are interned through a global table, so two symbols created from
//! the same text share the same underlying storage. This provides:
//!
//! - **O(1) equality**: comparing symbols is a pointer comparison
//! - **O(1) hashing**: the hash is computed from the pointer address
//! - **Memory efficiency**: identical names share storage
//!
//! # Memory Behaviour
//!
//! Interned symbols are never deallocated: the global table keeps a strong
//! `Arc` to every name created during the program's lifetime, and the
//! garbage collector never touches them. Memory grows monotonically with the
//! number of *unique* names, which is bounded by the source program.
//!
//! # Thread Safety
//!
//! The intern table is protected by a `Mutex`, so symbol creation is
//! thread-safe (and serialized). Comparison and hashing are lock-free.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

/// An interned identifier.
///
/// Two symbols are equal iff they were created from the same text.
#[derive(Clone)]
pub struct Symbol {
    name: Arc<str>,
}

/// Global intern table
static INTERN_TABLE: OnceLock<Mutex<HashMap<String, Arc<str>>>> = OnceLock::new();

fn intern(name: &str) -> Arc<str> {
    let table = INTERN_TABLE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut table = table
        .lock()
        .expect("intern table mutex poisoned: another thread panicked while holding the lock");
    if let Some(existing) = table.get(name) {
        Arc::clone(existing)
    } else {
        let interned: Arc<str> = Arc::from(name);
        table.insert(name.to_string(), Arc::clone(&interned));
        interned
    }
}

impl Symbol {
    /// Intern a name and return its symbol.
    pub fn new(name: &str) -> Self {
        Symbol { name: intern(name) }
    }

    /// Get the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        // Due to interning, pointer comparison is sufficient
        Arc::ptr_eq(&self.name, &other.name)
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Use pointer hash for interned symbols
        Arc::as_ptr(&self.name).hash(state);
    }
}

// ============================================================================
// Tests
// ============================================================================
