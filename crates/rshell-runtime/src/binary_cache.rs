//! Binary resolution cache.
//!
//! Maps a logical command name (`cat`) to the invocation that was found to
//! work on this host (`busybox cat`). Entries are write-once-wins and never
//! evicted: concurrent probes for the same name may both run, but only the
//! first stored answer is kept and returned to everyone.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::sync::{read, write};

/// Process-scoped memo of resolved invocations.
#[derive(Debug, Default)]
pub struct BinaryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl BinaryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached invocation for `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        read(&self.entries).get(name).cloned()
    }

    /// Store `invocation` unless `name` already has one.
    ///
    /// Returns the value that is cached after the call.
    pub fn insert(&self, name: &str, invocation: String) -> String {
        write(&self.entries)
            .entry(name.to_string())
            .or_insert(invocation)
            .clone()
    }

    /// Number of cached names.
    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    /// Whether nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        read(&self.entries).is_empty()
    }
}
