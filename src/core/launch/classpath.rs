// ─── Classpath Linker ───
// Accumulates resolved local artifact paths into the ordered set handed to
// the entry-point invoker.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Ordered, deduplicated set of classpath entries.
///
/// Insertion order is class-loading precedence: the patched main artifact
/// first, then bundle libraries in manifest order, then plugin dependencies
/// in discovery order. Producers verify existence before registering a
/// path; no validation happens here.
#[derive(Debug, Default)]
pub struct ClasspathSet {
    entries: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl ClasspathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path, deduplicating by canonicalized form.
    ///
    /// Returns `false` when the path was already present; a duplicate is a
    /// no-op, never an error.
    pub fn push(&mut self, path: &Path) -> bool {
        let resolved = canonical_or_raw(path);
        if !self.seen.insert(resolved.clone()) {
            return false;
        }
        self.entries.push(resolved);
        true
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Join the entries with the platform classpath separator.
    pub fn join(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(classpath_separator())
    }
}

/// `;` on Windows, `:` everywhere else.
pub fn classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
