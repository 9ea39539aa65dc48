//! The compiled path document.
//!
//! A [`Document`] is the `paths` object of an OpenAPI description: path
//! template → lowercase method → operation fragment. Both levels keep
//! insertion order, so compiling the same tree always yields the same output.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Operation fragments keyed by path template, then by lowercase method.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    paths: IndexMap<String, IndexMap<String, Value>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fragment at `(path, method)`, replacing any previous one.
    pub fn set(&mut self, path: &str, method: &str, fragment: Value) {
        self.paths
            .entry(path.to_owned())
            .or_default()
            .insert(method.to_owned(), fragment);
    }

    /// Folds `other` into `self`.
    ///
    /// Paths are unioned, and so are the method maps under a shared path. A
    /// `(path, method)` pair present in both takes the fragment from `other`.
    /// Never fails.
    pub fn merge(&mut self, other: Document) {
        for (path, methods) in other.paths {
            let slot = self.paths.entry(path).or_default();
            for (method, fragment) in methods {
                slot.insert(method, fragment);
            }
        }
    }

    pub fn get(&self, path: &str, method: &str) -> Option<&Value> {
        self.paths.get(path)?.get(method)
    }

    /// The method map under `path`.
    pub fn methods(&self, path: &str) -> Option<&IndexMap<String, Value>> {
        self.paths.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Moves the methods under `from` to `to`, replacing any of the same
    /// method already there. A missing `from` leaves the document unchanged.
    pub fn rename_path(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        if let Some(methods) = self.paths.shift_remove(from) {
            let slot = self.paths.entry(to.to_owned()).or_default();
            for (method, fragment) in methods {
                slot.insert(method, fragment);
            }
        }
    }
}
