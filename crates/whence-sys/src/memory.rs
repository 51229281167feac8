//! In-memory [`AttributeSource`] used by tests and fixtures.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use whence_error::{Result, WhenceError};

use crate::AttributeSource;

/// Files and their attributes held in memory.
///
/// A path that was never registered reads as a missing file. Every read is
/// logged so callers can assert which attributes were consulted.
#[derive(Debug, Default)]
pub struct MemoryAttributes {
    files: HashMap<PathBuf, HashMap<String, Result<Vec<u8>>>>,
    reads: RefCell<Vec<(PathBuf, String)>>,
}

impl MemoryAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` as an existing file with no attributes.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.files.entry(path.into()).or_default();
        self
    }

    /// Set attribute `name` on `path`, registering the file if needed.
    pub fn set(
        &mut self,
        path: impl Into<PathBuf>,
        name: &str,
        value: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.files
            .entry(path.into())
            .or_default()
            .insert(name.to_owned(), Ok(value.into()));
        self
    }

    /// Make every read of `name` on `path` fail with `error`.
    pub fn fail(&mut self, path: impl Into<PathBuf>, name: &str, error: WhenceError) -> &mut Self {
        self.files
            .entry(path.into())
            .or_default()
            .insert(name.to_owned(), Err(error));
        self
    }

    /// Attribute names read so far, in order, for `path`.
    #[must_use]
    pub fn reads_of(&self, path: &Path) -> Vec<String> {
        self.reads
            .borrow()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, name)| name.clone())
            .collect()
    }

    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.borrow().len()
    }
}

impl AttributeSource for MemoryAttributes {
    fn get_attribute(&self, path: &Path, name: &str) -> Result<Vec<u8>> {
        self.reads
            .borrow_mut()
            .push((path.to_path_buf(), name.to_owned()));

        let attrs = self
            .files
            .get(path)
            .ok_or_else(|| WhenceError::no_file("No such file or directory"))?;
        attrs
            .get(name)
            .cloned()
            .unwrap_or(Err(WhenceError::NoAttribute))
    }
}
