//! Ordered list of owned strings.
//!
//! Used both as a string builder (paths, registry keys) and as the container
//! for delimited records after [`split`].

use std::ops::Index;

/// Growable, insertion-ordered sequence of owned strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringList {
    strings: Vec<String>,
}

impl StringList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            strings: Vec::with_capacity(capacity),
        }
    }

    /// Append a copy of `s`.
    pub fn add(&mut self, s: &str) {
        self.strings.push(s.to_owned());
    }

    /// Append `s`, taking ownership of its buffer without copying.
    pub fn add_owned(&mut self, s: String) {
        self.strings.push(s);
    }

    /// Concatenate every element, without separator, into a new string.
    #[must_use]
    pub fn join(&self) -> String {
        self.strings.concat()
    }

    /// Drop every element but keep the backing storage.
    pub fn clear(&mut self) {
        self.strings.clear();
    }

    /// Consume the list, dropping every element and the backing storage.
    pub fn release(self) {
        drop(self);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.strings.capacity()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.strings.last().map(String::as_str)
    }

    /// Index of the first element equal to `needle` (linear scan).
    #[must_use]
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.strings.iter().position(|s| s == needle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.strings.iter().map(String::as_str)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.strings
    }
}

impl Index<usize> for StringList {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.strings[index]
    }
}

impl<'a> IntoIterator for &'a StringList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.strings.iter()
    }
}

impl From<Vec<String>> for StringList {
    fn from(strings: Vec<String>) -> Self {
        Self { strings }
    }
}

impl FromIterator<String> for StringList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            strings: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for StringList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            strings: iter.into_iter().map(str::to_owned).collect(),
        }
    }
}

/// Split `s` on every `sep`.
///
/// Always yields at least one element; empty fields are preserved, so
/// `"a;"` splits into `["a", ""]`.
#[must_use]
pub fn split(s: &str, sep: char) -> StringList {
    s.split(sep).collect()
}
