//! Operating-system primitives used by the whence collectors.
//!
//! - [`AttributeSource`]: read one named extended attribute of a file.
//!   [`HostAttributes`] talks to the OS, [`MemoryAttributes`] is an in-memory
//!   stand-in for tests.
//! - [`registry`]: string reads from the Windows registry.

mod host;
mod memory;
pub mod registry;

use std::path::Path;

use whence_error::Result;

pub use host::HostAttributes;
pub use memory::MemoryAttributes;

/// Read access to the named extended attributes of a file.
///
/// Errors carry the outcome class: `NoAttribute` when the attribute is
/// absent, `NoFile` when the file itself cannot be found, `Other` for
/// everything else.
pub trait AttributeSource {
    fn get_attribute(&self, path: &Path, name: &str) -> Result<Vec<u8>>;
}

impl<T: AttributeSource + ?Sized> AttributeSource for &T {
    fn get_attribute(&self, path: &Path, name: &str) -> Result<Vec<u8>> {
        (**self).get_attribute(path, name)
    }
}

/// Decode an attribute value as text.
///
/// The value is cut at the first NUL byte, as the on-disk encodings are C
/// strings, and invalid UTF-8 is replaced rather than rejected.
#[must_use]
pub fn attribute_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
