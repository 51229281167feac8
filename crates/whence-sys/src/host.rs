//! Extended attribute reads against the real filesystem.
//!
//! Linux and macOS use `getxattr(2)`. Windows has no xattrs; the equivalent
//! metadata lives in NTFS alternate data streams, read as `<path>:<name>`.
//! Other platforms report every attribute as absent.

use std::path::Path;

use tracing::trace;
use whence_error::{ErrorCode, Result};

use crate::AttributeSource;

/// [`AttributeSource`] backed by the host operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostAttributes;

impl HostAttributes {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AttributeSource for HostAttributes {
    fn get_attribute(&self, path: &Path, name: &str) -> Result<Vec<u8>> {
        let result = read_attribute(path, name);
        trace!(
            path = %path.display(),
            attribute = name,
            outcome = %result.as_ref().map_or_else(|e| e.code(), |_| ErrorCode::Ok),
            "attribute read"
        );
        result
    }
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
fn read_attribute(path: &Path, name: &str) -> Result<Vec<u8>> {
    xattr::get(path, name)
}

#[cfg(target_os = "windows")]
fn read_attribute(path: &Path, name: &str) -> Result<Vec<u8>> {
    ads::get(path, name)
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "windows"
)))]
fn read_attribute(path: &Path, _name: &str) -> Result<Vec<u8>> {
    use whence_error::WhenceError;

    match std::fs::metadata(path) {
        Ok(_) => Err(WhenceError::NoAttribute),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(WhenceError::no_file(err.to_string()))
        }
        Err(err) => Err(WhenceError::other(err.to_string())),
    }
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
mod xattr {
    use std::ffi::{CStr, CString};
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    use nix::errno::Errno;
    use whence_error::{Result, WhenceError};

    pub(super) fn get(path: &Path, name: &str) -> Result<Vec<u8>> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| WhenceError::other("file name contains a NUL byte"))?;
        let c_name = CString::new(name)
            .map_err(|_| WhenceError::other("attribute name contains a NUL byte"))?;

        // The attribute may grow between the size probe and the read.
        loop {
            let size = getxattr(&c_path, &c_name, &mut []).map_err(classify)?;
            if size == 0 {
                return Ok(Vec::new());
            }
            let mut buf = vec![0_u8; size];
            match getxattr(&c_path, &c_name, &mut buf) {
                Ok(read) => {
                    buf.truncate(read);
                    return Ok(buf);
                }
                Err(Errno::ERANGE) => {}
                Err(errno) => return Err(classify(errno)),
            }
        }
    }

    fn classify(errno: Errno) -> WhenceError {
        match errno {
            #[cfg(any(target_os = "linux", target_os = "android"))]
            Errno::ENODATA => WhenceError::NoAttribute,
            #[cfg(target_os = "macos")]
            Errno::ENOATTR => WhenceError::NoAttribute,
            Errno::ENOTSUP => WhenceError::NoAttribute,
            Errno::ENOENT | Errno::ENOTDIR => WhenceError::no_file(errno.desc()),
            other => WhenceError::other(other.desc()),
        }
    }

    /// One `getxattr` call. An empty `buf` asks for the value size.
    fn getxattr(path: &CStr, name: &CStr, buf: &mut [u8]) -> std::result::Result<usize, Errno> {
        let (ptr, len) = if buf.is_empty() {
            (std::ptr::null_mut(), 0)
        } else {
            (buf.as_mut_ptr().cast::<libc::c_void>(), buf.len())
        };

        // SAFETY: both strings are NUL-terminated and outlive the call; `ptr`
        // is either null with length 0 or points to `len` writable bytes.
        #[cfg(any(target_os = "linux", target_os = "android"))]
        let ret = unsafe { libc::getxattr(path.as_ptr(), name.as_ptr(), ptr, len) };

        // SAFETY: as above; position 0 and no options read the whole value
        // and follow symlinks.
        #[cfg(target_os = "macos")]
        let ret = unsafe { libc::getxattr(path.as_ptr(), name.as_ptr(), ptr, len, 0, 0) };

        if ret < 0 {
            Err(Errno::last())
        } else {
            Ok(ret as usize)
        }
    }
}

#[cfg(target_os = "windows")]
mod ads {
    use std::ffi::OsString;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use whence_error::{Result, WhenceError};

    pub(super) fn get(path: &Path, name: &str) -> Result<Vec<u8>> {
        if let Err(err) = std::fs::metadata(path) {
            return Err(if err.kind() == ErrorKind::NotFound {
                WhenceError::no_file(err.to_string())
            } else {
                WhenceError::other(err.to_string())
            });
        }

        let mut stream = OsString::from(path.as_os_str());
        stream.push(":");
        stream.push(name);
        match std::fs::read(PathBuf::from(stream)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(WhenceError::NoAttribute),
            Err(err) => Err(WhenceError::other(err.to_string())),
        }
    }
}

#[cfg(all(test, any(target_os = "linux", target_os = "android", target_os = "macos")))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = HostAttributes::new()
            .get_attribute(&missing, "user.xdg.origin.url")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoFile);
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_unset_attribute_is_no_attribute() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = HostAttributes::new()
            .get_attribute(file.path(), "user.whence.test.never-set")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoAttribute);
    }
}
