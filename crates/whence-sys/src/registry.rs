//! String value reads from the Windows registry.
//!
//! On other platforms [`HostRegistry`] finds nothing, so callers fall back
//! to their defaults.

/// Registry hive a value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryRoot {
    CurrentUser,
    LocalMachine,
}

impl RegistryRoot {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentUser => "HKEY_CURRENT_USER",
            Self::LocalMachine => "HKEY_LOCAL_MACHINE",
        }
    }
}

/// Read access to `REG_SZ` values.
pub trait RegistryReader {
    /// Read string value `value` under `root\subkey`.
    ///
    /// Any failure (missing key, wrong type, access denied) is `None`.
    fn read_string(&self, root: RegistryRoot, subkey: &str, value: &str) -> Option<String>;
}

impl<T: RegistryReader + ?Sized> RegistryReader for &T {
    fn read_string(&self, root: RegistryRoot, subkey: &str, value: &str) -> Option<String> {
        (**self).read_string(root, subkey, value)
    }
}

/// [`RegistryReader`] backed by the host registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostRegistry;

impl RegistryReader for HostRegistry {
    #[cfg(target_os = "windows")]
    fn read_string(&self, root: RegistryRoot, subkey: &str, value: &str) -> Option<String> {
        win::get_reg_sz(root, subkey, value)
    }

    #[cfg(not(target_os = "windows"))]
    fn read_string(&self, _root: RegistryRoot, _subkey: &str, _value: &str) -> Option<String> {
        None
    }
}

#[cfg(target_os = "windows")]
mod win {
    use windows::Win32::Foundation::ERROR_SUCCESS;
    use windows::Win32::System::Registry::{
        HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ, RegGetValueW,
    };
    use windows::core::PCWSTR;

    use super::RegistryRoot;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    pub(super) fn get_reg_sz(root: RegistryRoot, subkey: &str, value: &str) -> Option<String> {
        let hkey: HKEY = match root {
            RegistryRoot::CurrentUser => HKEY_CURRENT_USER,
            RegistryRoot::LocalMachine => HKEY_LOCAL_MACHINE,
        };
        let subkey = wide(subkey);
        let value = wide(value);

        let mut len: u32 = 0;
        // SAFETY: the key and value names are NUL-terminated UTF-16 buffers
        // that outlive the call; a null data pointer only queries the size.
        let status = unsafe {
            RegGetValueW(
                hkey,
                PCWSTR(subkey.as_ptr()),
                PCWSTR(value.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&raw mut len),
            )
        };
        if status != ERROR_SUCCESS || len == 0 {
            return None;
        }

        let mut buf = vec![0_u16; (len as usize).div_ceil(2)];
        // SAFETY: `buf` holds at least `len` bytes and `len` tells the API so.
        let status = unsafe {
            RegGetValueW(
                hkey,
                PCWSTR(subkey.as_ptr()),
                PCWSTR(value.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                Some(buf.as_mut_ptr().cast()),
                Some(&raw mut len),
            )
        };
        if status != ERROR_SUCCESS {
            return None;
        }

        buf.truncate(len as usize / 2);
        while buf.last() == Some(&0) {
            buf.pop();
        }
        Some(String::from_utf16_lossy(&buf))
    }
}
