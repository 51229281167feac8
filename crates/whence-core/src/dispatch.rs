//! Per-platform orchestration of the collectors.

use std::fmt;
use std::path::Path;

use tracing::debug;
use whence_error::ErrorCode;
use whence_sys::{AttributeSource, attribute_text};
use whence_types::ProvenanceRecord;

use crate::absorb_error;
use crate::cache::ProvenanceCache;
use crate::quarantine::{QUARANTINE_ATTR, decode_quarantine};
use crate::where_froms::{WHERE_FROMS_ATTR, apply_where_froms};
use crate::xdg::collect_xdg;
use crate::zone_identifier::{ZONE_IDENTIFIER_STREAM, apply_zone_identifier};

/// Which set of provenance stores a file is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Quarantine record, where-froms property list, then XDG attributes.
    MacOs,
    /// XDG attributes only.
    Xdg,
    /// The `Zone.Identifier` stream.
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Xdg
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MacOs => "macos",
            Self::Xdg => "xdg",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything learned about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProvenance {
    pub record: ProvenanceRecord,
    pub code: ErrorCode,
}

/// Runs the collectors of one platform against files, one at a time.
pub struct Dispatcher<'a, S: ?Sized> {
    platform: Platform,
    source: &'a S,
    cache: &'a mut ProvenanceCache,
}

impl<'a, S> Dispatcher<'a, S>
where
    S: AttributeSource + ?Sized,
{
    pub fn new(platform: Platform, source: &'a S, cache: &'a mut ProvenanceCache) -> Self {
        Self {
            platform,
            source,
            cache,
        }
    }

    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    pub fn collect(&mut self, path: &Path) -> FileProvenance {
        let mut record = ProvenanceRecord::new();
        let code = match self.platform {
            Platform::MacOs => self.collect_macos(path, &mut record),
            Platform::Xdg => collect_xdg(self.source, path, &mut record),
            Platform::Windows => self.collect_windows(path, &mut record),
        };
        debug!(path = %path.display(), platform = %self.platform, outcome = %code, "collected");
        FileProvenance { record, code }
    }

    fn collect_macos(&mut self, path: &Path, record: &mut ProvenanceRecord) -> ErrorCode {
        let quarantine = match self.source.get_attribute(path, QUARANTINE_ATTR) {
            Ok(bytes) => decode_quarantine(&attribute_text(&bytes), record, self.cache),
            Err(err) => absorb_error(err, record),
        };
        debug!(path = %path.display(), outcome = %quarantine, "quarantine phase");
        if quarantine == ErrorCode::NoFile {
            return quarantine;
        }

        let where_froms = match self.source.get_attribute(path, WHERE_FROMS_ATTR) {
            Ok(bytes) => apply_where_froms(&bytes, record),
            Err(err) => absorb_error(err, record),
        };
        debug!(path = %path.display(), outcome = %where_froms, "where-froms phase");
        let code = quarantine.combine(where_froms);
        if where_froms == ErrorCode::NoFile {
            return code;
        }

        code.combine(collect_xdg(self.source, path, record))
    }

    fn collect_windows(&mut self, path: &Path, record: &mut ProvenanceRecord) -> ErrorCode {
        match self.source.get_attribute(path, ZONE_IDENTIFIER_STREAM) {
            Ok(bytes) => apply_zone_identifier(&attribute_text(&bytes), record, self.cache),
            Err(err) => absorb_error(err, record),
        }
    }
}

impl<S: ?Sized> fmt::Debug for Dispatcher<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("platform", &self.platform)
            .field("cache", &self.cache.kind())
            .finish_non_exhaustive()
    }
}
