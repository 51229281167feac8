//! The per-platform cache lent to the dispatcher for every file.

use tracing::debug;
use whence_error::ErrorCode;
use whence_types::{Field, ProvenanceRecord};

use crate::config::WhenceConfig;
use crate::correlation::CorrelationCache;
use crate::dispatch::Platform;
use crate::zone::ZoneNameCache;

/// Lookup state that outlives a single file.
///
/// `lookup` means different things per variant: an event id on macOS, a
/// zone id on Windows, nothing elsewhere.
#[derive(Debug)]
pub enum ProvenanceCache {
    Correlation(CorrelationCache),
    ZoneNames(ZoneNameCache),
    Noop,
}

impl ProvenanceCache {
    #[must_use]
    pub fn for_platform(platform: Platform, config: &WhenceConfig) -> Self {
        match platform {
            Platform::MacOs => Self::Correlation(CorrelationCache::from_config(config)),
            Platform::Windows => Self::ZoneNames(ZoneNameCache::with_host_registry()),
            Platform::Xdg => Self::Noop,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Correlation(_) => "correlation",
            Self::ZoneNames(_) => "zone-names",
            Self::Noop => "noop",
        }
    }

    /// Prepare the backing store. Failures are remembered, not returned.
    pub fn open(&mut self) {
        if let Self::Correlation(cache) = self {
            cache.open();
        }
    }

    /// Resolve `key` and fill the matching fields of `record`.
    pub fn lookup(&mut self, key: &str, record: &mut ProvenanceRecord) -> ErrorCode {
        match self {
            Self::Correlation(cache) => cache.lookup(key, record),
            Self::ZoneNames(cache) => {
                let name = cache.resolve(key);
                record.fill(Field::Zone, name);
                ErrorCode::Ok
            }
            Self::Noop => {
                debug!(key, "no lookup backend on this platform");
                ErrorCode::Ok
            }
        }
    }

    pub fn close(&mut self) {
        match self {
            Self::Correlation(cache) => cache.close(),
            Self::ZoneNames(cache) => cache.clear(),
            Self::Noop => {}
        }
    }
}
