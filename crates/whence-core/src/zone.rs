//! Zone id to display-name resolution through the Windows registry.
//!
//! Names are cached in two parallel lists scanned linearly. The cache is
//! bounded: when it holds [`ZONE_CACHE_LIMIT`] entries it is wiped before
//! the next insertion. Ids with no registry name are cached as themselves.

use std::fmt;

use tracing::debug;
use whence_sys::registry::{HostRegistry, RegistryReader, RegistryRoot};
use whence_types::StringList;

pub const ZONE_CACHE_LIMIT: usize = 100;

pub const ZONES_SUBKEY: &str =
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Internet Settings\Zones\";

pub const ZONE_NAME_VALUE: &str = "DisplayName";

/// Read the display name of zone `id`, per-user settings first.
pub fn lookup_zone_name<R: RegistryReader + ?Sized>(registry: &R, id: &str) -> Option<String> {
    let mut parts = StringList::with_capacity(2);
    parts.add(ZONES_SUBKEY);
    parts.add(id);
    let subkey = parts.join();

    [RegistryRoot::CurrentUser, RegistryRoot::LocalMachine]
        .into_iter()
        .find_map(|root| registry.read_string(root, &subkey, ZONE_NAME_VALUE))
}

pub struct ZoneNameCache {
    keys: StringList,
    values: StringList,
    registry: Box<dyn RegistryReader>,
}

impl ZoneNameCache {
    pub fn new(registry: impl RegistryReader + 'static) -> Self {
        Self {
            keys: StringList::new(),
            values: StringList::new(),
            registry: Box::new(registry),
        }
    }

    #[must_use]
    pub fn with_host_registry() -> Self {
        Self::new(HostRegistry)
    }

    /// Display name for `zone_id`, or `zone_id` itself if it has none.
    pub fn resolve(&mut self, zone_id: &str) -> &str {
        if let Some(idx) = self.keys.position(zone_id) {
            debug!(zone_id, "zone name cache hit");
            return &self.values[idx];
        }

        if self.keys.len() >= ZONE_CACHE_LIMIT {
            debug!(entries = self.keys.len(), "zone name cache full, wiping");
            self.clear();
        }

        let name = lookup_zone_name(self.registry.as_ref(), zone_id);
        debug!(zone_id, found = name.is_some(), "zone name cache miss");
        self.keys.add(zone_id);
        match name {
            Some(name) => self.values.add_owned(name),
            None => self.values.add(zone_id),
        }

        let last = self.values.len() - 1;
        &self.values[last]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }
}

impl fmt::Debug for ZoneNameCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneNameCache")
            .field("keys", &self.keys)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
