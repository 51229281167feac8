//! Run configuration, read once from the environment.

use std::ffi::OsString;
use std::path::PathBuf;

/// Overrides the location of the quarantine event database.
pub const QUARANTINE_DB_ENV: &str = "WHENCE_QUARANTINE_DB";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhenceConfig {
    /// Quarantine event database to use instead of the current user's.
    pub quarantine_db: Option<PathBuf>,
}

impl WhenceConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let quarantine_db = lookup(QUARANTINE_DB_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self { quarantine_db }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarantine_db_override() {
        let config = WhenceConfig::from_lookup(|key| {
            (key == QUARANTINE_DB_ENV).then(|| OsString::from("/tmp/events.db"))
        });
        assert_eq!(config.quarantine_db, Some(PathBuf::from("/tmp/events.db")));
    }

    #[test]
    fn test_empty_value_is_unset() {
        let config = WhenceConfig::from_lookup(|_| Some(OsString::new()));
        assert_eq!(config, WhenceConfig::default());
    }
}
