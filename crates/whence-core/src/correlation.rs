//! Lookup of quarantine events in the LaunchServices event database.
//!
//! The database is opened lazily, read-only, on the first lookup. If that
//! open fails the failure is logged once and every later lookup is a no-op
//! until [`CorrelationCache::close`].

use std::fmt;
use std::path::PathBuf;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info, warn};
use whence_error::{ErrorCode, Result, WhenceError};
use whence_types::{Field, ProvenanceRecord};

use crate::absorb_error;
use crate::config::WhenceConfig;

/// Database path relative to the user's home directory.
pub const EVENTS_DB_RELATIVE: &str =
    "Library/Preferences/com.apple.LaunchServices.QuarantineEventsV2";

const EVENT_QUERY: &str =
    "SELECT * FROM LSQuarantineEvent WHERE LSQuarantineEventIdentifier == ?1";

/// Version string of the linked SQLite library.
#[must_use]
pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}

/// Where the event database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// Under the home directory of the current user, resolved at open time.
    CurrentUser,
    Path(PathBuf),
}

impl DbLocation {
    fn resolve(&self) -> Result<PathBuf> {
        match self {
            Self::CurrentUser => Ok(current_home()?.join(EVENTS_DB_RELATIVE)),
            Self::Path(path) => Ok(path.clone()),
        }
    }
}

#[cfg(unix)]
fn current_home() -> Result<PathBuf> {
    use nix::unistd::{User, getuid};

    let uid = getuid();
    match User::from_uid(uid) {
        Ok(Some(user)) => Ok(user.dir),
        Ok(None) => Err(WhenceError::other(format!(
            "no password database entry for uid {uid}"
        ))),
        Err(errno) => Err(WhenceError::other(errno.desc())),
    }
}

#[cfg(not(unix))]
fn current_home() -> Result<PathBuf> {
    Err(WhenceError::other("no password database on this platform"))
}

fn column_field(name: &str) -> Option<Field> {
    match name {
        "LSQuarantineDataURLString" => Some(Field::Url),
        "LSQuarantineOriginURLString" => Some(Field::Referrer),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// CorrelationCache
// ---------------------------------------------------------------------------

pub struct CorrelationCache {
    location: DbLocation,
    conn: Option<Connection>,
    tried_opening: bool,
}

impl CorrelationCache {
    /// Cache over the current user's event database.
    #[must_use]
    pub fn new() -> Self {
        Self::with_location(DbLocation::CurrentUser)
    }

    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self::with_location(DbLocation::Path(path.into()))
    }

    #[must_use]
    pub fn from_config(config: &WhenceConfig) -> Self {
        config
            .quarantine_db
            .clone()
            .map_or_else(Self::new, Self::with_path)
    }

    fn with_location(location: DbLocation) -> Self {
        Self {
            location,
            conn: None,
            tried_opening: false,
        }
    }

    #[must_use]
    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// Open the database if no attempt has been made yet.
    ///
    /// Returns the connection, or `None` if the one open attempt failed.
    pub fn open(&mut self) -> Option<&Connection> {
        if self.conn.is_none() && !self.tried_opening {
            self.tried_opening = true;
            match self.connect() {
                Ok((conn, path)) => {
                    info!(path = %path.display(), "opened quarantine event database");
                    self.conn = Some(conn);
                }
                Err(err) => {
                    warn!(error = %err, "cannot open quarantine event database");
                }
            }
        }
        self.conn.as_ref()
    }

    fn connect(&self) -> Result<(Connection, PathBuf)> {
        let path = self.location.resolve()?;
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags).map_err(|err| {
            WhenceError::other(format!("{}: {err}", path.display()))
        })?;
        Ok((conn, path))
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// True once an open was attempted and did not produce a connection.
    #[must_use]
    pub fn open_failed(&self) -> bool {
        self.tried_opening && self.conn.is_none()
    }

    /// Fill `url` and `referrer` from the event with identifier `id`.
    ///
    /// Returns `Ok` when the database is unavailable; a query failure is
    /// `Other` with its message noted on `record`.
    pub fn lookup(&mut self, id: &str, record: &mut ProvenanceRecord) -> ErrorCode {
        let Some(conn) = self.open() else {
            debug!(event_id = %id, "event database unavailable, skipping lookup");
            return ErrorCode::Ok;
        };

        match query_event(conn, id, record) {
            Ok(rows) => {
                debug!(event_id = %id, rows, "quarantine event lookup");
                ErrorCode::Ok
            }
            Err(err) => absorb_error(WhenceError::other(err.to_string()), record),
        }
    }

    /// Drop the connection and allow a fresh open attempt.
    pub fn close(&mut self) {
        self.conn = None;
        self.tried_opening = false;
    }
}

impl Default for CorrelationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CorrelationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationCache")
            .field("location", &self.location)
            .field("open", &self.conn.is_some())
            .field("tried_opening", &self.tried_opening)
            .finish()
    }
}

fn query_event(
    conn: &Connection,
    id: &str,
    record: &mut ProvenanceRecord,
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(EVENT_QUERY)?;
    let targets: Vec<(usize, Field)> = stmt
        .column_names()
        .into_iter()
        .enumerate()
        .filter_map(|(idx, name)| column_field(name).map(|field| (idx, field)))
        .collect();

    let mut rows = stmt.query([id])?;
    let mut seen = 0;
    while let Some(row) = rows.next()? {
        seen += 1;
        for &(idx, field) in &targets {
            if let ValueRef::Text(text) = row.get_ref(idx)? {
                record.fill_with(field, || String::from_utf8_lossy(text).into_owned());
            }
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn create_events_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE LSQuarantineEvent (
                LSQuarantineEventIdentifier TEXT PRIMARY KEY NOT NULL,
                LSQuarantineTimeStamp REAL,
                LSQuarantineAgentName TEXT,
                LSQuarantineDataURLString TEXT,
                LSQuarantineOriginURLString TEXT
            );
            INSERT INTO LSQuarantineEvent VALUES
                ('ABCD-1234', 618000000.0, 'Safari',
                 'https://dl.example/app.dmg', 'https://example/download');
            INSERT INTO LSQuarantineEvent VALUES
                ('NULLS-1', NULL, 'curl', NULL, NULL);
            INSERT INTO LSQuarantineEvent VALUES
                ('it''s', NULL, 'curl', 'https://quote.example/', X'6869');",
        )
        .unwrap();
    }

    #[test]
    fn test_lookup_fills_url_and_referrer() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("events.db");
        create_events_db(&db);

        let mut cache = CorrelationCache::with_path(&db);
        let mut record = ProvenanceRecord::new();
        assert_eq!(cache.lookup("ABCD-1234", &mut record), ErrorCode::Ok);
        assert!(cache.is_open());
        assert_eq!(record.get(Field::Url), Some("https://dl.example/app.dmg"));
        assert_eq!(record.get(Field::Referrer), Some("https://example/download"));
        assert_eq!(record.get(Field::Application), None);
    }

    #[test]
    fn test_lookup_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("events.db");
        create_events_db(&db);

        let mut cache = CorrelationCache::with_path(&db);
        let mut record = ProvenanceRecord::new();
        record.fill(Field::Url, "https://first.example/");
        cache.lookup("ABCD-1234", &mut record);
        assert_eq!(record.get(Field::Url), Some("https://first.example/"));
        assert_eq!(record.get(Field::Referrer), Some("https://example/download"));
    }

    #[test]
    fn test_lookup_ignores_null_and_non_text() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("events.db");
        create_events_db(&db);

        let mut cache = CorrelationCache::with_path(&db);
        let mut record = ProvenanceRecord::new();
        assert_eq!(cache.lookup("NULLS-1", &mut record), ErrorCode::Ok);
        assert!(record.is_empty());

        // Quotes in the id are bound, not spliced into the SQL.
        assert_eq!(cache.lookup("it's", &mut record), ErrorCode::Ok);
        assert_eq!(record.get(Field::Url), Some("https://quote.example/"));
        assert_eq!(record.get(Field::Referrer), None);
    }

    #[test]
    fn test_unknown_id_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("events.db");
        create_events_db(&db);

        let mut cache = CorrelationCache::with_path(&db);
        let mut record = ProvenanceRecord::new();
        assert_eq!(cache.lookup("' OR 1=1 --", &mut record), ErrorCode::Ok);
        assert!(record.is_empty());
    }

    #[test]
    fn test_open_failure_is_tried_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("missing.db");

        let mut cache = CorrelationCache::with_path(&db);
        let mut record = ProvenanceRecord::new();
        assert_eq!(cache.lookup("ABCD-1234", &mut record), ErrorCode::Ok);
        assert!(cache.open_failed());
        assert!(!record.has_error());

        // The database appearing later does not trigger a second attempt.
        create_events_db(&db);
        assert_eq!(cache.lookup("ABCD-1234", &mut record), ErrorCode::Ok);
        assert!(!cache.is_open());
        assert!(record.is_empty());

        cache.close();
        assert!(!cache.open_failed());
        assert_eq!(cache.lookup("ABCD-1234", &mut record), ErrorCode::Ok);
        assert!(cache.is_open());
        assert_eq!(record.get(Field::Url), Some("https://dl.example/app.dmg"));
    }

    #[test]
    fn test_query_error_is_other() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("empty.db");
        Connection::open(&db)
            .unwrap()
            .execute_batch("CREATE TABLE unrelated (x INTEGER);")
            .unwrap();

        let mut cache = CorrelationCache::with_path(&db);
        let mut record = ProvenanceRecord::new();
        assert_eq!(cache.lookup("ABCD-1234", &mut record), ErrorCode::Other);
        let message = record.error().unwrap().to_owned();
        assert!(message.contains("LSQuarantineEvent"), "{message}");

        record.note_error("later");
        assert_eq!(record.error(), Some(message.as_str()));
    }

    #[test]
    fn test_from_config_uses_override() {
        let config = WhenceConfig {
            quarantine_db: Some(PathBuf::from("/tmp/q.db")),
        };
        let cache = CorrelationCache::from_config(&config);
        assert_eq!(cache.location(), &DbLocation::Path(PathBuf::from("/tmp/q.db")));
        assert_eq!(
            CorrelationCache::from_config(&WhenceConfig::default()).location(),
            &DbLocation::CurrentUser
        );
    }

    #[test]
    fn test_sqlite_version_is_reported() {
        assert!(sqlite_version().starts_with('3'));
    }
}
