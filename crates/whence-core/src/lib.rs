//! Provenance collection for whence.
//!
//! A [`Dispatcher`] runs the collectors for one platform against a file and
//! folds their outcomes into one [`FileProvenance`]:
//!
//! - macOS: the quarantine record ([`quarantine`]), optionally enriched from
//!   the quarantine event database ([`correlation`]), then the where-from
//!   property list ([`where_froms`]), then the XDG attributes ([`xdg`]).
//! - Windows: the `Zone.Identifier` stream ([`zone_identifier`]) with zone
//!   names resolved through the registry ([`zone`]).
//! - Everything else: the XDG attributes.
//!
//! The per-platform cache ([`ProvenanceCache`]) lives for the whole run and
//! is lent to the dispatcher for each file.

pub mod cache;
pub mod config;
pub mod correlation;
pub mod dispatch;
pub mod quarantine;
pub mod where_froms;
pub mod xdg;
pub mod zone;
pub mod zone_identifier;

pub use cache::ProvenanceCache;
pub use config::WhenceConfig;
pub use correlation::{CorrelationCache, sqlite_version};
pub use dispatch::{Dispatcher, FileProvenance, Platform};
pub use whence_error::{ErrorCode, Result, WhenceError};
pub use whence_types::{Field, ProvenanceRecord, StringList};
pub use zone::ZoneNameCache;

/// Fold a failed read into `record` and return its outcome.
///
/// Absence is not a diagnostic; every other failure moves its message into
/// `record.error` unless an earlier one is already there.
pub(crate) fn absorb_error(err: WhenceError, record: &mut ProvenanceRecord) -> ErrorCode {
    let code = err.code();
    if code.is_failure() {
        record.note_error(err.into_message());
    }
    code
}
