//! The freedesktop.org common extended attributes.

use std::path::Path;

use tracing::debug;
use whence_error::ErrorCode;
use whence_sys::{AttributeSource, attribute_text};
use whence_types::{Field, ProvenanceRecord};

use crate::absorb_error;

/// Attribute names and the field each one fills, in read order.
pub const XDG_ATTRIBUTES: [(&str, Field); 6] = [
    ("user.xdg.origin.url", Field::Url),
    ("user.xdg.referrer.url", Field::Referrer),
    ("user.xdg.origin.email.from", Field::From),
    ("user.xdg.origin.email.subject", Field::Subject),
    ("user.xdg.origin.email.message-id", Field::MessageId),
    ("user.xdg.publisher", Field::Application),
];

/// Read every XDG attribute of `path` into `record`.
///
/// The first read sets the baseline outcome and later ones are folded in
/// with [`ErrorCode::combine`]. A missing file stops the remaining reads.
pub fn collect_xdg<S>(source: &S, path: &Path, record: &mut ProvenanceRecord) -> ErrorCode
where
    S: AttributeSource + ?Sized,
{
    let mut outcome = None;

    for (name, field) in XDG_ATTRIBUTES {
        let code = match source.get_attribute(path, name) {
            Ok(bytes) => {
                record.fill_with(field, || attribute_text(&bytes));
                ErrorCode::Ok
            }
            Err(err) => absorb_error(err, record),
        };
        debug!(path = %path.display(), attribute = name, outcome = %code, "xdg attribute");

        outcome = Some(outcome.map_or(code, |prev: ErrorCode| prev.combine(code)));
        if code == ErrorCode::NoFile {
            break;
        }
    }

    outcome.unwrap_or(ErrorCode::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use whence_error::WhenceError;
    use whence_sys::MemoryAttributes;

    #[test]
    fn test_reads_all_attributes_in_order() {
        let mut source = MemoryAttributes::new();
        source
            .set("/f", "user.xdg.origin.url", "https://dl.example/f.tar")
            .set("/f", "user.xdg.referrer.url", "https://example/")
            .set("/f", "user.xdg.origin.email.from", "alice@example.org")
            .set("/f", "user.xdg.origin.email.subject", "the file")
            .set("/f", "user.xdg.origin.email.message-id", "<1@example.org>")
            .set("/f", "user.xdg.publisher", "wget\0");

        let mut record = ProvenanceRecord::new();
        let path = Path::new("/f");
        assert_eq!(collect_xdg(&source, path, &mut record), ErrorCode::Ok);
        assert_eq!(record.get(Field::Url), Some("https://dl.example/f.tar"));
        assert_eq!(record.get(Field::MessageId), Some("<1@example.org>"));
        assert_eq!(record.get(Field::Application), Some("wget"));
        assert_eq!(
            source.reads_of(path),
            XDG_ATTRIBUTES.iter().map(|(name, _)| (*name).to_owned()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_partial_attributes_are_ok() {
        let mut source = MemoryAttributes::new();
        source.set("/f", "user.xdg.referrer.url", "https://example/");

        let mut record = ProvenanceRecord::new();
        assert_eq!(collect_xdg(&source, Path::new("/f"), &mut record), ErrorCode::Ok);
        assert_eq!(record.get(Field::Referrer), Some("https://example/"));
        assert!(!record.has_error());
    }

    #[test]
    fn test_no_attributes_is_no_attribute() {
        let mut source = MemoryAttributes::new();
        source.add_file("/f");

        let mut record = ProvenanceRecord::new();
        assert_eq!(
            collect_xdg(&source, Path::new("/f"), &mut record),
            ErrorCode::NoAttribute
        );
        assert!(record.is_empty());
    }

    #[test]
    fn test_missing_file_stops_after_first_read() {
        let source = MemoryAttributes::new();
        let mut record = ProvenanceRecord::new();
        let path = Path::new("/gone");
        assert_eq!(collect_xdg(&source, path, &mut record), ErrorCode::NoFile);
        assert_eq!(source.read_count(), 1);
        assert_eq!(record.error(), Some("No such file or directory"));
    }

    #[test]
    fn test_first_failure_message_wins() {
        let mut source = MemoryAttributes::new();
        source
            .fail("/f", "user.xdg.origin.email.from", WhenceError::other("first"))
            .fail("/f", "user.xdg.publisher", WhenceError::other("second"))
            .set("/f", "user.xdg.origin.url", "https://dl.example/");

        let mut record = ProvenanceRecord::new();
        assert_eq!(collect_xdg(&source, Path::new("/f"), &mut record), ErrorCode::Other);
        assert_eq!(record.error(), Some("first"));
        assert_eq!(record.get(Field::Url), Some("https://dl.example/"));
    }

    #[test]
    fn test_existing_fields_are_kept() {
        let mut source = MemoryAttributes::new();
        source.set("/f", "user.xdg.origin.url", "https://xdg.example/");

        let mut record = ProvenanceRecord::new();
        record.fill(Field::Url, "https://quarantine.example/");
        collect_xdg(&source, Path::new("/f"), &mut record);
        assert_eq!(record.get(Field::Url), Some("https://quarantine.example/"));
    }
}
