//! The `Zone.Identifier` alternate data stream written by Windows browsers.
//!
//! ```text
//! [ZoneTransfer]
//! ZoneId=3
//! ReferrerUrl=https://example.com/
//! HostUrl=https://example.com/file.zip
//! ```

use whence_error::ErrorCode;
use whence_types::{Field, ProvenanceRecord};

use crate::cache::ProvenanceCache;

pub const ZONE_IDENTIFIER_STREAM: &str = "Zone.Identifier";

/// Keys of interest in a `Zone.Identifier` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneTransfer {
    pub zone_id: Option<String>,
    pub referrer_url: Option<String>,
    pub host_url: Option<String>,
}

impl ZoneTransfer {
    /// Parse the document. Unknown keys and malformed lines are ignored and
    /// the first occurrence of a key wins.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut out = Self::default();
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let slot = match key.trim() {
                k if k.eq_ignore_ascii_case("ZoneId") => &mut out.zone_id,
                k if k.eq_ignore_ascii_case("ReferrerUrl") => &mut out.referrer_url,
                k if k.eq_ignore_ascii_case("HostUrl") => &mut out.host_url,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.trim().to_owned());
            }
        }
        out
    }
}

/// Fill `record` from a `Zone.Identifier` document, resolving the zone id
/// through `cache`.
pub fn apply_zone_identifier(
    text: &str,
    record: &mut ProvenanceRecord,
    cache: &mut ProvenanceCache,
) -> ErrorCode {
    let transfer = ZoneTransfer::parse(text);

    if let Some(url) = transfer.host_url {
        record.fill(Field::Url, url);
    }
    if let Some(referrer) = transfer.referrer_url {
        record.fill(Field::Referrer, referrer);
    }
    match transfer.zone_id {
        Some(zone_id) if !zone_id.is_empty() => cache.lookup(&zone_id, record),
        _ => ErrorCode::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneNameCache;
    use whence_sys::registry::{RegistryReader, RegistryRoot};

    struct Zones;

    impl RegistryReader for Zones {
        fn read_string(&self, _root: RegistryRoot, subkey: &str, _value: &str) -> Option<String> {
            subkey.ends_with(r"\3").then(|| "Internet".to_owned())
        }
    }

    const DOC: &str = "[ZoneTransfer]\r\nZoneId=3\r\nReferrerUrl=https://example.com/\r\nHostUrl=https://example.com/file.zip\r\n";

    #[test]
    fn test_parse_standard_document() {
        let transfer = ZoneTransfer::parse(DOC);
        assert_eq!(transfer.zone_id.as_deref(), Some("3"));
        assert_eq!(transfer.referrer_url.as_deref(), Some("https://example.com/"));
        assert_eq!(transfer.host_url.as_deref(), Some("https://example.com/file.zip"));
    }

    #[test]
    fn test_parse_is_lenient() {
        let text = "\u{feff}; comment\n\n[ZoneTransfer]\n  zoneid = 2 \nnot a pair\nLastWriterPackageFamilyName=x\nZONEID=4\nhosturl=https://a.example/?q=1\n";
        let transfer = ZoneTransfer::parse(text);
        assert_eq!(transfer.zone_id.as_deref(), Some("2"));
        assert_eq!(transfer.host_url.as_deref(), Some("https://a.example/?q=1"));
        assert_eq!(transfer.referrer_url, None);
    }

    #[test]
    fn test_apply_fills_url_referrer_and_zone() {
        let mut cache = ProvenanceCache::ZoneNames(ZoneNameCache::new(Zones));
        let mut record = ProvenanceRecord::new();
        assert_eq!(apply_zone_identifier(DOC, &mut record, &mut cache), ErrorCode::Ok);
        assert_eq!(record.get(Field::Url), Some("https://example.com/file.zip"));
        assert_eq!(record.get(Field::Referrer), Some("https://example.com/"));
        assert_eq!(record.get(Field::Zone), Some("Internet"));
    }

    #[test]
    fn test_unknown_zone_resolves_to_id() {
        let mut cache = ProvenanceCache::ZoneNames(ZoneNameCache::new(Zones));
        let mut record = ProvenanceRecord::new();
        apply_zone_identifier("[ZoneTransfer]\nZoneId=4\n", &mut record, &mut cache);
        assert_eq!(record.get(Field::Zone), Some("4"));
        assert_eq!(record.get(Field::Url), None);
    }
}
