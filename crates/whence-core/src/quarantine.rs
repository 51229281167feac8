//! Decoding of the macOS `com.apple.quarantine` attribute.
//!
//! Wire format: `<version>;<hex-timestamp>;<application>[;<event-id>[;...]]`.
//! The application name embeds `\xHH` escapes for bytes that would
//! otherwise clash with the delimiter.

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;
use whence_error::{ErrorCode, Result, WhenceError};
use whence_types::{Field, ProvenanceRecord, split};

use crate::absorb_error;
use crate::cache::ProvenanceCache;

pub const QUARANTINE_ATTR: &str = "com.apple.quarantine";

/// Fields decoded from one quarantine record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineRecord {
    pub version: String,
    pub date: DateTime<Utc>,
    /// Originating application with escapes already decoded.
    pub application: String,
    /// Key into the quarantine event database, if the record carries one.
    pub event_id: Option<String>,
}

impl QuarantineRecord {
    pub fn parse(raw: &str) -> Result<Self> {
        let fields = split(raw, ';');
        if fields.len() < 3 {
            return Err(WhenceError::other(format!(
                "Expected at least 3 fields in {QUARANTINE_ATTR}, but got {}",
                fields.len()
            )));
        }

        let date = parse_hex_date(&fields[1])?;
        let event_id = fields
            .get(3)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        Ok(Self {
            version: fields[0].to_owned(),
            date,
            application: unescape_hex(&fields[2]),
            event_id,
        })
    }
}

/// Decode `raw` into `record`, consulting `cache` for the event id.
///
/// The returned code is the parse failure, or else the outcome of the
/// event lookup unchanged; merging it with other phases is the caller's job.
pub fn decode_quarantine(
    raw: &str,
    record: &mut ProvenanceRecord,
    cache: &mut ProvenanceCache,
) -> ErrorCode {
    let parsed = match QuarantineRecord::parse(raw) {
        Ok(parsed) => parsed,
        Err(err) => return absorb_error(err, record),
    };

    record.fill_date(parsed.date);
    record.fill(Field::Application, parsed.application);

    match parsed.event_id {
        Some(id) => {
            debug!(event_id = %id, "looking up quarantine event");
            cache.lookup(&id, record)
        }
        None => ErrorCode::Ok,
    }
}

/// Parse a strictly hexadecimal seconds-since-epoch token.
///
/// No sign, prefix, whitespace or trailing characters are accepted.
pub fn parse_hex_date(token: &str) -> Result<DateTime<Utc>> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(WhenceError::other(format!(
            "'{token}' is not a valid hex number."
        )));
    }
    let out_of_range = || WhenceError::other(format!("'{token}' is out of range."));

    let seconds = u64::from_str_radix(token, 16).map_err(|_| out_of_range())?;
    let seconds = i64::try_from(seconds).map_err(|_| out_of_range())?;
    Utc.timestamp_opt(seconds, 0).single().ok_or_else(out_of_range)
}

/// Replace every `\xHH` escape with the byte it encodes.
///
/// Anything that is not a backslash, `x`, and exactly two hex digits is
/// copied through byte for byte. The result is always a fresh string.
#[must_use]
pub fn unescape_hex(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'x') {
            let hi = bytes.get(i + 2).copied().and_then(hex_value);
            let lo = bytes.get(i + 3).copied().and_then(hex_value);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi << 4) | lo);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    match String::from_utf8(out) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

fn hex_value(b: u8) -> Option<u8> {
    char::from(b).to_digit(16).map(|d| d as u8)
}
