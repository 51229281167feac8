//! Decoding of the `com.apple.metadata:kMDItemWhereFroms` property list.

use std::io::Cursor;

use plist::Value;
use whence_error::{ErrorCode, Result, WhenceError};
use whence_types::{Field, ProvenanceRecord, StringList};

use crate::absorb_error;

pub const WHERE_FROMS_ATTR: &str = "com.apple.metadata:kMDItemWhereFroms";

/// Decode a binary or XML property list whose root is an array of strings.
pub fn decode_string_array(bytes: &[u8]) -> Result<StringList> {
    let value = Value::from_reader(Cursor::new(bytes))
        .map_err(|err| WhenceError::other(format!("Cannot decode property list: {err}")))?;
    let Value::Array(items) = value else {
        return Err(WhenceError::other("Expected CFArray at property list root"));
    };

    let mut list = StringList::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Value::String(s) => list.add_owned(s),
            _ => {
                return Err(WhenceError::other(format!(
                    "Expected CFString at index {idx} of CFArray"
                )));
            }
        }
    }
    Ok(list)
}

/// Fill `url` and `referrer` from a where-froms value.
///
/// The array must hold exactly `[url, referrer]`.
pub fn apply_where_froms(bytes: &[u8], record: &mut ProvenanceRecord) -> ErrorCode {
    let list = match decode_string_array(bytes) {
        Ok(list) => list,
        Err(err) => return absorb_error(err, record),
    };

    if list.len() != 2 {
        let err = WhenceError::other(format!(
            "Expected CFArray of length 2, but got {}",
            list.len()
        ));
        return absorb_error(err, record);
    }

    let mut entries = list.into_vec().into_iter();
    if let Some(url) = entries.next() {
        record.fill(Field::Url, url);
    }
    if let Some(referrer) = entries.next() {
        record.fill(Field::Referrer, referrer);
    }
    ErrorCode::Ok
}
