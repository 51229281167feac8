//! Outcome codes and the error type shared by every whence crate.
//!
//! Each file processed by `whence` produces exactly one [`ErrorCode`]. The
//! collectors that populate a record run in phases, and each phase reports
//! its own code; [`ErrorCode::combine`] folds them into the one reported for
//! the file. The numeric value of the code is the process exit status.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Outcome of reading provenance for one file, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ErrorCode {
    Ok = 0,
    /// The attribute is simply not present on the file.
    NoAttribute = 1,
    NoFile = 2,
    Other = 3,
    BadInvocation = 4,
    OutOfMemory = 5,
}

impl ErrorCode {
    /// All codes in ascending severity.
    pub const ALL: [Self; 6] = [
        Self::Ok,
        Self::NoAttribute,
        Self::NoFile,
        Self::Other,
        Self::BadInvocation,
        Self::OutOfMemory,
    ];

    /// Merge the outcome `other` of a later, independent phase into `self`.
    ///
    /// This is not `max`: a `NoAttribute` on the left is downgraded to `Ok`
    /// when the later phase succeeds, so a file with at least one readable
    /// source reports success.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        let a = self as u8;
        let b = other as u8;
        let no_attr = Self::NoAttribute as u8;

        if b > a && b > no_attr {
            other
        } else if a > no_attr {
            self
        } else if b == Self::Ok as u8 {
            Self::Ok
        } else {
            self
        }
    }

    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NoAttribute => "no_attribute",
            Self::NoFile => "no_file",
            Self::Other => "other",
            Self::BadInvocation => "bad_invocation",
            Self::OutOfMemory => "out_of_memory",
        }
    }

    /// True for codes that carry a diagnostic worth showing.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        self as u8 > Self::NoAttribute as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fold a sequence of phase outcomes left to right.
///
/// The first code is the baseline; an empty sequence yields `Ok`.
pub fn combine_all<I>(codes: I) -> ErrorCode
where
    I: IntoIterator<Item = ErrorCode>,
{
    let mut iter = codes.into_iter();
    let Some(first) = iter.next() else {
        return ErrorCode::Ok;
    };
    iter.fold(first, ErrorCode::combine)
}

/// Error produced by an attribute read, a decoder, or a backend query.
///
/// The message is owned by the error; moving it into a record consumes the
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WhenceError {
    #[error("attribute not found")]
    NoAttribute,

    #[error("{0}")]
    NoFile(String),

    #[error("{0}")]
    Other(String),

    #[error("{0}")]
    BadInvocation(String),
}

impl WhenceError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    pub fn no_file(message: impl Into<String>) -> Self {
        Self::NoFile(message.into())
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoAttribute => ErrorCode::NoAttribute,
            Self::NoFile(_) => ErrorCode::NoFile,
            Self::Other(_) => ErrorCode::Other,
            Self::BadInvocation(_) => ErrorCode::BadInvocation,
        }
    }

    /// Consume the error, yielding its diagnostic text.
    #[must_use]
    pub fn into_message(self) -> String {
        match self {
            Self::NoAttribute => "attribute not found".to_owned(),
            Self::NoFile(msg) | Self::Other(msg) | Self::BadInvocation(msg) => msg,
        }
    }
}

pub type Result<T> = std::result::Result<T, WhenceError>;
