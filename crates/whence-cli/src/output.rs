//! Rendering of provenance records for the terminal and as JSON.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use serde_json::{Map, Value};
use whence_types::{Field, ProvenanceRecord};

/// Values longer than this many bytes are cut short in human output.
pub const TRUNCATION_LIMIT: usize = 1600;

const LABEL_WIDTH: usize = 11;

const MAGENTA: &str = "\x1b[95m";
const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Whether ANSI colors should be written to a stream.
///
/// Colors need a terminal and an unset or empty `NO_COLOR`.
#[must_use]
pub fn color_enabled(is_terminal: bool, no_color: Option<&std::ffi::OsStr>) -> bool {
    is_terminal && no_color.is_none_or(std::ffi::OsStr::is_empty)
}

#[must_use]
pub fn format_human_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S %z")
        .to_string()
}

/// Labelled values of `record` in display order, the date rendered by
/// `format_date`.
pub fn display_fields<F>(record: &ProvenanceRecord, format_date: F) -> Vec<(&'static str, String)>
where
    F: Fn(DateTime<Utc>) -> String,
{
    let mut out = Vec::with_capacity(Field::ALL.len() + 1);
    for (field, value) in record.present() {
        if field == Field::Zone {
            push_date(&mut out, record, &format_date);
        }
        out.push((field.label(), value.to_owned()));
    }
    if !record.is_set(Field::Zone) {
        push_date(&mut out, record, &format_date);
    }
    out
}

fn push_date<F>(out: &mut Vec<(&'static str, String)>, record: &ProvenanceRecord, format_date: &F)
where
    F: Fn(DateTime<Utc>) -> String,
{
    if let Some(date) = record.date() {
        out.push(("Date", format_date(date)));
    }
}

/// Terminal output, one block per file.
#[derive(Debug, Clone, Copy)]
pub struct HumanPrinter {
    pub color: bool,
    pub error_color: bool,
}

impl HumanPrinter {
    /// Print `record` for `name`. A record carrying an error prints only
    /// the error, to `err`.
    pub fn print<W, E, F>(
        &self,
        out: &mut W,
        err: &mut E,
        name: &str,
        record: &ProvenanceRecord,
        format_date: F,
    ) -> io::Result<()>
    where
        W: Write,
        E: Write,
        F: Fn(DateTime<Utc>) -> String,
    {
        if let Some(message) = record.error() {
            return if self.error_color {
                writeln!(err, "{RED}{name}: {message}{RESET}")
            } else {
                writeln!(err, "{name}: {message}")
            };
        }
        if record.is_empty() {
            return Ok(());
        }

        if self.color {
            writeln!(out, "{MAGENTA}{name}{RESET}:")?;
        } else {
            writeln!(out, "{name}:")?;
        }
        for (label, value) in display_fields(record, format_date) {
            if self.color {
                write!(out, "  {GREEN}{label:<LABEL_WIDTH$}{RESET} ")?;
            } else {
                write!(out, "  {label:<LABEL_WIDTH$} ")?;
            }
            self.write_limited(out, &value)?;
        }
        Ok(())
    }

    fn write_limited<W: Write>(&self, out: &mut W, value: &str) -> io::Result<()> {
        let Some(head) = truncated(value) else {
            return writeln!(out, "{value}");
        };
        let len = value.len();
        if self.color {
            writeln!(out, "{head}{RED}... ({len} bytes){RESET}")
        } else {
            writeln!(out, "{head}... ({len} bytes)")
        }
    }
}

/// The displayed prefix of `value`, or `None` if it fits.
#[must_use]
pub fn truncated(value: &str) -> Option<&str> {
    if value.len() <= TRUNCATION_LIMIT {
        return None;
    }
    let mut end = TRUNCATION_LIMIT;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    Some(&value[..end])
}

/// Accumulates one JSON object keyed by file name.
#[derive(Debug, Default)]
pub struct JsonReport {
    files: Map<String, Value>,
}

impl JsonReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: String, record: &ProvenanceRecord) -> serde_json::Result<()> {
        let value = serde_json::to_value(record)?;
        self.files.insert(name, value);
        Ok(())
    }

    pub fn write<W: Write>(self, out: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, &Value::Object(self.files))?;
        writeln!(out)
    }
}
