//! The normalized provenance record.
//!
//! Every field is first-writer-wins: collectors run in a fixed phase order
//! and a field that already holds a value is never overwritten. The fields
//! are private so the only way to write one is through [`ProvenanceRecord::fill`]
//! and friends, which enforce that rule.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A string-valued field of [`ProvenanceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Url,
    Referrer,
    From,
    Subject,
    MessageId,
    Application,
    Zone,
}

impl Field {
    pub const ALL: [Self; 7] = [
        Self::Url,
        Self::Referrer,
        Self::From,
        Self::Subject,
        Self::MessageId,
        Self::Application,
        Self::Zone,
    ];

    /// Label used in human-readable output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Url => "URL",
            Self::Referrer => "Referrer",
            Self::From => "From",
            Self::Subject => "Subject",
            Self::MessageId => "Message-ID",
            Self::Application => "Application",
            Self::Zone => "Zone",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvenanceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(rename = "message-id", skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ProvenanceRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Url => self.url.as_deref(),
            Field::Referrer => self.referrer.as_deref(),
            Field::From => self.from.as_deref(),
            Field::Subject => self.subject.as_deref(),
            Field::MessageId => self.message_id.as_deref(),
            Field::Application => self.application.as_deref(),
            Field::Zone => self.zone.as_deref(),
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Url => &mut self.url,
            Field::Referrer => &mut self.referrer,
            Field::From => &mut self.from,
            Field::Subject => &mut self.subject,
            Field::MessageId => &mut self.message_id,
            Field::Application => &mut self.application,
            Field::Zone => &mut self.zone,
        }
    }

    #[must_use]
    pub fn is_set(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Store `value` in `field` unless it already holds one.
    ///
    /// Returns `true` if the value was stored.
    pub fn fill(&mut self, field: Field, value: impl Into<String>) -> bool {
        self.fill_with(field, || value.into())
    }

    /// Like [`fill`](Self::fill), but only builds the value when the field is
    /// still empty.
    pub fn fill_with(&mut self, field: Field, make: impl FnOnce() -> String) -> bool {
        let slot = self.slot(field);
        if slot.is_some() {
            return false;
        }
        *slot = Some(make());
        true
    }

    #[must_use]
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn fill_date(&mut self, date: DateTime<Utc>) -> bool {
        if self.date.is_some() {
            return false;
        }
        self.date = Some(date);
        true
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Record `message` as the diagnostic unless one is already present.
    pub fn note_error(&mut self, message: impl Into<String>) -> bool {
        if self.error.is_some() {
            return false;
        }
        self.error = Some(message.into());
        true
    }

    /// True when nothing at all has been recorded, including errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Present string fields in display order.
    pub fn present(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }
}
