//! Entry model
//!
//! An entry is one dated financial transaction that references exactly one
//! category.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::ids::{CategoryId, EntryId};
use super::money::Money;

/// Date of an entry, kept in the form it was written
///
/// New entries carry a plain `YYYY-MM-DD` date. Older documents stored an
/// RFC 3339 timestamp or epoch milliseconds; those are written back
/// unchanged so that re-saving a document never moves an entry's instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryDate(Written);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Written {
    Calendar(NaiveDate),
    Timestamp {
        at: DateTime<FixedOffset>,
        precision: SecondsFormat,
        use_z: bool,
    },
    Millis(i64),
}

impl EntryDate {
    /// Wrap a calendar date
    pub fn new(date: NaiveDate) -> Self {
        Self(Written::Calendar(date))
    }

    /// Build from year, month and day, if they form a valid date
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::new)
    }

    /// Parse a `YYYY-MM-DD` date or an RFC 3339 timestamp
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Self::new(date));
        }
        let at = DateTime::parse_from_rfc3339(s).ok()?;
        Some(Self(Written::Timestamp {
            at,
            precision: seconds_format(s),
            use_z: s.ends_with(['Z', 'z']),
        }))
    }

    /// Wrap an epoch-milliseconds timestamp
    pub fn from_timestamp_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(|_| Self(Written::Millis(millis)))
    }

    /// The calendar date the entry falls on
    ///
    /// A timestamp with an explicit offset uses the date at that offset. UTC
    /// timestamps and epoch milliseconds carry no writer offset, so they are
    /// read in the local time zone, the same way the writer picked them.
    pub fn date(&self) -> NaiveDate {
        match self.0 {
            Written::Calendar(date) => date,
            Written::Timestamp { at, use_z, .. } => {
                if use_z {
                    at.with_timezone(&Local).date_naive()
                } else {
                    at.date_naive()
                }
            }
            Written::Millis(millis) => DateTime::<Utc>::from_timestamp_millis(millis)
                .map(|dt| dt.with_timezone(&Local).date_naive())
                .unwrap_or_default(),
        }
    }

    /// The full instant, for dates written as timestamps
    pub fn instant(&self) -> Option<DateTime<FixedOffset>> {
        match self.0 {
            Written::Calendar(_) => None,
            Written::Timestamp { at, .. } => Some(at),
            Written::Millis(millis) => {
                DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.fixed_offset())
            }
        }
    }
}

/// Fractional-second precision of an RFC 3339 string
fn seconds_format(s: &str) -> SecondsFormat {
    let digits = s
        .split_once('.')
        .map(|(_, rest)| rest.chars().take_while(|c| c.is_ascii_digit()).count())
        .unwrap_or(0);
    match digits {
        0 => SecondsFormat::Secs,
        3 => SecondsFormat::Millis,
        6 => SecondsFormat::Micros,
        9 => SecondsFormat::Nanos,
        _ => SecondsFormat::AutoSi,
    }
}

impl From<NaiveDate> for EntryDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date)
    }
}

impl fmt::Display for EntryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date().format("%Y-%m-%d"))
    }
}

impl Serialize for EntryDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Written::Calendar(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
            Written::Timestamp {
                at,
                precision,
                use_z,
            } => serializer.serialize_str(&at.to_rfc3339_opts(precision, use_z)),
            Written::Millis(millis) => serializer.serialize_i64(millis),
        }
    }
}

impl<'de> Deserialize<'de> for EntryDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntryDateVisitor)
    }
}

struct EntryDateVisitor;

impl<'de> de::Visitor<'de> for EntryDateVisitor {
    type Value = EntryDate;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a YYYY-MM-DD date, an RFC 3339 timestamp, or epoch milliseconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EntryDate, E> {
        EntryDate::parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntryDate, E> {
        EntryDate::from_timestamp_millis(v)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntryDate, E> {
        i64::try_from(v)
            .ok()
            .and_then(EntryDate::from_timestamp_millis)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }
}

/// A dated financial entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique, stable identifier
    pub id: EntryId,

    /// Short description
    pub title: String,

    /// The category this entry is booked against
    pub category: CategoryId,

    /// When the entry happened
    pub date: EntryDate,

    /// Signed amount
    pub amount: Money,
}

impl Entry {
    /// Create an entry from its fields with a fresh id
    pub fn new(new: NewEntry) -> Self {
        Self {
            id: EntryId::new(),
            title: new.title,
            category: new.category,
            date: new.date,
            amount: new.amount,
        }
    }

    /// Replace every mutable field, keeping the id
    pub fn apply(&mut self, new: NewEntry) {
        self.title = new.title;
        self.category = new.category;
        self.date = new.date;
        self.amount = new.amount;
    }

    /// Validate the entry
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.title.trim().is_empty() {
            return Err(EntryValidationError::EmptyTitle);
        }

        Ok(())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.date, self.title, self.amount)
    }
}

/// The caller-supplied fields of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub title: String,
    pub category: CategoryId,
    pub date: EntryDate,
    pub amount: Money,
}

impl NewEntry {
    pub fn new(
        title: impl Into<String>,
        category: CategoryId,
        date: EntryDate,
        amount: Money,
    ) -> Self {
        Self {
            title: title.into(),
            category,
            date,
            amount,
        }
    }
}

/// Validation errors for entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyTitle,
}

impl fmt::Display for EntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Entry title cannot be empty"),
        }
    }
}

impl std::error::Error for EntryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn sample(category: CategoryId) -> NewEntry {
        NewEntry::new(
            "Milk",
            category,
            EntryDate::from_ymd(2024, 1, 1).unwrap(),
            Money::from_i64(5),
        )
    }

    #[test]
    fn test_new_entry() {
        let category = CategoryId::new();
        let entry = Entry::new(sample(category));
        assert_eq!(entry.title, "Milk");
        assert_eq!(entry.category, category);
        assert_eq!(entry.amount, Money::from_i64(5));
    }

    #[test]
    fn test_apply_keeps_id() {
        let mut entry = Entry::new(sample(CategoryId::new()));
        let id = entry.id;

        let mut changed = sample(CategoryId::new());
        changed.title = "Bread".into();
        entry.apply(changed);

        assert_eq!(entry.id, id);
        assert_eq!(entry.title, "Bread");
    }

    #[test]
    fn test_validation() {
        let mut entry = Entry::new(sample(CategoryId::new()));
        assert!(entry.validate().is_ok());

        entry.title.clear();
        assert_eq!(entry.validate(), Err(EntryValidationError::EmptyTitle));
    }

    #[test]
    fn test_date_written_as_calendar_date() {
        let date = EntryDate::from_ymd(2024, 3, 9).unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-03-09\"");
    }

    #[test]
    fn test_date_accepts_legacy_forms() {
        let from_offset: EntryDate = serde_json::from_str("\"2024-02-01T00:00:00+02:00\"").unwrap();
        assert_eq!(from_offset.date(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        // 2024-01-15T12:00:00Z, the 15th or 16th in every time zone
        let from_millis: EntryDate = serde_json::from_str("1705320000000").unwrap();
        assert!(matches!(from_millis.date().day(), 15 | 16));
        assert_eq!(from_millis.instant().unwrap().timestamp_millis(), 1705320000000);
    }

    #[test]
    fn test_timestamps_are_written_back_unchanged() {
        for raw in [
            "\"2024-01-31T22:00:00.000Z\"",
            "\"2024-01-31T22:00:00Z\"",
            "\"2024-02-01T00:00:00+02:00\"",
            "1706738400000",
        ] {
            let date: EntryDate = serde_json::from_str(raw).unwrap();
            assert_eq!(serde_json::to_string(&date).unwrap(), raw);
        }
    }

    #[test]
    fn test_utc_timestamp_keeps_its_instant() {
        let date: EntryDate = serde_json::from_str("\"2024-01-31T22:00:00.000Z\"").unwrap();
        let instant = date.instant().unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-01-31T22:00:00+00:00");
        assert_eq!(date.date(), instant.with_timezone(&Local).date_naive());
    }

    #[test]
    fn test_date_rejects_garbage() {
        assert!(serde_json::from_str::<EntryDate>("\"yesterday\"").is_err());
        assert!(serde_json::from_str::<EntryDate>("true").is_err());
    }
}
