//! Display metadata derived from stored filenames.
//!
//! The catalog captions every image with two lines: a name ("Batch #3" or
//! "Single QR") and the moment the code was generated. Both come from the
//! filename alone (see [`naming`](crate::naming) for the grammar), so
//! [`extract`] is a pure function with no I/O.
//!
//! ## Fallback
//!
//! Foreign or hand-renamed files still end up in the catalog. When the
//! timestamp part of a name does not parse, the display time is the original
//! filename, untouched. Extraction never fails.
//!
//! ## Rendering
//!
//! Parsed instants are shown in the local time zone with millisecond
//! precision (`2024-01-01 13:00:00.000`), so the caption can be parsed back to
//! the exact instant that was encoded in the QR payload.

use crate::naming::{self, ParsedName};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

/// Format used for [`Metadata::display_time`] when the timestamp parses.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Caption name for images that are not part of a batch.
pub const SINGLE_DISPLAY_NAME: &str = "Single QR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Single,
    Batch,
}

/// Human-readable caption data for one stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub kind: Kind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<u32>,
    pub display_time: String,
    pub display_name: String,
}

/// Derive display metadata from a stored filename.
///
/// - `batch-5-2024-01-01T12-00-00-000Z.png` → Batch, number 5, "Batch #5"
/// - `2024-01-01T12-00-00-000Z.png` → Single, "Single QR"
/// - `not-a-timestamp.png` → Single, display time `"not-a-timestamp.png"`
pub fn extract(filename: &str) -> Metadata {
    let parsed = naming::parse_filename(filename);
    let display_time = parse_timestamp(parsed.timestamp_part())
        .map(|instant| render_local(&instant))
        .unwrap_or_else(|| filename.to_string());

    match parsed {
        ParsedName::Batch { number, .. } => Metadata {
            kind: Kind::Batch,
            batch_number: Some(number),
            display_time,
            display_name: format!("Batch #{number}"),
        },
        ParsedName::Single { .. } => Metadata {
            kind: Kind::Single,
            batch_number: None,
            display_time,
            display_name: SINGLE_DISPLAY_NAME.to_string(),
        },
    }
}

/// Parse the timestamp part of a filename back into an instant.
pub fn parse_timestamp(part: &str) -> Option<DateTime<Utc>> {
    let restored = naming::restore_timestamp(part);
    DateTime::parse_from_rfc3339(&restored)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn render_local(instant: &DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}
