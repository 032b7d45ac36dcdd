//! Filename grammar for stored QR images.
//!
//! Every stored image encodes its own identity in the filename. There is no
//! index file or sidecar: the name is the only metadata that survives.
//!
//! ```text
//! 2024-01-01T12-00-00-000Z.png            single image
//! batch-7-2024-01-01T12-00-00-123Z.png    7th image of a batch call
//! ```
//!
//! The timestamp part is an ISO-8601 instant with millisecond precision where
//! every `:` and `.` has been replaced by `-`, which keeps the names portable
//! across filesystems. [`restore_timestamp`] reverses the time portion of that
//! transform so the instant can be parsed again.

use chrono::{DateTime, SecondsFormat, Utc};

/// Extension shared by every stored image.
pub const IMAGE_EXTENSION: &str = "png";

const BATCH_PREFIX: &str = "batch-";

/// ISO-8601 rendering used for both the QR payload and the filename.
///
/// Always UTC, always millisecond precision: `2024-01-01T12:00:00.000Z`.
pub fn iso_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Replace every `:` and `.` with `-`.
pub fn filename_safe(timestamp: &str) -> String {
    timestamp.replace([':', '.'], "-")
}

/// `<ts>.png` for a standalone image.
pub fn single_filename(timestamp: &str) -> String {
    format!("{}.{}", filename_safe(timestamp), IMAGE_EXTENSION)
}

/// `batch-<index>-<ts>.png` for the `index`-th image of a batch call.
///
/// The index makes names unique within a batch even when the clock returns
/// the same millisecond twice.
pub fn batch_filename(index: u32, timestamp: &str) -> String {
    format!(
        "{}{}-{}.{}",
        BATCH_PREFIX,
        index,
        filename_safe(timestamp),
        IMAGE_EXTENSION
    )
}

/// Whether a directory entry name looks like a stored image.
pub fn is_image_name(name: &str) -> bool {
    name.to_ascii_lowercase()
        .ends_with(&format!(".{IMAGE_EXTENSION}"))
}

/// Result of parsing a stored filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedName<'a> {
    /// `<stem>.png`; the stem is expected to be a transformed timestamp.
    Single { stem: &'a str },
    /// `batch-<number>-<timestamp>.png`.
    Batch { number: u32, timestamp: &'a str },
}

impl<'a> ParsedName<'a> {
    /// The part of the name that should hold the transformed timestamp.
    pub fn timestamp_part(&self) -> &'a str {
        match self {
            ParsedName::Single { stem } => stem,
            ParsedName::Batch { timestamp, .. } => timestamp,
        }
    }
}

/// Parse a stored filename into one of the two known shapes.
///
/// Handles these patterns:
/// - `"batch-5-2024-01-01T12-00-00-000Z.png"` → Batch { number: 5, timestamp: "2024-01-01T12-00-00-000Z" }
/// - `"2024-01-01T12-00-00-000Z.png"` → Single { stem: "2024-01-01T12-00-00-000Z" }
/// - `"batch-x-foo.png"` → Single { stem: "batch-x-foo" } (no digits after the prefix)
/// - `"batch-5-.png"` → Single { stem: "batch-5-" } (empty timestamp)
///
/// Never fails: anything that is not a batch name is a single name.
pub fn parse_filename(filename: &str) -> ParsedName<'_> {
    let stem = strip_image_extension(filename);
    match parse_batch_stem(stem) {
        Some((number, timestamp)) => ParsedName::Batch { number, timestamp },
        None => ParsedName::Single { stem },
    }
}

fn strip_image_extension(filename: &str) -> &str {
    let suffix_len = IMAGE_EXTENSION.len() + 1;
    if filename.len() >= suffix_len && is_image_name(filename) {
        &filename[..filename.len() - suffix_len]
    } else {
        filename
    }
}

fn parse_batch_stem(stem: &str) -> Option<(u32, &str)> {
    let rest = stem.strip_prefix(BATCH_PREFIX)?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let timestamp = rest[digits_end..].strip_prefix('-')?;
    if timestamp.is_empty() {
        return None;
    }
    // Digit runs too long for u32 are not batch numbers we could have written.
    let number = rest[..digits_end].parse::<u32>().ok()?;
    Some((number, timestamp))
}

/// Undo the filename transform for the time portion of a timestamp.
///
/// `2024-01-01T12-00-00-000Z` → `2024-01-01T12:00:00.000Z`. Only the first
/// `T<hh>-<mm>-<ss>-<mmm>Z` run is rewritten; input without one is returned
/// unchanged, which then fails to parse downstream.
pub fn restore_timestamp(part: &str) -> String {
    const RUN_LEN: usize = "Thh-mm-ss-mmmZ".len();
    let bytes = part.as_bytes();
    for start in 0..bytes.len().saturating_sub(RUN_LEN - 1) {
        let run = &bytes[start..start + RUN_LEN];
        if is_time_run(run) {
            let mut restored = String::with_capacity(part.len());
            restored.push_str(&part[..start + 3]);
            restored.push(':');
            restored.push_str(&part[start + 4..start + 6]);
            restored.push(':');
            restored.push_str(&part[start + 7..start + 9]);
            restored.push('.');
            restored.push_str(&part[start + 10..]);
            return restored;
        }
    }
    part.to_string()
}

// T hh - mm - ss - mmm Z
fn is_time_run(run: &[u8]) -> bool {
    let digit = |i: usize| run[i].is_ascii_digit();
    run[0] == b'T'
        && digit(1)
        && digit(2)
        && run[3] == b'-'
        && digit(4)
        && digit(5)
        && run[6] == b'-'
        && digit(7)
        && digit(8)
        && run[9] == b'-'
        && digit(10)
        && digit(11)
        && digit(12)
        && run[13] == b'Z'
}
