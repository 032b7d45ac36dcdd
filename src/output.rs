//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Single
//!
//! ```text
//! Generated 2024-01-01T12-00-00-000Z.png
//!     Path: qr-codes/2024-01-01T12-00-00-000Z.png
//!     Content: 2024-01-01T12:00:00.000Z
//! ```
//!
//! ## Batch
//!
//! ```text
//! 001 Batch #1
//!     Path: qr-codes/batch-1-2024-01-01T12-00-00-000Z.png
//! 002 Batch #2
//!     Path: qr-codes/batch-2-2024-01-01T12-00-00-001Z.png
//!
//! Successfully generated 2 QR codes
//! ```
//!
//! With `--json` the batch is printed as the structured response instead:
//! `{ "message", "count", "files": [{ "filename", "filepath", "batchNumber" }] }`.
//!
//! ## List
//!
//! ```text
//! 001 Batch #10
//!     Source: batch-10-2024-01-01T12-00-00-000Z.png
//!     Time: 2024-01-01 13:00:00.000
//! 002 Single QR
//!     Source: not-a-timestamp.png
//!
//! 2 images (1 from batches)
//! ```
//!
//! ## Compose
//!
//! ```text
//! Catalog → pdf-output/qr-codes-collection.pdf
//!     Pages: 2
//!     Size: 41.2 KB
//!     Skipped: broken.png
//!
//! Placed 31 of 32 images
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::compose::CatalogReport;
use crate::generate::ImageRecord;
use crate::metadata::{self, Kind};
use serde::Serialize;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Human-readable byte size: `512 B`, `41.2 KB`, `1.5 MB`.
fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

// ============================================================================
// Generation
// ============================================================================

pub fn format_single_output(record: &ImageRecord) -> Vec<String> {
    vec![
        format!("Generated {}", record.filename),
        format!("{}Path: {}", indent(1), record.filepath.display()),
        format!("{}Content: {}", indent(1), record.timestamp),
    ]
}

pub fn print_single_output(record: &ImageRecord) {
    for line in format_single_output(record) {
        println!("{line}");
    }
}

fn batch_message(count: usize) -> String {
    format!("Successfully generated {count} QR codes")
}

pub fn format_batch_output(records: &[ImageRecord]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let number = record.batch_number.unwrap_or((i + 1) as u32);
        lines.push(format!("{} Batch #{}", format_index(i + 1), number));
        lines.push(format!("{}Path: {}", indent(1), record.filepath.display()));
    }
    lines.push(String::new());
    lines.push(batch_message(records.len()));
    lines
}

pub fn print_batch_output(records: &[ImageRecord]) {
    for line in format_batch_output(records) {
        println!("{line}");
    }
}

/// Structured batch result.
#[derive(Debug, Serialize)]
pub struct BatchResponse<'a> {
    pub message: String,
    pub count: usize,
    pub files: Vec<BatchFile<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFile<'a> {
    pub filename: &'a str,
    pub filepath: String,
    pub batch_number: Option<u32>,
}

pub fn batch_response(records: &[ImageRecord]) -> BatchResponse<'_> {
    BatchResponse {
        message: batch_message(records.len()),
        count: records.len(),
        files: records
            .iter()
            .map(|r| BatchFile {
                filename: &r.filename,
                filepath: r.filepath.display().to_string(),
                batch_number: r.batch_number,
            })
            .collect(),
    }
}

pub fn format_batch_json(records: &[ImageRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&batch_response(records))
}

pub fn print_batch_json(records: &[ImageRecord]) -> Result<(), serde_json::Error> {
    println!("{}", format_batch_json(records)?);
    Ok(())
}

// ============================================================================
// Listing
// ============================================================================

/// One entry per stored image with the metadata its caption would show.
///
/// The time line is omitted when the filename did not parse, since the
/// display time is then just the filename again.
pub fn format_list_output(names: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let meta = metadata::extract(name);
        lines.push(format!("{} {}", format_index(i + 1), meta.display_name));
        lines.push(format!("{}Source: {}", indent(1), name));
        if meta.display_time != *name {
            lines.push(format!("{}Time: {}", indent(1), meta.display_time));
        }
    }
    if !names.is_empty() {
        lines.push(String::new());
    }
    let batches = names
        .iter()
        .filter(|n| metadata::extract(n).kind == Kind::Batch)
        .count();
    lines.push(format!(
        "{} ({} from batches)",
        plural(names.len(), "image"),
        batches
    ));
    lines
}

pub fn print_list_output(names: &[String]) {
    for line in format_list_output(names) {
        println!("{line}");
    }
}

// ============================================================================
// Composition
// ============================================================================

pub fn format_compose_output(report: &CatalogReport) -> Vec<String> {
    let mut lines = vec![
        format!("Catalog → {}", report.path.display()),
        format!("{}Pages: {}", indent(1), report.pages),
        format!("{}Size: {}", indent(1), format_size(report.bytes)),
    ];
    for name in &report.skipped {
        lines.push(format!("{}Skipped: {}", indent(1), name));
    }
    lines.push(String::new());
    lines.push(format!(
        "Placed {} of {}",
        report.placed,
        plural(report.items, "image")
    ));
    lines
}

pub fn print_compose_output(report: &CatalogReport) {
    for line in format_compose_output(report) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(batch_number: Option<u32>, filename: &str) -> ImageRecord {
        ImageRecord {
            timestamp: "2024-01-01T12:00:00.000Z".to_string(),
            filename: filename.to_string(),
            filepath: PathBuf::from("qr-codes").join(filename),
            batch_number,
            png: Vec::new(),
        }
    }

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn format_size_picks_unit() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024 / 2), "1.5 MB");
    }

    // =========================================================================
    // Generation output
    // =========================================================================

    #[test]
    fn single_output_shows_path_and_content() {
        let lines = format_single_output(&record(None, "2024-01-01T12-00-00-000Z.png"));
        assert_eq!(lines[0], "Generated 2024-01-01T12-00-00-000Z.png");
        assert_eq!(
            lines[1],
            "    Path: qr-codes/2024-01-01T12-00-00-000Z.png"
        );
        assert_eq!(lines[2], "    Content: 2024-01-01T12:00:00.000Z");
    }

    #[test]
    fn batch_output_lists_items_and_summary() {
        let records = vec![
            record(Some(1), "batch-1-x.png"),
            record(Some(2), "batch-2-x.png"),
        ];
        let lines = format_batch_output(&records);
        assert_eq!(lines[0], "001 Batch #1");
        assert_eq!(lines[1], "    Path: qr-codes/batch-1-x.png");
        assert_eq!(lines[2], "002 Batch #2");
        assert_eq!(lines.last().unwrap(), "Successfully generated 2 QR codes");
    }

    #[test]
    fn batch_json_has_response_shape() {
        let records = vec![record(Some(1), "batch-1-x.png")];
        let json: serde_json::Value =
            serde_json::from_str(&format_batch_json(&records).unwrap()).unwrap();

        assert_eq!(json["message"], "Successfully generated 1 QR codes");
        assert_eq!(json["count"], 1);
        assert_eq!(json["files"][0]["filename"], "batch-1-x.png");
        assert_eq!(json["files"][0]["filepath"], "qr-codes/batch-1-x.png");
        assert_eq!(json["files"][0]["batchNumber"], 1);
    }

    // =========================================================================
    // List output
    // =========================================================================

    #[test]
    fn list_shows_name_source_and_time() {
        let names = vec![
            "batch-10-2024-01-01T12-00-00-000Z.png".to_string(),
            "not-a-timestamp.png".to_string(),
        ];
        let lines = format_list_output(&names);

        assert_eq!(lines[0], "001 Batch #10");
        assert_eq!(lines[1], "    Source: batch-10-2024-01-01T12-00-00-000Z.png");
        assert!(lines[2].starts_with("    Time: 2024-01-0"), "{}", lines[2]);
        assert_eq!(lines[3], "002 Single QR");
        assert_eq!(lines[4], "    Source: not-a-timestamp.png");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "2 images (1 from batches)");
    }

    #[test]
    fn empty_list_prints_summary_only() {
        assert_eq!(format_list_output(&[]), vec!["0 images (0 from batches)"]);
    }

    // =========================================================================
    // Compose output
    // =========================================================================

    #[test]
    fn compose_output_reports_pages_and_skips() {
        let report = CatalogReport {
            path: PathBuf::from("pdf-output/qr-codes-collection.pdf"),
            items: 32,
            placed: 31,
            skipped: vec!["broken.png".to_string()],
            pages: 2,
            bytes: 2048,
        };
        let lines = format_compose_output(&report);
        assert_eq!(lines[0], "Catalog → pdf-output/qr-codes-collection.pdf");
        assert_eq!(lines[1], "    Pages: 2");
        assert_eq!(lines[2], "    Size: 2.0 KB");
        assert_eq!(lines[3], "    Skipped: broken.png");
        assert_eq!(lines.last().unwrap(), "Placed 31 of 32 images");
    }

    #[test]
    fn compose_output_singular_image() {
        let report = CatalogReport {
            path: PathBuf::from("out.pdf"),
            items: 1,
            placed: 1,
            skipped: Vec::new(),
            pages: 1,
            bytes: 10,
        };
        let lines = format_compose_output(&report);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "Placed 1 of 1 image");
    }
}
