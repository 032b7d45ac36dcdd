//! Shared test utilities for the qr-catalog test suite.
//!
//! Provides fixture writers that populate a temporary store directory with
//! real PNG files, plus a frozen clock for deterministic filenames.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let names = populate_store(tmp.path(), 3);
//! assert_eq!(names[0], "batch-1-2024-01-01T12-00-00-000Z.png");
//! ```

use chrono::{DateTime, TimeZone, Utc};
use image::{GrayImage, ImageFormat, Luma};
use std::path::{Path, PathBuf};

use crate::naming::{batch_filename, iso_timestamp, single_filename};

// =========================================================================
// Clock
// =========================================================================

/// 2024-01-01T12:00:00.000Z
pub fn frozen_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub fn frozen_timestamp() -> String {
    iso_timestamp(&frozen_now())
}

// =========================================================================
// Fixture files
// =========================================================================

/// Write a `side × side` checkerboard PNG into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, side: u32) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let img = GrayImage::from_fn(side, side, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    });
    let path = dir.join(name);
    img.save_with_format(&path, ImageFormat::Png).unwrap();
    path
}

/// Write `count` batch images named for the frozen clock. Returns the names
/// in generation order.
pub fn populate_store(dir: &Path, count: u32) -> Vec<String> {
    let ts = frozen_timestamp();
    (1..=count)
        .map(|i| {
            let name = batch_filename(i, &ts);
            write_png(dir, &name, 16);
            name
        })
        .collect()
}

/// Write one single-generation image named for the frozen clock.
pub fn write_single(dir: &Path) -> String {
    let name = single_filename(&frozen_timestamp());
    write_png(dir, &name, 16);
    name
}
