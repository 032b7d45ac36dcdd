//! QR image generation.
//!
//! Produces PNG files whose QR payload is the ISO-8601 instant of generation
//! and whose filename follows the [`naming`](crate::naming) grammar.
//!
//! ## Batches
//!
//! A batch call maps the index range `1..=count` to independent work items:
//! take a fresh timestamp, encode it, write `batch-<i>-<ts>.png`. Items run on
//! the [rayon](https://docs.rs/rayon) pool and are collected in index order,
//! so the returned records always read `1, 2, …, count` regardless of which
//! worker finished first.
//!
//! Names are unique because the index is part of them. Two items generated
//! in the same millisecond still get distinct files.
//!
//! ## Failure
//!
//! Any encode or write failure aborts the whole call and no records are
//! returned. Files already written by other items stay on disk.

use crate::naming;
use crate::qr::{EncodeError, QrPngEncoder, SymbolEncoder};
use crate::store::QrStore;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Smallest accepted batch size.
pub const MIN_BATCH: u32 = 1;
/// Largest accepted batch size.
pub const MAX_BATCH: u32 = 100;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("count must be between {min} and {max}, got {count}")]
    InvalidCount { count: String, min: u32, max: u32 },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode {filename}: {source}")]
    Encode {
        filename: String,
        source: EncodeError,
    },
}

impl GenerateError {
    fn invalid_count(count: impl fmt::Display) -> Self {
        Self::InvalidCount {
            count: count.to_string(),
            min: MIN_BATCH,
            max: MAX_BATCH,
        }
    }
}

/// A batch size already checked against `MIN_BATCH..=MAX_BATCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCount(u32);

impl BatchCount {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for BatchCount {
    type Error = GenerateError;

    fn try_from(count: i64) -> Result<Self, Self::Error> {
        if (MIN_BATCH as i64..=MAX_BATCH as i64).contains(&count) {
            Ok(Self(count as u32))
        } else {
            Err(GenerateError::invalid_count(count))
        }
    }
}

impl FromStr for BatchCount {
    type Err = GenerateError;

    /// Accepts decimal integers only; `"x"`, `"1.5"` and `""` are rejected
    /// with the same error as out-of-range values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count: i64 = s
            .trim()
            .parse()
            .map_err(|_| GenerateError::invalid_count(format!("{s:?}")))?;
        Self::try_from(count)
    }
}

impl fmt::Display for BatchCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One generated image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// ISO-8601 instant, also the QR payload.
    pub timestamp: String,
    pub filename: String,
    pub filepath: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<u32>,
    #[serde(skip)]
    pub png: Vec<u8>,
}

/// Source of generation instants.
pub type Clock = fn() -> DateTime<Utc>;

/// Writes QR images into a [`QrStore`].
pub struct Generator<E: SymbolEncoder = QrPngEncoder> {
    store: QrStore,
    encoder: E,
    clock: Clock,
}

impl Generator<QrPngEncoder> {
    pub fn new(store: QrStore) -> Self {
        Self::with_encoder(store, QrPngEncoder::default())
    }
}

impl<E: SymbolEncoder> Generator<E> {
    pub fn with_encoder(store: QrStore, encoder: E) -> Self {
        Self {
            store,
            encoder,
            clock: Utc::now,
        }
    }

    /// Replace the clock (tests freeze it to force timestamp collisions).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &QrStore {
        &self.store
    }

    /// Generate one standalone image.
    pub fn generate_single(&self) -> Result<ImageRecord, GenerateError> {
        let record = self.generate_item(None)?;
        info!(filename = %record.filename, "generated QR code");
        Ok(record)
    }

    /// Generate `count` images named `batch-1-…` through `batch-<count>-…`.
    ///
    /// Fails with [`GenerateError::InvalidCount`] unless `1 <= count <= 100`.
    pub fn generate_batch(&self, count: i64) -> Result<Vec<ImageRecord>, GenerateError> {
        self.generate_batch_of(BatchCount::try_from(count)?)
    }

    /// Generate a batch whose size has already been validated.
    pub fn generate_batch_of(&self, count: BatchCount) -> Result<Vec<ImageRecord>, GenerateError> {
        self.ensure_store()?;

        let records = (MIN_BATCH..=count.get())
            .into_par_iter()
            .map(|index| self.generate_item(Some(index)))
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = records.len(), dir = %self.store.root().display(), "generated QR batch");
        Ok(records)
    }

    fn generate_item(&self, batch_number: Option<u32>) -> Result<ImageRecord, GenerateError> {
        let timestamp = naming::iso_timestamp(&(self.clock)());
        let filename = match batch_number {
            Some(index) => naming::batch_filename(index, &timestamp),
            None => naming::single_filename(&timestamp),
        };

        let png = self
            .encoder
            .encode_png(&timestamp)
            .map_err(|source| GenerateError::Encode {
                filename: filename.clone(),
                source,
            })?;

        let filepath = self
            .store
            .write(&filename, &png)
            .map_err(|source| GenerateError::Io {
                path: self.store.path_for(&filename),
                source,
            })?;
        debug!(%filename, bytes = png.len(), "wrote QR image");

        Ok(ImageRecord {
            timestamp,
            filename,
            filepath,
            batch_number,
            png,
        })
    }

    fn ensure_store(&self) -> Result<(), GenerateError> {
        self.store.ensure_dir().map_err(|source| GenerateError::Io {
            path: self.store.root().to_path_buf(),
            source,
        })
    }
}
