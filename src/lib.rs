//! # QR Catalog
//!
//! Generates QR codes that encode their own creation instant, stores them as
//! PNG files in one flat directory, and lays the whole collection out in a
//! paginated A4 PDF catalog with a caption under every code.
//!
//! # Architecture: Two Independent Stages
//!
//! ```text
//! 1. Generate  clock → qr-codes/*.png                 (encode + write)
//! 2. Compose   qr-codes/*.png → pdf-output/*.pdf      (list + layout + draw)
//! ```
//!
//! The stages share nothing but the directory. The filename is the only
//! metadata store: the generator encodes kind, batch number and timestamp
//! into it, and the composer parses them back out to build captions.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Filename grammar: build and parse `<ts>.png` / `batch-<i>-<ts>.png` |
//! | [`metadata`] | Caption data (kind, batch number, display name and time) from a filename |
//! | [`qr`] | `SymbolEncoder` trait and the PNG QR encoder |
//! | [`store`] | Flat image directory: ensure, write, list |
//! | [`generate`] | Single and batch generation on the rayon pool |
//! | [`layout`] | Pure grid calculations and the placement cursor |
//! | [`render`] | `Canvas` trait and the printpdf implementation |
//! | [`compose`] | Catalog composition: list → layout → draw → write |
//! | [`config`] | `qr-catalog.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Filenames As Metadata
//!
//! A generated image carries its whole identity in its name:
//!
//! ```text
//! batch-5-2024-01-01T12-00-00-000Z.png
//! ^^^^^ ^ ^^^^^^^^^^^^^^^^^^^^^^^^
//! kind  # timestamp with ':' and '.' replaced by '-'
//! ```
//!
//! There is no index file to keep in sync. Any PNG dropped into the
//! directory is catalogued too; names that do not parse are shown as
//! "Single QR" with the raw filename as their time.
//!
//! ## Explicit Placement Cursor
//!
//! Pagination state is a plain value threaded through the composer loop. A
//! slot is only consumed once its image has actually been drawn, so a
//! corrupt file never leaves a hole in the grid.
//!
//! ## Lexicographic Ordering
//!
//! The catalog is sorted by filename bytes. Batch numbers are not
//! zero-padded, so `batch-10-…` sorts before `batch-2-…`.

pub mod compose;
pub mod config;
pub mod generate;
pub mod layout;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod qr;
pub mod render;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
