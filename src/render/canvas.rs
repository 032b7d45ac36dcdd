//! Canvas trait and shared drawing types.
//!
//! The [`Canvas`] trait is the full set of primitives the catalog needs:
//! start a page, place an image, place a line of text, flush to disk.
//! Coordinates are PDF points with a top-left origin, matching
//! [`layout`](crate::layout).
//!
//! Only [`Canvas::draw_image`] can fail per item. Its [`DrawError`] is meant to
//! be recovered by the caller (skip the item), while [`RenderError`] from
//! creating or finishing a document is fatal.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Failure to place one image.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to draw {}: {reason}", path.display())]
pub struct DrawError {
    pub path: PathBuf,
    pub reason: String,
}

impl DrawError {
    pub fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Document-level properties fixed before the first page is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSetup {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    /// Physical page size in points.
    pub page_width: f32,
    pub page_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// One line of text inside a horizontal box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock<'a> {
    pub text: &'a str,
    /// Left edge of the box.
    pub x: f32,
    /// Top of the line.
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub align: Align,
}

pub trait Canvas {
    /// Start a new page; subsequent drawing goes there.
    fn new_page(&mut self);

    /// Place the image at `path` as a `size × size` square with its
    /// top-left corner at `(x, y)`.
    fn draw_image(&mut self, path: &Path, x: f32, y: f32, size: f32) -> Result<(), DrawError>;

    fn draw_text(&mut self, block: &TextBlock<'_>);

    /// Write the finished document to `output`.
    fn finish(self, output: &Path) -> Result<(), RenderError>;
}
