//! Catalog composition: every stored image on a paginated PDF grid.
//!
//! ## Flow
//!
//! ```text
//! QrStore::list_images  →  sorted names
//!          │
//!          ▼
//! compute_grid (once)   →  LayoutGrid
//!          │
//!          ▼
//! per image: metadata::extract → cursor.resolve → draw → cursor.advance
//!          │
//!          ▼
//! Canvas::finish        →  <output_dir>/qr-codes-collection.pdf
//! ```
//!
//! The first page opens with a title block ("QR Codes Collection", generation
//! date and item count) and the grid starts below it. A draw failure on one
//! image is logged and skipped; its slot stays free for the next image, so
//! the grid never has holes.
//!
//! Drawing goes through the [`Canvas`] trait. [`Composer::compose`] uses the
//! PDF canvas; tests drive [`Composer::compose_with`] with a recording mock.

use crate::generate::Clock;
use crate::layout::{self, LayoutError, LayoutGrid, PageGeometry, PlacementCursor};
use crate::metadata::{self, Metadata};
use crate::render::{Align, Canvas, DocumentSetup, PdfCanvas, RenderError, TextBlock};
use crate::store::QrStore;
use chrono::{Local, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const OUTPUT_FILENAME: &str = "qr-codes-collection.pdf";

pub const DOCUMENT_TITLE: &str = "QR Codes Collection";
pub const DOCUMENT_AUTHOR: &str = "QR Generator API";
pub const DOCUMENT_SUBJECT: &str = "Generated QR Codes";
pub const DOCUMENT_CREATOR: &str = "QR Generator Utility";

const TITLE_FONT_SIZE: f32 = 16.0;
const SUBTITLE_FONT_SIZE: f32 = 8.0;
/// Subtitle line offset from the top of the title block.
const SUBTITLE_OFFSET: f32 = 22.0;

const NAME_FONT_SIZE: f32 = 6.0;
const TIME_FONT_SIZE: f32 = 5.0;
/// Gap between the image bottom and the first caption line.
const CAPTION_GAP: f32 = 1.0;
/// Offset of the second caption line below the first.
const CAPTION_LINE_OFFSET: f32 = 8.0;
/// Display times longer than this are replaced by the display name.
pub const CAPTION_TIME_MAX_CHARS: usize = 20;

/// Generation date shown in the title block, e.g. `1/1/2024`.
const GENERATED_DATE_FORMAT: &str = "%-m/%-d/%Y";

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("no images found in {}", .0.display())]
    EmptyCollection(PathBuf),
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl ComposeError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| ComposeError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Summary of one composition run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogReport {
    pub path: PathBuf,
    /// Images found in the store.
    pub items: usize,
    /// Images actually drawn.
    pub placed: usize,
    /// Filenames whose draw failed.
    pub skipped: Vec<String>,
    pub pages: usize,
    /// Size of the written document.
    pub bytes: u64,
}

/// The two caption lines under an image.
///
/// Line one is always the display name. Line two is the display time, or the
/// name again when the time is longer than [`CAPTION_TIME_MAX_CHARS`].
pub fn caption_lines(meta: &Metadata) -> (&str, &str) {
    let second = if meta.display_time.chars().count() > CAPTION_TIME_MAX_CHARS {
        meta.display_name.as_str()
    } else {
        meta.display_time.as_str()
    };
    (meta.display_name.as_str(), second)
}

pub struct Composer {
    store: QrStore,
    output_dir: PathBuf,
    geometry: PageGeometry,
    clock: Clock,
}

impl Composer {
    pub fn new(store: QrStore, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            output_dir: output_dir.into(),
            geometry: PageGeometry::default(),
            clock: Utc::now,
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Replace the clock used for the generation date.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_FILENAME)
    }

    /// Build the PDF catalog and return its path.
    pub fn compose(&self) -> Result<PathBuf, ComposeError> {
        Ok(self.compose_report()?.path)
    }

    /// Build the PDF catalog and return the full run summary.
    pub fn compose_report(&self) -> Result<CatalogReport, ComposeError> {
        self.compose_with(PdfCanvas::new)
    }

    /// Build the catalog on a canvas produced by `make_canvas`.
    ///
    /// The canvas is only created once the store has been listed and the
    /// grid computed, so an empty store or a bad geometry never starts a
    /// document.
    pub fn compose_with<C, F>(&self, make_canvas: F) -> Result<CatalogReport, ComposeError>
    where
        C: Canvas,
        F: FnOnce(&DocumentSetup) -> Result<C, RenderError>,
    {
        fs::create_dir_all(&self.output_dir).map_err(ComposeError::io(&self.output_dir))?;

        let names = self
            .store
            .list_images()
            .map_err(ComposeError::io(self.store.root()))?;
        if names.is_empty() {
            return Err(ComposeError::EmptyCollection(self.store.root().to_path_buf()));
        }

        let grid = layout::compute_grid(&self.geometry)?;
        debug!(
            items_per_row = grid.items_per_row,
            rows_per_page = grid.rows_per_page,
            items = names.len(),
            "computed layout grid"
        );

        let mut canvas = make_canvas(&self.document_setup())?;
        self.draw_title_block(&mut canvas, &grid, names.len());

        let mut cursor = PlacementCursor::first_page(&grid);
        let mut pages = 1;
        let mut placed = 0;
        let mut skipped = Vec::new();

        for name in &names {
            let meta = metadata::extract(name);
            let (slot, page_break) = cursor.resolve(&grid);
            if page_break {
                canvas.new_page();
                pages += 1;
            }

            let path = self.store.path_for(name);
            match canvas.draw_image(&path, slot.x, slot.y, grid.item_size) {
                Ok(()) => {
                    draw_caption(&mut canvas, &grid, &slot, &meta);
                    cursor = slot.advance(&grid);
                    placed += 1;
                }
                Err(err) => {
                    warn!(file = %name, error = %err, "skipping image");
                    skipped.push(name.clone());
                    cursor = slot;
                }
            }
        }

        let output = self.output_path();
        canvas.finish(&output)?;
        let bytes = fs::metadata(&output).map(|m| m.len()).unwrap_or(0);

        info!(
            path = %output.display(),
            items = names.len(),
            placed,
            skipped = skipped.len(),
            pages,
            "catalog written"
        );

        Ok(CatalogReport {
            path: output,
            items: names.len(),
            placed,
            skipped,
            pages,
            bytes,
        })
    }

    fn document_setup(&self) -> DocumentSetup {
        let (page_width, page_height) = self.geometry.physical_size();
        DocumentSetup {
            title: DOCUMENT_TITLE.to_string(),
            author: DOCUMENT_AUTHOR.to_string(),
            subject: DOCUMENT_SUBJECT.to_string(),
            creator: DOCUMENT_CREATOR.to_string(),
            page_width,
            page_height,
        }
    }

    fn draw_title_block<C: Canvas>(&self, canvas: &mut C, grid: &LayoutGrid, total: usize) {
        let generated = (self.clock)()
            .with_timezone(&Local)
            .format(GENERATED_DATE_FORMAT);
        let subtitle = format!("Generated: {generated} | Total: {total}");

        canvas.draw_text(&TextBlock {
            text: DOCUMENT_TITLE,
            x: grid.margin,
            y: grid.margin,
            width: grid.page_width,
            font_size: TITLE_FONT_SIZE,
            align: Align::Center,
        });
        canvas.draw_text(&TextBlock {
            text: &subtitle,
            x: grid.margin,
            y: grid.margin + SUBTITLE_OFFSET,
            width: grid.page_width,
            font_size: SUBTITLE_FONT_SIZE,
            align: Align::Center,
        });
    }
}

fn draw_caption<C: Canvas>(canvas: &mut C, grid: &LayoutGrid, slot: &PlacementCursor, meta: &Metadata) {
    let (first, second) = caption_lines(meta);
    let top = slot.y + grid.item_size + CAPTION_GAP;

    canvas.draw_text(&TextBlock {
        text: first,
        x: slot.x,
        y: top,
        width: grid.item_size,
        font_size: NAME_FONT_SIZE,
        align: Align::Center,
    });
    canvas.draw_text(&TextBlock {
        text: second,
        x: slot.x,
        y: top + CAPTION_LINE_OFFSET,
        width: grid.item_size,
        font_size: TIME_FONT_SIZE,
        align: Align::Center,
    });
}
