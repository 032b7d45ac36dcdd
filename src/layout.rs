//! Grid pagination for the catalog.
//!
//! Pure calculations, no drawing. The composer asks for one placement per
//! image and gets back coordinates plus a flag telling it to start a new page
//! first.
//!
//! ## Coordinates
//!
//! All values are PDF points (1/72 in) with the origin at the **top-left** of
//! the page and y growing downwards. The renderer flips to PDF's bottom-left
//! convention; nothing here knows about it.
//!
//! ## Grid
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ margin                               │
//! │   ┌ title band ───────────────────┐  │  first page only
//! │   [QR] [QR] [QR] [QR] [QR]           │  item_size + spacing pitch
//! │   cap  cap  cap  cap  cap            │  caption band
//! │   [QR] [QR] ...                      │  item_height = item + caption + spacing
//! └──────────────────────────────────────┘
//! ```
//!
//! The title band is subtracted from the available height on every page, so
//! continuation pages hold the same number of items as the first one even
//! though they start at the top margin.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A4 in points.
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

pub const DEFAULT_MARGIN: f32 = 30.0;
pub const DEFAULT_ITEM_SIZE: f32 = 80.0;
pub const DEFAULT_SPACING: f32 = 10.0;
pub const DEFAULT_CAPTION_HEIGHT: f32 = 16.0;
pub const DEFAULT_TITLE_HEIGHT: f32 = 40.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("page content width {available}pt cannot fit one {required}pt item")]
    TooNarrow { available: f32, required: f32 },
    #[error("page content height {available}pt cannot fit one {required}pt row")]
    TooShort { available: f32, required: f32 },
    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),
}

/// Fixed page geometry the grid is computed from.
///
/// `page_width` and `page_height` are the content area, i.e. the physical
/// page minus the margin on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub item_size: f32,
    pub spacing: f32,
    pub caption_height: f32,
    pub title_height: f32,
}

impl PageGeometry {
    /// Content area of a physical page with the given margin and item bands.
    pub fn for_page(
        physical_width: f32,
        physical_height: f32,
        margin: f32,
        item_size: f32,
        spacing: f32,
        caption_height: f32,
        title_height: f32,
    ) -> Self {
        Self {
            page_width: physical_width - 2.0 * margin,
            page_height: physical_height - 2.0 * margin,
            margin,
            item_size,
            spacing,
            caption_height,
            title_height,
        }
    }

    /// Physical page size: content area plus the margin on both sides.
    pub fn physical_size(&self) -> (f32, f32) {
        (
            self.page_width + 2.0 * self.margin,
            self.page_height + 2.0 * self.margin,
        )
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::for_page(
            A4_WIDTH,
            A4_HEIGHT,
            DEFAULT_MARGIN,
            DEFAULT_ITEM_SIZE,
            DEFAULT_SPACING,
            DEFAULT_CAPTION_HEIGHT,
            DEFAULT_TITLE_HEIGHT,
        )
    }
}

/// Grid capacity derived once per document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutGrid {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub item_size: f32,
    pub spacing: f32,
    pub caption_height: f32,
    pub title_height: f32,
    pub items_per_row: usize,
    pub rows_per_page: usize,
    pub items_per_page: usize,
}

impl LayoutGrid {
    /// Vertical pitch between rows: image, caption band, spacing.
    pub fn item_height(&self) -> f32 {
        self.item_size + self.caption_height + self.spacing
    }

    /// Horizontal pitch between columns.
    pub fn item_pitch(&self) -> f32 {
        self.item_size + self.spacing
    }

    /// Number of pages needed for `items` images.
    pub fn pages_for(&self, items: usize) -> usize {
        items.div_ceil(self.items_per_page).max(1)
    }
}

/// Compute how many items fit per row and per page.
///
/// ```text
/// available_height = page_height − title_height
/// items_per_row    = floor(page_width / (item_size + spacing))
/// item_height      = item_size + caption_height + spacing
/// rows_per_page    = floor(available_height / item_height)
/// items_per_page   = items_per_row × rows_per_page
/// ```
pub fn compute_grid(geometry: &PageGeometry) -> Result<LayoutGrid, LayoutError> {
    let PageGeometry {
        page_width,
        page_height,
        margin,
        item_size,
        spacing,
        caption_height,
        title_height,
    } = *geometry;

    for (name, value) in [
        ("page_width", page_width),
        ("page_height", page_height),
        ("margin", margin),
        ("item_size", item_size),
        ("spacing", spacing),
        ("caption_height", caption_height),
        ("title_height", title_height),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(LayoutError::InvalidGeometry(format!(
                "{name} must be a non-negative number, got {value}"
            )));
        }
    }
    if item_size <= 0.0 {
        return Err(LayoutError::InvalidGeometry(
            "item_size must be positive".into(),
        ));
    }

    let pitch = item_size + spacing;
    let items_per_row = (page_width / pitch).floor() as usize;
    if items_per_row < 1 {
        return Err(LayoutError::TooNarrow {
            available: page_width,
            required: pitch,
        });
    }

    let available_height = page_height - title_height;
    let item_height = item_size + caption_height + spacing;
    let rows_per_page = if available_height > 0.0 {
        (available_height / item_height).floor() as usize
    } else {
        0
    };
    if rows_per_page < 1 {
        return Err(LayoutError::TooShort {
            available: available_height,
            required: item_height,
        });
    }

    Ok(LayoutGrid {
        page_width,
        page_height,
        margin,
        item_size,
        spacing,
        caption_height,
        title_height,
        items_per_row,
        rows_per_page,
        items_per_page: items_per_row * rows_per_page,
    })
}

/// Where the next item goes, and the counters describing the current page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementCursor {
    pub x: f32,
    pub y: f32,
    pub items_in_row: usize,
    pub items_in_page: usize,
}

/// Coordinates for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    /// A new page must be started before drawing at `(x, y)`.
    pub page_break: bool,
}

impl PlacementCursor {
    /// Cursor at `(x, y)` with empty counters.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            items_in_row: 0,
            items_in_page: 0,
        }
    }

    /// Top-left of a continuation page.
    pub fn page_origin(grid: &LayoutGrid) -> Self {
        Self::at(grid.margin, grid.margin)
    }

    /// Top-left of the first page, below the title band.
    pub fn first_page(grid: &LayoutGrid) -> Self {
        Self::at(grid.margin, grid.margin + grid.title_height)
    }

    /// Apply page and row boundaries so the cursor points at a free slot.
    ///
    /// Returns the resolved cursor and whether a page break happened. The
    /// slot is not consumed; call [`advance`](Self::advance) once the item
    /// has actually been drawn.
    pub fn resolve(self, grid: &LayoutGrid) -> (Self, bool) {
        if self.items_in_page >= grid.items_per_page {
            return (Self::page_origin(grid), true);
        }
        if self.items_in_row >= grid.items_per_row {
            let next_row = Self {
                x: grid.margin,
                y: self.y + grid.item_height(),
                items_in_row: 0,
                items_in_page: self.items_in_page,
            };
            return (next_row, false);
        }
        (self, false)
    }

    /// Consume the current slot.
    pub fn advance(self, grid: &LayoutGrid) -> Self {
        Self {
            x: self.x + grid.item_pitch(),
            y: self.y,
            items_in_row: self.items_in_row + 1,
            items_in_page: self.items_in_page + 1,
        }
    }
}

/// Resolve and consume one slot.
pub fn next_placement(cursor: PlacementCursor, grid: &LayoutGrid) -> (Placement, PlacementCursor) {
    let (resolved, page_break) = cursor.resolve(grid);
    let placement = Placement {
        x: resolved.x,
        y: resolved.y,
        page_break,
    };
    (placement, resolved.advance(grid))
}

/// Placements for `count` items starting on the first page.
pub fn plan(grid: &LayoutGrid, count: usize) -> Vec<Placement> {
    let mut cursor = PlacementCursor::first_page(grid);
    (0..count)
        .map(|_| {
            let (placement, next) = next_placement(cursor, grid);
            cursor = next;
            placement
        })
        .collect()
}
