//! Document drawing primitives.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Pages** | `printpdf::PdfDocument::add_page` |
//! | **Images** | `image::load_from_memory` → raw RGB `ImageXObject` |
//! | **Text** | builtin Helvetica via `use_text` |
//! | **Centering** | Helvetica advance widths from [`metrics`] |
//!
//! The module is split into:
//! - **Canvas**: [`Canvas`] trait, shared types, and a recording mock for tests
//! - **Metrics**: pure text-width calculations (unit testable)
//! - **PDF**: [`PdfCanvas`], the printpdf-backed implementation

pub mod canvas;
pub mod metrics;
pub mod pdf;

pub use canvas::{Align, Canvas, DocumentSetup, DrawError, RenderError, TextBlock};
pub use pdf::PdfCanvas;
