//! printpdf-backed [`Canvas`].
//!
//! printpdf works in millimetres with the origin at the bottom-left. The
//! canvas converts from the catalog's top-left point space at the boundary:
//!
//! ```text
//! x_mm = x_pt × 25.4 / 72
//! y_mm = (page_height_pt − y_pt − box_height_pt) × 25.4 / 72
//! ```
//!
//! Images are decoded with the `image` crate and embedded as raw 8-bit RGB.
//! The embed DPI is chosen so the pixel width lands exactly on the requested
//! size in points.

use super::canvas::{Align, Canvas, DocumentSetup, DrawError, RenderError, TextBlock};
use super::metrics;
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Px,
};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const LAYER_NAME: &str = "Layer 1";

/// Helvetica ascender as a fraction of the font size.
const ASCENT: f32 = 0.718;

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * 25.4 / 72.0
}

pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    page_width: f32,
    page_height: f32,
}

impl PdfCanvas {
    /// Start a one-page document with `setup`'s page size and info fields.
    pub fn new(setup: &DocumentSetup) -> Result<Self, RenderError> {
        let (doc, page, layer) = PdfDocument::new(
            &setup.title,
            Mm(pt_to_mm(setup.page_width)),
            Mm(pt_to_mm(setup.page_height)),
            LAYER_NAME,
        );
        let doc = doc
            .with_author(setup.author.as_str())
            .with_subject(setup.subject.as_str())
            .with_creator(setup.creator.as_str());
        let layer = doc.get_page(page).get_layer(layer);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        Ok(Self {
            doc,
            layer,
            font,
            page_width: setup.page_width,
            page_height: setup.page_height,
        })
    }

    /// Bottom edge of a box of `height` whose top is at `y`, in printpdf space.
    fn flip_y(&self, y: f32, height: f32) -> Mm {
        Mm(pt_to_mm(self.page_height - y - height))
    }
}

impl Canvas for PdfCanvas {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(pt_to_mm(self.page_width)),
            Mm(pt_to_mm(self.page_height)),
            LAYER_NAME,
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    fn draw_image(&mut self, path: &Path, x: f32, y: f32, size: f32) -> Result<(), DrawError> {
        let bytes = fs::read(path).map_err(|e| DrawError::new(path, e.to_string()))?;
        let decoded =
            image::load_from_memory(&bytes).map_err(|e| DrawError::new(path, e.to_string()))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(DrawError::new(path, "image has no pixels"));
        }

        let image = Image::from(ImageXObject {
            width: Px(width as usize),
            height: Px(height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: rgb.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // pixels / (size_pt / 72 in)
        let dpi = width as f32 * 72.0 / size;
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(pt_to_mm(x))),
                translate_y: Some(self.flip_y(y, size)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn draw_text(&mut self, block: &TextBlock<'_>) {
        let x = match block.align {
            Align::Left => block.x,
            Align::Center => metrics::centered_x(block.text, block.font_size, block.x, block.width),
        };
        let baseline = self.flip_y(block.y, block.font_size * ASCENT);
        self.layer.use_text(
            block.text,
            block.font_size,
            Mm(pt_to_mm(x)),
            baseline,
            &self.font,
        );
    }

    fn finish(self, output: &Path) -> Result<(), RenderError> {
        let mut writer = BufWriter::new(File::create(output)?);
        self.doc
            .save(&mut writer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{A4_HEIGHT, A4_WIDTH};
    use crate::test_helpers::write_png;
    use tempfile::TempDir;

    fn a4_setup() -> DocumentSetup {
        DocumentSetup {
            title: "Test Catalog".to_string(),
            author: "tests".to_string(),
            subject: "rendering".to_string(),
            creator: "tests".to_string(),
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
        }
    }

    #[test]
    fn a4_is_210_by_297_mm() {
        assert!((pt_to_mm(A4_WIDTH) - 210.0).abs() < 0.01);
        assert!((pt_to_mm(A4_HEIGHT) - 297.0).abs() < 0.01);
    }

    #[test]
    fn writes_pdf_with_images_and_text() {
        let tmp = TempDir::new().unwrap();
        let png = write_png(tmp.path(), "a.png", 40);
        let out = tmp.path().join("out.pdf");

        let mut canvas = PdfCanvas::new(&a4_setup()).unwrap();
        canvas.draw_image(&png, 30.0, 70.0, 80.0).unwrap();
        canvas.draw_text(&TextBlock {
            text: "Batch #1",
            x: 30.0,
            y: 151.0,
            width: 80.0,
            font_size: 6.0,
            align: Align::Center,
        });
        canvas.new_page();
        canvas.draw_image(&png, 30.0, 30.0, 80.0).unwrap();
        canvas.finish(&out).unwrap();

        let bytes = fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn missing_image_is_a_draw_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.png");
        let mut canvas = PdfCanvas::new(&a4_setup()).unwrap();

        let err = canvas.draw_image(&missing, 30.0, 70.0, 80.0).unwrap_err();
        assert_eq!(err.path, missing);
    }

    #[test]
    fn corrupt_image_is_a_draw_error() {
        let tmp = TempDir::new().unwrap();
        let broken = tmp.path().join("broken.png");
        fs::write(&broken, b"not a png").unwrap();
        let mut canvas = PdfCanvas::new(&a4_setup()).unwrap();

        assert!(canvas.draw_image(&broken, 30.0, 70.0, 80.0).is_err());
    }

    #[test]
    fn finish_into_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let canvas = PdfCanvas::new(&a4_setup()).unwrap();
        let err = canvas
            .finish(&tmp.path().join("no/such/dir/out.pdf"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
