//! QR symbol encoding.
//!
//! The generator only needs "content in, PNG bytes out". [`SymbolEncoder`] is
//! that seam; [`QrPngEncoder`] is the production implementation. Tests swap in
//! a recording mock so generation logic runs without rasterizing anything.
//!
//! ## Raster size
//!
//! The symbol is painted with a whole number of pixels per module so edges
//! stay crisp: `scale = max(1, width / (modules + 2 × margin))`. The resulting
//! image is therefore at most `width` pixels wide, and only smaller when the
//! symbol has more modules than fit at one pixel each.

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("QR encoding failed: {0}")]
    Symbol(#[from] qrcode::types::QrError),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Turns a payload string into PNG bytes.
///
/// `Sync` so one encoder can serve every worker of a parallel batch.
pub trait SymbolEncoder: Sync {
    fn encode_png(&self, content: &str) -> Result<Vec<u8>, EncodeError>;
}

/// Target raster width in pixels.
pub const DEFAULT_WIDTH: u32 = 300;
/// Quiet zone in modules on each side.
pub const DEFAULT_MARGIN: u32 = 2;

/// Black-on-white PNG rendering of a QR symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrPngEncoder {
    pub width: u32,
    pub margin: u32,
}

impl QrPngEncoder {
    pub fn new(width: u32, margin: u32) -> Self {
        Self { width, margin }
    }

    /// Rasterize `code` with the configured quiet zone and scale.
    pub fn render(&self, code: &QrCode) -> GrayImage {
        let modules = code.width() as u32;
        let total = modules + 2 * self.margin;
        let scale = (self.width / total).max(1);
        let side = total * scale;
        let colors = code.to_colors();

        GrayImage::from_fn(side, side, |px, py| {
            let mx = (px / scale) as i64 - self.margin as i64;
            let my = (py / scale) as i64 - self.margin as i64;
            let inside = (0..modules as i64).contains(&mx) && (0..modules as i64).contains(&my);
            if inside && colors[(my as usize) * modules as usize + mx as usize] == Color::Dark {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}

impl Default for QrPngEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_MARGIN)
    }
}

impl SymbolEncoder for QrPngEncoder {
    fn encode_png(&self, content: &str) -> Result<Vec<u8>, EncodeError> {
        let code = QrCode::new(content.as_bytes())?;
        let raster = self.render(&code);
        let mut png = Vec::new();
        raster.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    /// Encoder that records payloads and returns a fixed byte string.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockEncoder {
        pub payloads: Mutex<Vec<String>>,
        pub fail_on: Option<String>,
    }

    impl MockEncoder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail for any payload containing `needle`.
        pub fn failing_on(needle: &str) -> Self {
            Self {
                payloads: Mutex::new(Vec::new()),
                fail_on: Some(needle.to_string()),
            }
        }

        pub fn get_payloads(&self) -> Vec<String> {
            self.payloads.lock().unwrap().clone()
        }
    }

    impl SymbolEncoder for MockEncoder {
        fn encode_png(&self, content: &str) -> Result<Vec<u8>, EncodeError> {
            if self
                .fail_on
                .as_deref()
                .is_some_and(|needle| content.contains(needle))
            {
                return Err(EncodeError::Symbol(qrcode::types::QrError::DataTooLong));
            }
            self.payloads.lock().unwrap().push(content.to_string());
            Ok(format!("png:{content}").into_bytes())
        }
    }

    #[test]
    fn encodes_valid_png() {
        let png = QrPngEncoder::default()
            .encode_png("2024-01-01T12:00:00.000Z")
            .unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), decoded.height());
        assert!(decoded.width() <= DEFAULT_WIDTH);
    }

    #[test]
    fn render_uses_whole_pixel_modules_and_quiet_zone() {
        let encoder = QrPngEncoder::new(300, 2);
        let code = QrCode::new(b"2024-01-01T12:00:00.000Z").unwrap();
        let raster = encoder.render(&code);

        let total = code.width() as u32 + 4;
        let scale = 300 / total;
        assert_eq!(raster.width(), total * scale);

        // Quiet zone is white, finder pattern corner is dark.
        assert_eq!(raster.get_pixel(0, 0), &Luma([255]));
        let corner = 2 * scale;
        assert_eq!(raster.get_pixel(corner, corner), &Luma([0]));
    }

    #[test]
    fn tiny_width_still_renders_one_pixel_per_module() {
        let encoder = QrPngEncoder::new(1, 0);
        let code = QrCode::new(b"x").unwrap();
        let raster = encoder.render(&code);
        assert_eq!(raster.width(), code.width() as u32);
    }

    #[test]
    fn mock_records_payloads() {
        let encoder = MockEncoder::new();
        let bytes = encoder.encode_png("hello").unwrap();
        assert_eq!(bytes, b"png:hello");
        assert_eq!(encoder.get_payloads(), vec!["hello".to_string()]);
    }

    #[test]
    fn mock_fails_on_needle() {
        let encoder = MockEncoder::failing_on("bad");
        assert!(encoder.encode_png("a bad payload").is_err());
        assert!(encoder.get_payloads().is_empty());
    }
}
