use crate::error::{QrError, Result};
use crate::matrix::ModuleMatrix;
use crate::qrcode::QrCode;

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/*---- Rendering ----*/

/// Pixel geometry of a rendered symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pixels per module edge. Must be at least 1.
    pub box_size: i32,
    /// Light quiet zone around the symbol, in modules. Must not be negative.
    pub border: i32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            box_size: 10,
            border: 4,
        }
    }
}

impl RenderOptions {
    /// Returns the image edge length in pixels for a symbol of `size` modules.
    pub fn image_size(&self, size: usize) -> Result<u32> {
        let invalid = || QrError::InvalidGeometry {
            box_size: self.box_size,
            border: self.border,
        };
        if self.box_size < 1 || self.border < 0 {
            return Err(invalid());
        }
        u32::try_from(size)
            .ok()
            .and_then(|size| size.checked_add(2 * self.border as u32))
            .and_then(|modules| modules.checked_mul(self.box_size as u32))
            .ok_or_else(invalid)
    }
}

/// Expands a module matrix into a grayscale image: each module becomes a
/// `box_size` square, black if dark and white if light, framed by `border`
/// modules of white.
pub fn render_matrix(matrix: &ModuleMatrix, options: &RenderOptions) -> Result<GrayImage> {
    let edge = options.image_size(matrix.size())?;
    let box_size = options.box_size as u32;
    let border = options.border as u32;
    let size = matrix.size() as u32;

    let img = ImageBuffer::from_fn(edge, edge, |x, y| {
        let mx = (x / box_size).checked_sub(border).filter(|&mx| mx < size);
        let my = (y / box_size).checked_sub(border).filter(|&my| my < size);
        match (mx, my) {
            (Some(mx), Some(my)) if matrix.is_dark(mx as usize, my as usize) => Luma([0u8]), // Black
            _ => Luma([255u8]), // White
        }
    });
    debug!(width = edge, height = edge, box_size, border, "rendered symbol");
    Ok(img)
}

/// Generates an image buffer from a finished QR Code.
///
/// # Example
///
/// ```
/// use qrpng::helper::{to_image_buffer, RenderOptions};
/// use qrpng::qrcode::{EncodeOptions, QrCode};
///
/// let qr = QrCode::encode_text("Hello, World!", &EncodeOptions::default()).unwrap();
/// let img = to_image_buffer(&qr, &RenderOptions::default()).unwrap();
/// assert_eq!(img.dimensions(), (290, 290));
/// ```
pub fn to_image_buffer(qr: &QrCode, options: &RenderOptions) -> Result<GrayImage> {
    render_matrix(qr.matrix(), options)
}

/// Encodes a rendered QR Code as an 8-bit grayscale PNG.
pub fn to_png_bytes(qr: &QrCode, options: &RenderOptions) -> Result<Vec<u8>> {
    matrix_to_png_bytes(qr.matrix(), options)
}

pub(crate) fn matrix_to_png_bytes(matrix: &ModuleMatrix, options: &RenderOptions) -> Result<Vec<u8>> {
    let img = render_matrix(matrix, options)?;
    let mut buffer = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

/// Renders a QR Code and saves it as a PNG file.
///
/// # Arguments
///
/// * `qr` - The QR Code object to convert.
/// * `path` - Destination file. Missing parent directories are created.
/// * `options` - Box size and border.
///
/// # Errors
///
/// Returns [`QrError::InvalidGeometry`] for a bad box size or border, and
/// [`QrError::Image`] if the directory or file cannot be written.
pub fn save_png(qr: &QrCode, path: impl AsRef<Path>, options: &RenderOptions) -> Result<()> {
    let path = path.as_ref();
    let img = to_image_buffer(qr, options)?;

    // Check if the directory exists, create it if it doesn't
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(image::ImageError::IoError)?;
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    debug!(path = %path.display(), "saved symbol");
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::qrcode::EncodeOptions;

    fn hello() -> QrCode {
        QrCode::encode_text("Hello, world!", &EncodeOptions::default()).unwrap()
    }

    #[test]
    fn test_image_geometry() {
        let img = to_image_buffer(&hello(), &RenderOptions::default()).unwrap();
        // (21 + 2 * 4) * 10
        assert_eq!(img.dimensions(), (290, 290));

        let img = to_image_buffer(&hello(), &RenderOptions { box_size: 1, border: 0 }).unwrap();
        assert_eq!(img.dimensions(), (21, 21));
    }

    #[test]
    fn test_pixels_follow_modules() {
        let qr = hello();
        let options = RenderOptions { box_size: 3, border: 2 };
        let img = to_image_buffer(&qr, &options).unwrap();
        // Quiet zone
        assert_eq!(img.get_pixel(0, 0)[0], 255);
        assert_eq!(img.get_pixel(5, 40)[0], 255);
        // Top-left finder corner spans pixels 6..9
        assert_eq!(img.get_pixel(6, 6)[0], 0);
        assert_eq!(img.get_pixel(8, 8)[0], 0);
        // Ring of light inside the finder
        assert_eq!(img.get_pixel(9, 9)[0], 255);
        for y in 0..qr.size() as u32 {
            for x in 0..qr.size() as u32 {
                let expected = if qr.get_module(x as i32, y as i32) { 0 } else { 255 };
                assert_eq!(img.get_pixel(6 + x * 3 + 1, 6 + y * 3 + 2)[0], expected);
            }
        }
    }

    #[test]
    fn test_invalid_geometry() {
        let qr = hello();
        for (box_size, border) in [(0, 4), (-3, 4), (10, -1)] {
            let err = to_png_bytes(&qr, &RenderOptions { box_size, border }).unwrap_err();
            assert!(matches!(err, QrError::InvalidGeometry { .. }));
        }
    }

    #[test]
    fn test_png_bytes_decode() {
        let bytes = to_png_bytes(&hello(), &RenderOptions::default()).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((img.width(), img.height()), (290, 290));
    }

    #[test]
    fn test_save_png_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("qr.png");
        save_png(&hello(), &path, &RenderOptions::default()).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), 290);
    }
}
