//! # qrpng
//!
//! A Rust library that turns text into QR code PNG images.
//!
//! `qrpng` encodes text into QR codes following the QR Code Model 2
//! specification (ISO/IEC 18004) with its own encoder: mode selection,
//! capacity tables, Reed–Solomon error correction over GF(256), matrix
//! construction and penalty-based mask selection. The finished symbol is
//! rasterized and returned as PNG bytes.
//!
//! ## Features
//!
//! - Encode data in numeric, alphanumeric or byte mode, picking the most compact one.
//! - Support versions 1 to 40 and four error correction levels: Low, Medium, Quartile, High.
//! - Render to in-memory grayscale image buffers, PNG bytes or PNG files.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Example
//!
//! ```rust
//! use qrpng::QrCodeEcc;
//!
//! let png: Vec<u8> = qrpng::encode("https://example.com", QrCodeEcc::Low, 10, 4).unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! ```
//!
//! Finer control goes through [`EncodeOptions`]:
//!
//! ```rust
//! use qrpng::{encode_with_options, EncodeOptions, QrCodeEcc, RenderOptions, Version};
//!
//! let options = EncodeOptions {
//!     ecl: QrCodeEcc::High,
//!     min_version: Version::new(3),
//!     render: RenderOptions { box_size: 4, border: 2 },
//!     ..EncodeOptions::default()
//! };
//! let png = encode_with_options("HELLO WORLD", &options).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`segment`]: Mode classification and version selection.
//! - [`bits`]: Bit stream assembly and padding.
//! - [`ecc`]: Error correction levels, block tables and Reed–Solomon coding.
//! - [`matrix`]: Function patterns and data placement.
//! - [`mask`]: Mask patterns, penalty scoring, format and version information.
//! - [`qrcode`]: The encoding pipeline and the finished symbol.
//! - [`helper`]: Rasterization to images and PNG.
#![forbid(unsafe_code)]

pub mod bits;
pub mod ecc;
pub mod error;
pub mod helper;
pub mod mask;
pub mod matrix;
pub mod qrcode;
pub mod segment;
pub mod version;

pub use ecc::QrCodeEcc;
pub use error::{QrError, Result};
pub use helper::RenderOptions;
pub use mask::Mask;
pub use qrcode::{EncodeOptions, QrCode};
pub use segment::EncodingMode;
pub use version::Version;

/// Encodes `text` into a QR code and returns it as PNG bytes.
///
/// The smallest version that holds the text at level `ecl` is used, each
/// module is drawn as a `box_size` pixel square, and `border` modules of
/// light quiet zone surround the symbol.
///
/// # Errors
///
/// - [`QrError::EmptyInput`] if `text` is empty.
/// - [`QrError::CapacityExceeded`] if the text does not fit version 40 at `ecl`.
/// - [`QrError::InvalidGeometry`] if `box_size < 1` or `border < 0`.
pub fn encode(text: &str, ecl: QrCodeEcc, box_size: i32, border: i32) -> Result<Vec<u8>> {
    let options = EncodeOptions {
        ecl,
        render: RenderOptions { box_size, border },
        ..EncodeOptions::default()
    };
    encode_with_options(text, &options)
}

/// Encodes `text` with full control over version range, mask and geometry.
pub fn encode_with_options(text: &str, options: &EncodeOptions) -> Result<Vec<u8>> {
    // Fail on bad geometry before doing any encoding work
    options.render.image_size(Version::MIN.size())?;
    let qr = QrCode::encode_text(text, options)?;
    helper::to_png_bytes(&qr, &options.render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Module;

    fn decode_png(bytes: &[u8]) -> String {
        let img = image::load_from_memory(bytes).unwrap().to_luma8();
        let (w, h) = img.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
            img.get_pixel(x as u32, y as u32)[0]
        });
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one symbol");
        let (_, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn test_round_trip_modes() {
        for text in [
            "12345",
            "HELLO WORLD",
            "hello",
            "https://example.com/path?query=1&x=y",
            "Ünïcödé text ✓",
        ] {
            let png = encode(text, QrCodeEcc::Low, 6, 4).unwrap();
            assert_eq!(decode_png(&png), text);
        }
    }

    #[test]
    fn test_round_trip_levels() {
        let text = "The quick brown fox jumps over the lazy dog";
        for ecl in [QrCodeEcc::Low, QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High] {
            let png = encode(text, ecl, 5, 4).unwrap();
            assert_eq!(decode_png(&png), text);
        }
    }

    #[test]
    fn test_round_trip_large_versions() {
        // Versions 7 and up carry version information.
        let text: String = (0..180).map(|i| char::from(b'!' + (i % 90) as u8)).collect();
        let qr = QrCode::encode_text(&text, &EncodeOptions::default()).unwrap();
        assert!(qr.version().value() >= 7);
        let png = encode(&text, QrCodeEcc::Low, 4, 4).unwrap();
        assert_eq!(decode_png(&png), text);
    }

    #[test]
    fn test_round_trip_with_corrupted_codewords() {
        // Version 1-M has 10 EC codewords and corrects up to 5. Invert the
        // modules of the first three codewords (bottom-right 2x12 strip).
        let text = "HELLO WORLD";
        let options = EncodeOptions {
            ecl: QrCodeEcc::Medium,
            ..EncodeOptions::default()
        };
        let qr = QrCode::encode_text(text, &options).unwrap();
        assert_eq!(qr.version().value(), 1);
        let mut matrix = qr.matrix().clone();
        for y in 9..21 {
            for x in 19..21 {
                match matrix.get(x, y) {
                    Module::Data(bit) => matrix.set(x, y, Module::Data(!bit)),
                    other => panic!("expected data module at ({}, {}), got {:?}", x, y, other),
                }
            }
        }
        assert_ne!(&matrix, qr.matrix());
        let png = helper::matrix_to_png_bytes(&matrix, &options.render).unwrap();
        assert_eq!(decode_png(&png), text);
    }

    #[test]
    fn test_default_geometry() {
        let png = encode("x", QrCodeEcc::Low, 10, 4).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (290, 290));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(encode("", QrCodeEcc::Low, 10, 4), Err(QrError::EmptyInput)));
        assert!(matches!(
            encode("x", QrCodeEcc::Low, 0, 4),
            Err(QrError::InvalidGeometry { box_size: 0, border: 4 })
        ));
        assert!(matches!(
            encode("x", QrCodeEcc::Low, 10, -1),
            Err(QrError::InvalidGeometry { .. })
        ));
        let long = "x".repeat(2954);
        assert!(matches!(
            encode(&long, QrCodeEcc::Low, 1, 0),
            Err(QrError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_concurrent_calls() {
        let handles: Vec<_> = (0..4)
            .map(|i| std::thread::spawn(move || encode(&format!("thread {}", i), QrCodeEcc::Medium, 2, 1)))
            .collect();
        let outputs: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
        assert_eq!(outputs[1], encode("thread 1", QrCodeEcc::Medium, 2, 1).unwrap());
    }
}
