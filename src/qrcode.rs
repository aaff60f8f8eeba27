//! QR code encoding pipeline.
//!
//! Text flows through mode and version selection, bit stream assembly,
//! Reed–Solomon coding, matrix construction and mask selection, each stage
//! consuming the previous stage's output by value.

use tracing::debug;

use crate::bits::encode_data_codewords;
use crate::ecc::{add_ecc_and_interleave, data_capacity_bits, QrCodeEcc};
use crate::error::{QrError, Result};
use crate::helper::RenderOptions;
use crate::mask::{apply_mask, select_mask, Mask};
use crate::matrix::ModuleMatrix;
use crate::segment::{select_version, EncodingMode, Segment};
use crate::version::Version;

/// Settings for [`QrCode::encode_text`] and [`crate::encode_with_options`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Requested error correction level.
    pub ecl: QrCodeEcc,
    /// Smallest version to consider.
    pub min_version: Version,
    /// Largest version to consider.
    pub max_version: Version,
    /// Fixed mask, or `None` to pick the lowest-penalty one.
    pub mask: Option<Mask>,
    /// Raise the level while the data still fits the selected version.
    pub boost_ecl: bool,
    /// Geometry of the rendered image.
    pub render: RenderOptions,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ecl: QrCodeEcc::Low,
            min_version: Version::MIN,
            max_version: Version::MAX,
            mask: None,
            boost_ecl: false,
            render: RenderOptions::default(),
        }
    }
}

/// A finished QR Code symbol, a square grid of dark and light modules.
///
/// This struct covers QR Code Model 2 versions 1 to 40, all four error
/// correction levels and the numeric, alphanumeric and byte modes.
/// Instances are immutable after creation.
///
/// # Example
///
/// ```rust
/// use qrpng::qrcode::{EncodeOptions, QrCode};
///
/// let qr = QrCode::encode_text("Hello, World!", &EncodeOptions::default()).unwrap();
/// assert_eq!(qr.version().value(), 1);
/// assert_eq!(qr.size(), 21);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    version: Version,
    ecl: QrCodeEcc,
    mode: EncodingMode,
    mask: Mask,
    matrix: ModuleMatrix,
}

impl QrCode {
    /// Encodes text in the most compact mode that can hold it.
    pub fn encode_text(text: &str, options: &EncodeOptions) -> Result<QrCode> {
        let seg = Segment::from_text(text)?;
        Self::encode_segment(&seg, options)
    }

    /// Encodes an already built segment, for callers forcing a mode.
    pub fn encode_segment(seg: &Segment, options: &EncodeOptions) -> Result<QrCode> {
        if seg.num_chars() == 0 {
            return Err(QrError::EmptyInput);
        }
        let version = select_version(seg, options.ecl, options.min_version, options.max_version)?;
        let ecl = if options.boost_ecl {
            boost_ecl(seg, version, options.ecl)
        } else {
            options.ecl
        };

        let datacodewords = encode_data_codewords(seg, version, ecl)?;
        let allcodewords = add_ecc_and_interleave(&datacodewords, version, ecl)?;

        let mut matrix = ModuleMatrix::with_function_patterns(version);
        matrix.place_codewords(&allcodewords)?;
        if !matrix.is_complete() {
            return Err(QrError::InternalInvariantViolation(
                "modules left unset after data placement".to_string(),
            ));
        }

        let (mask, matrix) = match options.mask {
            Some(mask) => (mask, apply_mask(&matrix, ecl, mask)),
            None => select_mask(&matrix, ecl),
        };
        debug!(
            version = version.value(),
            ecl = %ecl,
            mask = mask.value(),
            codewords = allcodewords.len(),
            "encoded symbol"
        );
        Ok(QrCode {
            version,
            ecl,
            mode: seg.mode(),
            mask,
            matrix,
        })
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> usize {
        self.matrix.size()
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.ecl
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Returns this QR Code's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside the QR
    /// code's bounds return `false`.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size() as i32;
        range.contains(&x) && range.contains(&y) && self.matrix.is_dark(x as usize, y as usize)
    }

    /// The underlying module grid.
    pub fn matrix(&self) -> &ModuleMatrix {
        &self.matrix
    }
}

/// Returns the highest level at or above `ecl` whose capacity at `version`
/// still holds `seg`.
fn boost_ecl(seg: &Segment, version: Version, ecl: QrCodeEcc) -> QrCodeEcc {
    let usedbits = seg.total_bits(version).unwrap_or(usize::MAX);
    [QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High]
        .into_iter()
        .filter(|&newecl| newecl > ecl && usedbits <= data_capacity_bits(version, newecl))
        .fold(ecl, |_, newecl| newecl)
}
