//! Error type shared by every stage of the encoder.

use thiserror::Error;

use crate::ecc::QrCodeEcc;
use crate::segment::EncodingMode;

/// Errors raised while encoding text into a QR symbol or rendering it.
///
/// Ways to handle [`QrError::CapacityExceeded`] include:
///
/// - Decrease the error correction level if it was greater than `QrCodeEcc::Low`.
/// - Increase the maximum version if it was less than `Version::MAX`.
/// - Change the text to fit the character set of a denser mode (e.g. alphanumeric).
/// - Change the text to be shorter.
#[derive(Debug, Error)]
pub enum QrError {
    /// No text was supplied.
    #[error("input text is empty")]
    EmptyInput,

    /// A character cannot be represented in the requested mode.
    #[error("character {ch:?} cannot be encoded in {mode:?} mode")]
    UnsupportedCharacter { ch: char, mode: EncodingMode },

    /// The data does not fit any allowed version at the requested level.
    #[error("data length = {required_bits} bits, max capacity = {capacity_bits} bits at level {ecl:?}")]
    CapacityExceeded {
        required_bits: usize,
        capacity_bits: usize,
        ecl: QrCodeEcc,
    },

    /// Box size below one pixel or a negative border.
    #[error("invalid geometry: box_size = {box_size}, border = {border}")]
    InvalidGeometry { box_size: i32, border: i32 },

    /// A version number outside 1..=40, or an empty version range.
    #[error("invalid version: {0}")]
    InvalidVersion(u8),

    /// A mask number outside 0..=7.
    #[error("invalid mask: {0}")]
    InvalidMask(u8),

    /// The codeword bits ran out before every data module was filled.
    #[error("matrix underflow: {bits} codeword bits for {modules} data modules")]
    MatrixUnderflow { bits: usize, modules: usize },

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    /// PNG encoding or file output failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, QrError>;
