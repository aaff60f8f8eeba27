//! Mode classification, payload encoding and version selection.

use tracing::debug;

use crate::bits::BitBuffer;
use crate::ecc::{data_capacity_bits, QrCodeEcc};
use crate::error::{QrError, Result};
use crate::version::Version;

static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// The data encoding modes this encoder produces.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EncodingMode {
    Numeric,
    Alphanumeric,
    Byte,
}

impl EncodingMode {
    /// Returns the most compact mode that represents `text` losslessly.
    pub fn classify(text: &str) -> Self {
        if Segment::is_numeric(text) {
            EncodingMode::Numeric
        } else if Segment::is_alphanumeric(text) {
            EncodingMode::Alphanumeric
        } else {
            EncodingMode::Byte
        }
    }

    /// The 4-bit mode indicator.
    pub(crate) fn mode_bits(self) -> u32 {
        use EncodingMode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
        }
    }

    /// Width of the character count indicator at the given version.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        use EncodingMode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
        })[ver.tier()]
    }
}

/// A run of text encoded in a single mode, without indicators.
///
/// Created with [`Segment::from_text`] for automatic mode choice, or with one
/// of the `make_*` constructors to force a mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    mode: EncodingMode,
    numchars: usize,
    data: BitBuffer,
}

impl Segment {
    /// Encodes `text` in the most compact mode that can hold it.
    ///
    /// Byte mode accepts any UTF-8 text, so this only fails on empty input.
    pub fn from_text(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(QrError::EmptyInput);
        }
        match EncodingMode::classify(text) {
            EncodingMode::Numeric => Segment::make_numeric(text),
            EncodingMode::Alphanumeric => Segment::make_alphanumeric(text),
            EncodingMode::Byte => Ok(Segment::make_bytes(text.as_bytes())),
        }
    }

    /// Creates a byte mode segment. Each byte becomes 8 bits.
    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bb = BitBuffer::with_capacity(data.len() * 8);
        for &b in data {
            bb.append_bits(u32::from(b), 8);
        }
        Segment::new(EncodingMode::Byte, data.len(), bb)
    }

    /// Creates a numeric mode segment: three digits per 10 bits, with a
    /// trailing pair in 7 bits or a single digit in 4.
    pub fn make_numeric(text: &str) -> Result<Self> {
        let mut bb = BitBuffer::with_capacity(text.len() * 10 / 3 + 4);
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for c in text.chars() {
            let digit = c.to_digit(10).ok_or(QrError::UnsupportedCharacter {
                ch: c,
                mode: EncodingMode::Numeric,
            })?;
            accumdata = accumdata * 10 + digit;
            accumcount += 1;
            if accumcount == 3 {
                bb.append_bits(accumdata, 10);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            bb.append_bits(accumdata, accumcount * 3 + 1);
        }
        Ok(Segment::new(EncodingMode::Numeric, text.len(), bb))
    }

    /// Creates an alphanumeric mode segment: two characters per 11 bits,
    /// with a trailing character in 6.
    ///
    /// Allowed characters: 0–9, A–Z (uppercase), space, `$`, `%`, `*`, `+`, `-`, `.`, `/`, `:`.
    pub fn make_alphanumeric(text: &str) -> Result<Self> {
        let mut bb = BitBuffer::with_capacity(text.len() * 11 / 2 + 6);
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for c in text.chars() {
            let i = ALPHANUMERIC_CHARSET
                .find(c)
                .ok_or(QrError::UnsupportedCharacter {
                    ch: c,
                    mode: EncodingMode::Alphanumeric,
                })?;
            accumdata = accumdata * 45 + i as u32;
            accumcount += 1;
            if accumcount == 2 {
                bb.append_bits(accumdata, 11);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            bb.append_bits(accumdata, 6);
        }
        Ok(Segment::new(EncodingMode::Alphanumeric, text.len(), bb))
    }

    fn new(mode: EncodingMode, numchars: usize, data: BitBuffer) -> Self {
        Self {
            mode,
            numchars,
            data,
        }
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Characters for numeric and alphanumeric segments, bytes for byte segments.
    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// The encoded payload bits.
    pub fn data(&self) -> &BitBuffer {
        &self.data
    }

    /// Bits needed for this segment at `version`, indicators included.
    ///
    /// Returns `None` if the character count overflows the count indicator.
    pub fn total_bits(&self, version: Version) -> Option<usize> {
        let ccbits: u8 = self.mode.num_char_count_bits(version);
        if self.numchars >= 1usize << ccbits {
            return None;
        }
        (4 + usize::from(ccbits)).checked_add(self.data.len())
    }

    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }
}

/// Picks the smallest version in `minversion..=maxversion` whose data
/// capacity at `ecl` holds `seg`.
pub fn select_version(
    seg: &Segment,
    ecl: QrCodeEcc,
    minversion: Version,
    maxversion: Version,
) -> Result<Version> {
    if minversion > maxversion {
        return Err(QrError::InvalidVersion(minversion.value()));
    }
    let version = minversion
        .range_to(maxversion)
        .find(|&v| seg.total_bits(v).is_some_and(|n| n <= data_capacity_bits(v, ecl)))
        .ok_or_else(|| QrError::CapacityExceeded {
            required_bits: seg.total_bits(maxversion).unwrap_or(usize::MAX),
            capacity_bits: data_capacity_bits(maxversion, ecl),
            ecl,
        })?;
    debug!(
        mode = ?seg.mode(),
        chars = seg.num_chars(),
        version = version.value(),
        ecl = %ecl,
        "selected symbol version"
    );
    Ok(version)
}
