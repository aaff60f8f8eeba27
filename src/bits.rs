//! Bit stream assembly: mode and count indicators, payload, terminator and padding.

use crate::ecc::{data_capacity_bits, QrCodeEcc};
use crate::error::{QrError, Result};
use crate::segment::Segment;
use crate::version::Version;

/// An append-only sequence of bits, packed most-significant-bit first.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity(bits.div_ceil(8)),
            length: 0,
        }
    }

    /// Number of bits appended so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`, highest first.
    ///
    /// # Panics
    ///
    /// Panics if `len > 31` or `val` does not fit in `len` bits.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0);
        for i in (0..len).rev() {
            let shift: u8 = 7 - ((self.length as u8) & 7);
            let bit: u8 = ((val >> i) as u8) & 1;
            if shift == 7 {
                self.data.push(bit << shift);
            } else if let Some(last) = self.data.last_mut() {
                *last |= bit << shift;
            }
            self.length += 1;
        }
    }

    /// Appends every bit of another buffer.
    pub fn append_buffer(&mut self, other: &BitBuffer) {
        for i in 0..other.length {
            self.append_bits(u32::from(other.get_bit(i)), 1);
        }
    }

    /// Returns bit `i`, counting from the start of the stream.
    pub fn get_bit(&self, i: usize) -> bool {
        assert!(i < self.length, "Bit index out of range");
        (self.data[i >> 3] >> (7 - (i & 7))) & 1 != 0
    }

    /// The packed bytes; a trailing partial byte is zero-filled.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Serializes one segment into the data codewords of a symbol.
///
/// Appends the mode indicator, the character count, the payload, a terminator
/// of up to four zero bits, zero bits up to a byte boundary and then the fill
/// bytes `0xEC, 0x11` until the data capacity of `(version, ecl)` is reached.
pub fn encode_data_codewords(seg: &Segment, version: Version, ecl: QrCodeEcc) -> Result<Vec<u8>> {
    let capacitybits = data_capacity_bits(version, ecl);
    let usedbits = seg
        .total_bits(version)
        .filter(|&n| n <= capacitybits)
        .ok_or_else(|| QrError::CapacityExceeded {
            required_bits: seg.total_bits(version).unwrap_or(usize::MAX),
            capacity_bits: capacitybits,
            ecl,
        })?;

    let mut bb = BitBuffer::with_capacity(capacitybits);
    bb.append_bits(seg.mode().mode_bits(), 4);
    let count = u32::try_from(seg.num_chars()).map_err(|_| {
        QrError::InternalInvariantViolation("character count exceeds 32 bits".to_string())
    })?;
    bb.append_bits(count, seg.mode().num_char_count_bits(version));
    bb.append_buffer(seg.data());
    debug_assert_eq!(bb.len(), usedbits);

    // Terminator, then pad up to a byte
    let numzerobits = core::cmp::min(4, capacitybits - bb.len());
    bb.append_bits(0, numzerobits as u8);
    let numzerobits = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, numzerobits as u8);
    debug_assert_eq!(bb.len() % 8, 0);

    for &padbyte in [0xec, 0x11].iter().cycle() {
        if bb.len() >= capacitybits {
            break;
        }
        bb.append_bits(padbyte, 8);
    }
    if bb.len() != capacitybits {
        return Err(QrError::InternalInvariantViolation(format!(
            "bit stream is {} bits, capacity is {}",
            bb.len(),
            capacitybits
        )));
    }
    Ok(bb.into_bytes())
}
