//! Error correction: levels, block tables and Reed–Solomon codewords over GF(256).

use core::str::FromStr;

use crate::error::{QrError, Result};
use crate::version::Version;

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    #[default]
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    /// Returns an unsigned 2-bit integer (in the range 0 to 3).
    pub(crate) fn ordinal(self) -> usize {
        use QrCodeEcc::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// Returns the 2-bit value stored in the format information.
    pub(crate) fn format_bits(self) -> u8 {
        use QrCodeEcc::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }

    /// The single-letter name used by the standard.
    pub fn letter(self) -> char {
        ['L', 'M', 'Q', 'H'][self.ordinal()]
    }
}

impl FromStr for QrCodeEcc {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        use QrCodeEcc::*;
        match s.to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(Low),
            "M" | "MEDIUM" => Ok(Medium),
            "Q" | "QUARTILE" => Ok(Quartile),
            "H" | "HIGH" => Ok(High),
            _ => Err(format!("unknown error correction level: {s}")),
        }
    }
}

impl core::fmt::Display for QrCodeEcc {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Returns the number of data codewords (excluding EC) a symbol holds.
pub fn num_data_codewords(ver: Version, ecl: QrCodeEcc) -> usize {
    ver.num_raw_codewords()
        - table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl) * table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
}

/// Returns the number of data bits a symbol holds, the capacity every
/// encoded bit stream is measured against.
pub fn data_capacity_bits(ver: Version, ecl: QrCodeEcc) -> usize {
    num_data_codewords(ver, ecl) * 8
}

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: QrCodeEcc) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

/// How the data codewords of one symbol split into Reed–Solomon blocks.
///
/// Blocks come in at most two sizes: `num_short_blocks` blocks of
/// `short_block_len` data codewords followed by blocks holding one more.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockLayout {
    pub num_blocks: usize,
    pub ecc_per_block: usize,
    pub num_short_blocks: usize,
    pub short_block_len: usize,
}

impl BlockLayout {
    pub fn new(ver: Version, ecl: QrCodeEcc) -> Self {
        let num_blocks = table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl);
        let ecc_per_block = table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl);
        let rawcodewords = ver.num_raw_codewords();
        Self {
            num_blocks,
            ecc_per_block,
            num_short_blocks: num_blocks - rawcodewords % num_blocks,
            short_block_len: rawcodewords / num_blocks - ecc_per_block,
        }
    }

    /// Data codewords in block `i`.
    pub fn data_len(&self, i: usize) -> usize {
        self.short_block_len + usize::from(i >= self.num_short_blocks)
    }
}

/// Splits `data` into blocks, appends a Reed–Solomon remainder to each and
/// interleaves the result into the final codeword sequence.
///
/// Data codewords are read position by position across all blocks (short
/// blocks drop out at their last position), then EC codewords the same way.
/// The output length equals the symbol's raw codeword capacity.
pub fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: QrCodeEcc) -> Result<Vec<u8>> {
    let expected = num_data_codewords(ver, ecl);
    if data.len() != expected {
        return Err(QrError::InternalInvariantViolation(format!(
            "expected {} data codewords for version {} level {}, got {}",
            expected,
            ver,
            ecl,
            data.len()
        )));
    }
    let layout = BlockLayout::new(ver, ecl);
    let rs = ReedSolomonGenerator::new(layout.ecc_per_block);

    let mut blocks: Vec<&[u8]> = Vec::with_capacity(layout.num_blocks);
    let mut eccs: Vec<Vec<u8>> = Vec::with_capacity(layout.num_blocks);
    let mut rest: &[u8] = data;
    for i in 0..layout.num_blocks {
        let (block, tail) = rest.split_at(layout.data_len(i));
        eccs.push(rs.compute_remainder(block));
        blocks.push(block);
        rest = tail;
    }
    debug_assert!(rest.is_empty());

    let mut result: Vec<u8> = Vec::with_capacity(ver.num_raw_codewords());
    for i in 0..=layout.short_block_len {
        result.extend(blocks.iter().filter_map(|b| b.get(i)));
    }
    for i in 0..layout.ecc_per_block {
        result.extend(eccs.iter().map(|e| e[i]));
    }
    if result.len() != ver.num_raw_codewords() {
        return Err(QrError::InternalInvariantViolation(format!(
            "interleaved {} codewords, symbol holds {}",
            result.len(),
            ver.num_raw_codewords()
        )));
    }
    Ok(result)
}

/// Computes Reed–Solomon EC codewords for one block.
///
/// The generator polynomial is the product of `(x - 2^i)` for `i` in
/// `0..degree`, over GF(2^8) reduced by `x^8 + x^4 + x^3 + x^2 + 1`.
pub struct ReedSolomonGenerator {
    /// Coefficients from highest to lowest power, excluding the leading 1.
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    pub fn new(degree: usize) -> Self {
        assert!((1..=255).contains(&degree), "Degree out of range");
        let mut divisor = vec![0u8; degree];
        divisor[degree - 1] = 1;
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = Self::multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = Self::multiply(root, 0x02);
        }
        Self { divisor }
    }

    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    /// Returns the remainder of `data * x^degree` divided by the generator.
    pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.degree()];
        for b in data {
            let factor: u8 = b ^ result[0];
            result.rotate_left(1);
            result[self.degree() - 1] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= Self::multiply(y, factor);
            }
        }
        result
    }

    /// Russian-peasant multiplication in GF(2^8) modulo 0x11D.
    pub fn multiply(x: u8, y: u8) -> u8 {
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * 0x1d);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }
}

static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply() {
        assert_eq!(ReedSolomonGenerator::multiply(0, 0x53), 0);
        assert_eq!(ReedSolomonGenerator::multiply(1, 0x53), 0x53);
        assert_eq!(ReedSolomonGenerator::multiply(0x02, 0x80), 0x1d);
        // 2^8 reduced by the field modulus.
        let mut x: u8 = 1;
        for _ in 0..255 {
            x = ReedSolomonGenerator::multiply(x, 0x02);
        }
        assert_eq!(x, 1);
    }

    #[test]
    fn test_remainder_known_answer() {
        // "01234567" at version 1-M.
        let data = [
            0x10, 0x20, 0x0c, 0x56, 0x61, 0x80, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11,
            0xec, 0x11,
        ];
        let rs = ReedSolomonGenerator::new(10);
        assert_eq!(
            rs.compute_remainder(&data),
            vec![0xa5, 0x24, 0xd4, 0xc1, 0xed, 0x36, 0xc7, 0x87, 0x2c, 0x55]
        );
    }

    #[test]
    fn test_data_capacity() {
        assert_eq!(num_data_codewords(Version::new(1), QrCodeEcc::Low), 19);
        assert_eq!(num_data_codewords(Version::new(1), QrCodeEcc::High), 9);
        assert_eq!(num_data_codewords(Version::new(5), QrCodeEcc::Quartile), 62);
        assert_eq!(num_data_codewords(Version::new(40), QrCodeEcc::Low), 2956);
        assert_eq!(data_capacity_bits(Version::new(40), QrCodeEcc::Low), 23648);
    }

    #[test]
    fn test_block_layout_mixed_sizes() {
        // 5-Q: two blocks of 15 and two of 16 data codewords, 18 EC each.
        let layout = BlockLayout::new(Version::new(5), QrCodeEcc::Quartile);
        assert_eq!(layout.num_blocks, 4);
        assert_eq!(layout.ecc_per_block, 18);
        assert_eq!(layout.num_short_blocks, 2);
        assert_eq!(layout.data_len(0), 15);
        assert_eq!(layout.data_len(3), 16);
    }

    #[test]
    fn test_interleave_order() {
        let ver = Version::new(5);
        let ecl = QrCodeEcc::Quartile;
        let data: Vec<u8> = (0..62).collect();
        let out = add_ecc_and_interleave(&data, ver, ecl).unwrap();
        assert_eq!(out.len(), 134);
        // Blocks start at 0, 15, 30, 46.
        assert_eq!(&out[..8], &[0, 15, 30, 46, 1, 16, 31, 47]);
        // Last data position exists only in the two long blocks.
        assert_eq!(&out[56..62], &[14, 29, 44, 60, 45, 61]);
        let rs = ReedSolomonGenerator::new(18);
        let ecc0 = rs.compute_remainder(&data[..15]);
        assert_eq!(out[62], ecc0[0]);
        assert_eq!(out[66], ecc0[1]);
    }

    #[test]
    fn test_interleave_rejects_wrong_length() {
        let err = add_ecc_and_interleave(&[0u8; 3], Version::new(1), QrCodeEcc::Low).unwrap_err();
        assert!(matches!(err, QrError::InternalInvariantViolation(_)));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("l".parse::<QrCodeEcc>().unwrap(), QrCodeEcc::Low);
        assert_eq!("High".parse::<QrCodeEcc>().unwrap(), QrCodeEcc::High);
        assert!("X".parse::<QrCodeEcc>().is_err());
        assert_eq!(QrCodeEcc::default(), QrCodeEcc::Low);
    }
}
