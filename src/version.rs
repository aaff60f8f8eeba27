//! Symbol versions and the geometry derived from them.

use crate::error::QrError;

/// A QR code version (1–40).
///
/// The version fixes the side length of the symbol, `17 + 4 * version` modules,
/// and with it every table lookup made by the later stages.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40]. Use `Version::try_from`
    /// for numbers that come from user input.
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the width and height of the symbol in modules, between 21 and 177.
    pub const fn size(self) -> usize {
        (self.0 as usize) * 4 + 17
    }

    /// Iterates over every version from `self` to `last`, inclusive.
    pub fn range_to(self, last: Version) -> impl Iterator<Item = Version> {
        (self.0..=last.0).map(Version)
    }

    /// Index into the character-count width tables: 0 for 1–9, 1 for 10–26, 2 for 27–40.
    pub(crate) fn tier(self) -> usize {
        usize::from((self.0 + 7) / 17)
    }

    /// Returns the center coordinates of the alignment patterns, in ascending order.
    ///
    /// Each coordinate is used both as a row and as a column. Version 1 has none.
    /// The three combinations that collide with finder patterns are included here
    /// and skipped by the caller.
    pub fn alignment_pattern_positions(self) -> Vec<usize> {
        let ver = usize::from(self.0);
        if ver == 1 {
            return Vec::new();
        }
        let numalign = ver / 7 + 2;
        let step = if ver == 32 {
            26
        } else {
            ((ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2)) * 2
        };
        let mut result: Vec<usize> = (0..numalign - 1)
            .map(|i| self.size() - 7 - i * step)
            .collect();
        result.push(6);
        result.reverse();
        result
    }

    /// Returns the number of modules available for data and EC codewords
    /// after all function patterns are excluded. Includes remainder bits,
    /// so it is not necessarily a multiple of 8.
    pub fn num_raw_data_modules(self) -> usize {
        let ver = usize::from(self.0);
        let mut result: usize = (16 * ver + 128) * ver + 64;
        if ver >= 2 {
            let numalign: usize = ver / 7 + 2;
            result -= (25 * numalign - 10) * numalign - 55;
            if ver >= 7 {
                result -= 36;
            }
        }
        result
    }

    /// Returns the total number of codewords (data and EC) the symbol holds.
    pub fn num_raw_codewords(self) -> usize {
        self.num_raw_data_modules() / 8
    }
}

impl TryFrom<u8> for Version {
    type Error = QrError;

    fn try_from(ver: u8) -> Result<Self, Self::Error> {
        if (Version::MIN.0..=Version::MAX.0).contains(&ver) {
            Ok(Version(ver))
        } else {
            Err(QrError::InvalidVersion(ver))
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::MIN
    }
}

impl core::fmt::Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(Version::MIN.size(), 21);
        assert_eq!(Version::new(7).size(), 45);
        assert_eq!(Version::MAX.size(), 177);
    }

    #[test]
    fn test_try_from() {
        assert_eq!(Version::try_from(12).unwrap().value(), 12);
        assert!(matches!(Version::try_from(0), Err(QrError::InvalidVersion(0))));
        assert!(matches!(Version::try_from(41), Err(QrError::InvalidVersion(41))));
    }

    #[test]
    fn test_alignment_positions() {
        assert!(Version::new(1).alignment_pattern_positions().is_empty());
        assert_eq!(Version::new(2).alignment_pattern_positions(), vec![6, 18]);
        assert_eq!(Version::new(7).alignment_pattern_positions(), vec![6, 22, 38]);
        assert_eq!(
            Version::new(32).alignment_pattern_positions(),
            vec![6, 34, 60, 86, 112, 138]
        );
        assert_eq!(
            Version::new(40).alignment_pattern_positions(),
            vec![6, 30, 58, 86, 114, 142, 170]
        );
    }

    #[test]
    fn test_raw_codewords() {
        assert_eq!(Version::new(1).num_raw_codewords(), 26);
        assert_eq!(Version::new(7).num_raw_codewords(), 196);
        assert_eq!(Version::new(40).num_raw_codewords(), 3706);
    }

    #[test]
    fn test_tier() {
        assert_eq!(Version::new(9).tier(), 0);
        assert_eq!(Version::new(10).tier(), 1);
        assert_eq!(Version::new(26).tier(), 1);
        assert_eq!(Version::new(27).tier(), 2);
    }
}
