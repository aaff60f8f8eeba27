//! The module grid: function patterns, reserved areas and zigzag data placement.

use crate::error::{QrError, Result};
use crate::version::Version;

/// One cell of the symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Module {
    /// Not yet assigned.
    #[default]
    Unset,
    /// Part of a function pattern or a reserved area; `true` is dark.
    /// Never touched by data placement or masking.
    Fixed(bool),
    /// A data or EC bit, or a remainder bit; `true` is dark.
    Data(bool),
}

impl Module {
    pub fn is_dark(self) -> bool {
        matches!(self, Module::Fixed(true) | Module::Data(true))
    }

    pub fn is_fixed(self) -> bool {
        matches!(self, Module::Fixed(_))
    }
}

/// A square grid of modules, indexed by `(x, y)` with `x` the column and
/// `(0, 0)` the top-left corner.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleMatrix {
    version: Version,
    size: usize,
    modules: Vec<Module>,
}

impl ModuleMatrix {
    /// Allocates a grid for `version` with every module unset.
    pub fn new(version: Version) -> Self {
        let size = version.size();
        Self {
            version,
            size,
            modules: vec![Module::Unset; size * size],
        }
    }

    /// Allocates a grid for `version` and lays down every function pattern.
    ///
    /// Format and version information areas are reserved as light fixed
    /// modules; their values are written once a mask is chosen.
    pub fn with_function_patterns(version: Version) -> Self {
        let mut result = Self::new(version);
        result.draw_timing_patterns();
        let size = result.size as i32;
        result.draw_finder_pattern(3, 3);
        result.draw_finder_pattern(size - 4, 3);
        result.draw_finder_pattern(3, size - 4);

        let alignpatpos = version.alignment_pattern_positions();
        let numalign = alignpatpos.len();
        for (i, &pos0) in alignpatpos.iter().enumerate() {
            for (j, &pos1) in alignpatpos.iter().enumerate() {
                // Don't draw on the three finder corners
                if (i == 0 && j == 0) || (i == 0 && j == numalign - 1) || (i == numalign - 1 && j == 0)
                {
                    continue;
                }
                result.draw_alignment_pattern(pos0, pos1);
            }
        }

        result.reserve_format_area();
        if version.value() >= 7 {
            result.reserve_version_area();
        }
        result
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Side length in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// # Panics
    ///
    /// Panics if the coordinates are out of range.
    pub fn get(&self, x: usize, y: usize) -> Module {
        assert!(x < self.size && y < self.size, "Coordinates out of range");
        self.modules[y * self.size + x]
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_dark()
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, module: Module) {
        assert!(x < self.size && y < self.size, "Coordinates out of range");
        self.modules[y * self.size + x] = module;
    }

    fn set_fixed_unbounded(&mut self, x: i32, y: i32, isdark: bool) {
        let range = 0..self.size as i32;
        if range.contains(&x) && range.contains(&y) {
            self.set(x as usize, y as usize, Module::Fixed(isdark));
        }
    }

    /// Every module in row-major order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub(crate) fn modules_mut(&mut self) -> &mut [Module] {
        &mut self.modules
    }

    /// True once no module is left unset.
    pub fn is_complete(&self) -> bool {
        !self.modules.contains(&Module::Unset)
    }

    pub fn count_dark(&self) -> usize {
        self.modules.iter().filter(|m| m.is_dark()).count()
    }

    fn draw_timing_patterns(&mut self) {
        for i in 0..self.size {
            self.set(6, i, Module::Fixed(i % 2 == 0));
            self.set(i, 6, Module::Fixed(i % 2 == 0));
        }
    }

    /// Draws a 7x7 finder pattern centered at `(x, y)` together with its
    /// light separator. Modules outside the symbol are clipped.
    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let dist: i32 = dx.abs().max(dy.abs());
                self.set_fixed_unbounded(x + dx, y + dy, dist != 2 && dist != 4);
            }
        }
    }

    /// Draws a 5x5 alignment pattern centered at `(x, y)`.
    fn draw_alignment_pattern(&mut self, x: usize, y: usize) {
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                let isdark = dx.abs().max(dy.abs()) != 1;
                self.set((x as i32 + dx) as usize, (y as i32 + dy) as usize, Module::Fixed(isdark));
            }
        }
    }

    fn reserve_format_area(&mut self) {
        for (x, y) in format_info_positions(self.size).into_iter().flatten() {
            self.set(x, y, Module::Fixed(false));
        }
        // Always dark
        self.set(8, self.size - 8, Module::Fixed(true));
    }

    fn reserve_version_area(&mut self) {
        for (x, y) in version_info_positions(self.size).into_iter().flatten() {
            self.set(x, y, Module::Fixed(false));
        }
    }

    /// Writes a 15-bit format word (bit 0 first) into both copies.
    pub(crate) fn draw_format_bits(&mut self, bits: u32) {
        for copy in format_info_positions(self.size) {
            for (i, (x, y)) in copy.into_iter().enumerate() {
                self.set(x, y, Module::Fixed(get_bit(bits, i)));
            }
        }
    }

    /// Writes an 18-bit version word (bit 0 first) into both copies.
    pub(crate) fn draw_version_bits(&mut self, bits: u32) {
        for copy in version_info_positions(self.size) {
            for (i, (x, y)) in copy.into_iter().enumerate() {
                self.set(x, y, Module::Fixed(get_bit(bits, i)));
            }
        }
    }

    /// Fills every unset module with the bits of `data`, most significant
    /// bit first, in the standard zigzag order.
    ///
    /// Placement runs in two-column strips from the right edge, alternating
    /// upward and downward and skipping the vertical timing column. Modules
    /// left over after the last codeword are remainder bits and become light
    /// data modules.
    pub fn place_codewords(&mut self, data: &[u8]) -> Result<()> {
        let expected = self.version.num_raw_codewords() * 8;
        if data.len() * 8 != expected {
            return Err(QrError::InternalInvariantViolation(format!(
                "got {} codewords for a symbol holding {}",
                data.len(),
                expected / 8
            )));
        }
        let size = self.size as i32;
        let mut i: usize = 0;
        let mut remainder: usize = 0;
        let mut right: i32 = size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            let upward: bool = ((right + 1) & 2) == 0;
            for vert in 0..size {
                let y = (if upward { size - 1 - vert } else { vert }) as usize;
                for j in 0..2 {
                    let x = (right - j) as usize;
                    if self.get(x, y) != Module::Unset {
                        continue;
                    }
                    if i < expected {
                        let bit = get_bit(u32::from(data[i >> 3]), 7 - (i & 7));
                        self.set(x, y, Module::Data(bit));
                        i += 1;
                    } else {
                        self.set(x, y, Module::Data(false));
                        remainder += 1;
                    }
                }
            }
            right -= 2;
        }
        if i < expected {
            return Err(QrError::InternalInvariantViolation(format!(
                "ran out of data modules after {} of {} bits",
                i, expected
            )));
        }
        if remainder > self.version.num_raw_data_modules() - expected {
            return Err(QrError::MatrixUnderflow {
                bits: expected,
                modules: expected + remainder,
            });
        }
        Ok(())
    }
}

/// Coordinates of the two format information copies, bit 0 first.
fn format_info_positions(size: usize) -> [[(usize, usize); 15]; 2] {
    let mut first = [(0, 0); 15];
    let mut second = [(0, 0); 15];
    for i in 0..6 {
        first[i] = (8, i);
    }
    first[6] = (8, 7);
    first[7] = (8, 8);
    first[8] = (7, 8);
    for i in 9..15 {
        first[i] = (14 - i, 8);
    }
    for i in 0..8 {
        second[i] = (size - 1 - i, 8);
    }
    for i in 8..15 {
        second[i] = (8, size - 15 + i);
    }
    [first, second]
}

/// Coordinates of the two version information copies, bit 0 first:
/// a 3x6 block left of the top-right finder and its transpose.
fn version_info_positions(size: usize) -> [[(usize, usize); 18]; 2] {
    let mut top_right = [(0, 0); 18];
    let mut bottom_left = [(0, 0); 18];
    for i in 0..18 {
        let a = size - 11 + i % 3;
        let b = i / 3;
        top_right[i] = (a, b);
        bottom_left[i] = (b, a);
    }
    [top_right, bottom_left]
}

pub(crate) fn get_bit(x: u32, i: usize) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_count(m: &ModuleMatrix) -> usize {
        m.modules().iter().filter(|m| m.is_fixed()).count()
    }

    #[test]
    fn test_function_modules_leave_raw_data_area() {
        for ver in [1u8, 2, 6, 7, 14, 32, 40] {
            let ver = Version::new(ver);
            let m = ModuleMatrix::with_function_patterns(ver);
            let unset = m.modules().iter().filter(|&&m| m == Module::Unset).count();
            assert_eq!(unset, ver.num_raw_data_modules(), "version {}", ver);
            assert_eq!(fixed_count(&m) + unset, ver.size() * ver.size());
        }
    }

    #[test]
    fn test_finder_and_timing() {
        let m = ModuleMatrix::with_function_patterns(Version::new(1));
        // Finder rings
        assert!(m.is_dark(0, 0));
        assert!(!m.is_dark(1, 1));
        assert!(m.is_dark(3, 3));
        assert!(m.is_dark(20, 0));
        assert!(m.is_dark(0, 20));
        // Separator
        assert_eq!(m.get(7, 0), Module::Fixed(false));
        assert_eq!(m.get(13, 7), Module::Fixed(false));
        // Timing
        assert_eq!(m.get(8, 6), Module::Fixed(true));
        assert_eq!(m.get(9, 6), Module::Fixed(false));
        assert_eq!(m.get(6, 12), Module::Fixed(true));
        // Dark module
        assert_eq!(m.get(8, 13), Module::Fixed(true));
    }

    #[test]
    fn test_alignment_pattern() {
        let m = ModuleMatrix::with_function_patterns(Version::new(2));
        assert_eq!(m.get(18, 18), Module::Fixed(true));
        assert_eq!(m.get(17, 18), Module::Fixed(false));
        assert_eq!(m.get(16, 16), Module::Fixed(true));
        assert_eq!(m.get(15, 15), Module::Unset);
    }

    #[test]
    fn test_place_codewords_fills_everything() {
        let ver = Version::new(7);
        let mut m = ModuleMatrix::with_function_patterns(ver);
        let data = vec![0xffu8; ver.num_raw_codewords()];
        m.place_codewords(&data).unwrap();
        assert!(m.is_complete());
        // 196 codewords of ones; no remainder bits at version 7.
        let data_dark = m
            .modules()
            .iter()
            .filter(|&&m| m == Module::Data(true))
            .count();
        assert_eq!(data_dark, 196 * 8);
    }

    #[test]
    fn test_place_codewords_zigzag_start() {
        let mut m = ModuleMatrix::with_function_patterns(Version::new(1));
        let mut data = vec![0u8; 26];
        data[0] = 0b1010_0000;
        m.place_codewords(&data).unwrap();
        // First codeword fills the bottom-right 2x4 block, right column first.
        assert_eq!(m.get(20, 20), Module::Data(true));
        assert_eq!(m.get(19, 20), Module::Data(false));
        assert_eq!(m.get(20, 19), Module::Data(true));
        assert_eq!(m.get(19, 19), Module::Data(false));
    }

    #[test]
    fn test_remainder_bits_are_light() {
        // Version 2 has 7 remainder bits.
        let ver = Version::new(2);
        let mut m = ModuleMatrix::with_function_patterns(ver);
        m.place_codewords(&vec![0xffu8; ver.num_raw_codewords()]).unwrap();
        let light_data = m
            .modules()
            .iter()
            .filter(|&&m| m == Module::Data(false))
            .count();
        assert_eq!(light_data, 7);
    }

    #[test]
    fn test_place_codewords_wrong_length() {
        let mut m = ModuleMatrix::with_function_patterns(Version::new(1));
        assert!(matches!(
            m.place_codewords(&[0u8; 25]),
            Err(QrError::InternalInvariantViolation(_))
        ));
    }

    #[test]
    fn test_place_codewords_underflow() {
        // Without function patterns every module outside the timing column is free.
        let mut m = ModuleMatrix::new(Version::new(1));
        assert!(matches!(
            m.place_codewords(&[0u8; 26]),
            Err(QrError::MatrixUnderflow { bits: 208, modules: 420 })
        ));
    }

    #[test]
    fn test_format_bits_written_twice() {
        let mut m = ModuleMatrix::with_function_patterns(Version::new(1));
        m.draw_format_bits(0b000_0000_0000_0001);
        assert_eq!(m.get(8, 0), Module::Fixed(true));
        assert_eq!(m.get(20, 8), Module::Fixed(true));
        assert_eq!(m.get(8, 1), Module::Fixed(false));
        assert_eq!(m.get(8, 13), Module::Fixed(true));
    }

    #[test]
    fn test_version_bits_written_twice() {
        let mut m = ModuleMatrix::with_function_patterns(Version::new(7));
        m.draw_version_bits(1 << 17);
        assert_eq!(m.get(36, 5), Module::Fixed(true));
        assert_eq!(m.get(5, 36), Module::Fixed(true));
        assert_eq!(m.get(34, 0), Module::Fixed(false));
    }
}
