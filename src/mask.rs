//! Mask patterns, penalty scoring and the format/version information words.

use tracing::{debug, trace};

use crate::ecc::QrCodeEcc;
use crate::error::QrError;
use crate::matrix::{Module, ModuleMatrix};
use crate::version::Version;

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// All eight masks in ascending order.
    pub fn all() -> impl Iterator<Item = Mask> {
        (0..8).map(Mask)
    }

    /// Whether this mask inverts the module at column `x`, row `y`.
    pub fn inverts(self, x: usize, y: usize) -> bool {
        match self.0 {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => ((x * y) % 2) + ((x * y) % 3) == 0,
            6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
            7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
            _ => unreachable!(),
        }
    }
}

impl TryFrom<u8> for Mask {
    type Error = QrError;

    fn try_from(mask: u8) -> Result<Self, Self::Error> {
        if mask <= 7 {
            Ok(Mask(mask))
        } else {
            Err(QrError::InvalidMask(mask))
        }
    }
}

/// Returns the 15-bit format word: level and mask, a BCH(15,5) remainder
/// with generator 0x537, XORed with 0x5412.
pub fn format_bits(ecl: QrCodeEcc, mask: Mask) -> u32 {
    let data = u32::from((ecl.format_bits() << 3) | mask.value());
    let mut rem: u32 = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    ((data << 10) | rem) ^ 0x5412
}

/// Returns the 18-bit version word: the version and a BCH(18,6) remainder
/// with generator 0x1F25.
pub fn version_bits(ver: Version) -> u32 {
    let ver = u32::from(ver.value());
    let mut rem: u32 = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
    }
    (ver << 12) | rem
}

/// Returns a copy of `matrix` with `mask` applied to its data modules and the
/// format (and, from version 7, version) information written.
pub fn apply_mask(matrix: &ModuleMatrix, ecl: QrCodeEcc, mask: Mask) -> ModuleMatrix {
    let mut result = matrix.clone();
    let size = result.size();
    for (index, module) in result.modules_mut().iter_mut().enumerate() {
        if let Module::Data(bit) = *module {
            *module = Module::Data(bit ^ mask.inverts(index % size, index / size));
        }
    }
    result.draw_format_bits(format_bits(ecl, mask));
    if result.version().value() >= 7 {
        result.draw_version_bits(version_bits(result.version()));
    }
    result
}

/// Tries all eight masks and returns the one with the lowest penalty along
/// with the finished matrix. Ties go to the lowest mask number.
pub fn select_mask(matrix: &ModuleMatrix, ecl: QrCodeEcc) -> (Mask, ModuleMatrix) {
    let mut best = apply_mask(matrix, ecl, Mask::new(0));
    let mut bestmask = Mask::new(0);
    let mut minpenalty = penalty_score(&best);
    trace!(mask = 0, penalty = minpenalty, "scored mask candidate");
    for mask in Mask::all().skip(1) {
        let candidate = apply_mask(matrix, ecl, mask);
        let penalty = penalty_score(&candidate);
        trace!(mask = mask.value(), penalty, "scored mask candidate");
        if penalty < minpenalty {
            best = candidate;
            bestmask = mask;
            minpenalty = penalty;
        }
    }
    debug!(mask = bestmask.value(), penalty = minpenalty, "selected mask");
    (bestmask, best)
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// Scores a finished matrix by the four standard penalty rules:
/// same-color runs of five or more, 2x2 same-color blocks, finder-like
/// 1:1:3:1:1 patterns with light margins, and dark/light imbalance.
pub fn penalty_score(matrix: &ModuleMatrix) -> i32 {
    let size = matrix.size();
    let mut result: i32 = 0;

    // Rows, then columns
    for transpose in [false, true] {
        for a in 0..size {
            let mut runcolor = false;
            let mut runlen: i32 = 0;
            let mut runhistory = FinderPenalty::new(size);
            for b in 0..size {
                let color = if transpose {
                    matrix.is_dark(a, b)
                } else {
                    matrix.is_dark(b, a)
                };
                if color == runcolor {
                    runlen += 1;
                    if runlen == 5 {
                        result += PENALTY_N1;
                    } else if runlen > 5 {
                        result += 1;
                    }
                } else {
                    runhistory.add_history(runlen);
                    if !runcolor {
                        result += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = color;
                    runlen = 1;
                }
            }
            result += runhistory.terminate_and_count(runcolor, runlen) * PENALTY_N3;
        }
    }

    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color: bool = matrix.is_dark(x, y);
            if color == matrix.is_dark(x + 1, y)
                && color == matrix.is_dark(x, y + 1)
                && color == matrix.is_dark(x + 1, y + 1)
            {
                result += PENALTY_N2;
            }
        }
    }

    // Smallest k such that (45-5k)% <= dark/total <= (55+5k)%
    let dark = matrix.count_dark() as i32;
    let total = (size * size) as i32;
    let k: i32 = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    result += k * PENALTY_N4;
    result
}

/// Tracks the last seven run lengths of a row or column to spot
/// finder-like patterns. The symbol edge counts as a light run.
struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: usize) -> Self {
        Self {
            qr_size: size as i32,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            // Light border before the first run
            currentrunlength += self.qr_size;
        }
        self.run_history.copy_within(0..6, 1);
        self.run_history[0] = currentrunlength;
    }

    /// Call only right after a light run is added.
    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        i32::from(
            n > 0
                && rh[2] == n
                && rh[3] == n * 3
                && rh[4] == n
                && rh[5] == n
                && (rh[0] >= n * 4 || rh[6] >= n * 4),
        )
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        // Light border after the last run
        currentrunlength += self.qr_size;
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}
