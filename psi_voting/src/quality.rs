//! The quality function `F(x) = [psi(x + 1/2) - psi(1/2)] / 2` and its lookup table.
//!
//! `F(0) = 0`, `F(1) = 1` and `F(x + 1) = F(x) + 1/(2x + 1)`, so on integers it behaves like
//! a harmonic sum over odd numbers. A ballot whose summed score for the winner set is `x`
//! contributes `F(x)` to the quality of that winner set.

use log::debug;

use crate::config::QualityRule;
use crate::psi::{
    accurate_expansion, fast_expansion, shift_up, ABS_PSI_HALF, ACCURATE_SHIFT, FAST_C4,
    FAST_SHIFT,
};

/// Number of entries in a [`QualityTable`]. Integer totals must stay below this bound.
pub const TABLE_SIZE: usize = 512;

/// Quality accurate to about +-4e-16. Requires `x >= 0`.
pub fn quality_accurate(x: f64) -> f64 {
    assert!(x >= 0.0, "quality_accurate: argument must be non-negative, got {}", x);
    let (p, y) = shift_up(x + 0.5, ABS_PSI_HALF, ACCURATE_SHIFT);
    0.5 * accurate_expansion(p, y)
}

/// Quality accurate to about +-4e-12. Requires `x >= 0`.
pub fn quality_fast(x: f64) -> f64 {
    assert!(x >= 0.0, "quality_fast: argument must be non-negative, got {}", x);
    let (p, y) = shift_up(x + 0.5, FAST_C4 + ABS_PSI_HALF, FAST_SHIFT);
    0.5 * fast_expansion(p, y)
}

pub fn quality(x: f64, accurate: bool) -> f64 {
    if accurate {
        quality_accurate(x)
    } else {
        quality_fast(x)
    }
}

/// `quality(j / 9)` for `j = 0..=9`, to more digits than a double holds.
pub const REFERENCE_NINTHS: [f64; 10] = [
    0.0,
    0.231_344_398_261_451_616_064_873_648_180_400_480,
    0.402_461_181_265_483_029_158_748_201_667_014_700,
    0.536_390_306_674_581_119_399_124_765_539_722_520,
    0.645_501_525_962_868_133_052_710_550_655_173_858,
    0.737_072_875_488_692_532_109_319_255_818_931_414,
    0.815_691_260_323_254_343_508_007_379_076_488_922,
    0.884_406_562_797_259_071_986_922_242_399_804_666,
    0.945_335_576_927_708_646_448_801_110_074_017_809,
    1.0,
];

/// Precomputed per-ballot quality for every integer total score below [`TABLE_SIZE`].
///
/// The table is tied to one `(rule, top_score)` pair: with the Fsimmons rule, entry `j` is
/// `quality_accurate(j / top_score)`. With the harmonic rule, entry `j` is the harmonic
/// number `H_j` (proportional approval voting) and `top_score` only bounds the totals.
#[derive(PartialEq, Debug, Clone)]
pub struct QualityTable {
    top_score: u32,
    values: Vec<f64>,
}

impl QualityTable {
    pub fn build(rule: QualityRule, top_score: u32) -> QualityTable {
        assert!(top_score > 0, "QualityTable: the top score must be positive");
        let values: Vec<f64> = match rule {
            QualityRule::Harmonic => {
                let mut values = Vec::with_capacity(TABLE_SIZE);
                let mut h = 0.0;
                values.push(h);
                for j in 1..TABLE_SIZE {
                    h += 1.0 / j as f64;
                    values.push(h);
                }
                values
            }
            QualityRule::Fsimmons => {
                let scale = 1.0 / top_score as f64;
                (0..TABLE_SIZE)
                    .map(|j| quality_accurate(j as f64 * scale))
                    .collect()
            }
        };
        debug!(
            "QualityTable::build: rule {:?} top score {} max entry {}",
            rule,
            top_score,
            values[TABLE_SIZE - 1]
        );
        QualityTable { top_score, values }
    }

    pub fn top_score(&self) -> u32 {
        self.top_score
    }

    /// Whether every total reachable by `num_winners` candidates fits in the table.
    pub fn supports(&self, num_winners: u32) -> bool {
        (num_winners as u64) * (self.top_score as u64) < TABLE_SIZE as u64
    }

    #[inline]
    pub fn get(&self, total: usize) -> f64 {
        self.values[total]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_ninths() {
        for (j, expected) in REFERENCE_NINTHS.iter().enumerate() {
            let x = j as f64 / 9.0;
            assert!((quality_accurate(x) - expected).abs() < 1e-11, "j={}", j);
            assert!((quality_fast(x) - expected).abs() < 1e-11, "j={}", j);
        }
        assert!((quality(1.0 / 9.0, true) - 0.23134439826145).abs() < 1e-11);
    }

    #[test]
    fn shift_by_one_recurrence() {
        let mut x = 0.0;
        while x < 40.0 {
            let step = 1.0 / (2.0 * x + 1.0);
            assert!(
                (quality_accurate(x + 1.0) - quality_accurate(x) - step).abs() < 1e-14,
                "x={}",
                x
            );
            assert!(
                (quality_fast(x + 1.0) - quality_fast(x) - step).abs() < 1e-11,
                "x={}",
                x
            );
            x += 0.037;
        }
    }

    #[test]
    fn integers_are_odd_harmonic_sums() {
        // F(n) = 1 + 1/3 + ... + 1/(2n - 1)
        let mut sum = 0.0;
        for n in 1..30 {
            sum += 1.0 / (2 * n - 1) as f64;
            assert!((quality_accurate(n as f64) - sum).abs() < 1e-14, "n={}", n);
        }
    }

    #[test]
    fn harmonic_table() {
        let table = QualityTable::build(QualityRule::Harmonic, 1);
        assert_eq!(table.get(0), 0.0);
        assert_eq!(table.get(1), 1.0);
        assert_eq!(table.get(2), 1.5);
        assert!((table.get(3) - 1.833_333_333_333_333).abs() < 1e-15);
        assert!((table.get(TABLE_SIZE - 1) - table.get(TABLE_SIZE - 2) - 1.0 / 511.0).abs() < 1e-14);
        assert!(table.supports(511));
        assert!(!table.supports(512));
    }

    #[test]
    fn fsimmons_table_is_scaled() {
        let table = QualityTable::build(QualityRule::Fsimmons, 9);
        for j in 0..=9 {
            assert!((table.get(j) - REFERENCE_NINTHS[j]).abs() < 1e-11, "j={}", j);
        }
        assert!((table.get(18) - (1.0 + 1.0 / 3.0)).abs() < 1e-14);
        assert_eq!(table.top_score(), 9);
        assert!(table.supports(56));
        assert!(!table.supports(57));
    }

    #[test]
    #[should_panic]
    fn negative_argument() {
        quality_fast(-0.5);
    }
}
