//! Approximations of the digamma function `psi(x) = Gamma'(x) / Gamma(x)` for `x > 0`.
//!
//! Both evaluators shift the argument upward with the recurrence
//! `psi(x) = psi(x + 1) - 1/x` and then apply the asymptotic expansion
//!
//! `psi(y) ~ ln(y) - 1/(2y) - 1/(12y^2) + 1/(120y^4) - ...`
//!
//! The accurate version shifts further and keeps more terms of the series.
//! Very small arguments skip the shift loop and use the Laurent expansion around 0,
//! where `1/x` dominates and the loop would lose every significant digit.

use log::debug;

use crate::rand48::Rand48;

pub const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_860_61;
/// pi^2 / 6
pub const ZETA2: f64 = 1.644_934_066_848_226_436_47;
pub const ZETA3: f64 = 1.202_056_903_159_594_285_40;
/// pi^4 / 90
pub const ZETA4: f64 = 1.082_323_233_711_138_191_52;
pub const LN4: f64 = 1.386_294_361_119_890_618_83;
/// `-psi(1/2) = EULER_MASCHERONI + ln(4)`
pub const ABS_PSI_HALF: f64 = 1.963_510_026_021_423_479_44;

pub(crate) const ACCURATE_SHIFT: f64 = 14.9;
const ACCURATE_SMALL_X: f64 = 0.000_286_648;

pub(crate) const FAST_SHIFT: f64 = 7.01;
const FAST_SMALL_X: f64 = 0.000_17;
// Minimax-adjusted coefficients of the truncated series used by the fast variant.
const FAST_C1: f64 = 0.244_417_244_017_665;
const FAST_C2: f64 = 0.133_307_727_351_213;
const FAST_C3: f64 = 0.333_333_316_834_594;
pub(crate) const FAST_C4: f64 = 3.793_448_858_054_65e-12;

/// Digamma accurate to within +-1e-15 for any `x > 0`.
///
/// Near 0 the floating point grid itself limits what any method can achieve.
/// The worst case is around `x = 0.25`.
pub fn psi_accurate(x: f64) -> f64 {
    assert!(x > 0.0, "psi_accurate: argument must be positive, got {}", x);
    if x < ACCURATE_SMALL_X {
        return (ZETA2 - x * (ZETA3 - x * ZETA4)) * x - EULER_MASCHERONI - 1.0 / x;
    }
    let (p, y) = shift_up(x, 0.0, ACCURATE_SHIFT);
    accurate_expansion(p, y)
}

/// Digamma accurate to within +-9e-12 for `x >= 1e-4` and +-7e-12 for `x >= 3e-4`.
pub fn psi_fast(x: f64) -> f64 {
    assert!(x > 0.0, "psi_fast: argument must be positive, got {}", x);
    if x < FAST_SMALL_X {
        return (ZETA2 - ZETA3 * x) * x - EULER_MASCHERONI - 1.0 / x;
    }
    let (p, y) = shift_up(x, FAST_C4, FAST_SHIFT);
    fast_expansion(p, y)
}

pub fn psi(x: f64, accurate: bool) -> f64 {
    if accurate {
        psi_accurate(x)
    } else {
        psi_fast(x)
    }
}

/// Applies `psi(y) = psi(y + 1) - 1/y` until `y` reaches `threshold`.
/// Returns the accumulated sum (starting from `seed`) and the final argument.
pub(crate) fn shift_up(x: f64, seed: f64, threshold: f64) -> (f64, f64) {
    let mut p = seed;
    let mut y = x;
    while y < threshold {
        p -= 1.0 / y;
        y += 1.0;
    }
    (p, y)
}

/// Adds the asymptotic expansion at `y` to the shifted sum `p`.
pub(crate) fn accurate_expansion(p: f64, y: f64) -> f64 {
    let mut r = 0.5 / y;
    let p = p + (y.ln() - r);
    r *= r;
    p - r * (1.0 / 3.0 - r * (2.0 / 15.0 - r * (16.0 / 63.0 - r * (16.0 / 15.0 - r * 256.0 / 33.0))))
}

pub(crate) fn fast_expansion(p: f64, y: f64) -> f64 {
    let mut r = 0.5 / y;
    let p = p + y.ln() - r;
    r *= r;
    p - r * ((FAST_C1 * r - FAST_C2) * r + FAST_C3)
}

// ******** Accuracy sweep *********

/// The largest error seen for one identity, and where.
#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub struct RecordError {
    pub error: f64,
    pub at: f64,
}

impl RecordError {
    fn observe(&mut self, name: &str, error: f64, x: f64) {
        if error >= self.error {
            self.error = error;
            self.at = x;
            debug!("record error for {} test: {:e} at x={:.15}", name, error, x);
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct SweepReport {
    pub samples: u32,
    pub low: f64,
    pub high: f64,
    /// `psi_fast(x) + 1/x` against `psi_fast(x + 1)`
    pub shift_by_one: RecordError,
    /// `psi_fast(2x)` against `(psi_fast(x + 1/2) + psi_fast(x) + ln 4) / 2`
    pub doubling: RecordError,
    /// `psi_fast(x)` against `psi_accurate(x)`
    pub agreement: RecordError,
}

/// Checks the consistency identities of `psi_fast` on `samples` arguments drawn
/// uniformly from `[low, low + width)`.
pub fn accuracy_sweep(rng: &mut Rand48, samples: u32, low: f64, width: f64) -> SweepReport {
    let mut shift_by_one = RecordError::default();
    let mut doubling = RecordError::default();
    let mut agreement = RecordError::default();
    for _ in 0..samples {
        let x = width * rng.next_f64() + low;
        let p = psi_fast(x);
        shift_by_one.observe("shift-by-1", (p + 1.0 / x - psi_fast(x + 1.0)).abs(), x);
        doubling.observe(
            "doubling",
            (psi_fast(2.0 * x) - 0.5 * (psi_fast(x + 0.5) + p + LN4)).abs(),
            x,
        );
        agreement.observe("accurate-fast", (p - psi_accurate(x)).abs(), x);
    }
    SweepReport {
        samples,
        low,
        high: low + width,
        shift_by_one,
        doubling,
        agreement,
    }
}
