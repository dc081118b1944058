//! Special mathematical functions.
//!
//! Cancellation-free evaluations of the complement forms that appear in
//! the manifestation model. Each primitive is written in terms of
//! `exp_m1`/`ln_1p` so that arguments near zero keep full relative
//! precision instead of being swallowed by a subtraction from 1.
//!
//! These functions do not validate their domain; NaN in gives NaN out.
//! Domain checks live in [`crate::manifestation`].

/// Complement of the exponential survival term: `1 − e^(−x)`.
///
/// # Algorithm
/// Evaluated as `−expm1(−x)`. The naive `1.0 - (-x).exp()` loses every
/// significant digit once `x < ε`; the `expm1` form keeps full relative
/// precision down to the smallest subnormal.
///
/// For `x ≳ 37.4`, `e^(−x)` is below half an ulp of 1 and the result is
/// exactly `1.0`. That saturation is the correctly rounded answer.
///
/// # Examples
/// ```
/// use u_manifest::special::exp_complement;
/// assert_eq!(exp_complement(0.0), 0.0);
/// assert!((exp_complement(1e-10) - 1e-10).abs() < 1e-19);
/// assert_eq!(exp_complement(100.0), 1.0);
/// ```
pub fn exp_complement(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    -(-x).exp_m1()
}

/// Inverse of [`exp_complement`]: `−ln(1 − q)`.
///
/// # Algorithm
/// Evaluated as `−ln_1p(−q)`, accurate both for `q → 0` (where the result
/// tends to `q`) and for `q → 1` (where `1 − q` is formed exactly by
/// Sterbenz' lemma for `q ≥ 0.5`).
///
/// # Returns
/// - `f64::INFINITY` if `q == 1.0`.
/// - `f64::NAN` if `q > 1.0` or NaN.
///
/// # Examples
/// ```
/// use u_manifest::special::log_complement;
/// let tau = log_complement(0.99);
/// assert!((tau - 100.0_f64.ln()).abs() < 1e-9);
/// ```
pub fn log_complement(q: f64) -> f64 {
    if q.is_nan() || q > 1.0 {
        return f64::NAN;
    }
    -(-q).ln_1p()
}

/// Discrete complement `1 − (1 − p)^n` over `n` Bernoulli trials.
///
/// # Algorithm
/// `(1 − p)^n = exp(n · ln(1 − p))`, so the complement is
/// `exp_complement(−n · ln_1p(−p))`. Computing `1 − p` first would round
/// any `p < ε/2` to exactly 1 and report zero probability for every `n`.
///
/// # Examples
/// ```
/// use u_manifest::special::bernoulli_complement;
/// assert!((bernoulli_complement(2.0, 0.5) - 0.75).abs() < 1e-15);
/// // p far below machine epsilon still registers.
/// let q = bernoulli_complement(1e20, 1e-20);
/// assert!((q - (1.0 - (-1.0_f64).exp())).abs() < 1e-12);
/// ```
pub fn bernoulli_complement(n: f64, p: f64) -> f64 {
    if n.is_nan() || p.is_nan() {
        return f64::NAN;
    }
    if n == 0.0 {
        return 0.0;
    }
    exp_complement(-n * (-p).ln_1p())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- exp_complement ---

    #[test]
    fn test_exp_complement_zero() {
        assert_eq!(exp_complement(0.0), 0.0);
    }

    #[test]
    fn test_exp_complement_known() {
        // 1 - 1/e
        let expected = 0.632_120_558_828_557_7;
        assert!((exp_complement(1.0) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_exp_complement_beats_naive_form() {
        let x: f64 = 1e-18;
        assert_eq!(1.0 - (-x).exp(), 0.0, "naive form cancels to zero");
        let y = exp_complement(x);
        assert!((y - x).abs() <= x * f64::EPSILON, "got {y}");
    }

    #[test]
    fn test_exp_complement_saturates() {
        assert_eq!(exp_complement(40.0), 1.0);
        assert_eq!(exp_complement(1e6), 1.0);
        assert_eq!(exp_complement(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_exp_complement_nan() {
        assert!(exp_complement(f64::NAN).is_nan());
    }

    // --- log_complement ---

    #[test]
    fn test_log_complement_known() {
        assert!((log_complement(0.99) - 100.0_f64.ln()).abs() < 1e-9);
        assert!((log_complement(0.999) - 1000.0_f64.ln()).abs() < 1e-9);
        assert_eq!(log_complement(0.0), 0.0);
    }

    #[test]
    fn test_log_complement_small() {
        let q = 1e-15;
        assert!((log_complement(q) - q).abs() <= q * f64::EPSILON);
    }

    #[test]
    fn test_log_complement_edges() {
        assert_eq!(log_complement(1.0), f64::INFINITY);
        assert!(log_complement(1.5).is_nan());
        assert!(log_complement(f64::NAN).is_nan());
    }

    #[test]
    fn test_log_complement_inverts_exp_complement() {
        for &x in &[1e-12, 1e-6, 0.1, 1.0, 4.5, 20.0] {
            let back = log_complement(exp_complement(x));
            assert!(
                (back - x).abs() <= 1e-12 * x.max(1.0),
                "x={x}, back={back}"
            );
        }
    }

    // --- bernoulli_complement ---

    #[test]
    fn test_bernoulli_complement_exact_cases() {
        assert_eq!(bernoulli_complement(0.0, 0.3), 0.0);
        assert_eq!(bernoulli_complement(5.0, 0.0), 0.0);
        assert_eq!(bernoulli_complement(3.0, 1.0), 1.0);
        assert!((bernoulli_complement(1.0, 0.3) - 0.3).abs() < 1e-15);
        assert!((bernoulli_complement(3.0, 0.5) - 0.875).abs() < 1e-15);
    }

    #[test]
    fn test_bernoulli_complement_tiny_p() {
        // 1 - p rounds to 1.0 here; the ln_1p form does not.
        let p = 1e-20;
        assert_eq!(1.0 - p, 1.0);
        let q = bernoulli_complement(4.605_170_185_988_092e20, p);
        assert!((q - 0.99).abs() < 1e-15, "got {q}");
    }

    #[test]
    fn test_bernoulli_complement_nan() {
        assert!(bernoulli_complement(f64::NAN, 0.5).is_nan());
        assert!(bernoulli_complement(1.0, f64::NAN).is_nan());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn exp_complement_in_zero_one(x in 0.0_f64..1e3) {
            let q = exp_complement(x);
            prop_assert!((0.0..=1.0).contains(&q), "1-exp(-{x}) = {q} out of [0,1]");
        }

        #[test]
        fn exp_complement_is_monotonic(x1 in 0.0_f64..60.0, x2 in 0.0_f64..60.0) {
            let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
            prop_assert!(exp_complement(lo) <= exp_complement(hi));
        }

        #[test]
        fn exp_complement_below_linear_bound(x in 0.0_f64..10.0) {
            // 1 - e^(-x) <= x for x >= 0
            prop_assert!(exp_complement(x) <= x);
        }

        #[test]
        fn bernoulli_below_poisson_bound(n in 1u32..10_000, p in 0.0_f64..1.0) {
            // (1-p)^n <= e^(-np), so the discrete complement dominates
            let n = f64::from(n);
            let discrete = bernoulli_complement(n, p);
            let poisson = exp_complement(n * p);
            prop_assert!(discrete >= poisson - 1e-12, "{discrete} < {poisson}");
        }
    }
}
