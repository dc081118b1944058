//! Manifestation probability in double precision.
//!
//! The probability that at least one success occurs over `t` independent
//! attempts, each succeeding with probability `p`, in the continuous
//! (Poisson) limit:
//!
//! ```text
//! P(t, p) = 1 − e^(−τ),   τ = t·p
//! ```
//!
//! # Regimes
//!
//! | Regime | τ | Behaviour |
//! |---|---|---|
//! | [`Regime::Degenerate`] | 0 | P = 0 exactly |
//! | [`Regime::Linear`] | (0, [`LINEAR_TAU`]) | P ≈ τ − τ²/2 |
//! | [`Regime::Transitional`] | [[`LINEAR_TAU`], [`SATURATION_TAU`]) | full curve, P < 1 |
//! | [`Regime::Saturated`] | ≥ [`SATURATION_TAU`] | P = 1.0 exactly in f64 |
//!
//! Saturation is not an overflow bug: once `e^(−τ)` drops below half an
//! ulp of 1, the correctly rounded value of `1 − e^(−τ)` *is* `1.0`.
//! Callers that need to tell `1 − 10⁻²⁰` from `1 − 10⁻⁴⁰` use
//! [`crate::precise`].
//!
//! # Domain
//!
//! Every function validates its arguments first and returns
//! [`ManifestationError::InvalidParameter`] instead of a clamped value.

use crate::error::ManifestationError;
use crate::special;

/// τ at which P reaches 99%: `ln 100 ≈ 4.605170185988091`.
pub const CRITICAL_TAU_99: f64 = 2.0 * std::f64::consts::LN_10;

/// τ at which P reaches 99.9%: `ln 1000 ≈ 6.907755278982137`.
pub const CRITICAL_TAU_999: f64 = 3.0 * std::f64::consts::LN_10;

/// Upper edge of the linear regime. Below it `P` and `τ` differ by a
/// relative `τ/2 < 5 × 10⁻⁴`.
pub const LINEAR_TAU: f64 = 1e-3;

/// Lower edge of the saturated regime, `54·ln 2 ≈ 37.43`.
///
/// Here `e^(−τ)` reaches `2⁻⁵⁴`, half the spacing of f64 just below 1, so
/// from here on P rounds to exactly `1.0`. [`Regime::classify`] places the
/// edge on the evaluated P, so the last-ulp rounding of `expm1` right at
/// the boundary cannot split the two.
pub const SATURATION_TAU: f64 = 54.0 * std::f64::consts::LN_2;

/// Numerical regime of a composite parameter τ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    /// τ = 0: no attempts or impossible success.
    Degenerate,
    /// First-order regime where P ≈ τ.
    Linear,
    /// The bend of the curve, where neither approximation holds and P is
    /// still below 1.0.
    Transitional,
    /// P rounds to exactly 1.0 in double precision.
    Saturated,
}

impl Regime {
    /// Classifies a composite parameter τ.
    ///
    /// # Errors
    /// Returns `Err` if `tau` is negative, infinite or NaN.
    ///
    /// # Examples
    /// ```
    /// use u_manifest::manifestation::Regime;
    /// assert_eq!(Regime::classify(0.0).unwrap(), Regime::Degenerate);
    /// assert_eq!(Regime::classify(4.6).unwrap(), Regime::Transitional);
    /// assert_eq!(Regime::classify(38.0).unwrap(), Regime::Saturated);
    /// ```
    pub fn classify(tau: f64) -> Result<Self, ManifestationError> {
        check_tau(tau)?;
        Ok(if tau == 0.0 {
            Regime::Degenerate
        } else if tau < LINEAR_TAU {
            Regime::Linear
        } else if special::exp_complement(tau) < 1.0 {
            Regime::Transitional
        } else {
            Regime::Saturated
        })
    }
}

// ============================================================================
// Validation
// ============================================================================

fn check_trials(t: f64) -> Result<(), ManifestationError> {
    if !t.is_finite() || t < 0.0 {
        return Err(ManifestationError::invalid(
            "t",
            t,
            "trial count must be finite and non-negative",
        ));
    }
    Ok(())
}

fn check_probability(p: f64) -> Result<(), ManifestationError> {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return Err(ManifestationError::invalid(
            "p",
            p,
            "success probability must be in [0, 1]",
        ));
    }
    Ok(())
}

fn check_tau(tau: f64) -> Result<(), ManifestationError> {
    if !tau.is_finite() || tau < 0.0 {
        return Err(ManifestationError::invalid(
            "tau",
            tau,
            "composite parameter must be finite and non-negative",
        ));
    }
    Ok(())
}

fn check_target(target: f64) -> Result<(), ManifestationError> {
    if target.is_nan() || target <= 0.0 || target >= 1.0 {
        return Err(ManifestationError::invalid(
            "target",
            target,
            "target probability must be in the open interval (0, 1)",
        ));
    }
    Ok(())
}

// ============================================================================
// Forward evaluation
// ============================================================================

/// Probability of at least one manifestation after `t` attempts at
/// success probability `p`: `P = 1 − e^(−t·p)`.
///
/// # Algorithm
/// `−expm1(−t·p)` via [`special::exp_complement`]. Since `p ≤ 1`, the
/// product never exceeds `t` and cannot overflow.
///
/// # Errors
/// Returns `Err` if `t` is negative or not finite, or if `p` is outside
/// `[0, 1]` or NaN.
///
/// # Examples
/// ```
/// use u_manifest::manifestation::manifestation_probability;
/// assert_eq!(manifestation_probability(0.0, 0.5).unwrap(), 0.0);
/// let p = manifestation_probability(4.605170185988092e20, 1e-20).unwrap();
/// assert!((p - 0.99).abs() < 1e-12);
/// assert!(manifestation_probability(-1.0, 0.5).is_err());
/// ```
pub fn manifestation_probability(t: f64, p: f64) -> Result<f64, ManifestationError> {
    check_trials(t)?;
    check_probability(p)?;
    if t == 0.0 || p == 0.0 {
        return Ok(0.0);
    }
    Ok(special::exp_complement(t * p))
}

/// [`manifestation_probability`] expressed on the composite parameter τ.
///
/// # Errors
/// Returns `Err` if `tau` is negative, infinite or NaN.
///
/// # Examples
/// ```
/// use u_manifest::manifestation::{probability_from_tau, CRITICAL_TAU_99};
/// let p = probability_from_tau(CRITICAL_TAU_99).unwrap();
/// assert!((p - 0.99).abs() < 1e-9);
/// ```
pub fn probability_from_tau(tau: f64) -> Result<f64, ManifestationError> {
    check_tau(tau)?;
    if tau == 0.0 {
        return Ok(0.0);
    }
    Ok(special::exp_complement(tau))
}

/// Exact discrete form `1 − (1 − p)^n` over `n` whole attempts.
///
/// Converges to [`manifestation_probability`] as `p → 0` with `n·p` held
/// fixed, and always dominates it: `(1 − p)^n ≤ e^(−np)`.
///
/// # Errors
/// Returns `Err` if `p` is outside `[0, 1]` or NaN.
///
/// # Examples
/// ```
/// use u_manifest::manifestation::discrete_manifestation_probability;
/// let p = discrete_manifestation_probability(2, 0.5).unwrap();
/// assert!((p - 0.75).abs() < 1e-15);
/// ```
pub fn discrete_manifestation_probability(n: u128, p: f64) -> Result<f64, ManifestationError> {
    check_probability(p)?;
    if n == 0 || p == 0.0 {
        return Ok(0.0);
    }
    Ok(special::bernoulli_complement(n as f64, p))
}

// ============================================================================
// Inverse evaluation
// ============================================================================

/// Composite parameter τ at which P reaches `target`: `τ = −ln(1 − P*)`.
///
/// # Errors
/// Returns `Err` unless `0 < target < 1`. At `0` the threshold is the
/// trivial `τ = 0` and at `1` it is infinite; neither is a usable answer.
///
/// # Examples
/// ```
/// use u_manifest::manifestation::critical_tau;
/// let tau = critical_tau(0.99).unwrap();
/// assert!((tau - 4.6051701859880914).abs() < 1e-9);
/// assert!(critical_tau(1.0).is_err());
/// ```
pub fn critical_tau(target: f64) -> Result<f64, ManifestationError> {
    check_target(target)?;
    Ok(special::log_complement(target))
}

/// Number of attempts needed to reach `target` at success probability `p`.
///
/// # Errors
/// Returns `Err` unless `0 < target < 1` and `0 < p ≤ 1`, or if the trial
/// count overflows `f64` (p in the subnormal range).
///
/// # Examples
/// ```
/// use u_manifest::manifestation::critical_trials;
/// let t = critical_trials(0.99, 1e-20).unwrap();
/// assert!((t / 4.605170185988091e20 - 1.0).abs() < 1e-12);
/// ```
pub fn critical_trials(target: f64, p: f64) -> Result<f64, ManifestationError> {
    check_target(target)?;
    check_probability(p)?;
    if p == 0.0 {
        return Err(ManifestationError::invalid(
            "p",
            p,
            "no finite trial count reaches the target at zero success probability",
        ));
    }
    let t = special::log_complement(target) / p;
    if !t.is_finite() {
        return Err(ManifestationError::invalid(
            "p",
            p,
            "required trial count overflows f64",
        ));
    }
    Ok(t)
}

// ============================================================================
// Curve sampling
// ============================================================================

/// Evenly spaced `(τ, P)` samples on `[0, tau_max]`, `steps + 1` points.
///
/// # Errors
/// Returns `Err` if `tau_max` is not finite and positive, or `steps == 0`.
///
/// # Examples
/// ```
/// use u_manifest::manifestation::probability_curve;
/// let curve = probability_curve(10.0, 100).unwrap();
/// assert_eq!(curve.len(), 101);
/// assert_eq!(curve[0], (0.0, 0.0));
/// assert_eq!(curve[100].0, 10.0);
/// ```
pub fn probability_curve(
    tau_max: f64,
    steps: usize,
) -> Result<Vec<(f64, f64)>, ManifestationError> {
    if !tau_max.is_finite() || tau_max <= 0.0 {
        return Err(ManifestationError::invalid(
            "tau_max",
            tau_max,
            "curve range must be finite and positive",
        ));
    }
    if steps == 0 {
        return Err(ManifestationError::invalid(
            "steps",
            steps,
            "curve needs at least one step",
        ));
    }
    (0..=steps)
        .map(|i| {
            let tau = tau_max * i as f64 / steps as f64;
            probability_from_tau(tau).map(|p| (tau, p))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
