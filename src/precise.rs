//! Manifestation probability on arbitrary-precision decimals.
//!
//! Double precision carries ~16 significant digits, which is not enough to
//! tell `1 − 10⁻²⁰` from 1, or to check the 99% threshold to more than 15
//! places. This module repeats the computations of
//! [`crate::manifestation`] on exact decimals and rounds each result to a
//! caller-chosen number of significant digits.
//!
//! # Precision
//!
//! Precision is an explicit argument of every call ([`Precision`], default
//! 30 significant digits). There is no process-wide context, so a
//! computation at 200 digits never changes the behaviour of a later one
//! at 30.
//!
//! # Algorithms
//!
//! Inputs are exact [`Decimal`]s and `τ = t·p` is formed exactly. The
//! transcendental parts run in fixed point, `value · 10^scale` held in a
//! [`BigInt`], with [`GUARD_DIGITS`] extra digits beyond the requested
//! precision and the scale widened by the leading zeros of small inputs:
//!
//! - `τ < 1`: alternating Maclaurin series of `1 − e^(−τ)`, which has no
//!   cancellation at the leading term.
//! - `τ ≥ 1`: `e^(−τ) = (e^(−1))^⌊τ⌋ · e^(−{τ})` by binary powering, then
//!   `1 − e^(−τ)`, which is at least `1 − 1/e`.
//! - `τ ≥ (digits + 2)·ln 10`: the result rounds to exactly 1 at the
//!   requested precision and is returned without evaluation.
//! - inverse: Newton's method on `e^(−τ) = 1 − P*`, seeded by the f64
//!   answer, so two or three steps reach 30 digits.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use tracing::{debug, trace};

use crate::error::ManifestationError;
use crate::special;

/// Digits carried beyond the requested precision in fixed-point work.
pub const GUARD_DIGITS: u32 = 12;

/// Largest decimal exponent magnitude accepted by the parser and by
/// [`Decimal::new`].
pub const MAX_EXPONENT: i64 = 1_000_000;

const MAX_NEWTON_STEPS: usize = 64;

/// Newton stops once a step moves the estimate by at most this many units
/// in the last fixed-point place.
const NEWTON_TOLERANCE_ULPS: u32 = 10;

// ============================================================================
// Precision
// ============================================================================

/// Number of significant decimal digits a result is rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Precision(u32);

impl Precision {
    /// Default precision: 30 significant digits.
    pub const DEFAULT_DIGITS: u32 = 30;

    /// Upper bound on requested precision.
    pub const MAX_DIGITS: u32 = 1000;

    /// Creates a precision of `digits` significant digits.
    ///
    /// # Errors
    /// Returns `Err` if `digits` is 0 or exceeds [`Precision::MAX_DIGITS`].
    ///
    /// # Examples
    /// ```
    /// use u_manifest::precise::Precision;
    /// assert_eq!(Precision::new(50).unwrap().digits(), 50);
    /// assert!(Precision::new(0).is_err());
    /// ```
    pub fn new(digits: u32) -> Result<Self, ManifestationError> {
        if digits == 0 || digits > Self::MAX_DIGITS {
            return Err(ManifestationError::invalid(
                "precision",
                digits,
                "significant digits must be in 1..=1000",
            ));
        }
        Ok(Self(digits))
    }

    pub fn digits(self) -> u32 {
        self.0
    }

    fn working_scale(self) -> u32 {
        self.0 + GUARD_DIGITS
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self(Self::DEFAULT_DIGITS)
    }
}

// ============================================================================
// Decimal
// ============================================================================

/// Exact arbitrary-precision decimal `coefficient · 10^exponent`.
///
/// Values are kept normalized (no trailing zeros in the coefficient, zero
/// stored as `0·10⁰`), so the derived equality is numeric equality.
///
/// # Examples
/// ```
/// use u_manifest::precise::Decimal;
/// let p: Decimal = "1e-20".parse().unwrap();
/// let t: Decimal = "4.605170185988092e20".parse().unwrap();
/// assert_eq!((&t * &p).to_string(), "4.605170185988092");
/// assert_eq!("1.50".parse::<Decimal>().unwrap(), "1.5".parse().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    coefficient: BigInt,
    exponent: i64,
}

impl Decimal {
    /// Creates `coefficient · 10^exponent`.
    ///
    /// # Errors
    /// Returns `Err` if `|exponent|` exceeds [`MAX_EXPONENT`].
    ///
    /// # Examples
    /// ```
    /// use u_manifest::precise::Decimal;
    /// assert_eq!(Decimal::new(15, -1).unwrap().to_string(), "1.5");
    /// assert!(Decimal::new(1, i64::MAX).is_err());
    /// ```
    pub fn new(coefficient: impl Into<BigInt>, exponent: i64) -> Result<Self, ManifestationError> {
        if exponent.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
            return Err(ManifestationError::invalid(
                "exponent",
                exponent,
                "decimal exponent is out of range",
            ));
        }
        Ok(normalize(coefficient.into(), exponent))
    }

    pub fn zero() -> Self {
        Self {
            coefficient: BigInt::zero(),
            exponent: 0,
        }
    }

    pub fn one() -> Self {
        Self {
            coefficient: BigInt::one(),
            exponent: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.coefficient.is_negative()
    }

    pub fn coefficient(&self) -> &BigInt {
        &self.coefficient
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Exponent of the leading digit, `⌊log₁₀ |x|⌋`. Zero for zero.
    ///
    /// # Examples
    /// ```
    /// use u_manifest::precise::Decimal;
    /// assert_eq!("123.4".parse::<Decimal>().unwrap().adjusted_exponent(), 2);
    /// assert_eq!("0.0042".parse::<Decimal>().unwrap().adjusted_exponent(), -3);
    /// ```
    pub fn adjusted_exponent(&self) -> i64 {
        if self.is_zero() {
            return 0;
        }
        self.exponent
            .saturating_add(digit_count(&self.coefficient) as i64)
            .saturating_sub(1)
    }

    /// Rounds to `precision` significant digits, ties to even.
    ///
    /// # Examples
    /// ```
    /// use u_manifest::precise::{Decimal, Precision};
    /// let x: Decimal = "0.6321205588".parse().unwrap();
    /// let rounded = x.round_to(Precision::new(4).unwrap());
    /// assert_eq!(rounded.to_string(), "0.6321");
    /// ```
    pub fn round_to(&self, precision: Precision) -> Self {
        self.round_with_tie(precision, Ordering::Equal)
    }

    /// Rounds a value whose magnitude lies infinitesimally `tie` of `self`.
    /// Only an exact tie can be decided by that offset: `Less` rounds it
    /// down, `Greater` rounds it up and `Equal` rounds it to even.
    fn round_with_tie(&self, precision: Precision, tie: Ordering) -> Self {
        let digits = u64::from(precision.digits());
        let len = digit_count(&self.coefficient);
        if len <= digits {
            return self.clone();
        }
        let dropped = len - digits;
        let divisor = pow10(dropped);
        let magnitude = self.coefficient.abs();
        let (mut kept, remainder) = magnitude.div_rem(&divisor);
        let twice = remainder * 2u32;
        let up = match twice.cmp(&divisor) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match tie {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => kept.is_odd(),
            },
        };
        if up {
            kept += 1u32;
        }
        if self.is_negative() {
            kept = -kept;
        }
        normalize(kept, self.exponent + dropped as i64)
    }

    /// Nearest `f64`. Values beyond the `f64` range become `±inf` or `±0`.
    ///
    /// # Examples
    /// ```
    /// use u_manifest::precise::Decimal;
    /// assert_eq!("0.99".parse::<Decimal>().unwrap().to_f64(), 0.99);
    /// ```
    pub fn to_f64(&self) -> f64 {
        // Display output is always valid float syntax, and `parse` rounds
        // correctly.
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// `self / 2`, exact.
    fn half(&self) -> Self {
        normalize(&self.coefficient * 5u32, self.exponent - 1)
    }

    /// `⌊self · 10^scale⌋` for non-negative values.
    fn to_fixed(&self, scale: u32) -> BigInt {
        let shift = self.exponent + i64::from(scale);
        if shift >= 0 {
            &self.coefficient * pow10(shift as u64)
        } else if (-shift) as u64 > digit_count(&self.coefficient) {
            BigInt::zero()
        } else {
            &self.coefficient / pow10((-shift) as u64)
        }
    }

    fn from_fixed(mantissa: BigInt, scale: u32) -> Self {
        normalize(mantissa, -i64::from(scale))
    }
}

fn normalize(mut coefficient: BigInt, mut exponent: i64) -> Decimal {
    if coefficient.is_zero() {
        return Decimal::zero();
    }
    let ten = BigInt::from(10u32);
    loop {
        let (quotient, remainder) = coefficient.div_rem(&ten);
        if !remainder.is_zero() {
            break;
        }
        coefficient = quotient;
        exponent += 1;
    }
    Decimal {
        coefficient,
        exponent,
    }
}

fn digit_count(n: &BigInt) -> u64 {
    n.magnitude().to_str_radix(10).len() as u64
}

fn pow10(n: u64) -> BigInt {
    BigInt::from(10u32).pow(u32::try_from(n).unwrap_or(u32::MAX))
}

/// Both coefficients rescaled to the smaller exponent.
fn align(a: &Decimal, b: &Decimal) -> (BigInt, BigInt, i64) {
    let exponent = a.exponent.min(b.exponent);
    let rescale = |d: &Decimal| &d.coefficient * pow10((d.exponent - exponent) as u64);
    (rescale(a), rescale(b), exponent)
}

impl Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let (a, b, exponent) = align(self, rhs);
        normalize(a + b, exponent)
    }
}

impl Sub for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let (a, b, exponent) = align(self, rhs);
        normalize(a - b, exponent)
    }
}

impl Mul for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        normalize(
            &self.coefficient * &rhs.coefficient,
            self.exponent + rhs.exponent,
        )
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        &self + &rhs
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        &self - &rhs
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        &self * &rhs
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal {
            coefficient: -self.coefficient,
            exponent: self.exponent,
        }
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.coefficient.sign();
        if sign != other.coefficient.sign() {
            return sign.cmp(&other.coefficient.sign());
        }
        if self.is_zero() {
            return Ordering::Equal;
        }
        match self.adjusted_exponent().cmp(&other.adjusted_exponent()) {
            Ordering::Equal => {
                let (a, b, _) = align(self, other);
                a.cmp(&b)
            }
            by_magnitude if self.is_negative() => by_magnitude.reverse(),
            by_magnitude => by_magnitude,
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        normalize(BigInt::from(value), 0)
    }
}

impl From<u128> for Decimal {
    fn from(value: u128) -> Self {
        normalize(BigInt::from(value), 0)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        normalize(BigInt::from(value), 0)
    }
}

impl TryFrom<f64> for Decimal {
    type Error = ManifestationError;

    /// Converts the shortest decimal string that round-trips to `value`,
    /// so `0.1` becomes exactly `0.1`.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(ManifestationError::invalid(
                "value",
                value,
                "only finite floats convert to decimal",
            ));
        }
        format!("{value:e}").parse()
    }
}

impl FromStr for Decimal {
    type Err = ManifestationError;

    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ManifestationError::Parse {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(fail("empty input"));
        }
        let (negative, body) = if let Some(rest) = trimmed.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix('+') {
            (false, rest)
        } else {
            (false, trimmed)
        };

        let (mantissa, exponent_text) = match body.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&body[..i], Some(&body[i + 1..])),
            None => (body, None),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(fail("no digits"));
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(fail("unexpected character"));
        }

        let mut exponent = match exponent_text {
            None => 0,
            Some(text) => {
                let digits = text.trim_start_matches(|c: char| c == '+' || c == '-');
                if digits.is_empty() {
                    return Err(fail("missing exponent digits"));
                }
                text.parse::<i64>().map_err(|_| fail("malformed exponent"))?
            }
        };
        if exponent.abs() > MAX_EXPONENT {
            return Err(fail("exponent out of range"));
        }
        exponent -= frac_part.len() as i64;

        let digits = format!("{int_part}{frac_part}");
        let mut coefficient =
            BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| fail("no digits"))?;
        if negative {
            coefficient = -coefficient;
        }
        Ok(normalize(coefficient, exponent))
    }
}

impl fmt::Display for Decimal {
    /// Plain notation for leading-digit exponents in `-7..21`, scientific
    /// (`d.ddde±x`) outside it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.is_negative() {
            f.write_str("-")?;
        }
        let digits = self.coefficient.magnitude().to_str_radix(10);
        let adjusted = self.adjusted_exponent();

        if self.exponent >= 0 && adjusted < 21 {
            write!(f, "{digits}{}", "0".repeat(self.exponent as usize))
        } else if self.exponent < 0 && adjusted >= -7 {
            if adjusted >= 0 {
                let (int_part, frac_part) = digits.split_at(adjusted as usize + 1);
                write!(f, "{int_part}.{frac_part}")
            } else {
                write!(f, "0.{}{digits}", "0".repeat((-adjusted - 1) as usize))
            }
        } else {
            let (lead, rest) = digits.split_at(1);
            if rest.is_empty() {
                write!(f, "{lead}e{adjusted}")
            } else {
                write!(f, "{lead}.{rest}e{adjusted}")
            }
        }
    }
}

// ============================================================================
// Fixed-point kernels (values are BigInt · 10^-scale, `one` = 10^scale)
// ============================================================================

fn fixed_mul(a: &BigInt, b: &BigInt, one: &BigInt) -> BigInt {
    a * b / one
}

/// `e^(−x)` for `0 ≤ x ≤ 1`.
fn exp_neg_reduced(x: &BigInt, one: &BigInt) -> BigInt {
    let mut sum = one.clone();
    let mut term = one.clone();
    let mut k = 1u32;
    loop {
        term = &term * x / (one * k);
        if term.is_zero() {
            return sum;
        }
        if k % 2 == 1 {
            sum -= &term;
        } else {
            sum += &term;
        }
        k += 1;
    }
}

/// `1 − e^(−x)` for `0 ≤ x < 1`.
fn exp_complement_reduced(x: &BigInt, one: &BigInt) -> BigInt {
    let mut sum = x.clone();
    let mut term = x.clone();
    let mut k = 2u32;
    loop {
        term = &term * x / (one * k);
        if term.is_zero() {
            return sum;
        }
        if k % 2 == 0 {
            sum -= &term;
        } else {
            sum += &term;
        }
        k += 1;
    }
}

/// `e^(−x)` for any `x ≥ 0`.
fn exp_neg(x: &BigInt, one: &BigInt) -> BigInt {
    let (mut whole, frac) = x.div_rem(one);
    let mut result = exp_neg_reduced(&frac, one);
    let mut base = exp_neg_reduced(one, one);
    while !whole.is_zero() && !result.is_zero() {
        if whole.is_odd() {
            result = fixed_mul(&result, &base, one);
        }
        base = fixed_mul(&base, &base, one);
        whole >>= 1u32;
    }
    result
}

/// `base^n` by binary powering.
fn pow_fixed(mut base: BigInt, mut n: u128, one: &BigInt) -> BigInt {
    let mut result = one.clone();
    while n > 0 && !result.is_zero() {
        if n & 1 == 1 {
            result = fixed_mul(&result, &base, one);
        }
        base = fixed_mul(&base, &base, one);
        n >>= 1;
    }
    result
}

fn leading_zeros(adjusted: i64) -> u32 {
    if adjusted < 0 {
        u32::try_from(-adjusted).unwrap_or(u32::MAX)
    } else {
        0
    }
}

/// `τ` past which `1 − e^(−τ)` rounds to exactly 1 at `precision`.
fn saturation_tau(precision: Precision) -> f64 {
    f64::from(precision.digits() + 2) * std::f64::consts::LN_10
}

/// `true` once anything smaller than `x²` is too small to move `x` across a
/// rounding boundary at `precision`, short of an exact tie.
fn square_is_negligible(x: &Decimal, precision: Precision) -> bool {
    let adjusted = x.adjusted_exponent();
    let last_kept = x.exponent.min(adjusted - i64::from(precision.digits()) + 1);
    2 * adjusted + 2 < last_kept
}

/// `ln x` to f64 accuracy for any positive decimal, including values far
/// outside the f64 range.
fn ln_approx(x: &Decimal) -> f64 {
    let adjusted = x.adjusted_exponent();
    let mantissa = Decimal {
        coefficient: x.coefficient.clone(),
        exponent: x.exponent - adjusted,
    };
    mantissa.to_f64().ln() + adjusted as f64 * std::f64::consts::LN_10
}

// ============================================================================
// Validation
// ============================================================================

fn check_trials(t: &Decimal) -> Result<(), ManifestationError> {
    if t.is_negative() {
        return Err(ManifestationError::invalid(
            "t",
            t,
            "trial count must be non-negative",
        ));
    }
    Ok(())
}

fn check_probability(p: &Decimal) -> Result<(), ManifestationError> {
    if p.is_negative() || *p > Decimal::one() {
        return Err(ManifestationError::invalid(
            "p",
            p,
            "success probability must be in [0, 1]",
        ));
    }
    Ok(())
}

fn check_target(target: &Decimal) -> Result<(), ManifestationError> {
    if *target <= Decimal::zero() || *target >= Decimal::one() {
        return Err(ManifestationError::invalid(
            "target",
            target,
            "target probability must be in the open interval (0, 1)",
        ));
    }
    Ok(())
}

// ============================================================================
// Public operations
// ============================================================================

/// `P = 1 − e^(−t·p)` rounded to `precision` significant digits.
///
/// # Errors
/// Returns `Err` if `t` is negative or `p` is outside `[0, 1]`.
///
/// # Examples
/// ```
/// use u_manifest::precise::{manifestation_probability, Decimal, Precision};
/// let t: Decimal = "4.605170185988092e20".parse().unwrap();
/// let p: Decimal = "1e-20".parse().unwrap();
/// let prob = manifestation_probability(&t, &p, Precision::default()).unwrap();
/// assert!((prob.to_f64() - 0.99).abs() < 1e-15);
/// ```
pub fn manifestation_probability(
    t: &Decimal,
    p: &Decimal,
    precision: Precision,
) -> Result<Decimal, ManifestationError> {
    check_trials(t)?;
    check_probability(p)?;
    probability_from_tau(&(t * p), precision)
}

/// `P = 1 − e^(−τ)` rounded to `precision` significant digits.
///
/// # Errors
/// Returns `Err` if `tau` is negative.
///
/// # Examples
/// ```
/// use u_manifest::precise::{probability_from_tau, Decimal, Precision};
/// let p = probability_from_tau(&Decimal::one(), Precision::default()).unwrap();
/// assert_eq!(p.to_string(), "0.632120558828557678404476229839");
/// ```
pub fn probability_from_tau(
    tau: &Decimal,
    precision: Precision,
) -> Result<Decimal, ManifestationError> {
    if tau.is_negative() {
        return Err(ManifestationError::invalid(
            "tau",
            tau,
            "composite parameter must be non-negative",
        ));
    }
    if tau.is_zero() {
        return Ok(Decimal::zero());
    }

    if square_is_negligible(tau, precision) {
        // τ − τ²/2 < P < τ
        trace!(%tau, "first-order term decides the rounding");
        return Ok(tau.round_with_tie(precision, Ordering::Less));
    }
    let adjusted = tau.adjusted_exponent();
    if adjusted < -i64::from(precision.working_scale()) {
        // Beyond τ − τ²/2 every term is below the guard digits.
        trace!(%tau, "linear regime shortcut");
        let p = tau - &(tau * tau).half();
        return Ok(p.round_to(precision));
    }
    if tau.to_f64() >= saturation_tau(precision) {
        debug!(%tau, digits = precision.digits(), "saturated at requested precision");
        return Ok(Decimal::one());
    }

    let scale = precision.working_scale() + leading_zeros(adjusted);
    let one = pow10(u64::from(scale));
    let x = tau.to_fixed(scale);
    let p = if x < one {
        exp_complement_reduced(&x, &one)
    } else {
        &one - exp_neg(&x, &one)
    };
    debug!(%tau, digits = precision.digits(), scale, "evaluated decimal probability");
    Ok(Decimal::from_fixed(p, scale).round_to(precision))
}

/// `τ = −ln(1 − P*)` rounded to `precision` significant digits.
///
/// # Errors
/// Returns `Err` unless `0 < target < 1`.
///
/// # Examples
/// ```
/// use u_manifest::precise::{critical_tau, Decimal, Precision};
/// let target: Decimal = "0.99".parse().unwrap();
/// let tau = critical_tau(&target, Precision::default()).unwrap();
/// assert_eq!(tau.to_string(), "4.60517018598809136803598290937");
/// ```
pub fn critical_tau(target: &Decimal, precision: Precision) -> Result<Decimal, ManifestationError> {
    check_target(target)?;

    if square_is_negligible(target, precision) {
        // q < −ln(1 − q) < q + q²
        trace!(%target, "first-order term decides the rounding");
        return Ok(target.round_with_tie(precision, Ordering::Greater));
    }
    let target_adjusted = target.adjusted_exponent();
    if target_adjusted < -i64::from(precision.working_scale()) {
        // −ln(1 − q) = q + q²/2 + q³/3 + …
        trace!(%target, "linear regime shortcut");
        let tau = target + &(target * target).half();
        return Ok(tau.round_to(precision));
    }

    let survival = &Decimal::one() - target;
    let scale = precision.working_scale()
        + leading_zeros(survival.adjusted_exponent())
        + leading_zeros(target_adjusted);
    let one = pow10(u64::from(scale));
    let y = survival.to_fixed(scale);

    let seed = if *target <= normalize(BigInt::from(5u32), -1) {
        special::log_complement(target.to_f64())
    } else {
        -ln_approx(&survival)
    };
    let mut x = Decimal::try_from(seed)?.to_fixed(scale);
    let tolerance = BigInt::from(NEWTON_TOLERANCE_ULPS);

    for step in 0..MAX_NEWTON_STEPS {
        let e = exp_neg(&x, &one);
        if e.is_zero() {
            break;
        }
        // x ← x + 1 − y·e^x
        let next = &x + &one - &y * &one / &e;
        let delta = (&next - &x).abs();
        x = next;
        trace!(step, %delta, "newton step");
        if delta <= tolerance {
            break;
        }
    }

    debug!(%target, digits = precision.digits(), scale, "evaluated decimal critical tau");
    Ok(Decimal::from_fixed(x, scale).round_to(precision))
}

/// Discrete form `1 − (1 − p)^n` rounded to `precision` significant digits.
///
/// # Errors
/// Returns `Err` if `p` is outside `[0, 1]`.
///
/// # Examples
/// ```
/// use u_manifest::precise::{discrete_manifestation_probability, Decimal, Precision};
/// let p: Decimal = "0.5".parse().unwrap();
/// let q = discrete_manifestation_probability(3, &p, Precision::default()).unwrap();
/// assert_eq!(q.to_string(), "0.875");
/// ```
pub fn discrete_manifestation_probability(
    n: u128,
    p: &Decimal,
    precision: Precision,
) -> Result<Decimal, ManifestationError> {
    check_probability(p)?;
    if n == 0 || p.is_zero() {
        return Ok(Decimal::zero());
    }
    if *p == Decimal::one() {
        return Ok(Decimal::one());
    }

    let tau = &Decimal::from(n) * p;
    if square_is_negligible(&tau, precision) {
        // np − C(n, 2)·p² ≤ P ≤ np, with equality for a single trial
        let tie = if n == 1 { Ordering::Equal } else { Ordering::Less };
        return Ok(tau.round_with_tie(precision, tie));
    }
    let adjusted = tau.adjusted_exponent();
    if adjusted < -i64::from(precision.working_scale()) {
        // 1 − (1 − p)^n = np − C(n, 2)·p² + …
        let correction = (&tau * &(&Decimal::from(n - 1) * p)).half();
        return Ok((&tau - &correction).round_to(precision));
    }

    // Powering amplifies the truncation error of 1 − p by up to n.
    let trial_digits = n.checked_ilog10().map_or(1, |d| d + 1);
    let scale = precision.working_scale() + trial_digits + leading_zeros(adjusted);
    let one = pow10(u64::from(scale));
    let base = (&Decimal::one() - p).to_fixed(scale);
    let survival = pow_fixed(base, n, &one);
    debug!(n = %n, digits = precision.digits(), scale, "evaluated decimal discrete probability");
    Ok(Decimal::from_fixed(&one - survival, scale).round_to(precision))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
