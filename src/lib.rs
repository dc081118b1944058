//! # u-manifest
//!
//! Manifestation probability for the U-Engine ecosystem.
//!
//! Computes `P(t, p) = 1 − e^(−tp)`, the probability that at least one
//! success occurs over `t` independent attempts of success probability
//! `p`, together with its inverse (the critical `τ = tp` at which `P`
//! reaches a target) and an arbitrary-precision variant of both.
//!
//! ## Modules
//!
//! - [`special`] — Cancellation-free `expm1`/`ln_1p` complement primitives
//! - [`manifestation`] — Validated f64 evaluation, inverse and regimes
//! - [`precise`] — Arbitrary-precision decimal evaluation
//! - [`error`] — The shared [`ManifestationError`] type
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: `−expm1(−τ)` instead of `1 − exp(−τ)`,
//!   so `P(τ) ≈ τ` holds to full precision for tiny `τ`
//! - **Saturation is correct**: `P = 1.0` for `τ ≳ 37.4` in f64 is the
//!   rounded answer, not an overflow
//! - **Reject, never clamp**: domain violations return
//!   [`ManifestationError::InvalidParameter`] before any arithmetic
//! - **Lean library**: the demo's CLI stack (`clap`, `anyhow`,
//!   `tracing-subscriber`) is only built with the `demo` feature
//! - **Property-based testing**: Mathematical invariants verified via proptest

pub mod error;
pub mod manifestation;
pub mod precise;
pub mod special;

pub use error::ManifestationError;
pub use manifestation::{critical_tau, manifestation_probability};
