//! Demonstration of the manifestation probability engine.
//!
//! Prints the 99% critical point, a saturated extreme, the high-precision
//! discrete check, the critical thresholds for the requested targets and a
//! text rendering of `P(τ) = 1 − e^(−τ)`.
//!
//! Log verbosity follows `U_MANIFEST_LOG` (default `info`).
//!
//! Run with: `cargo run --features demo --bin manifest-demo`

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_manifest::manifestation::{self, probability_curve, Regime};
use u_manifest::precise::{self, Decimal, Precision};

const BAR_WIDTH: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "manifest-demo")]
struct Args {
    /// Significant digits for the high-precision checks.
    #[arg(long, default_value_t = Precision::DEFAULT_DIGITS)]
    precision: u32,

    /// Target probabilities whose critical τ is reported.
    #[arg(long, value_delimiter = ',', default_values_t = [0.99, 0.999])]
    targets: Vec<f64>,

    /// Upper end of the plotted τ range.
    #[arg(long, default_value_t = 10.0)]
    tau_max: f64,

    /// Number of curve intervals on [0, tau_max].
    #[arg(long, default_value_t = 20)]
    steps: usize,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("U_MANIFEST_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let precision = Precision::new(args.precision)?;
    info!(digits = precision.digits(), "starting manifestation demo");

    // 99% critical point in the continuous model
    let p = 1e-20;
    let t_99 = manifestation::critical_trials(0.99, p)?;
    let prob_99 = manifestation::manifestation_probability(t_99, p)?;
    println!("Critical point 99%:  t = {t_99:e}, p = {p:e}, P = {prob_99:.15}");

    // Saturation: e^(-10000) underflows and P is exactly 1.0
    let (p_extreme, t_extreme) = (0.1, 1e5);
    let prob_extreme = manifestation::manifestation_probability(t_extreme, p_extreme)?;
    let regime = Regime::classify(t_extreme * p_extreme)?;
    println!("Extreme case:        t = {t_extreme:e}, p = {p_extreme}, P = {prob_extreme} ({regime:?})");

    // Discrete analogue 1 − (1 − p)^N on exact decimals
    let p_dec: Decimal = "1e-20".parse()?;
    let n: u128 = 460_517_018_598_809_200_000;
    let prob_dec = precise::discrete_manifestation_probability(n, &p_dec, precision)?;
    println!("Decimal discrete:    N = {n}, p = {p_dec}, P = {prob_dec}");

    for &target in &args.targets {
        let tau = manifestation::critical_tau(target)?;
        let tau_precise = precise::critical_tau(&Decimal::try_from(target)?, precision)?;
        println!("Critical tau P={target}: {tau:.6} (decimal {tau_precise})");
    }

    println!();
    println!("P(tau) = 1 - exp(-tau)");
    for (tau, prob) in probability_curve(args.tau_max, args.steps)? {
        let filled = (prob * BAR_WIDTH as f64).round() as usize;
        println!(
            "{tau:>7.3} | {:<width$} | {prob:.6}",
            "#".repeat(filled),
            width = BAR_WIDTH
        );
    }

    Ok(())
}
