//! Integration tests for the optpricing engines.
//!
//! Exercises every engine through the public [`PricingModel`] API: reference
//! Black-Scholes values, Monte Carlo convergence to the closed form,
//! reproducibility through shared draw buffers, degenerate expiries,
//! unsupported Greeks, implied-vol round trips and concurrent use.

use std::sync::Arc;
use std::thread;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use optpricing::conventions::time_steps;
use optpricing::simulation::draws::{correlated_normals, seeded_rng, standard_normals};
use optpricing::simulation::{HestonParams, JumpParams, MonteCarloDraws, SimulationConfig};
use optpricing::{
    AnalyticEngine, Greek, Method, MonteCarloConfig, MonteCarloEngine, OptionContract, OptionType,
    PricingError, PricingModel, StochasticVolatilityConfig, StochasticVolatilityEngine,
};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Route engine logs to the test harness; `RUST_LOG=optpricing=debug` shows them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// S=100, K=90, r=5%, σ=20%, T=1.
fn reference_call() -> OptionContract {
    OptionContract::new(100.0, 90.0, 0.05, 0.2, 1.0, OptionType::Call).unwrap()
}

/// Short-dated contract: T = 0.05 → 81 simulation steps.
fn short_dated(strike: f64, option_type: OptionType) -> OptionContract {
    OptionContract::new(100.0, strike, 0.05, 0.2, 0.05, option_type).unwrap()
}

fn gbm_engine(num_sims: usize, seed: u64) -> MonteCarloEngine {
    MonteCarloEngine::new(
        MonteCarloConfig::new(SimulationConfig::new(num_sims).unwrap().with_seed(seed))
            .without_jumps(),
    )
}

fn heston_engine(num_sims: usize, seed: u64) -> StochasticVolatilityEngine {
    StochasticVolatilityEngine::new(StochasticVolatilityConfig::new(
        SimulationConfig::new(num_sims).unwrap().with_seed(seed),
        HestonParams::new(-0.7, 0.3, 2.0, 0.04).unwrap(),
    ))
}

// ---------------------------------------------------------------------------
// Analytic engine
// ---------------------------------------------------------------------------

#[test]
fn reference_contract_values() -> Result<(), Box<dyn std::error::Error>> {
    let engine = AnalyticEngine::new();
    let c = reference_call();

    assert_abs_diff_eq!(engine.price(&c, None)?, 16.70, epsilon = 0.01);
    assert_abs_diff_eq!(engine.delta(&c, None)?.value, 0.8096, epsilon = 1e-3);
    // φ(d₁)/(Sσ√T) and S·φ(d₁)·√T with d₁ = 0.8768
    assert_abs_diff_eq!(engine.gamma(&c, None)?.value, 0.01358, epsilon = 1e-4);
    assert_abs_diff_eq!(engine.vega(&c, None)?.value, 27.16, epsilon = 0.01);
    Ok(())
}

#[test]
fn one_year_has_1638_trading_hours() {
    assert_eq!(time_steps(1.0).unwrap(), 1638);
}

#[test]
fn put_call_parity_across_strikes() -> Result<(), Box<dyn std::error::Error>> {
    let engine = AnalyticEngine::new();
    for k in [60.0, 80.0, 100.0, 120.0, 150.0] {
        let call = OptionContract::new(100.0, k, 0.03, 0.25, 0.75, OptionType::Call)?;
        let put = call.with_option_type(OptionType::Put);
        let lhs = engine.price(&call, None)? - engine.price(&put, None)?;
        let rhs = 100.0 - k * (-0.03_f64 * 0.75).exp();
        assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn implied_vol_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let engine = AnalyticEngine::new();
    let c = reference_call();
    let price = engine.price(&c, None)?;
    let vol = engine.implied_volatility(100.0, 90.0, 0.05, 1.0, price, OptionType::Call)?;
    assert_abs_diff_eq!(vol.0, 0.2, epsilon = 1e-8);

    let repriced = engine.price(&c.with_sigma(vol.0)?, None)?;
    assert_abs_diff_eq!(repriced, price, epsilon = 1e-9);
    Ok(())
}

#[test]
fn implied_vol_reports_non_convergence() {
    // above the no-arbitrage upper bound S for a call
    let res = AnalyticEngine::new().implied_volatility(100.0, 90.0, 0.05, 1.0, 120.0, OptionType::Call);
    assert!(matches!(res, Err(PricingError::NumericalFailure { .. })));
}

// ---------------------------------------------------------------------------
// Monte Carlo engine
// ---------------------------------------------------------------------------

#[test]
fn gbm_monte_carlo_converges_to_black_scholes() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let c = short_dated(95.0, OptionType::Call);
    let mc = gbm_engine(100_000, 2024).price(&c, None)?;
    let bs = AnalyticEngine::new().price(&c, None)?;
    assert_relative_eq!(mc, bs, max_relative = 0.01);
    Ok(())
}

#[test]
fn jump_model_prices_satisfy_parity_approximately() -> Result<(), Box<dyn std::error::Error>> {
    let engine = MonteCarloEngine::new(
        MonteCarloConfig::new(SimulationConfig::new(20_000)?.with_seed(5))
            .with_jumps(JumpParams::new(1.0, -0.1, 0.2)?),
    );
    let call = short_dated(100.0, OptionType::Call);
    let put = call.with_option_type(OptionType::Put);
    let draws = engine.generate_draws(&call)?;
    let lhs = engine.price(&call, Some(&draws))? - engine.price(&put, Some(&draws))?;
    let rhs = 100.0 - 100.0 * (-0.05_f64 * 0.05).exp();
    assert_abs_diff_eq!(lhs, rhs, epsilon = 0.2);
    Ok(())
}

#[test]
fn identical_buffers_give_bit_identical_results() -> Result<(), Box<dyn std::error::Error>> {
    let c = short_dated(100.0, OptionType::Put);
    let steps = time_steps(c.expiry())?;
    let normals = standard_normals(&mut seeded_rng(Some(99)), steps, 1_000);
    let draws = MonteCarloDraws::new(normals);

    // a seeded and an unseeded engine replay the same buffer
    let a = gbm_engine(1_000, 1);
    let b = MonteCarloEngine::new(MonteCarloConfig::new(SimulationConfig::new(1_000)?).without_jumps());
    assert_eq!(a.price(&c, Some(&draws))?.to_bits(), b.price(&c, Some(&draws))?.to_bits());
    assert_eq!(
        a.delta(&c, Some(&draws))?.value.to_bits(),
        b.delta(&c, Some(&draws))?.value.to_bits()
    );
    Ok(())
}

#[test]
fn finite_difference_greeks_record_their_bumps() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let c = short_dated(100.0, OptionType::Call);
    let engine = gbm_engine(2_000, 3);
    let g = engine.greeks(&c, None)?;
    let h = 0.05 / 81.0;
    assert_eq!(g.delta.map(|d| d.method), Some(Method::ForwardDifference { step: h }));
    assert_eq!(g.gamma.map(|d| d.method), Some(Method::CentralDifference { step: h }));
    assert_eq!(g.vega.map(|d| d.method), Some(Method::ForwardDifference { step: 1.0 / 81.0 }));
    assert_eq!(g.rho.map(|d| d.method), Some(Method::ForwardDifference { step: h }));
    assert!(g.theta.is_none());
    Ok(())
}

#[test]
fn monte_carlo_theta_is_a_known_gap() {
    let c = short_dated(100.0, OptionType::Call);
    let res = MonteCarloEngine::default().theta(&c, None);
    assert!(matches!(
        res,
        Err(PricingError::Unsupported {
            greek: Greek::Theta,
            ..
        })
    ));
}

#[test]
fn degenerate_expiry_fails_fast() {
    // 1e-4 years is well under one trading hour
    let c = OptionContract::new(100.0, 100.0, 0.05, 0.2, 1e-4, OptionType::Call).unwrap();
    let mc = MonteCarloEngine::default();
    let sv = heston_engine(10, 1);
    assert!(matches!(mc.price(&c, None), Err(PricingError::DegenerateInput { .. })));
    assert!(matches!(mc.gamma(&c, None), Err(PricingError::DegenerateInput { .. })));
    assert!(matches!(sv.price(&c, None), Err(PricingError::DegenerateInput { .. })));
    assert!(matches!(sv.delta(&c, None), Err(PricingError::DegenerateInput { .. })));
    // the closed form has no discretization and prices it fine
    assert!(AnalyticEngine::new().price(&c, None).unwrap().is_finite());
}

// ---------------------------------------------------------------------------
// Stochastic volatility engine
// ---------------------------------------------------------------------------

#[test]
fn heston_accepts_caller_buffer() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let c = short_dated(100.0, OptionType::Call);
    let draws = correlated_normals(&mut seeded_rng(Some(17)), 81, 1_000, -0.7)?;
    let engine = heston_engine(1_000, 1);
    let p1 = engine.price(&c, Some(&draws))?;
    let p2 = engine.price(&c, Some(&draws))?;
    assert_eq!(p1.to_bits(), p2.to_bits());
    let delta = engine.delta(&c, Some(&draws))?;
    assert!(delta.value > 0.0 && delta.value < 1.0);
    Ok(())
}

#[test]
fn heston_exposes_delta_only() {
    let c = short_dated(100.0, OptionType::Put);
    let engine = heston_engine(200, 2);
    for greek in [Greek::Gamma, Greek::Vega, Greek::Theta, Greek::Rho] {
        let res = match greek {
            Greek::Gamma => engine.gamma(&c, None),
            Greek::Vega => engine.vega(&c, None),
            Greek::Theta => engine.theta(&c, None),
            _ => engine.rho(&c, None),
        };
        match res {
            Err(PricingError::Unsupported { greek: g, model }) => {
                assert_eq!(g, greek);
                assert_eq!(model, "Heston");
            }
            other => panic!("expected Unsupported for {greek}, got {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Polymorphism and thread safety
// ---------------------------------------------------------------------------

fn call_price<M: PricingModel>(model: &M, contract: &OptionContract) -> f64 {
    model.price(contract, None).unwrap()
}

#[test]
fn every_engine_prices_through_the_trait() {
    let c = short_dated(95.0, OptionType::Call);
    let analytic = call_price(&AnalyticEngine::new(), &c);
    let mc = call_price(&gbm_engine(20_000, 4), &c);
    let heston = call_price(&heston_engine(5_000, 4), &c);
    for p in [analytic, mc, heston] {
        assert!(p > 5.0 - 1e-9 && p < 7.0, "price {p} outside sanity band");
    }
}

#[test]
fn engines_are_shareable_across_threads() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(gbm_engine(1_000, 21));
    let c = short_dated(100.0, OptionType::Call);
    let expected = engine.price(&c, None)?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let e = Arc::clone(&engine);
            thread::spawn(move || -> optpricing::Result<f64> { e.price(&c, None) })
        })
        .collect();

    for h in handles {
        let price = h.join().expect("thread panicked")?;
        assert_eq!(price, expected);
    }
    Ok(())
}

#[test]
fn batched_pricing_combines_to_the_same_estimate() -> Result<(), Box<dyn std::error::Error>> {
    let c = short_dated(95.0, OptionType::Call);
    let engine = gbm_engine(60_000, 31);
    let batched = engine.price_batched(&c, 6)?;
    let bs = AnalyticEngine::new().price(&c, None)?;
    assert_relative_eq!(batched, bs, max_relative = 0.015);
    Ok(())
}

#[test]
fn contracts_deserialize_with_validation() {
    let ok = r#"{"spot":100.0,"strike":90.0,"rate":0.05,"sigma":0.2,"expiry":1.0,"option_type":"call"}"#;
    let c: OptionContract = serde_json::from_str(ok).unwrap();
    assert_eq!(c, reference_call());

    let bad = r#"{"spot":-100.0,"strike":90.0,"rate":0.05,"sigma":0.2,"expiry":1.0,"option_type":"call"}"#;
    assert!(serde_json::from_str::<OptionContract>(bad).is_err());
}
