//! Placeholder market analysis endpoint.
//!
//! Prices are synthesized, not ingested: a sine wave around 100 with random
//! jitter. The only computation is a simple moving average over the requested
//! lookback window and a buy/sell signal from the last price vs. that average.

use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::auth::Principal;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_lookback, validate_symbol};

/// Length of the synthesized price series
const PRICE_SERIES_LEN: usize = 60;

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub symbol: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_lookback")]
    pub lookback: usize,
}

fn default_timeframe() -> String {
    "1D".to_string()
}

fn default_strategy() -> String {
    "SMA".to_string()
}

fn default_lookback() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub symbol: String,
    pub timeframe: String,
    pub strategy: String,
    pub sma: f64,
    pub last: f64,
    pub signal: String,
    pub confidence: f64,
}

/// Synthesize a fake price series: sine drift around 100 plus uniform jitter
fn synthesize_prices(len: usize) -> Vec<f64> {
    let mut rng = rand::rng();
    (0..len)
        .map(|i| 100.0 + (i as f64 / 3.0).sin() * 5.0 + rng.random_range(-1.0..1.0))
        .collect()
}

/// Simple moving average over the trailing `lookback` prices. Falls back to
/// the whole series when it is shorter than the window.
fn simple_moving_average(prices: &[f64], lookback: usize) -> f64 {
    let window = if prices.len() >= lookback {
        &prices[prices.len() - lookback..]
    } else {
        prices
    };
    window.iter().sum::<f64>() / window.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run the placeholder analysis
///
/// POST /analysis
pub async fn analyze(
    _principal: Principal,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_symbol(&req.symbol) {
        errors.add("symbol", e);
    }
    if let Err(e) = validate_lookback(req.lookback) {
        errors.add("lookback", e);
    }
    errors.finish()?;

    let prices = synthesize_prices(PRICE_SERIES_LEN);
    let sma = simple_moving_average(&prices, req.lookback);
    let last = prices[prices.len() - 1];

    let signal = if last > sma { "buy" } else { "sell" };
    let confidence = if signal == "buy" { 0.62 } else { 0.55 };

    Ok(Json(AnalysisResponse {
        symbol: req.symbol.to_uppercase(),
        timeframe: req.timeframe,
        strategy: req.strategy,
        sma: round2(sma),
        last: round2(last),
        signal: signal.to_string(),
        confidence,
    }))
}
