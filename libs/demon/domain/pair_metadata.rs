//! Per-symbol price/quantity increments and their rounding rule

use serde::{Deserialize, Serialize};

/// Most decimals any exchange increment is expected to carry
const MAX_DECIMALS: u32 = 12;

/// Static trading rules for one symbol, supplied once by the exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairMetadata {
    pub tick_size: f64,
    pub step_size: f64,
    pub price_decimals: u32,
    pub qty_decimals: u32,
    /// Smallest accepted order value in quote asset
    #[serde(default)]
    pub min_notional: Option<f64>,
}

impl PairMetadata {
    pub fn new(tick_size: f64, step_size: f64) -> Self {
        Self {
            tick_size,
            step_size,
            price_decimals: decimals_for(tick_size),
            qty_decimals: decimals_for(step_size),
            min_notional: None,
        }
    }

    pub fn with_min_notional(mut self, min_notional: f64) -> Self {
        self.min_notional = Some(min_notional);
        self
    }

    /// Round a price to the tick's decimal precision
    pub fn round_price(&self, price: f64) -> f64 {
        round_to_decimals(price, self.price_decimals)
    }

    /// Round a quantity to the step's decimal precision
    pub fn round_qty(&self, qty: f64) -> f64 {
        round_to_decimals(qty, self.qty_decimals)
    }

    /// Price formatted exactly as the exchange expects it
    pub fn format_price(&self, price: f64) -> String {
        format!("{:.*}", self.price_decimals as usize, price)
    }

    /// Quantity formatted exactly as the exchange expects it
    pub fn format_qty(&self, qty: f64) -> String {
        format!("{:.*}", self.qty_decimals as usize, qty)
    }

    /// Whether an order of this size clears the minimum notional filter
    pub fn meets_min_notional(&self, price: f64, qty: f64) -> bool {
        match self.min_notional {
            Some(min) => price * qty >= min,
            None => true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.tick_size.is_finite()
            && self.step_size.is_finite()
            && self.tick_size > 0.0
            && self.step_size > 0.0
    }
}

impl Default for PairMetadata {
    fn default() -> Self {
        Self::new(0.00000001, 0.00000001)
    }
}

/// Number of decimals needed to express an increment.
///
/// Increments of 1 or more round to whole units; smaller increments use the
/// fewest decimals that represent them exactly (0.01 -> 2, 0.05 -> 2).
pub fn decimals_for(increment: f64) -> u32 {
    if !increment.is_finite() || increment <= 0.0 || increment >= 1.0 {
        return 0;
    }
    (0..=MAX_DECIMALS)
        .find(|&d| {
            let scaled = increment * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-9
        })
        .unwrap_or(MAX_DECIMALS)
}

/// Round half away from zero to `decimals` places
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
