//! Currency normalization onto a USD-equivalent unit

use anyhow::{bail, Result};
use std::collections::HashMap;

/// Immutable table of currency code to USD-equivalent multiplier.
///
/// Built once at startup and shared read-only between requests. Codes are
/// stored upper-case; lookups are case-sensitive, so `"eur"` is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRateTable {
    rates: HashMap<String, f64>,
}

impl ExchangeRateTable {
    /// Multiplier applied to currencies missing from the table
    pub const FALLBACK_RATE: f64 = 1.0;

    /// Build a table from configured rates, rejecting non-positive multipliers.
    pub fn from_rates(rates: HashMap<String, f64>) -> Result<Self> {
        let mut table = HashMap::with_capacity(rates.len());
        for (code, rate) in rates {
            if !rate.is_finite() || rate <= 0.0 {
                bail!("Exchange rate for {} must be a positive number, got {}", code, rate);
            }
            table.insert(code.to_uppercase(), rate);
        }
        Ok(Self { rates: table })
    }

    /// Multiplier for `currency`, falling back to 1.0 for unknown codes
    pub fn rate(&self, currency: &str) -> f64 {
        self.rates
            .get(currency)
            .copied()
            .unwrap_or(Self::FALLBACK_RATE)
    }

    /// Convert `amount` in `currency` to USD equivalent.
    pub fn normalize(&self, amount: f64, currency: &str) -> f64 {
        amount * self.rate(currency)
    }
}

impl Default for ExchangeRateTable {
    fn default() -> Self {
        Self {
            rates: crate::config::default_rates(),
        }
    }
}
