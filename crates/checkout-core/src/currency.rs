//! # Currency Conversion
//!
//! Converts the EUR-denominated order total into each supported settlement
//! currency using static configured rates.
//!
//! The converted amounts are advisory: they drive the payment-method labels
//! and the RoboKassa charge amount. The crypto provider quotes its own live
//! rate when the invoice is created, so its displayed amount is only an
//! estimate.

use serde::{Deserialize, Serialize};

/// The currency the customer ultimately pays in, distinct from the
/// EUR-denominated catalog pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementCurrency {
    Eur,
    Rub,
    Usdt,
}

impl SettlementCurrency {
    /// Lowercase code used on provider wires
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementCurrency::Eur => "eur",
            SettlementCurrency::Rub => "rub",
            SettlementCurrency::Usdt => "usdt",
        }
    }

    /// Display symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            SettlementCurrency::Eur => "€",
            SettlementCurrency::Rub => "₽",
            SettlementCurrency::Usdt => "USDT",
        }
    }

    /// Fractional digits shown for this currency.
    /// RUB is displayed without kopecks.
    pub fn display_precision(&self) -> u8 {
        match self {
            SettlementCurrency::Rub => 0,
            SettlementCurrency::Eur | SettlementCurrency::Usdt => 2,
        }
    }
}

impl std::fmt::Display for SettlementCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Static multiplicative rates from configuration; no live FX lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub eur_to_rub: f64,
    pub eur_to_usdt: f64,
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self {
            eur_to_rub: 100.0,
            eur_to_usdt: 1.05,
        }
    }
}

/// A converted amount with its display precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Converted {
    pub amount: f64,
    pub currency: SettlementCurrency,
    pub precision: u8,
}

impl Converted {
    /// Numeric string at display precision ("10000", "105.00")
    pub fn format_amount(&self) -> String {
        format!("{:.*}", self.precision as usize, self.amount)
    }

    /// Amount plus symbol ("10000 ₽", "105.00 USDT")
    pub fn display(&self) -> String {
        format!("{} {}", self.format_amount(), self.currency.symbol())
    }
}

/// Converts EUR totals into settlement currencies
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrencyConverter {
    rates: ExchangeRates,
}

impl CurrencyConverter {
    pub fn new(rates: ExchangeRates) -> Self {
        Self { rates }
    }

    /// Configured rates
    pub fn rates(&self) -> &ExchangeRates {
        &self.rates
    }

    /// Convert a EUR amount into the target settlement currency.
    ///
    /// Total function over the closed currency set; RUB is rounded to the
    /// nearest whole unit, EUR and USDT keep fractional precision.
    pub fn convert(&self, amount_eur: f64, target: SettlementCurrency) -> Converted {
        let amount = match target {
            SettlementCurrency::Eur => amount_eur,
            SettlementCurrency::Rub => (amount_eur * self.rates.eur_to_rub).round(),
            SettlementCurrency::Usdt => amount_eur * self.rates.eur_to_usdt,
        };

        Converted {
            amount,
            currency: target,
            precision: target.display_precision(),
        }
    }
}
