//! # Money Types
//!
//! Currency and price types for kitshop.
//! Every amount is held in the smallest currency unit (cents for USD).

use serde::{Deserialize, Serialize};

/// Currencies the storefront can quote in (ISO 4217)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    MXN,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
            Currency::MXN => "mxn",
        }
    }

    /// Parse a currency code, case-insensitive
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "usd" => Some(Currency::USD),
            "eur" => Some(Currency::EUR),
            "gbp" => Some(Currency::GBP),
            "jpy" => Some(Currency::JPY),
            "cad" => Some(Currency::CAD),
            "aud" => Some(Currency::AUD),
            "mxn" => Some(Currency::MXN),
            _ => None,
        }
    }

    /// Minor units in one major unit (1 for JPY, 100 for the others)
    pub fn minor_per_major(&self) -> u64 {
        match self {
            Currency::JPY => 1,
            _ => 100,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
            Currency::MXN => "MX$",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Price from an amount in minor units
    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Format for display (e.g. "$10.00", "¥1000")
    pub fn display(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        format!(
            "{}{}{}",
            sign,
            self.currency.symbol(),
            format_unsigned(self.amount.unsigned_abs(), self.currency)
        )
    }
}

/// Format an unsigned minor-unit amount, as produced by the pricing engine
pub fn display_minor(amount: u64, currency: Currency) -> String {
    format!("{}{}", currency.symbol(), format_unsigned(amount, currency))
}

fn format_unsigned(amount: u64, currency: Currency) -> String {
    let per_major = currency.minor_per_major();
    if per_major == 1 {
        amount.to_string()
    } else {
        format!("{}.{:02}", amount / per_major, amount % per_major)
    }
}
