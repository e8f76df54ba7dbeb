//! Money representation for the ledger.
//!
//! Local state always holds decimal amounts. Wire payloads always hold
//! integers in the currency's minor unit. This module owns the conversion
//! between the two and is applied at every API boundary by the mappers.
//!
//! ## Rounding
//!
//! Every conversion and display rounds half away from zero
//! (`RoundingStrategy::MidpointAwayFromZero`): `0.005 USD -> 1` cent,
//! `-0.005 USD -> -1` cent, `2.5 CLP -> 3`. There is no other rounding rule
//! anywhere in the crate, so totals are reproducible.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use crate::backend::domain::error::{LedgerError, LedgerResult};

/// Currencies without a minor unit when nothing else is configured
pub const DEFAULT_ZERO_DECIMAL_CURRENCIES: &[&str] =
    &["CLP", "JPY", "KRW", "VND", "ISK", "PYG", "UGX", "XAF", "XOF"];

pub const DEFAULT_CURRENCY: &str = "CLP";

const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Currency-aware conversions between decimal and minor-unit amounts
#[derive(Debug, Clone)]
pub struct MoneyService {
    default_currency: String,
    zero_decimal: Arc<HashSet<String>>,
}

impl Default for MoneyService {
    fn default() -> Self {
        Self::new(
            DEFAULT_CURRENCY,
            DEFAULT_ZERO_DECIMAL_CURRENCIES.iter().map(|c| c.to_string()),
        )
    }
}

impl MoneyService {
    pub fn new<I>(default_currency: &str, zero_decimal_currencies: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let zero_decimal = zero_decimal_currencies
            .into_iter()
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty())
            .collect();
        Self {
            default_currency: default_currency.trim().to_ascii_uppercase(),
            zero_decimal: Arc::new(zero_decimal),
        }
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// The given currency code, or the default one when absent or blank
    pub fn resolve_currency(&self, currency: Option<&str>) -> String {
        match currency.map(str::trim) {
            Some(code) if !code.is_empty() => code.to_ascii_uppercase(),
            _ => self.default_currency.clone(),
        }
    }

    pub fn is_zero_decimal(&self, currency: &str) -> bool {
        self.zero_decimal.contains(&currency.trim().to_ascii_uppercase())
    }

    /// Number of decimal places the currency carries
    pub fn decimals(&self, currency: &str) -> u32 {
        if self.is_zero_decimal(currency) {
            0
        } else {
            2
        }
    }

    /// Convert a decimal amount into the currency's minor unit
    pub fn to_minor(&self, amount: Decimal, currency: &str) -> LedgerResult<i64> {
        let scale = self.decimals(currency);
        let factor = Decimal::from(10_i64.pow(scale));
        let scaled = amount.checked_mul(factor).ok_or_else(|| {
            LedgerError::validation(format!("Amount {} is too large for {}", amount, currency))
        })?;
        scaled
            .round_dp_with_strategy(0, ROUNDING)
            .to_i64()
            .ok_or_else(|| {
                LedgerError::validation(format!("Amount {} is out of range for {}", amount, currency))
            })
    }

    /// Convert a minor-unit integer back into a decimal amount
    pub fn from_minor(&self, minor: i64, currency: &str) -> Decimal {
        Decimal::new(minor, self.decimals(currency))
    }

    /// Round an amount to the currency's precision
    pub fn round(&self, amount: Decimal, currency: &str) -> Decimal {
        amount.round_dp_with_strategy(self.decimals(currency), ROUNDING)
    }

    /// Parse user input such as `"$1,234.50"` or `" 60 000 "` into a decimal
    pub fn parse_amount(&self, input: &str) -> LedgerResult<Decimal> {
        let cleaned: String = input
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .trim_end_matches(|c: char| c.is_ascii_alphabetic())
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | '_') && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return Err(LedgerError::validation("Amount is empty"));
        }

        Decimal::from_str(&cleaned)
            .map_err(|e| LedgerError::validation(format!("Invalid amount '{}': {}", input.trim(), e)))
    }

    /// Render an amount for display, e.g. `-$1,234.50`, `€12.00` or `CHF 5.00`
    pub fn format_amount(&self, amount: Decimal, currency: &str) -> String {
        let scale = self.decimals(currency) as usize;
        let rounded = self.round(amount, currency);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        let digits = format!("{:.*}", scale, rounded.abs());
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
            None => (digits, None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let symbol = currency_symbol(currency);
        match fraction {
            Some(fraction) => format!("{}{}{}.{}", sign, symbol, grouped, fraction),
            None => format!("{}{}{}", sign, symbol, grouped),
        }
    }
}

/// Display prefix for a currency; codes without a known symbol render as `"CHF "`
fn currency_symbol(currency: &str) -> String {
    let code = currency.trim().to_ascii_uppercase();
    match code.as_str() {
        "USD" | "CLP" | "MXN" | "ARS" | "COP" | "CAD" | "AUD" | "NZD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        _ => format!("{} ", code),
    }
}
