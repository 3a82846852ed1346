//! Price parsing and rendering for the pt-BR locale: `,` as decimal
//! separator, no grouping, `R$` as currency symbol.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

pub const CURRENCY_SYMBOL: &str = "R$";
pub const DECIMAL_SEPARATOR: char = ',';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid amount: {0:?}")]
pub struct ParseError(pub String);

/// Parses a decimal amount written with `,` as the decimal separator.
pub fn parse_localized_amount(text: &str) -> Result<f64, ParseError> {
    let err = || ParseError(text.to_string());

    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (int, frac) = body.split_once(DECIMAL_SEPARATOR).unwrap_or((body, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return Err(err());
    }

    let int = if int.is_empty() { "0" } else { int };
    let value: f64 = format!("{int}.{frac}").parse().map_err(|_| err())?;

    Ok(if negative { -value } else { value })
}

/// Renders an amount with two fractional digits. Negative and non-finite
/// values are shown as zero.
pub fn format_amount_for_display(value: f64) -> String {
    let value = if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    };

    format_rounded(value, 2)
}

/// Re-renders a masked input buffer: every digit typed so far is read as a
/// count of cents.
pub fn format_digits_as_amount(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let digits = digits.trim_start_matches('0');

    let padded = format!("{digits:0>3}");
    let (int, cents) = padded.split_at(padded.len() - 2);

    format!("{int}{DECIMAL_SEPARATOR}{cents}")
}

/// Same as [`format_amount_for_display`] with the currency symbol in front.
pub fn format_currency_display(value: f64) -> String {
    format!("{} {}", CURRENCY_SYMBOL, format_amount_for_display(value))
}

/// Renders a percentage with one fractional digit.
pub fn format_ratio(value: f64) -> String {
    format_rounded(value, 1)
}

/// Rounds half away from zero on the shortest decimal form of `value`,
/// the way a person reading the number would.
fn format_rounded(value: f64, dp: u32) -> String {
    let precision = dp as usize;

    let text = match Decimal::from_str(&value.to_string()) {
        Ok(d) => {
            let d = d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
            format!("{d:.precision$}")
        }
        Err(_) => format!("{value:.precision$}"),
    };

    text.replace('.', &DECIMAL_SEPARATOR.to_string())
}
