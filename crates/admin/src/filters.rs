//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::{Decimal, RoundingStrategy};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a rupee amount with lakh grouping, e.g. `₹1,23,456.50`.
///
/// Accepts plain numbers and the `₹1299` form `Amount` displays as.
/// Anything else is rendered unchanged.
///
/// Usage in templates: `{{ order.amount|inr }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn inr(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_inr(&value.to_string()))
}

fn format_inr(raw: &str) -> String {
    let digits = raw.trim().replacen('₹', "", 1);
    let Ok(value) = digits.parse::<Decimal>() else {
        return raw.to_string();
    };
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    format!("{sign}₹{}.{fraction}", group_lakh(whole))
}

/// `1234567` -> `12,34,567`
fn group_lakh(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
